//! Locally persisted favorite game.
//!
//! # Invariants
//! - `game_id` is the remote catalogue id and the row key.
//! - `name` is never blank and `rating` stays within `0..=5`.

use super::game::{Game, GameId};
use crate::store::Entity;
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Snapshot of a catalogue game the user marked as favorite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteGame {
    pub game_id: GameId,
    pub name: String,
    pub released: Option<String>,
    pub background_image: Option<String>,
    pub rating: f64,
    /// Unix epoch milliseconds.
    pub added_at: i64,
}

impl FavoriteGame {
    /// Snapshots the list-level fields of `game`.
    pub fn from_game(game: &Game, added_at: i64) -> Self {
        Self {
            game_id: game.id,
            name: game.name.clone(),
            released: game.released.clone(),
            background_image: game.background_image.clone(),
            rating: game.rating,
            added_at,
        }
    }
}

impl Entity for FavoriteGame {
    const ENTITY_NAME: &'static str = "favorite_games";
    const KEY_COLUMN: &'static str = "game_id";
    const COLUMNS: &'static [&'static str] = &[
        "game_id",
        "name",
        "released",
        "background_image",
        "rating",
        "added_at",
    ];

    fn key(&self) -> Value {
        Value::Integer(self.game_id)
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.game_id),
            Value::Text(self.name.clone()),
            optional_text(&self.released),
            optional_text(&self.background_image),
            Value::Real(self.rating),
            Value::Integer(self.added_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            game_id: row.get("game_id")?,
            name: row.get("name")?,
            released: row.get("released")?,
            background_image: row.get("background_image")?,
            rating: row.get("rating")?,
            added_at: row.get("added_at")?,
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(format!("favorite {} has an empty name", self.game_id));
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(format!(
                "favorite {} has rating {} outside 0..=5",
                self.game_id, self.rating
            ));
        }
        Ok(())
    }
}

fn optional_text(value: &Option<String>) -> Value {
    value.clone().map_or(Value::Null, Value::Text)
}
