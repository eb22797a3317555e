//! Remote catalogue records.
//!
//! Shapes follow the catalogue API's JSON; unknown fields are ignored and
//! optional fields default so partial payloads still decode.

use serde::{Deserialize, Serialize};

/// Stable identifier assigned by the remote catalogue.
pub type GameId = i64;

/// Genre tag attached to a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// One catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    /// Release date as published by the API (`YYYY-MM-DD`).
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    /// Average user rating on a 0..=5 scale.
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Plain-text description; only present on detail responses.
    #[serde(default)]
    pub description_raw: Option<String>,
}

/// Paged list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePage {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub results: Vec<Game>,
}

impl GamePage {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}
