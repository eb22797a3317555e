//! Favorite games persisted in the local store.

use crate::model::favorite::FavoriteGame;
use crate::model::game::{Game, GameId};
use crate::store::{FetchRequest, Predicate, SortDescriptor, Store, StoreResult};
use log::info;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Favorites use-case service over `Store`.
pub struct FavoriteService {
    store: Arc<Store>,
}

impl FavoriteService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Marks `game` as favorite, refreshing the snapshot if it already is.
    pub async fn add(&self, game: &Game) -> StoreResult<FavoriteGame> {
        self.save(FavoriteGame::from_game(game, now_epoch_ms())).await
    }

    /// Persists an explicit favorite record.
    pub async fn save(&self, favorite: FavoriteGame) -> StoreResult<FavoriteGame> {
        self.store.save(favorite.clone()).await?;
        info!(
            "event=favorite_add module=catalogue status=ok game_id={}",
            favorite.game_id
        );
        Ok(favorite)
    }

    /// Removes a favorite. Removing a game that is not a favorite succeeds.
    pub async fn remove(&self, game_id: GameId) -> StoreResult<()> {
        self.store.delete_by_key::<FavoriteGame>(game_id).await?;
        info!("event=favorite_remove module=catalogue status=ok game_id={game_id}");
        Ok(())
    }

    /// Newest favorites first; ties are broken by game id.
    pub async fn list(&self, offset: u32, size: u32) -> StoreResult<Vec<FavoriteGame>> {
        let request = FetchRequest::new()
            .sort_by(SortDescriptor::descending("added_at"))
            .sort_by(SortDescriptor::ascending("game_id"))
            .offset(offset)
            .limit(size);
        self.store.fetch_all(request).await
    }

    /// Returns `StoreError::NotFound` when `game_id` is not a favorite.
    pub async fn get(&self, game_id: GameId) -> StoreResult<FavoriteGame> {
        self.store
            .fetch_first(FetchRequest::new().predicate(by_id(game_id)))
            .await
    }

    pub async fn is_favorite(&self, game_id: GameId) -> StoreResult<bool> {
        let matches = self
            .store
            .count::<FavoriteGame>(Some(by_id(game_id)))
            .await?;
        Ok(matches > 0)
    }

    pub async fn count(&self) -> StoreResult<u64> {
        self.store.count::<FavoriteGame>(None).await
    }
}

fn by_id(game_id: GameId) -> Predicate {
    Predicate::new().eq("game_id", game_id)
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
