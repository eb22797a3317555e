//! Remote game catalogue client.

use crate::config::CoreConfig;
use crate::model::game::{Game, GameId, GamePage};
use crate::net::{HttpClient, NetResult, Request};
use std::sync::Arc;

/// Largest page size the catalogue API accepts.
pub const MAX_PAGE_SIZE: u32 = 40;

/// Typed access to the `/games` endpoints.
pub struct CatalogueApi {
    base_url: String,
    api_key: Option<String>,
    client: Arc<HttpClient>,
}

impl CatalogueApi {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        client: Arc<HttpClient>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client,
        }
    }

    pub fn from_config(config: &CoreConfig, client: Arc<HttpClient>) -> Self {
        Self::new(config.api_base_url.clone(), config.api_key.clone(), client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists games; `page` is 1-based and `page_size` is clamped to
    /// `1..=MAX_PAGE_SIZE`.
    pub async fn list_games(&self, page: u32, page_size: u32) -> NetResult<GamePage> {
        self.request("games")
            .query("page", page.max(1))
            .query("page_size", page_size.clamp(1, MAX_PAGE_SIZE))
            .send(&self.client)
            .await
    }

    pub async fn search_games(&self, query: &str, page: u32) -> NetResult<GamePage> {
        self.request("games")
            .query("search", query.trim())
            .query("page", page.max(1))
            .send(&self.client)
            .await
    }

    pub async fn game_detail(&self, id: GameId) -> NetResult<Game> {
        self.request(&format!("games/{id}"))
            .send(&self.client)
            .await
    }

    fn request(&self, path: &str) -> Request {
        let url = format!("{}/{path}", self.base_url.trim_end_matches('/'));
        Request::get(url).query_opt("key", self.api_key.as_deref())
    }
}
