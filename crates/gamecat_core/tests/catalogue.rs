use gamecat_core::catalogue::{
    CatalogueApi, CatalogueModule, FavoriteService, FavoritesModule, FavoritesProvider,
    GameCatalogueProvider,
};
use gamecat_core::model::favorite::FavoriteGame;
use gamecat_core::model::game::Game;
use gamecat_core::net::{HttpClient, NetError};
use gamecat_core::store::{Store, StoreError, StoreLocation};
use gamecat_core::{AppContext, AppError, CoreConfig, ResolveError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn game(id: i64, name: &str) -> Game {
    serde_json::from_value(json!({"id": id, "name": name, "rating": 4.0})).unwrap()
}

fn api(server: &MockServer, key: Option<&str>) -> CatalogueApi {
    let client = HttpClient::new(Duration::from_secs(5)).unwrap();
    CatalogueApi::new(server.uri(), key.map(str::to_string), Arc::new(client))
}

fn config_for(server: &MockServer) -> CoreConfig {
    CoreConfig {
        api_base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        ..CoreConfig::default()
    }
}

#[tokio::test]
async fn list_games_sends_paging_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "40"))
        .and(query_param("key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": "https://api.example.com/games?page=3",
            "previous": null,
            "results": [
                {"id": 3498, "name": "Grand Theft Auto V", "released": "2013-09-17",
                 "rating": 4.47, "genres": [{"id": 4, "name": "Action"}]},
                {"id": 4200, "name": "Portal 2", "rating": 4.61}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = api(&server, Some("secret")).list_games(2, 100).await.unwrap();

    assert_eq!(page.count, 2);
    assert!(page.has_next());
    assert_eq!(page.results[0].genres[0].name, "Action");
    assert_eq!(page.results[1].released, None);
}

#[tokio::test]
async fn search_and_detail_hit_their_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param("search", "zelda"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "results": [{"id": 22511, "name": "The Legend of Zelda: Breath of the Wild"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/games/22511"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 22511,
            "name": "The Legend of Zelda: Breath of the Wild",
            "description_raw": "Step into a world of discovery."
        })))
        .mount(&server)
        .await;

    let catalogue = api(&server, None);
    let found = catalogue.search_games(" zelda ", 0).await.unwrap();
    assert_eq!(found.results.len(), 1);
    assert!(!found.has_next());

    let detail = catalogue.game_detail(22511).await.unwrap();
    assert_eq!(
        detail.description_raw.as_deref(),
        Some("Step into a world of discovery.")
    );
}

#[tokio::test]
async fn missing_game_surfaces_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = api(&server, None).game_detail(1).await.unwrap_err();
    assert!(matches!(err, NetError::ServerError { code: 404, .. }));
}

#[tokio::test]
async fn favorites_add_list_and_remove() {
    let favorites = FavoriteService::new(Arc::new(Store::in_memory("Favorites").unwrap()));

    favorites
        .save(FavoriteGame::from_game(&game(1, "Celeste"), 100))
        .await
        .unwrap();
    favorites
        .save(FavoriteGame::from_game(&game(2, "Hades"), 300))
        .await
        .unwrap();
    favorites
        .save(FavoriteGame::from_game(&game(3, "Inside"), 200))
        .await
        .unwrap();
    let added = favorites.add(&game(4, "Limbo")).await.unwrap();
    assert!(added.added_at > 300);

    let newest_first: Vec<_> = favorites
        .list(0, 10)
        .await
        .unwrap()
        .into_iter()
        .map(|favorite| favorite.game_id)
        .collect();
    assert_eq!(newest_first, vec![4, 2, 3, 1]);

    let second_page: Vec<_> = favorites
        .list(2, 2)
        .await
        .unwrap()
        .into_iter()
        .map(|favorite| favorite.game_id)
        .collect();
    assert_eq!(second_page, vec![3, 1]);

    assert!(favorites.is_favorite(2).await.unwrap());
    favorites.remove(2).await.unwrap();
    favorites.remove(2).await.unwrap();
    assert!(!favorites.is_favorite(2).await.unwrap());
    assert!(matches!(favorites.get(2).await, Err(StoreError::NotFound)));
    assert_eq!(favorites.get(1).await.unwrap().name, "Celeste");
    assert_eq!(favorites.count().await.unwrap(), 3);
}

#[tokio::test]
async fn bootstrap_wires_modules_and_providers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games/7"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "name": "Spelunky"})))
        .expect(1)
        .mount(&server)
        .await;

    let context = AppContext::bootstrap(config_for(&server)).unwrap();
    assert_eq!(
        context.modules().module_names(),
        vec![CatalogueModule::NAME, FavoritesModule::NAME]
    );
    assert!(context.modules().is_loaded::<FavoritesModule>());

    let catalogue_provider = context
        .navigator()
        .get_provider::<dyn GameCatalogueProvider>()
        .unwrap();
    assert_eq!(catalogue_provider.game_detail_destination(7).route, "/games/7");
    let spelunky = catalogue_provider
        .catalogue()
        .unwrap()
        .game_detail(7)
        .await
        .unwrap();

    let favorites_provider = context
        .navigator()
        .get_provider::<dyn FavoritesProvider>()
        .unwrap();
    let destination = favorites_provider.favorite_list_destination();
    assert_eq!(destination.module, FavoritesModule::NAME);
    assert_eq!(destination.route, "/favorites");
    let favorites = favorites_provider.favorites().unwrap();
    assert!(Arc::ptr_eq(&favorites, &context.favorites().unwrap()));
    favorites.add(&spelunky).await.unwrap();
    assert!(favorites.is_favorite(7).await.unwrap());

    let store = context.store().unwrap();
    assert_eq!(store.location(), &StoreLocation::Memory);
    assert_eq!(store.name(), "GameCatalogue");
}

#[tokio::test]
async fn bootstrap_with_data_dir_uses_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig {
        data_dir: Some(dir.path().to_path_buf()),
        store_name: "Library".to_string(),
        ..CoreConfig::default()
    };

    let context = AppContext::bootstrap(config).unwrap();
    let store = context.store().unwrap();
    assert_eq!(
        store.location(),
        &StoreLocation::File(dir.path().join("Library.sqlite3"))
    );
    context
        .favorites()
        .unwrap()
        .add(&game(9, "Tunic"))
        .await
        .unwrap();
    assert!(dir.path().join("Library.sqlite3").exists());
}

#[test]
fn bootstrap_rejects_invalid_config() {
    let config = CoreConfig {
        api_base_url: "ftp://catalogue".to_string(),
        ..CoreConfig::default()
    };

    let err = AppContext::bootstrap(config).err().unwrap();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn start_reports_missing_core_services() {
    let mut context = AppContext::new(CoreConfig::default());
    context.register_first_party_modules().unwrap();

    let err = context.start().unwrap_err();
    match err {
        AppError::Resolve(ResolveError::Missing(names)) => assert_eq!(names.len(), 3),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!context.modules().is_loaded::<CatalogueModule>());
}

#[test]
fn host_registered_services_take_precedence() {
    let mut context = AppContext::new(CoreConfig::default());
    let custom = Arc::new(Store::in_memory("HostStore").unwrap());
    context.services().register_instance(Arc::clone(&custom));
    context.register_core_services();
    context.register_first_party_modules().unwrap();

    assert_eq!(context.start().unwrap(), 2);
    assert!(Arc::ptr_eq(&context.store().unwrap(), &custom));
}
