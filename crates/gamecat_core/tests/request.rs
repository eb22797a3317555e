use gamecat_core::net::{HttpClient, NetError, Request, RequestMethod};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct SearchHit {
    id: i64,
    name: String,
}

fn client() -> HttpClient {
    HttpClient::new(Duration::from_secs(5)).unwrap()
}

#[test]
fn search_request_builds_the_exact_url() {
    let descriptor = Request::get("https://api.example.com/search")
        .query("q", "zelda")
        .build()
        .unwrap();

    assert_eq!(descriptor.url.as_str(), "https://api.example.com/search?q=zelda");
    assert_eq!(descriptor.method, RequestMethod::Get);
    assert!(descriptor.body.is_none());
}

#[tokio::test]
async fn get_appends_query_and_decodes_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "zelda"))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 22511, "name": "Breath of the Wild"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let hits: Vec<SearchHit> = Request::get(format!("{}/search", server.uri()))
        .query("q", "zelda")
        .send(&client())
        .await
        .unwrap();
    assert_eq!(
        hits,
        vec![SearchHit {
            id: 22511,
            name: "Breath of the Wild".to_string(),
        }]
    );
}

#[tokio::test]
async fn post_sends_json_body_and_custom_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ratings"))
        .and(header("x-client", "gamecat"))
        .and(body_json(json!({"game_id": 3498, "score": 5})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1, "name": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let created: SearchHit = Request::post(format!("{}/ratings", server.uri()))
        .header("X-Client", "gamecat")
        .json_body(json!({"game_id": 3498, "score": 5}))
        .send(&client())
        .await
        .unwrap();
    assert_eq!(created.id, 1);
}

#[tokio::test]
async fn non_success_status_is_a_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games/0"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let err = Request::get(format!("{}/games/0", server.uri()))
        .send::<SearchHit>(&client())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    assert!(matches!(err, NetError::ServerError { code: 404, .. }));
}

#[tokio::test]
async fn undecodable_body_is_invalid_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = Request::get(format!("{}/broken", server.uri()))
        .send::<Vec<SearchHit>>(&client())
        .await
        .unwrap_err();
    assert!(matches!(err, NetError::InvalidJson(_)));
}

#[tokio::test]
async fn malformed_url_fails_without_network_traffic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = Request::get("https//missing-colon/search")
        .query("q", "zelda")
        .send::<Vec<SearchHit>>(&client())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        NetError::InvalidUrl("https//missing-colon/search".to_string())
    );
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // Bind then release a port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let err = Request::get(format!("http://127.0.0.1:{port}/search"))
        .send::<Vec<SearchHit>>(&client())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(0));
}
