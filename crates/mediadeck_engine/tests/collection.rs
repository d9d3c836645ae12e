use std::time::Duration;

use mediadeck_core::PageRequest;
use mediadeck_engine::{ApiClient, ApiSettings, CollectionBackend, FailureKind};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    deck_logging::initialize_for_tests();
    ApiClient::new(&ApiSettings {
        base_url: server.uri(),
        auth_token: Some("secret".to_string()),
        ..ApiSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn page_request_carries_page_size_and_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/series"))
        .and(query_param("page", "3"))
        .and(query_param("size", "9"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Dark", "image": "d.jpg"},
            {"id": 2, "name": "Lost"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = PageRequest {
        page: 3,
        size: 9,
        query: None,
    };
    let items = client.fetch_page("series", &request).await.expect("page");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], json!("Dark"));
}

#[tokio::test]
async fn search_request_carries_encoded_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "star wars & more"))
        .and(query_param("page", "1"))
        .and(query_param("size", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = PageRequest {
        page: 1,
        size: 50,
        query: Some("star wars & more".to_string()),
    };
    let items = client.fetch_page("search", &request).await.expect("page");
    assert!(items.is_empty());
}

#[tokio::test]
async fn non_list_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = PageRequest {
        page: 1,
        size: 10,
        query: None,
    };
    let err = client.fetch_page("movies", &request).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
    assert_eq!(err.message, "expected a list of items, got an object");
}

#[tokio::test]
async fn error_status_surfaces_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/media"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "Internal Server Error"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = PageRequest {
        page: 1,
        size: 7,
        query: None,
    };
    let err = client.fetch_page("media", &request).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(err.to_string(), "http status 500: Internal Server Error");

    let err = client.fetch_page("movies", &request).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert_eq!(err.message, "Service Unavailable");
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/media"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!([])),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&ApiSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ApiSettings::default()
    })
    .expect("client");
    let request = PageRequest {
        page: 1,
        size: 7,
        query: None,
    };
    let err = client.fetch_page("media", &request).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[test]
fn base_url_without_trailing_slash_keeps_its_path() {
    let client = ApiClient::new(&ApiSettings {
        base_url: "http://example.test/api".to_string(),
        ..ApiSettings::default()
    })
    .expect("client");
    assert_eq!(
        client.endpoint("movies").unwrap().as_str(),
        "http://example.test/api/movies"
    );

    let err = ApiClient::new(&ApiSettings {
        base_url: "not a url".to_string(),
        ..ApiSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
