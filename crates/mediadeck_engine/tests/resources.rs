use mediadeck_core::{AdminView, Descriptor, ItemKey, WatchEntry};
use mediadeck_engine::{
    playlist_rows, provider_rows, ApiClient, ApiSettings, FailureKind, ResourceBackend,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    deck_logging::initialize_for_tests();
    ApiClient::new(&ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .expect("client")
}

fn watch_entry(id: i64, name: &str) -> WatchEntry {
    WatchEntry {
        id: ItemKey::Int(id),
        name: name.to_string(),
        kind: "Movie".to_string(),
        series_name: None,
        extra: Map::new(),
    }
}

#[test]
fn playlist_object_becomes_rows_sorted_by_file() {
    let rows = playlist_rows(json!({
        "sports.m3u": {"file_path": "m3us/sports.m3u", "creation_date": "2024-05-01 10:00:00"},
        "news.m3u": {"file_path": "m3us/news.m3u", "creation_date": "2024-04-01 09:00:00"}
    }))
    .expect("rows");

    let names: Vec<_> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["news.m3u", "sports.m3u"]);
    assert_eq!(rows[0].path, "m3us/news.m3u");
    assert_eq!(rows[0].extra.get("creation_date"), Some(&json!("2024-04-01 09:00:00")));
}

#[test]
fn provider_rows_keep_extra_fields_and_skip_nameless() {
    let rows = provider_rows(json!([
        {"name": "A", "path": "/media/A", "link": "http://a"},
        {"path": "/media/unnamed"},
        {"name": "B"}
    ]))
    .expect("rows");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].extra.get("link"), Some(&json!("http://a")));
    assert_eq!(rows[1], Descriptor::new("B", ""));

    let err = provider_rows(json!({"A": {}})).unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn tables_are_fetched_from_their_routes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/m3us"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "news.m3u": {"file_path": "m3us/news.m3u", "creation_date": "2024-04-01 09:00:00"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get-providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "A", "path": "/media/A"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let playlists = client.list_table(AdminView::Playlists).await.expect("playlists");
    let providers = client.list_table(AdminView::Providers).await.expect("providers");

    assert_eq!(playlists[0].name, "news.m3u");
    assert_eq!(providers, vec![Descriptor::new("A", "/media/A")]);
}

#[tokio::test]
async fn watch_list_is_posted_without_duplicates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/watchlist/"))
        .and(body_json(json!([
            {"id": 1, "name": "Dune", "type": "Movie"},
            {"id": 2, "name": "Arrival", "type": "Movie"}
        ])))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Watchlist received successfully!"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .submit_watch_list(&[watch_entry(1, "Dune"), watch_entry(2, "Arrival"), watch_entry(1, "Dune")])
        .await
        .expect("submitted");
}
