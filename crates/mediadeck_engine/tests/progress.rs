use std::sync::{Arc, Mutex};
use std::time::Duration;

use mediadeck_core::{JobKind, ProgressSnapshot, Ticket};
use mediadeck_engine::{
    ApiClient, ApiSettings, EngineEvent, EventStreamSource, FailureKind, PollingSource,
    ProgressSink, ProgressSource,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    fn snapshots(&self) -> Vec<ProgressSnapshot> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Progress { snapshot, .. } => Some(snapshot.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn client_for(server: &MockServer) -> Arc<ApiClient> {
    deck_logging::initialize_for_tests();
    Arc::new(
        ApiClient::new(&ApiSettings {
            base_url: server.uri(),
            ..ApiSettings::default()
        })
        .expect("client"),
    )
}

const TICKET: Ticket = Ticket::new(5);

#[tokio::test]
async fn polling_stops_at_first_terminal_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/load-m3u/progress/t-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"current_stage": "Parsing", "total_progress": 40})),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/load-m3u/progress/t-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"current_stage": "Done", "total_progress": 100, "is_complete": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let source = PollingSource::new(client_for(&server), Duration::from_millis(20));
    let sink = TestSink::default();
    source
        .watch(JobKind::Load, TICKET, "t-1", &sink)
        .await
        .expect("terminal snapshot");

    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 3);
    assert_eq!(snapshots[0].percent(), Some(40.0));
    assert!(snapshots[2].completed);

    // No further polls after completion.
    tokio::time::sleep(Duration::from_millis(80)).await;
}

#[tokio::test]
async fn polling_stops_at_error_snapshot() {
    let server = MockServer::start().await;
    for percent in [30, 70] {
        Mock::given(method("GET"))
            .and(path("/delete-providers/progress/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"progress": percent})))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/delete-providers/progress/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "x"})))
        .expect(1)
        .mount(&server)
        .await;

    let source = PollingSource::new(client_for(&server), Duration::from_millis(20));
    let sink = TestSink::default();
    source
        .watch(JobKind::Delete, TICKET, "t1", &sink)
        .await
        .expect("terminal snapshot");

    let snapshots = sink.snapshots();
    let percents: Vec<_> = snapshots.iter().map(ProgressSnapshot::percent).collect();
    assert_eq!(percents, vec![Some(30.0), Some(70.0), None]);
    assert_eq!(snapshots[2].error.as_deref(), Some("x"));

    // A further poll would hit the error mock a second time.
    tokio::time::sleep(Duration::from_millis(80)).await;
}

#[tokio::test]
async fn first_poll_waits_one_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/load-m3u/progress/t-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"is_complete": true})))
        .mount(&server)
        .await;

    let source = PollingSource::new(client_for(&server), Duration::from_millis(150));
    let sink = TestSink::default();
    let started = tokio::time::Instant::now();
    source
        .watch(JobKind::Load, TICKET, "t-2", &sink)
        .await
        .expect("terminal snapshot");
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn polling_fails_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/upload-m3u/progress/u-1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Task not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let source = PollingSource::new(client_for(&server), Duration::from_millis(10));
    let sink = TestSink::default();
    let err = source
        .watch(JobKind::Ingest, TICKET, "u-1", &sink)
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.message, "Task not found");
    assert!(sink.snapshots().is_empty());
}

#[tokio::test]
async fn event_stream_skips_keepalives_and_stops_on_completion() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"data\": \"0.0\", \"completed\": false, \"provider\": \"A\"}\n\n",
        ": comment\n\n",
        "data: keepalive\n\n",
        "data: {\"data\": \"50.0\", \"completed\": false, \"provider\": \"B\"}\n\n",
        "data: {\"data\": \"100.0\", \"completed\": true, \"provider\": null}\n\n",
        "data: {\"data\": \"100.0\", \"completed\": true, \"provider\": null}\n\n",
    );
    Mock::given(method("GET"))
        .and(path("/delete-progress"))
        .and(query_param("task_id", "d-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let source = EventStreamSource::new(client_for(&server));
    let sink = TestSink::default();
    source
        .watch(JobKind::Delete, TICKET, "d-1", &sink)
        .await
        .expect("terminal snapshot");

    let snapshots = sink.snapshots();
    let percents: Vec<_> = snapshots.iter().map(ProgressSnapshot::percent).collect();
    assert_eq!(percents, vec![Some(0.0), Some(50.0), Some(100.0)]);
    assert_eq!(snapshots[1].subject.as_deref(), Some("B"));
    assert!(snapshots[2].completed);
}

#[tokio::test]
async fn event_stream_closing_early_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/delete-progress"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"data\": \"10.0\", \"completed\": false}\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let source = EventStreamSource::new(client_for(&server));
    let sink = TestSink::default();
    let err = source
        .watch(JobKind::Delete, TICKET, "d-2", &sink)
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::StreamClosed);
    assert_eq!(sink.snapshots().len(), 1);
}

#[tokio::test]
async fn malformed_event_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/delete-progress"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("data: [1, 2]\n\n", "text/event-stream"))
        .mount(&server)
        .await;

    let source = EventStreamSource::new(client_for(&server));
    let sink = TestSink::default();
    let err = source
        .watch(JobKind::Delete, TICKET, "d-3", &sink)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn jobs_without_push_route_cannot_stream() {
    let server = MockServer::start().await;
    let source = EventStreamSource::new(client_for(&server));
    let sink = TestSink::default();
    let err = source
        .watch(JobKind::Load, TICKET, "t-9", &sink)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
