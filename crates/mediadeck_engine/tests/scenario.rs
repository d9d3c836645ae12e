//! Core and engine wired together against a mock backend.
use std::time::{Duration, Instant};

use mediadeck_core::{update, AdminView, AppState, CoreSettings, JobKind, JobState, Msg};
use mediadeck_engine::{ApiSettings, EngineHandle, ProgressTransport};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    engine: EngineHandle,
    state: Option<AppState>,
    job_states: Vec<JobState>,
    percents: Vec<f64>,
}

impl Harness {
    fn new(engine: EngineHandle, settings: CoreSettings) -> Self {
        Self {
            engine,
            state: Some(AppState::with_settings(settings)),
            job_states: Vec::new(),
            percents: Vec::new(),
        }
    }

    fn state(&self) -> &AppState {
        self.state.as_ref().expect("state")
    }

    fn send(&mut self, msg: Msg) {
        let state = self.state.take().expect("state");
        let (state, effects) = update(state, msg);
        if let Some(slot) = state.job(JobKind::Delete) {
            if self.job_states.last() != Some(&slot.state()) {
                self.job_states.push(slot.state());
            }
            let percent = slot
                .handle()
                .last_snapshot
                .as_ref()
                .and_then(|snapshot| snapshot.percent());
            if let Some(percent) = percent {
                if self.percents.last() != Some(&percent) {
                    self.percents.push(percent);
                }
            }
        }
        self.state = Some(state);
        for effect in effects {
            self.engine.apply(effect);
        }
    }

    async fn pump_until(&mut self, done: impl Fn(&AppState) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(self.state()) {
            assert!(Instant::now() < deadline, "scenario stalled");
            match self.engine.try_recv() {
                Some(event) => self.send(event.into()),
                None => tokio::time::sleep(Duration::from_millis(5)).await,
            }
        }
    }
}

fn provider_rows(state: &AppState) -> usize {
    state
        .panel(AdminView::Providers)
        .map_or(0, |panel| panel.table().rows().len())
}

fn delete_state(state: &AppState) -> Option<JobState> {
    state.job(JobKind::Delete).map(|slot| slot.state())
}

#[tokio::test]
async fn deleting_providers_end_to_end() {
    deck_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "A", "path": "/media/A"},
            {"name": "B", "path": "/media/B"}
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get-providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/delete-providers"))
        .and(body_json(json!([
            {"name": "A", "path": "/media/A"},
            {"name": "B", "path": "/media/B"}
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "T1"})))
        .expect(1)
        .mount(&server)
        .await;
    let events = concat!(
        "data: {\"data\": \"0.0\", \"completed\": false, \"provider\": \"A\"}\n\n",
        "data: {\"data\": \"50.0\", \"completed\": false, \"provider\": \"A\"}\n\n",
        "data: {\"data\": \"100.0\", \"completed\": true, \"provider\": null}\n\n",
    );
    Mock::given(method("GET"))
        .and(path("/delete-progress"))
        .and(query_param("task_id", "T1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(events, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let engine = EngineHandle::new(ApiSettings {
        base_url: server.uri(),
        delete_transport: ProgressTransport::Push,
        ..ApiSettings::default()
    })
    .expect("engine");
    let mut harness = Harness::new(
        engine,
        CoreSettings {
            grace_period: Duration::from_millis(50),
        },
    );

    harness.send(Msg::AdminOpened(AdminView::Providers));
    harness.pump_until(|state| provider_rows(state) == 2).await;

    harness.send(Msg::RowToggled {
        view: AdminView::Providers,
        index: 0,
    });
    harness.send(Msg::RowToggled {
        view: AdminView::Providers,
        index: 1,
    });
    harness.send(Msg::JobRequested(JobKind::Delete));
    harness
        .pump_until(|state| delete_state(state) == Some(JobState::Completed))
        .await;

    // The completed report stays visible until the grace period ends.
    harness
        .pump_until(|state| delete_state(state) == Some(JobState::Idle) && provider_rows(state) == 0)
        .await;

    assert_eq!(
        harness.job_states,
        vec![
            JobState::Idle,
            JobState::Submitting,
            JobState::InProgress,
            JobState::Completed,
            JobState::Idle
        ]
    );
    assert_eq!(harness.percents, vec![0.0, 50.0, 100.0]);
    assert!(harness.state().notice().is_none());
}

#[tokio::test]
async fn closing_the_view_mid_job_discards_progress() {
    deck_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/m3us"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "news.m3u": {"file_path": "m3us/news.m3u", "creation_date": "2024-04-01 09:00:00"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/load-m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "L1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/load-m3u/progress/L1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_progress": 5})))
        .mount(&server)
        .await;

    let engine = EngineHandle::new(ApiSettings {
        base_url: server.uri(),
        poll_interval: Duration::from_millis(20),
        ..ApiSettings::default()
    })
    .expect("engine");
    let mut harness = Harness::new(engine, CoreSettings::default());

    harness.send(Msg::AdminOpened(AdminView::Playlists));
    harness
        .pump_until(|state| {
            state
                .panel(AdminView::Playlists)
                .is_some_and(|panel| panel.table().rows().len() == 1)
        })
        .await;
    harness.send(Msg::RowToggled {
        view: AdminView::Playlists,
        index: 0,
    });
    harness.send(Msg::JobRequested(JobKind::Load));
    harness
        .pump_until(|state| {
            state
                .job(JobKind::Load)
                .and_then(|slot| slot.handle().last_snapshot.as_ref())
                .and_then(|snapshot| snapshot.percent())
                == Some(5.0)
        })
        .await;

    harness.send(Msg::AdminClosed(AdminView::Playlists));
    tokio::time::sleep(Duration::from_millis(60)).await;
    while harness.engine.try_recv().is_some() {}
    let polls = server.received_requests().await.unwrap().len();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.engine.try_recv(), None);
    assert_eq!(server.received_requests().await.unwrap().len(), polls);
    assert!(harness.state().panel(AdminView::Playlists).is_none());
}

#[tokio::test]
async fn deleting_providers_with_polling() {
    deck_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "A", "path": "/media/A"},
            {"name": "B", "path": "/media/B"},
            {"name": "C", "path": "/media/C"}
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get-providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/delete-providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/delete-providers/progress/t1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"progress": 33, "provider": "A", "completed": false})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/delete-providers/progress/t1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"progress": 100, "provider": "C", "completed": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = EngineHandle::new(ApiSettings {
        base_url: server.uri(),
        poll_interval: Duration::from_millis(20),
        delete_transport: ProgressTransport::Poll,
        ..ApiSettings::default()
    })
    .expect("engine");
    let mut harness = Harness::new(
        engine,
        CoreSettings {
            grace_period: Duration::from_millis(300),
        },
    );

    harness.send(Msg::AdminOpened(AdminView::Providers));
    harness.pump_until(|state| provider_rows(state) == 3).await;
    for index in 0..3 {
        harness.send(Msg::RowToggled {
            view: AdminView::Providers,
            index,
        });
    }
    harness.send(Msg::JobRequested(JobKind::Delete));
    harness
        .pump_until(|state| delete_state(state) == Some(JobState::Completed) && provider_rows(state) == 0)
        .await;

    let slot = harness.state().job(JobKind::Delete).expect("slot");
    assert_eq!(slot.handle().correlation_id.as_deref(), Some("t1"));
    let last = slot.handle().last_snapshot.as_ref().expect("final report");
    assert_eq!(last.subject.as_deref(), Some("C"));
    assert_eq!(harness.percents, vec![0.0, 33.0, 100.0]);

    harness
        .pump_until(|state| delete_state(state) == Some(JobState::Idle))
        .await;
    // Polling stopped at the terminal report.
    tokio::time::sleep(Duration::from_millis(60)).await;
}
