use std::sync::{mpsc, Arc};
use std::time::Duration;

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use mediadeck_core::{JobKind, ProgressSnapshot, Ticket};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::jobs::push_url;
use crate::{ApiClient, EngineEvent, FailureKind, JobBackend, TransportError};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// A transport that follows one task until it reports a terminal snapshot.
///
/// Every snapshot is emitted as [`EngineEvent::Progress`]. `Ok` means the last
/// emitted snapshot was terminal; `Err` means the transport broke first.
/// Dropping the future stops the transport.
#[async_trait::async_trait]
pub trait ProgressSource: Send + Sync {
    async fn watch(
        &self,
        kind: JobKind,
        ticket: Ticket,
        task_id: &str,
        sink: &dyn ProgressSink,
    ) -> Result<(), TransportError>;
}

/// Fixed-interval polling of the job's progress route.
pub struct PollingSource {
    backend: Arc<dyn JobBackend>,
    interval: Duration,
}

impl PollingSource {
    pub fn new(backend: Arc<dyn JobBackend>, interval: Duration) -> Self {
        Self { backend, interval }
    }
}

#[async_trait::async_trait]
impl ProgressSource for PollingSource {
    async fn watch(
        &self,
        kind: JobKind,
        ticket: Ticket,
        task_id: &str,
        sink: &dyn ProgressSink,
    ) -> Result<(), TransportError> {
        // First poll one full interval after acceptance.
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let snapshot = self.backend.progress(kind, task_id).await?;
            if emit(sink, kind, ticket, snapshot) {
                return Ok(());
            }
        }
    }
}

/// Server-sent events on the job's push route.
pub struct EventStreamSource {
    client: Arc<ApiClient>,
}

impl EventStreamSource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ProgressSource for EventStreamSource {
    async fn watch(
        &self,
        kind: JobKind,
        ticket: Ticket,
        task_id: &str,
        sink: &dyn ProgressSink,
    ) -> Result<(), TransportError> {
        let url = push_url(&self.client, kind, task_id)?;
        let response = self.client.open_stream(url).await?;
        let mut events = response.bytes_stream().eventsource();

        while let Some(event) = events.next().await {
            let event =
                event.map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;
            let data = event.data.trim();
            if data.is_empty() || data.eq_ignore_ascii_case("keepalive") {
                continue;
            }
            let snapshot = ProgressSnapshot::from_slice(data.as_bytes())
                .map_err(|err| TransportError::new(FailureKind::Decode, err.to_string()))?;
            if emit(sink, kind, ticket, snapshot) {
                return Ok(());
            }
        }

        Err(TransportError::new(
            FailureKind::StreamClosed,
            "stream ended before the task finished",
        ))
    }
}

/// Returns whether the snapshot was terminal.
fn emit(sink: &dyn ProgressSink, kind: JobKind, ticket: Ticket, snapshot: ProgressSnapshot) -> bool {
    let terminal = snapshot.is_terminal();
    sink.emit(EngineEvent::Progress {
        kind,
        ticket,
        snapshot,
    });
    terminal
}
