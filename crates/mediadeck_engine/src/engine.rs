use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use deck_logging::{deck_debug, deck_info, deck_warn};
use mediadeck_core::{
    AdminView, JobKind, JobPayload, ListKind, PageRequest, Scope, Ticket, WatchEntry,
};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::progress::{ChannelProgressSink, EventStreamSource, PollingSource, ProgressSink, ProgressSource};
use crate::{
    ApiClient, ApiSettings, CollectionBackend, EngineError, EngineEvent, JobBackend,
    ProgressTransport, ResourceBackend, TransportError,
};

pub(crate) enum EngineCommand {
    FetchPage {
        list: ListKind,
        ticket: Ticket,
        path: &'static str,
        request: PageRequest,
    },
    FetchTable {
        view: AdminView,
        ticket: Ticket,
    },
    SubmitJob {
        kind: JobKind,
        ticket: Ticket,
        payload: JobPayload,
    },
    WatchProgress {
        kind: JobKind,
        ticket: Ticket,
        task_id: String,
    },
    StopProgress {
        kind: JobKind,
    },
    ScheduleGrace {
        kind: JobKind,
        ticket: Ticket,
        delay: Duration,
    },
    CancelScope(Scope),
    SubmitWatchList(Vec<WatchEntry>),
}

/// The I/O implementations the engine drives.
#[derive(Clone)]
pub struct Backends {
    pub collections: Arc<dyn CollectionBackend>,
    pub jobs: Arc<dyn JobBackend>,
    pub resources: Arc<dyn ResourceBackend>,
    pub poller: Arc<dyn ProgressSource>,
    pub pusher: Arc<dyn ProgressSource>,
    pub delete_transport: ProgressTransport,
}

impl Backends {
    /// Everything over HTTP against one backend.
    pub fn http(settings: &ApiSettings) -> Result<Self, TransportError> {
        let client = Arc::new(ApiClient::new(settings)?);
        Ok(Self {
            collections: client.clone(),
            jobs: client.clone(),
            resources: client.clone(),
            poller: Arc::new(PollingSource::new(client.clone(), settings.poll_interval)),
            pusher: Arc::new(EventStreamSource::new(client)),
            delete_transport: settings.delete_transport,
        })
    }

    fn source_for(&self, kind: JobKind) -> Arc<dyn ProgressSource> {
        match (kind, self.delete_transport) {
            (JobKind::Delete, ProgressTransport::Push) => self.pusher.clone(),
            _ => self.poller.clone(),
        }
    }
}

/// Owns the engine thread and its tokio runtime.
///
/// Commands go in through [`EngineHandle::apply`]; results come back as
/// [`EngineEvent`]s. Dropping the last clone stops the thread and cancels
/// all outstanding work.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings) -> Result<Self, EngineError> {
        Self::with_backends(Backends::http(&settings)?)
    }

    pub fn with_backends(backends: Backends) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("mediadeck-engine".to_string())
            .spawn(move || {
                let mut dispatcher = Dispatcher::new(backends, event_tx);
                while let Ok(command) = cmd_rx.recv() {
                    dispatcher.handle(&runtime, command);
                }
                dispatcher.cancel_all();
                deck_debug!("engine thread stopped");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub(crate) fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    /// Blocks up to `timeout`. Other clones cannot receive while this waits.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError> {
        self.events().recv_timeout(timeout)
    }

    /// Receiving end only. Holding it does not keep the engine thread alive.
    pub fn events(&self) -> EngineEvents {
        EngineEvents {
            event_rx: Arc::clone(&self.event_rx),
        }
    }
}

/// Event side of an [`EngineHandle`].
///
/// Reports [`RecvTimeoutError::Disconnected`] once every handle is dropped
/// and the engine thread has shut down.
#[derive(Clone)]
pub struct EngineEvents {
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineEvents {
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError> {
        let receiver = self
            .event_rx
            .lock()
            .map_err(|_| RecvTimeoutError::Disconnected)?;
        receiver.recv_timeout(timeout)
    }
}

/// Lives on the engine thread. Tracks one cancellation token per mounted
/// view and one child token per progress watcher.
struct Dispatcher {
    backends: Backends,
    sink: Arc<ChannelProgressSink>,
    scopes: HashMap<Scope, CancellationToken>,
    watchers: HashMap<JobKind, CancellationToken>,
}

impl Dispatcher {
    fn new(backends: Backends, event_tx: mpsc::Sender<EngineEvent>) -> Self {
        Self {
            backends,
            sink: Arc::new(ChannelProgressSink::new(event_tx)),
            scopes: HashMap::new(),
            watchers: HashMap::new(),
        }
    }

    fn scope_token(&mut self, scope: Scope) -> CancellationToken {
        self.scopes.entry(scope).or_default().clone()
    }

    fn stop_watcher(&mut self, kind: JobKind) {
        if let Some(token) = self.watchers.remove(&kind) {
            token.cancel();
        }
    }

    fn cancel_all(&mut self) {
        for (_, token) in self.scopes.drain() {
            token.cancel();
        }
        self.watchers.clear();
    }

    fn handle(&mut self, runtime: &Runtime, command: EngineCommand) {
        let sink = self.sink.clone();
        match command {
            EngineCommand::FetchPage {
                list,
                ticket,
                path,
                request,
            } => {
                let token = self.scope_token(Scope::List(list));
                let collections = self.backends.collections.clone();
                runtime.spawn(async move {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => deck_debug!("{list} page {} dropped", request.page),
                        result = collections.fetch_page(path, &request) => {
                            if let Err(err) = &result {
                                deck_warn!("{list} page {} failed: {err}", request.page);
                            }
                            sink.emit(EngineEvent::PageFetched { list, ticket, result });
                        }
                    }
                });
            }
            EngineCommand::FetchTable { view, ticket } => {
                let token = self.scope_token(Scope::Admin(view));
                let resources = self.backends.resources.clone();
                runtime.spawn(async move {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => deck_debug!("{view} table refresh dropped"),
                        result = resources.list_table(view) => {
                            if let Err(err) = &result {
                                deck_warn!("{view} table refresh failed: {err}");
                            }
                            sink.emit(EngineEvent::TableFetched { view, ticket, result });
                        }
                    }
                });
            }
            EngineCommand::SubmitJob {
                kind,
                ticket,
                payload,
            } => {
                let token = self.scope_token(Scope::from(kind));
                let jobs = self.backends.jobs.clone();
                runtime.spawn(async move {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => deck_debug!("{kind} submission dropped"),
                        result = jobs.submit(kind, &payload) => {
                            match &result {
                                Ok(task_id) => deck_info!("{kind} job accepted as task {task_id}"),
                                Err(err) => deck_warn!("{kind} job rejected: {err}"),
                            }
                            sink.emit(EngineEvent::JobSubmitted { kind, ticket, result });
                        }
                    }
                });
            }
            EngineCommand::WatchProgress {
                kind,
                ticket,
                task_id,
            } => {
                self.stop_watcher(kind);
                let token = self.scope_token(Scope::from(kind)).child_token();
                self.watchers.insert(kind, token.clone());
                let source = self.backends.source_for(kind);
                runtime.spawn(async move {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => deck_debug!("stopped following {kind} task {task_id}"),
                        result = source.watch(kind, ticket, &task_id, sink.as_ref()) => match result {
                            Ok(()) => deck_info!("{kind} task {task_id} finished"),
                            Err(error) => {
                                deck_warn!("lost progress of {kind} task {task_id}: {error}");
                                sink.emit(EngineEvent::ProgressFailed { kind, ticket, error });
                            }
                        }
                    }
                });
            }
            EngineCommand::StopProgress { kind } => self.stop_watcher(kind),
            EngineCommand::ScheduleGrace {
                kind,
                ticket,
                delay,
            } => {
                let token = self.scope_token(Scope::from(kind));
                runtime.spawn(async move {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => {}
                        () = tokio::time::sleep(delay) => {
                            sink.emit(EngineEvent::GraceElapsed { kind, ticket });
                        }
                    }
                });
            }
            EngineCommand::CancelScope(scope) => {
                if let Some(token) = self.scopes.remove(&scope) {
                    deck_debug!("cancelling work of {scope:?}");
                    token.cancel();
                }
                self.watchers.retain(|kind, _| Scope::from(*kind) != scope);
            }
            EngineCommand::SubmitWatchList(entries) => {
                let resources = self.backends.resources.clone();
                runtime.spawn(async move {
                    let result = resources.submit_watch_list(&entries).await;
                    match &result {
                        Ok(()) => deck_info!("submitted watch list of {} entries", entries.len()),
                        Err(err) => deck_warn!("watch list submission failed: {err}"),
                    }
                    sink.emit(EngineEvent::WatchListSubmitted(result));
                });
            }
        }
    }
}
