//! Mediadeck engine: HTTP backends, progress transports and effect execution.
mod bridge;
mod client;
mod collection;
mod engine;
mod jobs;
mod persist;
mod progress;
mod resources;
mod settings;
mod types;

pub use client::ApiClient;
pub use collection::CollectionBackend;
pub use engine::{Backends, EngineEvents, EngineHandle};
pub use jobs::{JobBackend, JobRoutes};
pub use persist::{ensure_store_dir, load_json, save_json, FileStore, KeyValueStore, PersistError};
pub use progress::{
    ChannelProgressSink, EventStreamSource, PollingSource, ProgressSink, ProgressSource,
};
pub use resources::{playlist_rows, provider_rows, ResourceBackend};
pub use settings::{ApiSettings, ProgressTransport};
pub use types::{EngineError, EngineEvent, FailureKind, TransportError};
