use std::fmt;

use mediadeck_core::{AdminView, Descriptor, JobKind, ListKind, ProgressSnapshot, Ticket};
use serde_json::Value;
use thiserror::Error;

/// Failure of one request or progress transport, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Body was not the JSON shape the route promises.
    Decode,
    /// Server-push channel ended before a terminal snapshot.
    StreamClosed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response"),
            FailureKind::StreamClosed => write!(f, "progress stream closed"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] TransportError),
}

/// Results coming back from the engine thread, tagged with the ticket of the
/// request that produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PageFetched {
        list: ListKind,
        ticket: Ticket,
        result: Result<Vec<Value>, TransportError>,
    },
    TableFetched {
        view: AdminView,
        ticket: Ticket,
        result: Result<Vec<Descriptor>, TransportError>,
    },
    JobSubmitted {
        kind: JobKind,
        ticket: Ticket,
        result: Result<String, TransportError>,
    },
    Progress {
        kind: JobKind,
        ticket: Ticket,
        snapshot: ProgressSnapshot,
    },
    ProgressFailed {
        kind: JobKind,
        ticket: Ticket,
        error: TransportError,
    },
    GraceElapsed {
        kind: JobKind,
        ticket: Ticket,
    },
    WatchListSubmitted(Result<(), TransportError>),
}
