use std::time::Duration;

use crate::{AdminView, JobKind, JobPayload, ListKind, PageRequest, Ticket, WatchEntry};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPage {
        list: ListKind,
        ticket: Ticket,
        path: &'static str,
        request: PageRequest,
    },
    FetchTable { view: AdminView, ticket: Ticket },
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
    StopProgress { kind: JobKind },
    ScheduleGrace {
        kind: JobKind,
        ticket: Ticket,
        delay: Duration,
    },
    /// The view was torn down: drop everything still in flight for it.
    CancelScope(Scope),
    PersistWatchList(Vec<WatchEntry>),
    SubmitWatchList(Vec<WatchEntry>),
}

/// Cancellation scope: one per mounted view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    List(ListKind),
    Admin(AdminView),
}

impl From<JobKind> for Scope {
    fn from(kind: JobKind) -> Self {
        Scope::Admin(kind.owner())
    }
}
