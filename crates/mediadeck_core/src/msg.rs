use crate::{
    AdminView, Descriptor, JobKind, ListKind, ProgressSnapshot, Ticket, UploadFile, WatchEntry,
};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A list view was mounted (for search, with its query).
    ListOpened {
        list: ListKind,
        query: Option<String>,
    },
    /// A list view was torn down.
    ListClosed(ListKind),
    /// Scroll reached the bottom of a list view.
    LoadMoreRequested(ListKind),
    /// Collection backend answered a page request.
    PageLoaded {
        list: ListKind,
        ticket: Ticket,
        result: Result<Vec<Value>, String>,
    },
    AdminOpened(AdminView),
    AdminClosed(AdminView),
    TableLoaded {
        view: AdminView,
        ticket: Ticket,
        result: Result<Vec<Descriptor>, String>,
    },
    /// User clicked a table row.
    RowToggled { view: AdminView, index: usize },
    /// User picked playlist files to upload.
    IngestRequested(Vec<UploadFile>),
    /// User asked to run a job over the current table selection.
    JobRequested(JobKind),
    JobAccepted {
        kind: JobKind,
        ticket: Ticket,
        task_id: String,
    },
    JobRejected {
        kind: JobKind,
        ticket: Ticket,
        reason: String,
    },
    JobProgress {
        kind: JobKind,
        ticket: Ticket,
        snapshot: ProgressSnapshot,
    },
    /// Progress transport broke (network, non-2xx, closed stream).
    JobTransportFailed {
        kind: JobKind,
        ticket: Ticket,
        reason: String,
    },
    /// Display grace period of a completed job is over.
    GraceElapsed { kind: JobKind, ticket: Ticket },
    /// Restore the persisted watch list at startup.
    WatchListRestored(Vec<WatchEntry>),
    WatchListAdd(WatchEntry),
    /// Add the item at `index` of a list view.
    WatchListAddFromList { list: ListKind, index: usize },
    WatchListRemove(usize),
    WatchListCleared,
    WatchListSubmitRequested,
    WatchListSubmitted(Result<(), String>),
    NoticeDismissed,
    /// Fallback for placeholder wiring.
    NoOp,
}
