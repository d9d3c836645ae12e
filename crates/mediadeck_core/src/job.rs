use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::snapshot::ProgressSnapshot;
use crate::Ticket;

/// The three long-running backend jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobKind {
    /// Upload playlist files.
    Ingest,
    /// Import selected playlists into the library.
    Load,
    /// Delete selected providers and their files.
    Delete,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [JobKind::Ingest, JobKind::Load, JobKind::Delete];

    /// The admin view that owns jobs of this kind.
    pub fn owner(self) -> AdminView {
        match self {
            JobKind::Ingest | JobKind::Load => AdminView::Playlists,
            JobKind::Delete => AdminView::Providers,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JobKind::Ingest => "ingest",
            JobKind::Load => "load",
            JobKind::Delete => "delete",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Administrative views: each owns a resource table and one or more job slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AdminView {
    Playlists,
    Providers,
}

impl AdminView {
    pub const ALL: [AdminView; 2] = [AdminView::Playlists, AdminView::Providers];

    pub fn jobs(self) -> &'static [JobKind] {
        match self {
            AdminView::Playlists => &[JobKind::Ingest, JobKind::Load],
            AdminView::Providers => &[JobKind::Delete],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AdminView::Playlists => "playlists",
            AdminView::Providers => "providers",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|view| view.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for AdminView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `{name, path}` row of a playlist or provider table; also the load/delete payload.
///
/// Any other fields the server sent with the row are kept in `extra` and go
/// back out unchanged when the row is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPayload {
    Files(Vec<UploadFile>),
    Descriptors(Vec<Descriptor>),
}

impl JobPayload {
    pub fn is_empty(&self) -> bool {
        match self {
            JobPayload::Files(files) => files.is_empty(),
            JobPayload::Descriptors(rows) => rows.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("a {0} job is already running")]
    Busy(JobKind),
    #[error("nothing selected to {0}")]
    EmptySelection(JobKind),
    /// Uploads carry files, never a table selection.
    #[error("choose at least one playlist file to upload")]
    NoFiles,
    #[error("the {0} view is not open")]
    ViewClosed(AdminView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Submitting,
    InProgress,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_active(self) -> bool {
        matches!(self, JobState::Submitting | JobState::InProgress)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Lifecycle record of one job submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobHandle {
    pub correlation_id: Option<String>,
    pub state: JobState,
    pub last_snapshot: Option<ProgressSnapshot>,
    pub error: Option<String>,
}

/// What a progress report did to the job.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOutcome {
    Running,
    Completed,
    Failed(String),
    /// The report belongs to a job that is no longer live.
    Ignored,
}

/// Job slot of one kind inside its owning admin view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobSlot {
    ticket: Option<Ticket>,
    handle: JobHandle,
}

impl JobSlot {
    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    pub fn state(&self) -> JobState {
        self.handle.state
    }

    pub fn ticket(&self) -> Option<Ticket> {
        self.ticket
    }

    fn is_live(&self, ticket: Ticket) -> bool {
        self.ticket == Some(ticket)
    }

    /// Idle or terminal slots accept a new submission; active ones are busy.
    pub(crate) fn begin_submit(&mut self, kind: JobKind, ticket: Ticket) -> Result<(), SubmitError> {
        if self.handle.state.is_active() {
            return Err(SubmitError::Busy(kind));
        }
        self.ticket = Some(ticket);
        self.handle = JobHandle {
            correlation_id: None,
            state: JobState::Submitting,
            last_snapshot: Some(ProgressSnapshot::initializing()),
            error: None,
        };
        Ok(())
    }

    pub(crate) fn accept(&mut self, ticket: Ticket, task_id: String) -> bool {
        if !self.is_live(ticket) || self.handle.state != JobState::Submitting {
            return false;
        }
        self.handle.correlation_id = Some(task_id);
        self.handle.state = JobState::InProgress;
        true
    }

    pub(crate) fn reject(&mut self, ticket: Ticket, reason: String) -> bool {
        if !self.is_live(ticket) || self.handle.state != JobState::Submitting {
            return false;
        }
        self.handle.correlation_id = None;
        self.handle.state = JobState::Failed;
        self.handle.last_snapshot = None;
        self.handle.error = Some(reason);
        true
    }

    /// Error is checked before completion on every report.
    pub(crate) fn apply_snapshot(&mut self, ticket: Ticket, snapshot: ProgressSnapshot) -> SnapshotOutcome {
        if !self.is_live(ticket) || self.handle.state != JobState::InProgress {
            return SnapshotOutcome::Ignored;
        }
        if let Some(reason) = snapshot.error.clone() {
            self.handle.state = JobState::Failed;
            self.handle.error = Some(reason.clone());
            self.handle.last_snapshot = Some(snapshot);
            return SnapshotOutcome::Failed(reason);
        }
        let completed = snapshot.completed;
        self.handle.last_snapshot = Some(snapshot);
        if completed {
            self.handle.state = JobState::Completed;
            SnapshotOutcome::Completed
        } else {
            SnapshotOutcome::Running
        }
    }

    /// Transport failures end the job; there is no retry.
    pub(crate) fn transport_failed(&mut self, ticket: Ticket, reason: String) -> bool {
        if !self.is_live(ticket) || !self.handle.state.is_active() {
            return false;
        }
        self.handle.state = JobState::Failed;
        self.handle.error = Some(reason);
        true
    }

    /// Ends the display grace period of a completed job.
    pub(crate) fn clear_after_grace(&mut self, ticket: Ticket) -> bool {
        if !self.is_live(ticket) || self.handle.state != JobState::Completed {
            return false;
        }
        self.ticket = None;
        self.handle = JobHandle::default();
        true
    }
}
