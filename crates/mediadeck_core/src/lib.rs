//! Mediadeck core: pure state machines for incremental list fetching and
//! long-running job tracking, plus view-model helpers.
//!
//! Nothing in here performs I/O. Every asynchronous result comes back in as a
//! [`Msg`] carrying the [`Ticket`] it was issued under, and every request goes
//! out as an [`Effect`].
mod accumulator;
mod cursor;
mod effect;
mod item;
mod job;
mod list;
mod msg;
mod snapshot;
mod state;
mod table;
mod update;
mod view_model;
mod watchlist;

pub use accumulator::{Keyed, ListAccumulator};
pub use cursor::{PageCursor, PageRequest};
pub use effect::{Effect, Scope};
pub use item::{ItemKey, ItemShape, MediaItem, MediaKind};
pub use job::{
    AdminView, Descriptor, JobHandle, JobKind, JobPayload, JobSlot, JobState, SnapshotOutcome,
    SubmitError, UploadFile,
};
pub use list::{ListKind, ListProfile, ListView};
pub use msg::Msg;
pub use snapshot::{ItemCount, ProgressMeasure, ProgressSnapshot, SnapshotError};
pub use state::{AdminPanel, AppState, CoreSettings, Notice, NoticeLevel, Ticket};
pub use table::ResourceTable;
pub use update::update;
pub use view_model::{
    AppViewModel, JobPanelView, ListPanelView, MediaRowView, TablePanelView, TableRowView,
};
pub use watchlist::{WatchEntry, WatchList, WatchListError};
