use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::effect::{Effect, Scope};
use crate::job::{
    AdminView, Descriptor, JobKind, JobPayload, JobSlot, SnapshotOutcome, SubmitError, UploadFile,
};
use crate::list::{ListKind, ListProfile, ListView};
use crate::snapshot::ProgressSnapshot;
use crate::table::ResourceTable;
use crate::view_model::AppViewModel;
use crate::watchlist::{WatchEntry, WatchList};

/// Liveness token. Results carrying a ticket that no longer matches the
/// live view or job are stale and must not touch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreSettings {
    /// How long a completed job's final report stays visible.
    pub grace_period: Duration,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Table plus job slots owned by one mounted admin view.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminPanel {
    table: ResourceTable,
    jobs: BTreeMap<JobKind, JobSlot>,
}

impl AdminPanel {
    fn new(view: AdminView, ticket: Ticket) -> Self {
        Self {
            table: ResourceTable::new(ticket),
            jobs: view
                .jobs()
                .iter()
                .map(|&kind| (kind, JobSlot::default()))
                .collect(),
        }
    }

    pub fn table(&self) -> &ResourceTable {
        &self.table
    }

    pub fn job(&self, kind: JobKind) -> Option<&JobSlot> {
        self.jobs.get(&kind)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    settings: CoreSettings,
    last_ticket: u64,
    lists: BTreeMap<ListKind, ListView>,
    panels: BTreeMap<AdminView, AdminPanel>,
    watch_list: WatchList,
    notice: Option<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CoreSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::build(self)
    }

    pub fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    pub fn list(&self, kind: ListKind) -> Option<&ListView> {
        self.lists.get(&kind)
    }

    pub fn lists(&self) -> impl Iterator<Item = (ListKind, &ListView)> {
        self.lists.iter().map(|(kind, view)| (*kind, view))
    }

    pub fn panel(&self, view: AdminView) -> Option<&AdminPanel> {
        self.panels.get(&view)
    }

    pub(crate) fn panels(&self) -> impl Iterator<Item = (AdminView, &AdminPanel)> {
        self.panels.iter().map(|(view, panel)| (*view, panel))
    }

    pub fn job(&self, kind: JobKind) -> Option<&JobSlot> {
        self.panels.get(&kind.owner()).and_then(|panel| panel.job(kind))
    }

    pub fn watch_list(&self) -> &WatchList {
        &self.watch_list
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Returns and resets the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.last_ticket += 1;
        Ticket(self.last_ticket)
    }

    fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            text: text.into(),
        });
        self.mark_dirty();
    }

    pub(crate) fn dismiss_notice(&mut self) {
        if self.notice.take().is_some() {
            self.mark_dirty();
        }
    }

    // ---- list views -------------------------------------------------------

    /// Mounting replaces any previous instance, which counts as its teardown.
    pub(crate) fn open_list(&mut self, kind: ListKind, query: Option<String>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.lists.contains_key(&kind) {
            effects.push(Effect::CancelScope(Scope::List(kind)));
        }
        let ticket = self.issue_ticket();
        self.lists
            .insert(kind, ListView::new(ticket, ListProfile::for_list(kind, query)));
        self.mark_dirty();
        effects.extend(self.load_more(kind));
        effects
    }

    pub(crate) fn close_list(&mut self, kind: ListKind) -> Vec<Effect> {
        if self.lists.remove(&kind).is_none() {
            return Vec::new();
        }
        self.mark_dirty();
        vec![Effect::CancelScope(Scope::List(kind))]
    }

    pub(crate) fn load_more(&mut self, kind: ListKind) -> Option<Effect> {
        let view = self.lists.get_mut(&kind)?;
        let request = view.load_more()?;
        let effect = Effect::FetchPage {
            list: kind,
            ticket: view.ticket(),
            path: view.profile().path,
            request,
        };
        self.mark_dirty();
        Some(effect)
    }

    pub(crate) fn apply_page(
        &mut self,
        kind: ListKind,
        ticket: Ticket,
        result: Result<Vec<Value>, String>,
    ) {
        let Some(view) = self.lists.get_mut(&kind) else {
            return;
        };
        if view.ticket() != ticket || !view.cursor().is_fetching() {
            return;
        }
        match result {
            Ok(batch) => view.apply_page(batch),
            Err(reason) => view.apply_failure(reason),
        }
        self.mark_dirty();
    }

    // ---- admin views ------------------------------------------------------

    pub(crate) fn open_admin(&mut self, view: AdminView) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.panels.contains_key(&view) {
            effects.push(Effect::CancelScope(Scope::Admin(view)));
        }
        let ticket = self.issue_ticket();
        self.panels.insert(view, AdminPanel::new(view, ticket));
        self.mark_dirty();
        effects.extend(self.refresh_table(view));
        effects
    }

    pub(crate) fn close_admin(&mut self, view: AdminView) -> Vec<Effect> {
        if self.panels.remove(&view).is_none() {
            return Vec::new();
        }
        self.mark_dirty();
        vec![Effect::CancelScope(Scope::Admin(view))]
    }

    fn refresh_table(&mut self, view: AdminView) -> Option<Effect> {
        let ticket = self.issue_ticket();
        let panel = self.panels.get_mut(&view)?;
        panel.table.begin_refresh(ticket);
        Some(Effect::FetchTable { view, ticket })
    }

    pub(crate) fn apply_table(
        &mut self,
        view: AdminView,
        ticket: Ticket,
        result: Result<Vec<Descriptor>, String>,
    ) {
        let Some(panel) = self.panels.get_mut(&view) else {
            return;
        };
        if panel.table.ticket() != ticket {
            return;
        }
        match result {
            Ok(rows) => panel.table.replace_rows(rows),
            Err(reason) => panel.table.fail(reason),
        }
        self.mark_dirty();
    }

    pub(crate) fn toggle_row(&mut self, view: AdminView, index: usize) {
        let toggled = self
            .panels
            .get_mut(&view)
            .is_some_and(|panel| panel.table.toggle(index));
        if toggled {
            self.mark_dirty();
        }
    }

    // ---- jobs -------------------------------------------------------------

    /// Validates locally, then moves the slot to `Submitting`. Rejections
    /// surface as a notice and leave the slot untouched.
    pub(crate) fn submit_job(&mut self, kind: JobKind, files: Option<Vec<UploadFile>>) -> Vec<Effect> {
        match self.try_submit(kind, files) {
            Ok(effect) => vec![effect],
            Err(err) => {
                self.notify(NoticeLevel::Error, err.to_string());
                Vec::new()
            }
        }
    }

    fn try_submit(&mut self, kind: JobKind, files: Option<Vec<UploadFile>>) -> Result<Effect, SubmitError> {
        let owner = kind.owner();
        let panel = self
            .panels
            .get(&owner)
            .ok_or(SubmitError::ViewClosed(owner))?;
        if panel.job(kind).is_some_and(|slot| slot.state().is_active()) {
            return Err(SubmitError::Busy(kind));
        }
        let payload = match kind {
            JobKind::Ingest => match files {
                Some(files) if !files.is_empty() => JobPayload::Files(files),
                _ => return Err(SubmitError::NoFiles),
            },
            JobKind::Load | JobKind::Delete => {
                let selection = panel.table.selection();
                if selection.is_empty() {
                    return Err(SubmitError::EmptySelection(kind));
                }
                JobPayload::Descriptors(selection)
            }
        };

        let ticket = self.issue_ticket();
        let slot = self
            .panels
            .get_mut(&owner)
            .and_then(|panel| panel.jobs.get_mut(&kind))
            .ok_or(SubmitError::ViewClosed(owner))?;
        slot.begin_submit(kind, ticket)?;
        self.mark_dirty();
        Ok(Effect::SubmitJob {
            kind,
            ticket,
            payload,
        })
    }

    fn slot_mut(&mut self, kind: JobKind) -> Option<&mut JobSlot> {
        self.panels
            .get_mut(&kind.owner())
            .and_then(|panel| panel.jobs.get_mut(&kind))
    }

    pub(crate) fn job_accepted(&mut self, kind: JobKind, ticket: Ticket, task_id: String) -> Vec<Effect> {
        let accepted = self
            .slot_mut(kind)
            .is_some_and(|slot| slot.accept(ticket, task_id.clone()));
        if !accepted {
            return Vec::new();
        }
        self.mark_dirty();
        vec![Effect::WatchProgress {
            kind,
            ticket,
            task_id,
        }]
    }

    pub(crate) fn job_rejected(&mut self, kind: JobKind, ticket: Ticket, reason: String) {
        let rejected = self
            .slot_mut(kind)
            .is_some_and(|slot| slot.reject(ticket, reason.clone()));
        if rejected {
            self.notify(NoticeLevel::Error, reason);
        }
    }

    pub(crate) fn job_progress(
        &mut self,
        kind: JobKind,
        ticket: Ticket,
        snapshot: ProgressSnapshot,
    ) -> Vec<Effect> {
        let outcome = match self.slot_mut(kind) {
            Some(slot) => slot.apply_snapshot(ticket, snapshot),
            None => SnapshotOutcome::Ignored,
        };
        match outcome {
            SnapshotOutcome::Ignored => Vec::new(),
            SnapshotOutcome::Running => {
                self.mark_dirty();
                Vec::new()
            }
            SnapshotOutcome::Failed(reason) => {
                self.notify(NoticeLevel::Error, reason);
                vec![Effect::StopProgress { kind }]
            }
            SnapshotOutcome::Completed => {
                self.mark_dirty();
                let mut effects = vec![
                    Effect::StopProgress { kind },
                    Effect::ScheduleGrace {
                        kind,
                        ticket,
                        delay: self.settings.grace_period,
                    },
                ];
                let refresh = match kind {
                    JobKind::Ingest => Some(AdminView::Playlists),
                    JobKind::Delete => Some(AdminView::Providers),
                    JobKind::Load => None,
                };
                effects.extend(refresh.and_then(|view| self.refresh_table(view)));
                effects
            }
        }
    }

    pub(crate) fn job_transport_failed(&mut self, kind: JobKind, ticket: Ticket, reason: String) -> Vec<Effect> {
        let failed = self
            .slot_mut(kind)
            .is_some_and(|slot| slot.transport_failed(ticket, reason.clone()));
        if !failed {
            return Vec::new();
        }
        self.notify(NoticeLevel::Error, reason);
        vec![Effect::StopProgress { kind }]
    }

    pub(crate) fn grace_elapsed(&mut self, kind: JobKind, ticket: Ticket) {
        let cleared = self
            .slot_mut(kind)
            .is_some_and(|slot| slot.clear_after_grace(ticket));
        if cleared {
            self.mark_dirty();
        }
    }

    // ---- watch list -------------------------------------------------------

    pub(crate) fn restore_watch_list(&mut self, entries: Vec<WatchEntry>) {
        self.watch_list = WatchList::restore(entries);
        self.mark_dirty();
    }

    pub(crate) fn add_to_watch_list(&mut self, entry: WatchEntry) -> Vec<Effect> {
        match self.watch_list.add(entry) {
            Ok(()) => {
                self.mark_dirty();
                vec![self.persist_watch_list()]
            }
            Err(err) => {
                self.notify(NoticeLevel::Info, err.to_string());
                Vec::new()
            }
        }
    }

    pub(crate) fn add_from_list(&mut self, kind: ListKind, index: usize) -> Vec<Effect> {
        let entry = self
            .lists
            .get(&kind)
            .and_then(|view| view.items().as_slice().get(index))
            .map(WatchEntry::from_item);
        match entry {
            Some(entry) => self.add_to_watch_list(entry),
            None => Vec::new(),
        }
    }

    pub(crate) fn remove_from_watch_list(&mut self, index: usize) -> Vec<Effect> {
        if self.watch_list.remove(index).is_none() {
            return Vec::new();
        }
        self.mark_dirty();
        vec![self.persist_watch_list()]
    }

    pub(crate) fn clear_watch_list(&mut self) -> Vec<Effect> {
        self.watch_list.clear();
        self.mark_dirty();
        vec![self.persist_watch_list()]
    }

    pub(crate) fn request_watch_list_submit(&mut self) -> Vec<Effect> {
        if self.watch_list.is_empty() {
            self.notify(NoticeLevel::Error, "watch list is empty");
            return Vec::new();
        }
        vec![Effect::SubmitWatchList(self.watch_list.entries().to_vec())]
    }

    pub(crate) fn watch_list_submitted(&mut self, result: Result<(), String>) -> Vec<Effect> {
        match result {
            Ok(()) => {
                self.watch_list.clear();
                self.notify(NoticeLevel::Info, "watch list submitted successfully");
                vec![self.persist_watch_list()]
            }
            Err(reason) => {
                self.notify(
                    NoticeLevel::Error,
                    format!("failed to submit watch list: {reason}"),
                );
                Vec::new()
            }
        }
    }

    fn persist_watch_list(&self) -> Effect {
        Effect::PersistWatchList(self.watch_list.entries().to_vec())
    }
}
