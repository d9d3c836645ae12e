use std::collections::BTreeSet;

use crate::job::Descriptor;
use crate::Ticket;

/// Playlist or provider table with a row selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTable {
    ticket: Ticket,
    rows: Vec<Descriptor>,
    selected: BTreeSet<usize>,
    loading: bool,
    last_error: Option<String>,
}

impl ResourceTable {
    pub(crate) fn new(ticket: Ticket) -> Self {
        Self {
            ticket,
            rows: Vec::new(),
            selected: BTreeSet::new(),
            loading: false,
            last_error: None,
        }
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn rows(&self) -> &[Descriptor] {
        &self.rows
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn begin_refresh(&mut self, ticket: Ticket) {
        self.ticket = ticket;
        self.loading = true;
    }

    /// Returns false when `index` is out of range.
    pub(crate) fn toggle(&mut self, index: usize) -> bool {
        if index >= self.rows.len() {
            return false;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
        true
    }

    pub(crate) fn selection(&self) -> Vec<Descriptor> {
        self.selected
            .iter()
            .filter_map(|&index| self.rows.get(index).cloned())
            .collect()
    }

    /// Row indices shift on refresh, so the selection is dropped.
    pub(crate) fn replace_rows(&mut self, rows: Vec<Descriptor>) {
        self.rows = rows;
        self.selected.clear();
        self.loading = false;
        self.last_error = None;
    }

    pub(crate) fn fail(&mut self, reason: String) {
        self.loading = false;
        self.last_error = Some(reason);
    }
}
