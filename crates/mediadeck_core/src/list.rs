use std::fmt;

use serde_json::Value;

use crate::accumulator::ListAccumulator;
use crate::cursor::{PageCursor, PageRequest};
use crate::item::{ItemShape, MediaItem};
use crate::Ticket;

/// The four catalog list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListKind {
    Media,
    Movies,
    Series,
    Search,
}

impl ListKind {
    pub const ALL: [ListKind; 4] = [
        ListKind::Media,
        ListKind::Movies,
        ListKind::Series,
        ListKind::Search,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ListKind::Media => "media",
            ListKind::Movies => "movies",
            ListKind::Series => "series",
            ListKind::Search => "search",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Request shape of one list view: the only thing that differs between views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListProfile {
    pub path: &'static str,
    pub page_size: u32,
    pub shape: ItemShape,
    pub query: Option<String>,
}

impl ListProfile {
    /// Search without a query browses the general media collection.
    pub fn for_list(kind: ListKind, query: Option<String>) -> Self {
        let query = query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        match (kind, query) {
            (ListKind::Search, Some(query)) => Self {
                path: "search",
                page_size: 50,
                shape: ItemShape::Discriminated,
                query: Some(query),
            },
            (ListKind::Media | ListKind::Search, _) => Self {
                path: "media",
                page_size: 7,
                shape: ItemShape::Discriminated,
                query: None,
            },
            (ListKind::Movies, _) => Self {
                path: "movies",
                page_size: 10,
                shape: ItemShape::Movie,
                query: None,
            },
            (ListKind::Series, _) => Self {
                path: "series",
                page_size: 9,
                shape: ItemShape::Discriminated,
                query: None,
            },
        }
    }

    fn request(&self, page: u32) -> PageRequest {
        PageRequest {
            page,
            size: self.page_size,
            query: self.query.clone(),
        }
    }
}

/// State owned by one mounted list view.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    ticket: Ticket,
    profile: ListProfile,
    items: ListAccumulator<MediaItem>,
    cursor: PageCursor,
    last_error: Option<String>,
}

impl ListView {
    pub(crate) fn new(ticket: Ticket, profile: ListProfile) -> Self {
        let cursor = PageCursor::new(profile.page_size);
        Self {
            ticket,
            profile,
            items: ListAccumulator::new(),
            cursor,
            last_error: None,
        }
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn profile(&self) -> &ListProfile {
        &self.profile
    }

    pub fn items(&self) -> &ListAccumulator<MediaItem> {
        &self.items
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Single-flight guard: `None` while a page is in flight or after exhaustion.
    pub(crate) fn load_more(&mut self) -> Option<PageRequest> {
        self.cursor.begin().map(|page| self.profile.request(page))
    }

    pub(crate) fn apply_page(&mut self, batch: Vec<Value>) {
        let received = batch.len();
        let shape = self.profile.shape;
        let items = batch
            .into_iter()
            .filter_map(|raw| MediaItem::from_json(raw, shape));
        self.items.merge(items);
        self.cursor.complete(received);
    }

    pub(crate) fn apply_failure(&mut self, reason: String) {
        self.cursor.fail();
        self.last_error = Some(reason);
    }
}
