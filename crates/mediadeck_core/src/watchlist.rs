use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::item::{ItemKey, MediaItem};

/// One persisted watch-list record. Unknown fields round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub id: ItemKey,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "seriesName", default, skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WatchEntry {
    pub fn from_item(item: &MediaItem) -> Self {
        let mut extra = item.fields.clone();
        for known in ["id", "name", "type", "seriesName"] {
            extra.remove(known);
        }
        Self {
            id: item.id.clone(),
            name: item.title(),
            kind: item
                .field_str("type")
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| item.kind.to_string()),
            series_name: item.field_str("seriesName").map(ToOwned::to_owned),
            extra,
        }
    }

    /// `Series: Season 1` for seasons, the plain name otherwise.
    pub fn display_name(&self) -> String {
        match (&self.series_name, self.kind.as_str()) {
            (Some(series), "Season") => format!("{series}: {}", self.name),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchListError {
    #[error("item {0} is already in your watch list")]
    Duplicate(ItemKey),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WatchList {
    entries: Vec<WatchEntry>,
}

impl WatchList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later duplicates of an id are dropped.
    pub fn restore(entries: Vec<WatchEntry>) -> Self {
        let mut list = Self::new();
        for entry in entries {
            let _ = list.add(entry);
        }
        list
    }

    pub fn add(&mut self, entry: WatchEntry) -> Result<(), WatchListError> {
        if self.contains(&entry.id) {
            return Err(WatchListError::Duplicate(entry.id));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<WatchEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, id: &ItemKey) -> bool {
        self.entries.iter().any(|entry| &entry.id == id)
    }

    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
