use deck_logging::{deck_error, deck_info, deck_warn};
use mediadeck_core::WatchEntry;
use mediadeck_engine::{load_json, save_json, KeyValueStore};

const WATCH_LIST_KEY: &str = "watchList";

/// Unreadable or corrupt data is logged and treated as an empty list.
pub(crate) fn load_watch_list(store: &dyn KeyValueStore) -> Vec<WatchEntry> {
    match load_json::<Vec<WatchEntry>>(store, WATCH_LIST_KEY) {
        Ok(Some(entries)) => {
            deck_info!("Restored {} watch list entries", entries.len());
            entries
        }
        Ok(None) => Vec::new(),
        Err(err) => {
            deck_warn!("Failed to restore watch list: {}", err);
            Vec::new()
        }
    }
}

pub(crate) fn save_watch_list(store: &dyn KeyValueStore, entries: &[WatchEntry]) {
    if let Err(err) = save_json(store, WATCH_LIST_KEY, entries) {
        deck_error!("Failed to persist watch list: {}", err);
    }
}
