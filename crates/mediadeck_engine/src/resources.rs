use mediadeck_core::{AdminView, Descriptor, WatchEntry};
use serde_json::Value;

use crate::collection::json_kind;
use crate::{ApiClient, FailureKind, TransportError};

/// Admin tables and the watch-list endpoint.
#[async_trait::async_trait]
pub trait ResourceBackend: Send + Sync {
    async fn list_table(&self, view: AdminView) -> Result<Vec<Descriptor>, TransportError>;

    async fn submit_watch_list(&self, entries: &[WatchEntry]) -> Result<(), TransportError>;
}

#[async_trait::async_trait]
impl ResourceBackend for ApiClient {
    async fn list_table(&self, view: AdminView) -> Result<Vec<Descriptor>, TransportError> {
        let route = match view {
            AdminView::Playlists => "m3us",
            AdminView::Providers => "get-providers",
        };
        let body = self.get_json(self.endpoint(route)?).await?;
        match view {
            AdminView::Playlists => playlist_rows(body),
            AdminView::Providers => provider_rows(body),
        }
    }

    async fn submit_watch_list(&self, entries: &[WatchEntry]) -> Result<(), TransportError> {
        let mut unique: Vec<&WatchEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !unique.iter().any(|seen| seen.id == entry.id) {
                unique.push(entry);
            }
        }
        self.post_json(self.endpoint("watchlist/")?, &unique).await?;
        Ok(())
    }
}

/// `{file: {file_path, creation_date}}` keyed by playlist file name.
pub fn playlist_rows(body: Value) -> Result<Vec<Descriptor>, TransportError> {
    let Value::Object(files) = body else {
        return Err(unexpected("an object of playlists", &body));
    };
    Ok(files
        .into_iter()
        .map(|(file, info)| {
            let mut row = Descriptor::new(file, "");
            if let Value::Object(mut info) = info {
                if let Some(Value::String(path)) = info.remove("file_path") {
                    row.path = path;
                }
                row.extra = info;
            }
            row
        })
        .collect())
}

/// Array of provider records; rows without a name are skipped.
pub fn provider_rows(body: Value) -> Result<Vec<Descriptor>, TransportError> {
    let Value::Array(items) = body else {
        return Err(unexpected("a list of providers", &body));
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Descriptor>(item).ok())
        .collect())
}

fn unexpected(expected: &str, got: &Value) -> TransportError {
    TransportError::new(
        FailureKind::Decode,
        format!("expected {expected}, got {}", json_kind(got)),
    )
}
