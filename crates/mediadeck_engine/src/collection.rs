use mediadeck_core::PageRequest;
use serde_json::Value;

use crate::{ApiClient, FailureKind, TransportError};

/// Source of paginated media collections.
#[async_trait::async_trait]
pub trait CollectionBackend: Send + Sync {
    /// Returns the raw items of one page, in server order.
    async fn fetch_page(
        &self,
        path: &str,
        request: &PageRequest,
    ) -> Result<Vec<Value>, TransportError>;
}

#[async_trait::async_trait]
impl CollectionBackend for ApiClient {
    async fn fetch_page(
        &self,
        path: &str,
        request: &PageRequest,
    ) -> Result<Vec<Value>, TransportError> {
        let mut url = self.endpoint(path)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(text) = &request.query {
                query.append_pair("query", text);
            }
            query
                .append_pair("page", &request.page.to_string())
                .append_pair("size", &request.size.to_string());
        }

        match self.get_json(url).await? {
            Value::Array(items) => Ok(items),
            other => Err(TransportError::new(
                FailureKind::Decode,
                format!("expected a list of items, got {}", json_kind(&other)),
            )),
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
