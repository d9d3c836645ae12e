use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the engine follows a running job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProgressTransport {
    /// Server-sent events on the job's push route.
    #[default]
    Push,
    /// Fixed-interval GET of the job's progress route.
    Poll,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Every route is resolved relative to this URL.
    pub base_url: String,
    pub auth_token: Option<String>,
    pub connect_timeout: Duration,
    /// Total timeout for ordinary requests. The push stream is exempt.
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub delete_transport: ProgressTransport,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            auth_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            delete_transport: ProgressTransport::Push,
        }
    }
}
