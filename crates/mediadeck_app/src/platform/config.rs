use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use mediadeck_core::CoreSettings;
use mediadeck_engine::{ApiSettings, ProgressTransport};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "./mediadeck.ron";

/// Client configuration read from a RON file. Every field may be omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Sent as a bearer token on every request.
    pub auth_token: Option<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub grace_period_ms: u64,
    pub delete_transport: ProgressTransport,
    pub store_dir: PathBuf,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            auth_token: None,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            poll_interval_ms: 1_000,
            grace_period_ms: 2_000,
            delete_transport: ProgressTransport::Push,
            store_dir: PathBuf::from("./.mediadeck"),
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        ron::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            auth_token: self.auth_token.clone().filter(|token| !token.is_empty()),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            delete_transport: self.delete_transport,
        }
    }

    pub fn core_settings(&self) -> CoreSettings {
        CoreSettings {
            grace_period: Duration::from_millis(self.grace_period_ms),
        }
    }

    pub fn level(&self) -> LevelFilter {
        deck_logging::parse_level(&self.log_level)
    }
}
