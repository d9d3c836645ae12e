//! Normalized job progress reports.
//!
//! The job backends describe progress with overlapping field names
//! (`total_progress`/`current_stage` for playlist loading, `progress` or a
//! stringly `data`/`provider` pair for provider deletion). Everything is
//! folded into [`ProgressSnapshot`] at the boundary so the tracker only
//! ever sees one shape.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("progress payload is not a JSON object")]
    NotAnObject,
    #[error("progress payload is not valid JSON: {0}")]
    Malformed(String),
}

/// What the backend said about how far along the job is.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMeasure {
    Percent { percent: f64, stage: Option<String> },
    Stage(String),
    Indeterminate,
}

/// `current of total` sub-count, e.g. "file 2 of 5".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemCount {
    pub current: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: bool,
    pub measure: ProgressMeasure,
    /// Item currently being worked on (provider name, file name).
    pub subject: Option<String>,
    pub items: Option<ItemCount>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ProgressSnapshot {
    /// Placeholder shown between submission and the first report.
    pub fn initializing() -> Self {
        Self {
            completed: false,
            measure: ProgressMeasure::Percent {
                percent: 0.0,
                stage: Some("Initializing...".to_string()),
            },
            subject: None,
            items: None,
            message: None,
            error: None,
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|err| SnapshotError::Malformed(err.to_string()))?;
        Self::from_json(&value)
    }

    /// Field presence, not field naming, decides the meaning.
    pub fn from_json(value: &Value) -> Result<Self, SnapshotError> {
        let fields = value.as_object().ok_or(SnapshotError::NotAnObject)?;

        let percent = ["total_progress", "progress", "data"]
            .iter()
            .find_map(|name| fields.get(*name).and_then(as_number))
            .map(|percent| percent.clamp(0.0, 100.0));
        let stage = text(fields, "current_stage");
        let measure = match (percent, stage) {
            (Some(percent), stage) => ProgressMeasure::Percent { percent, stage },
            (None, Some(stage)) => ProgressMeasure::Stage(stage),
            (None, None) => ProgressMeasure::Indeterminate,
        };

        let completed = ["is_complete", "completed"]
            .iter()
            .find_map(|name| fields.get(*name).and_then(Value::as_bool))
            .unwrap_or(false);

        let subject = ["provider", "currentFile", "current_file"]
            .iter()
            .find_map(|name| text(fields, name));

        let items = [("currentM3U", "totalM3Us"), ("current_item", "total_items")]
            .iter()
            .find_map(|(current, total)| {
                let current = fields.get(*current).and_then(as_number)?;
                let total = fields.get(*total).and_then(as_number)?;
                Some(ItemCount {
                    current: current.max(0.0) as u64,
                    total: total.max(0.0) as u64,
                })
            });

        Ok(Self {
            completed,
            measure,
            subject,
            items,
            message: text(fields, "message"),
            error: text(fields, "error"),
        })
    }

    pub fn percent(&self) -> Option<f64> {
        match &self.measure {
            ProgressMeasure::Percent { percent, .. } => Some(*percent),
            _ => None,
        }
    }

    pub fn stage(&self) -> Option<&str> {
        match &self.measure {
            ProgressMeasure::Percent { stage, .. } => stage.as_deref(),
            ProgressMeasure::Stage(stage) => Some(stage),
            ProgressMeasure::Indeterminate => None,
        }
    }

    /// True once the report ends the job, successfully or not.
    pub fn is_terminal(&self) -> bool {
        self.error.is_some() || self.completed
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

fn text(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}
