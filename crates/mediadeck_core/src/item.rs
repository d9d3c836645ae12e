use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::accumulator::Keyed;

/// Identity of a catalog item as the backend sends it: integer or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemKey {
    Int(i64),
    Text(String),
}

impl ItemKey {
    /// Reads a key from a JSON value; floats, null and empty strings are not keys.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_i64().map(ItemKey::Int),
            Value::String(text) if !text.is_empty() => Some(ItemKey::Text(text.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Int(id) => write!(f, "{id}"),
            ItemKey::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Series,
    Movie,
    Unknown,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MediaKind::Series => "Series",
            MediaKind::Movie => "Movie",
            MediaKind::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// How a list view tags the items it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemShape {
    /// `image` marks a series, `logo` marks a movie, neither is unknown.
    Discriminated,
    /// Every item is a movie regardless of its fields.
    Movie,
}

impl ItemShape {
    pub fn classify(self, fields: &Map<String, Value>) -> MediaKind {
        match self {
            ItemShape::Movie => MediaKind::Movie,
            ItemShape::Discriminated => {
                if has_field(fields, "image") {
                    MediaKind::Series
                } else if has_field(fields, "logo") {
                    MediaKind::Movie
                } else {
                    MediaKind::Unknown
                }
            }
        }
    }
}

fn has_field(fields: &Map<String, Value>, name: &str) -> bool {
    match fields.get(name) {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.is_empty(),
        Some(_) => true,
    }
}

/// One row of a catalog list view.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: ItemKey,
    pub kind: MediaKind,
    pub fields: Map<String, Value>,
}

impl MediaItem {
    /// Normalizes a raw backend item. Returns `None` for payloads without a usable `id`.
    pub fn from_json(value: Value, shape: ItemShape) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };
        let id = fields.get("id").and_then(ItemKey::from_json)?;
        let kind = shape.classify(&fields);
        Some(Self { id, kind, fields })
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Display title: `name`, then `title`, then the id.
    pub fn title(&self) -> String {
        self.field_str("name")
            .or_else(|| self.field_str("title"))
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| self.id.to_string())
    }
}

impl Keyed for MediaItem {
    type Key = ItemKey;

    fn key(&self) -> ItemKey {
        self.id.clone()
    }
}
