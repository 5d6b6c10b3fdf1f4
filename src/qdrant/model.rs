//! Wire shapes for the Qdrant REST endpoints used by this tool.
//!
//! Requests are small `Serialize` structs mirroring the JSON bodies Qdrant
//! expects; responses are deserialized leniently (a missing `result`,
//! `points` or `payload` decodes as empty rather than failing).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::utils::text::truncate_ellipsis;

/// Payload fields consulted, in order, to name the document a chunk belongs to.
pub const DOCUMENT_KEY_FIELDS: [&str; 3] = ["doc_id", "source", "filename"];

/// Group name used when none of [`DOCUMENT_KEY_FIELDS`] is set.
pub const UNKNOWN_DOCUMENT: &str = "UNKNOWN";

/// Payload field holding the chunk text.
pub const TEXT_FIELD: &str = "text";

/* ---- Point identity ---- */

/// Database-assigned point id: Qdrant accepts unsigned integers or UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Uuid(String),
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointId::Num(n) => write!(f, "{n}"),
            PointId::Uuid(s) => f.write_str(s),
        }
    }
}

/* ---- Payload ---- */

/// Key/value metadata attached to a point, kept in wire order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Resolve the owning document: the first *set* value among `doc_id`,
    /// `source`, `filename`, else [`UNKNOWN_DOCUMENT`].
    ///
    /// Null, `false`, zero and empty strings/arrays/objects count as unset.
    pub fn document_key(&self) -> String {
        DOCUMENT_KEY_FIELDS
            .iter()
            .filter_map(|field| self.get(field))
            .find(|v| is_set(v))
            .map(value_text)
            .unwrap_or_else(|| UNKNOWN_DOCUMENT.to_string())
    }

    /// Chunk text, or an empty string when the `text` field is unset.
    pub fn text(&self) -> String {
        self.get(TEXT_FIELD)
            .filter(|v| is_set(v))
            .map(value_text)
            .unwrap_or_default()
    }

    /// Human rendering of a payload value: strings longer than `max_chars`
    /// are clipped with `...`; other values print as JSON.
    pub fn display_value(value: &Value, max_chars: usize) -> String {
        match value {
            Value::String(s) => truncate_ellipsis(s, max_chars),
            other => other.to_string(),
        }
    }
}

/// Whether a JSON value carries something (mirrors the usual "truthy" test).
pub fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Plain text of a value: strings unquoted, everything else as JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/* ---- Points / responses ---- */

/// A single stored vector entry. The vector itself is never requested.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Point {
    pub id: PointId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionDescription {
    pub name: String,
}

/// Standard Qdrant envelope: `{"result": ..., "status": ..., "time": ...}`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct ApiResponse<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: T,
}

#[derive(Debug, Default, Deserialize)]
pub struct CollectionsResult {
    #[serde(default)]
    pub collections: Vec<CollectionDescription>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScrollResult {
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub next_page_offset: Option<PointId>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/* ---- Requests ---- */

/// Exact-match condition: `{"key": field, "match": {"value": value}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCondition {
    pub key: String,
    #[serde(rename = "match")]
    pub matches: MatchValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchValue {
    pub value: Value,
}

/// Point filter. The empty filter serializes to `{}` and matches every point.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<FieldCondition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn field_equals(key: impl Into<String>, value: Value) -> Self {
        Self {
            must: vec![FieldCondition {
                key: key.into(),
                matches: MatchValue { value },
            }],
        }
    }
}

/// Body of `POST /collections/{name}/points/scroll`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollRequest {
    pub limit: usize,
    pub with_payload: bool,
    pub with_vector: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<PointId>,
}

impl ScrollRequest {
    /// First page of points with payloads, vectors suppressed.
    pub fn payloads(limit: usize) -> Self {
        Self {
            limit,
            with_payload: true,
            with_vector: false,
            filter: None,
            offset: None,
        }
    }

    /// Ids only, restricted by `filter`.
    pub fn ids_matching(filter: Filter, limit: usize) -> Self {
        Self {
            limit,
            with_payload: false,
            with_vector: false,
            filter: Some(filter),
            offset: None,
        }
    }

    pub fn starting_at(mut self, offset: Option<PointId>) -> Self {
        self.offset = offset;
        self
    }
}

/// Body of `POST /collections/{name}/points/delete`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DeleteSelector {
    Filter { filter: Filter },
    Points { points: Vec<PointId> },
}
