//! View response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of a view result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    /// Source document id (absent on reduced rows)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Emitted key
    #[serde(default)]
    pub key: Value,
    /// Emitted value
    #[serde(default)]
    pub value: Value,
    /// Source document, when `include_docs=true`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Value>,
}

/// Successful view response: `{total_rows, offset, rows: [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    pub rows: Vec<ViewRow>,
}

impl ViewResponse {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Documents attached to the rows, in row order
    pub fn docs(&self) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(|r| r.doc.as_ref())
    }
}

/// Error body returned by the store: `{error, reason}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub reason: String,
}

impl ErrorBody {
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self {
            error: "not_found".into(),
            reason: reason.into(),
        }
    }

    pub fn conflict() -> Self {
        Self {
            error: "conflict".into(),
            reason: "Document update conflict.".into(),
        }
    }

    /// Returns true if a body is the store's "not found" error
    pub fn is_not_found(body: &Value) -> bool {
        body.get("error").and_then(Value::as_str) == Some("not_found")
    }
}
