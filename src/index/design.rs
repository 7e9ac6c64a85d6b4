//! Design documents
//!
//! The design document is shared by every process that materializes views,
//! and its `_rev` token guards concurrent updates. Members this crate does
//! not manage are carried through a read-merge-write untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::definition::IndexDefinition;

/// A versioned container of view definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    #[serde(rename = "_id")]
    pub id: String,
    /// Revision read at fetch time; `None` until the document exists
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// View name → `{map, reduce, ...}`
    #[serde(default)]
    pub views: Map<String, Value>,
    /// Everything else (`language`, `validate_doc_update`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DesignDocument {
    /// An empty, not yet stored design document
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: None,
            views: Map::new(),
            extra: Map::new(),
        }
    }

    /// Returns the stored view entry under a name
    pub fn view(&self, name: &str) -> Option<&Value> {
        self.views.get(name)
    }

    /// Returns true if the exact definition is already installed
    pub fn has_definition(&self, definition: &IndexDefinition) -> bool {
        self.view(&definition.name) == Some(&definition.to_view_json())
    }

    /// Inserts or replaces a view definition
    pub fn set_view(&mut self, definition: &IndexDefinition) {
        self.views
            .insert(definition.name.clone(), definition.to_view_json());
    }
}
