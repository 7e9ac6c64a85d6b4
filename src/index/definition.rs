//! View definitions synthesized from query shapes
//!
//! The map function tests whether a document belongs to the document type
//! (`doc.type` equal to it, or an `_id` of the form `<type>/...`) and emits a
//! composite key built from the clause fields. Absent fields are emitted as
//! `null`. Every type and field name is inlined as a JSON string literal.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Built-in reducer installed alongside the map function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReduceFunction {
    #[serde(rename = "_count")]
    Count,
    #[serde(rename = "_stats")]
    Stats,
}

impl ReduceFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReduceFunction::Count => "_count",
            ReduceFunction::Stats => "_stats",
        }
    }
}

/// What a view has to index: the document type and the clause fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewShape {
    pub document_type: String,
    pub fields: Vec<String>,
    /// Emit whole documents instead of the constant `1`
    pub include_docs: bool,
}

impl ViewShape {
    pub fn new(
        document_type: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
        include_docs: bool,
    ) -> Self {
        Self {
            document_type: document_type.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            include_docs,
        }
    }

    /// `_stats` only accepts numeric values, so document-emitting views count.
    pub fn reducer(&self) -> ReduceFunction {
        if self.include_docs {
            ReduceFunction::Count
        } else {
            ReduceFunction::Stats
        }
    }

    /// Source text of the map function
    pub fn map_source(&self) -> String {
        let key = self
            .fields
            .iter()
            .map(|f| {
                let lit = js_string(f);
                format!("doc[{lit}] === undefined ? null : doc[{lit}]")
            })
            .collect::<Vec<_>>()
            .join(", ");

        let value = if self.include_docs { "doc" } else { "1" };
        let doc_type = js_string(&self.document_type);
        let id_prefix = js_string(&format!("{}/", self.document_type));

        format!(
            "function (doc) {{\n  \
             if (doc.type === {doc_type} || (typeof doc._id === \"string\" && doc._id.indexOf({id_prefix}) === 0)) {{\n    \
             emit([{key}], {value});\n  \
             }}\n\
             }}"
        )
    }
}

fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// A named view: map source plus built-in reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: String,
    pub map_source: String,
    pub reduce: ReduceFunction,
}

impl IndexDefinition {
    /// Synthesizes the definition a shape needs
    pub fn synthesize(name: impl Into<String>, shape: &ViewShape) -> Self {
        Self {
            name: name.into(),
            map_source: shape.map_source(),
            reduce: shape.reducer(),
        }
    }

    /// Design-document representation: `{map, reduce}`
    pub fn to_view_json(&self) -> Value {
        json!({
            "map": self.map_source,
            "reduce": self.reduce.as_str(),
        })
    }
}
