//! Query clause structures
//!
//! Defines the parsed clause representation consumed by the range compiler.

use serde_json::Value;

/// Which end of a range a bound clause constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `field >= value`
    Lower,
    /// `field <= value`
    Upper,
}

impl Bound {
    /// Returns the operator text for this bound
    pub fn op(&self) -> &'static str {
        match self {
            Bound::Lower => ">=",
            Bound::Upper => "<=",
        }
    }
}

/// Sort direction of an order clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "up",
            OrderDirection::Descending => "down",
        }
    }
}

/// A single query condition.
///
/// Clauses are compiled in insertion order; the compiler is order-sensitive.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    /// `field == value`
    Equality { field: String, value: Value },
    /// `field >= value` or `field <= value`
    Range {
        field: String,
        bound: Bound,
        value: Value,
    },
    /// Iteration direction over the emitted keys
    Order {
        field: String,
        direction: OrderDirection,
    },
}

impl FilterClause {
    /// Create an equality clause
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::Equality {
            field: field.into(),
            value,
        }
    }

    /// Create a lower-bound (`>=`) clause
    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self::Range {
            field: field.into(),
            bound: Bound::Lower,
            value,
        }
    }

    /// Create an upper-bound (`<=`) clause
    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self::Range {
            field: field.into(),
            bound: Bound::Upper,
            value,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::Order {
            field: field.into(),
            direction: OrderDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::Order {
            field: field.into(),
            direction: OrderDirection::Descending,
        }
    }

    /// Returns the document field this clause refers to
    pub fn field(&self) -> &str {
        match self {
            FilterClause::Equality { field, .. }
            | FilterClause::Range { field, .. }
            | FilterClause::Order { field, .. } => field,
        }
    }

    /// Returns true if this is a range clause
    pub fn is_range(&self) -> bool {
        matches!(self, FilterClause::Range { .. })
    }
}

/// Everything one query needs before compilation.
///
/// Owned by a single `QueryBuilder`; the compiler only ever sees `clauses`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    /// Document type the view is restricted to
    pub document_type: String,
    /// Design document holding the view (e.g. `_design/example`)
    pub index_container_id: String,
    /// Whether rows carry their source documents
    pub include_docs: bool,
    /// Maximum number of rows
    pub limit: Option<u64>,
    /// Clauses in insertion order
    pub clauses: Vec<FilterClause>,
}

impl QueryConfig {
    pub fn new(document_type: impl Into<String>, index_container_id: impl Into<String>) -> Self {
        Self {
            document_type: document_type.into(),
            index_container_id: index_container_id.into(),
            include_docs: false,
            limit: None,
            clauses: Vec::new(),
        }
    }

    /// Field names of every clause, in clause order
    pub fn fields(&self) -> Vec<&str> {
        self.clauses.iter().map(FilterClause::field).collect()
    }
}
