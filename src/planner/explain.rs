//! Explain output
//!
//! Clause rendering lives here rather than on the clause type, so the AST
//! stays plain data. Output is deterministic and human-readable.

use std::fmt;

use serde_json::Value;

use super::ast::{FilterClause, QueryConfig};
use super::compiler::CompiledQuery;
use super::errors::PlannerError;

/// Renders a clause as `field op <json>` or `order <up|down> field`.
pub fn render_clause(clause: &FilterClause) -> String {
    match clause {
        FilterClause::Equality { field, value } => format!("{} == {}", field, value),
        FilterClause::Range {
            field,
            bound,
            value,
        } => format!("{} {} {}", field, bound.op(), value),
        FilterClause::Order { field, direction } => {
            format!("order {} {}", direction.as_str(), field)
        }
    }
}

fn render_key(key: &Option<Vec<Value>>) -> Option<String> {
    key.as_ref().map(|k| Value::Array(k.clone()).to_string())
}

/// Explain plan output
#[derive(Debug, Clone)]
pub struct ExplainPlan {
    /// Whether compilation succeeded
    pub accepted: bool,
    /// Derived view name
    pub index_name: String,
    /// Request path of the view
    pub view_path: Option<String>,
    /// Rendered clauses in order
    pub clauses: Vec<String>,
    pub key: Option<String>,
    pub start_key: Option<String>,
    pub end_key: Option<String>,
    pub descending: bool,
    pub limit: Option<u64>,
    /// Wire query string
    pub query_string: Option<String>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a compiled query
    pub fn from_compiled(
        config: &QueryConfig,
        index_name: &str,
        view_path: &str,
        compiled: &CompiledQuery,
        query_string: &str,
    ) -> Self {
        Self {
            accepted: true,
            index_name: index_name.to_string(),
            view_path: Some(view_path.to_string()),
            clauses: config.clauses.iter().map(render_clause).collect(),
            key: render_key(&compiled.key),
            start_key: render_key(&compiled.start_key),
            end_key: render_key(&compiled.end_key),
            descending: compiled.descending,
            limit: compiled.limit,
            query_string: Some(query_string.to_string()),
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a compilation error
    pub fn from_error(config: &QueryConfig, index_name: &str, err: &PlannerError) -> Self {
        Self {
            accepted: false,
            index_name: index_name.to_string(),
            view_path: None,
            clauses: config.clauses.iter().map(render_clause).collect(),
            key: None,
            start_key: None,
            end_key: None,
            descending: false,
            limit: None,
            query_string: None,
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN VIEW QUERY ===")?;
        writeln!(f, "View: {}", self.index_name)?;

        if !self.clauses.is_empty() {
            writeln!(f, "Clauses:")?;
            for clause in &self.clauses {
                writeln!(f, "  - {}", clause)?;
            }
        }

        if !self.accepted {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
            return Ok(());
        }

        writeln!(f, "Status: ACCEPTED")?;
        if let Some(path) = &self.view_path {
            writeln!(f, "Path: {}", path)?;
        }
        if let Some(key) = &self.key {
            writeln!(f, "Key: {}", key)?;
        }
        if let (Some(start), Some(end)) = (&self.start_key, &self.end_key) {
            writeln!(f, "Range: {} .. {}", start, end)?;
        }
        writeln!(
            f,
            "Direction: {}",
            if self.descending { "descending" } else { "ascending" }
        )?;
        if let Some(limit) = self.limit {
            writeln!(f, "Limit: {}", limit)?;
        }
        if let Some(qs) = &self.query_string {
            writeln!(f, "Query: {}", qs)?;
        }

        Ok(())
    }
}
