//! Crate-level error type
//!
//! Planner errors surface when a clause is added. Everything else surfaces
//! from executing a query and carries the status and body that caused it.

use serde_json::Value;
use thiserror::Error;

use crate::planner::PlannerError;
use crate::store::StoreError;

/// Result type for query execution
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors returned by building or executing a view query
#[derive(Debug, Error)]
pub enum QueryError {
    /// Rejected clause: bad syntax, unknown operator or bad ordering
    #[error(transparent)]
    Planner(#[from] PlannerError),

    /// The view answered with something other than rows or "not found"
    #[error("Unknown response during query {url}: status {status}: {body}")]
    QueryFailed { url: String, status: u16, body: Value },

    /// Every install attempt hit a revision conflict
    #[error("No more tries remain to store view {index} after {attempts} attempts")]
    IndexCreationExhausted { index: String, attempts: u32 },

    /// The design document could not be read or written
    #[error("Error when storing view {index}: status {status}: {body}")]
    IndexInstallFailed {
        index: String,
        status: u16,
        body: Value,
    },

    /// The view was installed but the query still failed
    #[error("Failed to query {url} after creating its view: status {status}: {body}")]
    PostInstallQueryFailed { url: String, status: u16, body: Value },

    /// A 200 response whose body is not a view result
    #[error("Malformed view response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    /// Transport failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QueryError {
    /// Stable code for logs and assertions
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Planner(e) => e.code().code(),
            QueryError::QueryFailed { .. } => "VIEW_QUERY_FAILED",
            QueryError::IndexCreationExhausted { .. } => "VIEW_INDEX_CREATION_EXHAUSTED",
            QueryError::IndexInstallFailed { .. } => "VIEW_INDEX_INSTALL_FAILED",
            QueryError::PostInstallQueryFailed { .. } => "VIEW_POST_INSTALL_QUERY_FAILED",
            QueryError::InvalidResponse { .. } => "VIEW_INVALID_RESPONSE",
            QueryError::Store(StoreError::InvalidConfig(_)) => "VIEW_STORE_INVALID_CONFIG",
            QueryError::Store(_) => "VIEW_STORE_UNAVAILABLE",
        }
    }

    /// HTTP status that caused the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            QueryError::QueryFailed { status, .. }
            | QueryError::IndexInstallFailed { status, .. }
            | QueryError::PostInstallQueryFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerError;
    use serde_json::json;

    #[test]
    fn test_codes() {
        let err: QueryError = PlannerError::unknown_operator("!=").into();
        assert_eq!(err.code(), "VIEW_QUERY_UNKNOWN_OPERATOR");

        let err = QueryError::IndexCreationExhausted {
            index: "QC-Page".into(),
            attempts: 5,
        };
        assert_eq!(err.code(), "VIEW_INDEX_CREATION_EXHAUSTED");
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("5 attempts"));
    }

    #[test]
    fn test_status_is_kept() {
        let err = QueryError::QueryFailed {
            url: "_design/example/_view/QC-Page".into(),
            status: 500,
            body: json!({"error": "unknown"}),
        };
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("status 500"));
    }
}
