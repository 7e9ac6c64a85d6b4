//! Planner error types
//!
//! Error codes:
//! - VIEW_QUERY_INVALID_SYNTAX (REJECT)
//! - VIEW_QUERY_CLAUSE_ORDER (REJECT)
//! - VIEW_QUERY_UNKNOWN_OPERATOR (REJECT)
//! - VIEW_QUERY_TYPE_REQUIRED (REJECT)
//!
//! All planner errors are raised synchronously while clauses are added, so a
//! rejected query never reaches the network.

use std::fmt;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Malformed condition or order text
    InvalidClauseSyntax,
    /// Clause not allowed after the clauses before it
    ClauseOrderViolation,
    /// Condition operator is not one of `==`, `=`, `>=`, `<=`
    UnknownOperator,
    /// Query built without a document type
    DocumentTypeRequired,
}

impl PlannerErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::InvalidClauseSyntax => "VIEW_QUERY_INVALID_SYNTAX",
            PlannerErrorCode::ClauseOrderViolation => "VIEW_QUERY_CLAUSE_ORDER",
            PlannerErrorCode::UnknownOperator => "VIEW_QUERY_UNKNOWN_OPERATOR",
            PlannerErrorCode::DocumentTypeRequired => "VIEW_QUERY_TYPE_REQUIRED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerError {
    /// Error code
    code: PlannerErrorCode,
    /// Human-readable message
    message: String,
    /// Rendered clause or raw text that was rejected
    clause: Option<String>,
}

impl PlannerError {
    /// Create an invalid syntax error for condition or order text
    pub fn invalid_syntax(text: impl Into<String>, reason: &str) -> Self {
        let t = text.into();
        Self {
            code: PlannerErrorCode::InvalidClauseSyntax,
            message: format!("Unknown condition {:?}: {}", t, reason),
            clause: Some(t),
        }
    }

    /// Create a clause ordering error
    pub fn clause_order(clause: impl Into<String>, previous: &str) -> Self {
        let c = clause.into();
        Self {
            code: PlannerErrorCode::ClauseOrderViolation,
            message: format!("Filter '{}' not allowed after previous {} filter", c, previous),
            clause: Some(c),
        }
    }

    /// Create an unknown operator error
    pub fn unknown_operator(op: impl Into<String>) -> Self {
        let o = op.into();
        Self {
            code: PlannerErrorCode::UnknownOperator,
            message: format!("Unknown filter operation: {:?}", o),
            clause: Some(o),
        }
    }

    /// Create a document type required error
    pub fn document_type_required() -> Self {
        Self {
            code: PlannerErrorCode::DocumentTypeRequired,
            message: "Document type required".into(),
            clause: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending clause text if applicable
    pub fn clause(&self) -> Option<&str> {
        self.clause.as_deref()
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PlannerErrorCode::InvalidClauseSyntax.code(),
            "VIEW_QUERY_INVALID_SYNTAX"
        );
        assert_eq!(
            PlannerErrorCode::ClauseOrderViolation.code(),
            "VIEW_QUERY_CLAUSE_ORDER"
        );
        assert_eq!(
            PlannerErrorCode::UnknownOperator.code(),
            "VIEW_QUERY_UNKNOWN_OPERATOR"
        );
    }

    #[test]
    fn test_error_display() {
        let err = PlannerError::clause_order("status == \"open\"", "greater");
        let display = format!("{}", err);
        assert!(display.starts_with("[REJECT] VIEW_QUERY_CLAUSE_ORDER"));
        assert!(display.contains("status == \"open\""));
        assert!(display.contains("greater"));
        assert_eq!(err.clause(), Some("status == \"open\""));
    }

    #[test]
    fn test_type_required_has_no_clause() {
        let err = PlannerError::document_type_required();
        assert_eq!(err.code(), PlannerErrorCode::DocumentTypeRequired);
        assert!(err.clause().is_none());
    }
}
