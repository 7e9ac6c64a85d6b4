//! Observable events
//!
//! Every step of a query execution that touches the store has a named event.
//! Events are explicit and typed.

use std::fmt;

/// Observable events of query execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Query
    /// View query issued
    ViewQuery,
    /// View does not exist yet
    ViewMissing,
    /// Rows returned
    QueryComplete,
    /// Query ended in an error
    QueryFailed,

    // Materialization
    /// View definition synthesized
    IndexDefined,
    /// Design document write lost a revision race
    IndexInstallConflict,
    /// Design document written
    IndexInstalled,
    /// Design document already held the definition
    IndexAlreadyPresent,
    /// Conflict retry budget consumed
    IndexInstallExhausted,
    /// Query answered after installing its view
    ViewReconciled,
}

impl Event {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ViewQuery => "VIEW_QUERY",
            Event::ViewMissing => "VIEW_MISSING",
            Event::QueryComplete => "QUERY_COMPLETE",
            Event::QueryFailed => "QUERY_FAILED",
            Event::IndexDefined => "INDEX_DEFINED",
            Event::IndexInstallConflict => "INDEX_INSTALL_CONFLICT",
            Event::IndexInstalled => "INDEX_INSTALLED",
            Event::IndexAlreadyPresent => "INDEX_ALREADY_PRESENT",
            Event::IndexInstallExhausted => "INDEX_INSTALL_EXHAUSTED",
            Event::ViewReconciled => "VIEW_RECONCILED",
        }
    }

    /// Returns true for events that end a query unsuccessfully
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::QueryFailed | Event::IndexInstallExhausted)
    }

    /// Returns true for events worth seeing at default verbosity
    pub fn is_notable(&self) -> bool {
        matches!(
            self,
            Event::ViewMissing
                | Event::IndexInstalled
                | Event::IndexInstallConflict
                | Event::ViewReconciled
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::ViewMissing.as_str(), "VIEW_MISSING");
        assert_eq!(Event::IndexInstallExhausted.to_string(), "INDEX_INSTALL_EXHAUSTED");
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::QueryFailed.is_failure());
        assert!(Event::IndexInstallExhausted.is_failure());
        assert!(!Event::IndexInstalled.is_failure());
        assert!(!Event::ViewQuery.is_notable());
    }
}
