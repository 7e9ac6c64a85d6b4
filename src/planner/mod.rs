//! Query planner subsystem
//!
//! Turns condition text into typed clauses and compiles clause lists into
//! view key ranges.
//!
//! # Design Principles
//!
//! - Deterministic: same clauses → same compiled query
//! - Fail-fast: every clause is validated when it is added
//! - Pure: nothing here performs I/O
//!
//! # Accepted shapes
//!
//! Zero or more equality clauses, then either at most one range clause or
//! one or more order clauses.

mod ast;
mod compiler;
mod errors;
mod explain;
mod parser;

pub use ast::{Bound, FilterClause, OrderDirection, QueryConfig};
pub use compiler::{high_sentinel, low_sentinel, CompiledQuery, RangeCompiler};
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use explain::{render_clause, ExplainPlan};
pub use parser::{parse_condition, parse_order};
