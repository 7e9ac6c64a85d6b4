//! Range compiler
//!
//! Translates an ordered clause list into the key / key-range description a
//! view understands. Views order composite keys by JSON type first
//! (null < booleans < numbers < strings < arrays < objects) and then by value,
//! so the open end of a bound is filled with a type-extremal sentinel:
//! `null` below everything, `{}` above everything.
//!
//! The compiler is a small state machine. It starts in the equality state,
//! accumulating key components; the first range clause moves it into a range
//! state from which no further equality, range or order clause is accepted.
//!
//! Every clause field is a component of the emitted view key, order fields
//! included. An order clause therefore leaves its component open: the query
//! becomes a scan over the equality prefix, from `prefix ++ [null]` to
//! `prefix ++ [{}]`, walked backwards when descending. Only further order
//! clauses may follow it, since any later bound would land on the wrong key
//! position.

use serde_json::{Map, Value};

use super::ast::{Bound, FilterClause, OrderDirection, QueryConfig};
use super::errors::{PlannerError, PlannerResult};
use super::explain::render_clause;

/// Sentinel that sorts before every other JSON value
pub fn low_sentinel() -> Value {
    Value::Null
}

/// Sentinel that sorts after every other JSON value
pub fn high_sentinel() -> Value {
    Value::Object(Map::new())
}

/// Immutable view query description
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Exact composite key (equality-only queries)
    pub key: Option<Vec<Value>>,
    /// Inclusive range start (range queries)
    pub start_key: Option<Vec<Value>>,
    /// Inclusive range end (range queries)
    pub end_key: Option<Vec<Value>>,
    /// Iterate the view backwards
    pub descending: bool,
    /// Attach source documents to rows
    pub include_docs: bool,
    /// Maximum number of rows
    pub limit: Option<u64>,
    /// Always false: rows are read from the map side
    pub reduce: bool,
}

impl CompiledQuery {
    /// Returns true if the query scans a key range
    pub fn is_range(&self) -> bool {
        self.start_key.is_some()
    }
}

/// Compiler state
#[derive(Debug)]
enum KeyState {
    /// Only equality clauses so far
    Equal(Vec<Value>),
    /// An order clause opened the component after the prefix
    Ordered(Vec<Value>),
    /// A range clause has been applied
    Range {
        bound: Bound,
        start: Vec<Value>,
        end: Vec<Value>,
    },
}

impl KeyState {
    fn name(&self) -> &'static str {
        match self {
            KeyState::Equal(_) => "equal",
            KeyState::Ordered(_) => "order",
            KeyState::Range {
                bound: Bound::Lower,
                ..
            } => "greater",
            KeyState::Range {
                bound: Bound::Upper,
                ..
            } => "less",
        }
    }
}

/// Compiles filter clauses into a view query.
pub struct RangeCompiler;

impl RangeCompiler {
    /// Compiles clauses in order.
    ///
    /// Fails with a clause-order violation when any clause follows a range
    /// clause, or an equality or range clause follows an order clause.
    pub fn compile(clauses: &[FilterClause]) -> PlannerResult<CompiledQuery> {
        let mut state = KeyState::Equal(Vec::new());
        let mut descending = false;

        for clause in clauses {
            state = match (state, clause) {
                (KeyState::Equal(mut key), FilterClause::Equality { value, .. }) => {
                    key.push(value.clone());
                    KeyState::Equal(key)
                }
                (KeyState::Equal(key), FilterClause::Range { bound, value, .. }) => {
                    let mut start = key.clone();
                    let mut end = key;
                    match bound {
                        Bound::Lower => {
                            start.push(value.clone());
                            end.push(high_sentinel());
                        }
                        Bound::Upper => {
                            start.push(low_sentinel());
                            end.push(value.clone());
                        }
                    }
                    KeyState::Range {
                        bound: *bound,
                        start,
                        end,
                    }
                }
                (
                    KeyState::Equal(prefix) | KeyState::Ordered(prefix),
                    FilterClause::Order { direction, .. },
                ) => {
                    descending = *direction == OrderDirection::Descending;
                    KeyState::Ordered(prefix)
                }
                (state @ (KeyState::Ordered(_) | KeyState::Range { .. }), _) => {
                    return Err(PlannerError::clause_order(
                        render_clause(clause),
                        state.name(),
                    ));
                }
            };
        }

        let (key, start_key, end_key) = match state {
            KeyState::Equal(key) if key.is_empty() => (None, None, None),
            KeyState::Equal(key) => (Some(key), None, None),
            KeyState::Ordered(prefix) => {
                let mut low = prefix.clone();
                low.push(low_sentinel());
                let mut high = prefix;
                high.push(high_sentinel());
                if descending {
                    (None, Some(high), Some(low))
                } else {
                    (None, Some(low), Some(high))
                }
            }
            KeyState::Range { start, end, .. } => (None, Some(start), Some(end)),
        };

        Ok(CompiledQuery {
            key,
            start_key,
            end_key,
            descending,
            include_docs: false,
            limit: None,
            reduce: false,
        })
    }

    /// Compiles a snapshot of a query configuration, carrying its flags.
    pub fn compile_config(config: &QueryConfig) -> PlannerResult<CompiledQuery> {
        let mut compiled = Self::compile(&config.clauses)?;
        compiled.include_docs = config.include_docs;
        compiled.limit = config.limit;
        Ok(compiled)
    }
}
