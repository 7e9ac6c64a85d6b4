//! viewquery - fluent range queries over document-database views
//!
//! A query is a document type plus an ordered list of clauses: equality
//! conditions, at most one range bound, and optional ordering. The clauses
//! compile into the `key` or `startkey`/`endkey` parameters of a view, and
//! the view itself is created in the shared design document the first time
//! a query needs it.
//!
//! # Subsystems
//!
//! - [`planner`]: clause parsing and the range compiler (pure)
//! - [`index`]: view naming, definitions, design documents, materialization
//! - [`wire`]: query strings and response bodies
//! - [`store`]: the transport seam, an HTTP client and an in-memory store
//! - [`observability`]: lifecycle events and tracing setup
//!
//! Entry point: [`QueryBuilder`].

pub mod errors;
pub mod index;
pub mod observability;
pub mod planner;
pub mod query;
pub mod store;
pub mod wire;

pub use errors::{QueryError, QueryResult};
pub use query::QueryBuilder;
pub use store::{DocumentStore, HttpStore, MemoryStore, StoreConfig, ViewConfig};
pub use wire::{ViewResponse, ViewRow};
