//! View index subsystem
//!
//! Names views after the shape of the query that needs them, synthesizes
//! their definitions, and installs them into the shared design document on
//! first use.
//!
//! # Invariants
//!
//! - Same document type and clause fields → same view name
//! - A design document write always carries the revision it was read at
//! - Install retries happen only on revision conflicts, and are bounded

mod definition;
mod design;
mod materializer;
mod naming;

pub use definition::{IndexDefinition, ReduceFunction, ViewShape};
pub use design::DesignDocument;
pub use materializer::{IndexMaterializer, ViewRequest};
pub use naming::{derive_index_name, INDEX_PREFIX, NAME_SEPARATOR};
