//! Document store clients
//!
//! The materialization protocol talks to three endpoints of the store:
//!
//! - `GET {design}/_view/{name}?{query}` (view query)
//! - `GET {design}` (design document fetch)
//! - `PUT {design}` (design document write, guarded by `_rev`)
//!
//! [`DocumentStore`] is the seam for those calls. It returns raw status and
//! JSON body so the protocol, not the transport, decides what a status means.
//! Timeouts belong to the implementation.

mod collation;
mod config;
mod errors;
mod http;
mod memory;

pub use collation::collate;
pub use config::{validate_design_document, StoreConfig, ViewConfig, DESIGN_PREFIX};
pub use errors::{StoreError, StoreResult};
pub use http::HttpStore;
pub use memory::{MemoryStore, RecordedRequest};

use async_trait::async_trait;
use serde_json::Value;

/// Status and decoded body of one store response
#[derive(Debug, Clone, PartialEq)]
pub struct StoreResponse {
    pub status: u16,
    pub body: Value,
}

impl StoreResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used by the materialization protocol
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Query a view. `path` is `{design}/_view/{name}`; `query` has no leading `?`.
    async fn query_view(&self, path: &str, query: &str) -> StoreResult<StoreResponse>;

    /// Fetch a document by id
    async fn get_document(&self, id: &str) -> StoreResult<StoreResponse>;

    /// Write a whole document; the body carries its `_rev` when updating
    async fn put_document(&self, id: &str, body: &Value) -> StoreResult<StoreResponse>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    async fn query_view(&self, path: &str, query: &str) -> StoreResult<StoreResponse> {
        (**self).query_view(path, query).await
    }

    async fn get_document(&self, id: &str) -> StoreResult<StoreResponse> {
        (**self).get_document(id).await
    }

    async fn put_document(&self, id: &str, body: &Value) -> StoreResult<StoreResponse> {
        (**self).put_document(id, body).await
    }
}
