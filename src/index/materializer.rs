//! On-demand view materialization
//!
//! Runs one view query to completion, installing the view first if the store
//! reports it missing:
//!
//! ```text
//! Querying ──200──▶ Found
//!    │404 not_found
//!    ▼
//! Missing ─▶ Defining ─▶ Installing ──201──▶ Reconciling ──200──▶ Found
//!               ▲            │409
//!               └────────────┘ (while budget remains, else Exhausted)
//! ```
//!
//! Every conflict re-reads the design document, so concurrent writers of the
//! same view converge on a single merged definition. The three store calls of
//! one run are strictly sequential.

use serde_json::Value;
use tracing::debug;

use super::definition::{IndexDefinition, ViewShape};
use super::design::DesignDocument;
use crate::errors::{QueryError, QueryResult};
use crate::observability::{record, Event};
use crate::store::{DocumentStore, StoreResponse};
use crate::wire::{ErrorBody, ViewResponse};

/// Everything needed to query, and if necessary install, one view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRequest {
    /// Derived view name
    pub index_name: String,
    /// `{design}/_view/{name}`
    pub view_path: String,
    /// Encoded query string, no leading `?`
    pub query_string: String,
    /// What the view indexes, used only if it must be created
    pub shape: ViewShape,
}

impl ViewRequest {
    /// Relative URL used in errors and logs
    pub fn url(&self) -> String {
        format!("{}?{}", self.view_path, self.query_string)
    }
}

/// Protocol states that still have work to do
#[derive(Debug)]
enum Phase {
    Querying,
    Missing,
    Defining {
        definition: IndexDefinition,
        remaining: u32,
    },
    Installing {
        document: DesignDocument,
        definition: IndexDefinition,
        remaining: u32,
    },
    Reconciling,
}

/// Drives a [`ViewRequest`] through the materialization protocol
pub struct IndexMaterializer<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    design_document_id: &'a str,
    retry_budget: u32,
}

impl<'a, S: DocumentStore + ?Sized> IndexMaterializer<'a, S> {
    pub fn new(store: &'a S, design_document_id: &'a str, retry_budget: u32) -> Self {
        Self {
            store,
            design_document_id,
            retry_budget,
        }
    }

    /// Runs the protocol to a terminal state.
    pub async fn run(&self, request: &ViewRequest) -> QueryResult<ViewResponse> {
        let index = request.index_name.as_str();
        let mut phase = Phase::Querying;

        loop {
            debug!(index, phase = phase_name(&phase), "materializer step");

            phase = match phase {
                Phase::Querying => {
                    record(Event::ViewQuery, index);
                    let resp = self.query(request).await?;
                    match resp.status {
                        200 => return decode_rows(request, resp.body),
                        404 if ErrorBody::is_not_found(&resp.body) => Phase::Missing,
                        status => {
                            return Err(QueryError::QueryFailed {
                                url: request.url(),
                                status,
                                body: resp.body,
                            })
                        }
                    }
                }

                Phase::Missing => {
                    record(Event::ViewMissing, index);
                    let definition = IndexDefinition::synthesize(index, &request.shape);
                    record(Event::IndexDefined, index);
                    Phase::Defining {
                        definition,
                        remaining: self.retry_budget,
                    }
                }

                Phase::Defining {
                    definition,
                    remaining,
                } => {
                    if remaining == 0 {
                        record(Event::IndexInstallExhausted, index);
                        return Err(QueryError::IndexCreationExhausted {
                            index: index.to_string(),
                            attempts: self.retry_budget,
                        });
                    }

                    let mut document = self.fetch_design_document(index).await?;
                    if document.has_definition(&definition) {
                        record(Event::IndexAlreadyPresent, index);
                        Phase::Reconciling
                    } else {
                        document.set_view(&definition);
                        Phase::Installing {
                            document,
                            definition,
                            remaining,
                        }
                    }
                }

                Phase::Installing {
                    document,
                    definition,
                    remaining,
                } => {
                    let body = serde_json::to_value(&document).map_err(crate::store::StoreError::from)?;
                    let resp = self.store.put_document(&document.id, &body).await?;
                    match resp.status {
                        201 | 202 => {
                            record(Event::IndexInstalled, index);
                            Phase::Reconciling
                        }
                        409 => {
                            record(Event::IndexInstallConflict, index);
                            debug!(index, remaining = remaining - 1, "retrying design document write");
                            Phase::Defining {
                                definition,
                                remaining: remaining - 1,
                            }
                        }
                        status => {
                            return Err(QueryError::IndexInstallFailed {
                                index: index.to_string(),
                                status,
                                body: resp.body,
                            })
                        }
                    }
                }

                Phase::Reconciling => {
                    let resp = self.query(request).await?;
                    if resp.status == 200 {
                        record(Event::ViewReconciled, index);
                        return decode_rows(request, resp.body);
                    }
                    return Err(QueryError::PostInstallQueryFailed {
                        url: request.url(),
                        status: resp.status,
                        body: resp.body,
                    });
                }
            };
        }
    }

    async fn query(&self, request: &ViewRequest) -> QueryResult<StoreResponse> {
        Ok(self
            .store
            .query_view(&request.view_path, &request.query_string)
            .await?)
    }

    /// Latest design document, or an empty one if it does not exist yet
    async fn fetch_design_document(&self, index: &str) -> QueryResult<DesignDocument> {
        let resp = self.store.get_document(self.design_document_id).await?;
        match resp.status {
            200 => serde_json::from_value(resp.body.clone()).map_err(|_| {
                QueryError::IndexInstallFailed {
                    index: index.to_string(),
                    status: resp.status,
                    body: resp.body,
                }
            }),
            404 => Ok(DesignDocument::new(self.design_document_id)),
            status => Err(QueryError::IndexInstallFailed {
                index: index.to_string(),
                status,
                body: resp.body,
            }),
        }
    }
}

fn phase_name(phase: &Phase) -> &'static str {
    match phase {
        Phase::Querying => "querying",
        Phase::Missing => "missing",
        Phase::Defining { .. } => "defining",
        Phase::Installing { .. } => "installing",
        Phase::Reconciling => "reconciling",
    }
}

fn decode_rows(request: &ViewRequest, body: Value) -> QueryResult<ViewResponse> {
    serde_json::from_value(body).map_err(|e| QueryError::InvalidResponse {
        url: request.url(),
        reason: e.to_string(),
    })
}
