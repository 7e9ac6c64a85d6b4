//! In-memory document store for testing
//!
//! Emulates the three endpoints the materialization protocol uses, with
//! revision-checked writes. A view "exists" when the stored design document
//! holds an entry under its name; its rows are whatever was seeded for that
//! name, sorted by key collation and selected by `key` or `startkey`/`endkey`
//! the way a view would. Conflicts and concurrent writers can be injected, and
//! every request is recorded for assertions.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::collation::collate;
use super::errors::StoreResult;
use super::{DocumentStore, StoreResponse};
use crate::index::DesignDocument;
use crate::wire::{parse_query_string, ErrorBody};

type Mutation = Box<dyn FnOnce(&mut Value) + Send>;

/// A request received by the memory store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    QueryView { path: String, query: String },
    GetDocument { id: String },
    PutDocument { id: String, status: u16 },
}

#[derive(Default)]
struct Inner {
    documents: HashMap<String, Value>,
    rows: HashMap<String, Vec<Value>>,
    forced_conflicts: u32,
    pending_writers: VecDeque<(String, Mutation)>,
    requests: Vec<RecordedRequest>,
    revisions: u64,
}

impl Inner {
    fn next_rev(&mut self, previous: Option<&str>) -> String {
        let generation = previous
            .and_then(|r| r.split_once('-'))
            .and_then(|(g, _)| g.parse::<u64>().ok())
            .unwrap_or(0);
        self.revisions += 1;
        format!("{}-{:032x}", generation + 1, self.revisions)
    }

    fn current_rev(&self, id: &str) -> Option<String> {
        self.documents
            .get(id)
            .and_then(|d| d.get("_rev"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Stores a document under a fresh revision, returning the revision
    fn store(&mut self, id: &str, mut doc: Value) -> String {
        let previous = self.current_rev(id);
        let rev = self.next_rev(previous.as_deref());
        if let Some(obj) = doc.as_object_mut() {
            obj.insert("_id".into(), json!(id));
            obj.insert("_rev".into(), json!(rev));
        }
        self.documents.insert(id.to_string(), doc);
        rev
    }

    /// Applies a queued concurrent writer for `id`, if any
    fn run_pending_writer(&mut self, id: &str) {
        let Some(pos) = self.pending_writers.iter().position(|(target, _)| target == id) else {
            return;
        };
        let Some((_, mutate)) = self.pending_writers.remove(pos) else {
            return;
        };

        let mut doc = self
            .documents
            .get(id)
            .cloned()
            .unwrap_or_else(|| json!({}));
        mutate(&mut doc);
        self.store(id, doc);
    }

    fn view_exists(&self, design_id: &str, name: &str) -> bool {
        self.documents
            .get(design_id)
            .and_then(|d| d.get("views"))
            .and_then(|v| v.get(name))
            .is_some()
    }
}

fn row_key(row: &Value) -> &Value {
    row.get("key").unwrap_or(&Value::Null)
}

fn parse_key(name: &str, raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid {}: {}", name, e))
}

/// Row selection parsed from a view query string
#[derive(Debug, Default)]
struct KeyRange {
    key: Option<Value>,
    start_key: Option<Value>,
    end_key: Option<Value>,
    descending: bool,
    limit: Option<usize>,
}

impl KeyRange {
    fn from_query(query: &str) -> Result<Self, String> {
        let mut range = Self::default();
        let params = parse_query_string(query).map_err(|e| e.to_string())?;
        for (param, value) in &params {
            match param.as_str() {
                "key" => range.key = Some(parse_key(param, value)?),
                "startkey" => range.start_key = Some(parse_key(param, value)?),
                "endkey" => range.end_key = Some(parse_key(param, value)?),
                "descending" => range.descending = value == "true",
                "limit" => {
                    range.limit = Some(
                        value
                            .parse()
                            .map_err(|_| format!("invalid limit: {:?}", value))?,
                    )
                }
                _ => {}
            }
        }

        if let (Some(start), Some(end)) = (&range.start_key, &range.end_key) {
            let expected = if range.descending {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            if collate(start, end) == expected {
                return Err(format!(
                    "No rows can match your key range, reverse your start_key and end_key or set descending={}",
                    !range.descending
                ));
            }
        }
        Ok(range)
    }

    fn contains(&self, key: &Value) -> bool {
        if let Some(exact) = &self.key {
            return collate(key, exact) == Ordering::Equal;
        }

        let (low, high) = if self.descending {
            (&self.end_key, &self.start_key)
        } else {
            (&self.start_key, &self.end_key)
        };
        low.as_ref().map_or(true, |l| collate(key, l) != Ordering::Less)
            && high.as_ref().map_or(true, |h| collate(key, h) != Ordering::Greater)
    }
}

/// In-memory [`DocumentStore`]
///
/// Clones share state, so a test can keep a handle while the query runs.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryStore")
            .field("document_count", &inner.documents.len())
            .field("request_count", &inner.requests.len())
            .finish()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a document directly, bypassing revision checks
    pub fn insert_document(&self, id: &str, doc: Value) -> String {
        self.inner.lock().store(id, doc)
    }

    /// Returns a stored document
    pub fn document(&self, id: &str) -> Option<Value> {
        self.inner.lock().documents.get(id).cloned()
    }

    /// Returns a stored design document
    pub fn design_document(&self, id: &str) -> Option<DesignDocument> {
        self.document(id)
            .and_then(|doc| serde_json::from_value(doc).ok())
    }

    /// Sets the rows a view returns once it exists
    pub fn seed_rows(&self, view_name: &str, rows: Vec<Value>) {
        self.inner.lock().rows.insert(view_name.to_string(), rows);
    }

    /// Answers the next `count` writes with 409 regardless of revision
    pub fn force_conflicts(&self, count: u32) {
        self.inner.lock().forced_conflicts = count;
    }

    /// Lets another writer update `id` right before the next write to it,
    /// making that write's revision stale.
    pub fn inject_concurrent_update<F>(&self, id: &str, mutate: F)
    where
        F: FnOnce(&mut Value) + Send + 'static,
    {
        self.inner
            .lock()
            .pending_writers
            .push_back((id.to_string(), Box::new(mutate)));
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().requests.clone()
    }

    /// Number of document writes attempted
    pub fn put_count(&self) -> usize {
        self.inner
            .lock()
            .requests
            .iter()
            .filter(|r| matches!(r, RecordedRequest::PutDocument { .. }))
            .count()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query_view(&self, path: &str, query: &str) -> StoreResult<StoreResponse> {
        let mut inner = self.inner.lock();
        inner.requests.push(RecordedRequest::QueryView {
            path: path.to_string(),
            query: query.to_string(),
        });

        let Some((design_id, encoded_name)) = path.rsplit_once("/_view/") else {
            return Ok(StoreResponse::new(
                400,
                json!({"error": "bad_request", "reason": "not a view path"}),
            ));
        };
        let name = urlencoding::decode(encoded_name)
            .map(|n| n.into_owned())
            .unwrap_or_else(|_| encoded_name.to_string());

        if !inner.view_exists(design_id, &name) {
            let reason = if inner.documents.contains_key(design_id) {
                "missing_named_view"
            } else {
                "missing"
            };
            return Ok(StoreResponse::new(404, json!(ErrorBody::not_found(reason))));
        }

        let mut rows = inner.rows.get(&name).cloned().unwrap_or_default();
        rows.sort_by(|a, b| collate(row_key(a), row_key(b)));
        let total_rows = rows.len();

        let range = match KeyRange::from_query(query) {
            Ok(range) => range,
            Err(reason) => {
                return Ok(StoreResponse::new(
                    400,
                    json!({"error": "query_parse_error", "reason": reason}),
                ))
            }
        };
        rows.retain(|row| range.contains(row_key(row)));
        if range.descending {
            rows.reverse();
        }
        if let Some(limit) = range.limit {
            rows.truncate(limit);
        }

        Ok(StoreResponse::new(
            200,
            json!({"total_rows": total_rows, "offset": 0, "rows": rows}),
        ))
    }

    async fn get_document(&self, id: &str) -> StoreResult<StoreResponse> {
        let mut inner = self.inner.lock();
        inner.requests.push(RecordedRequest::GetDocument { id: id.to_string() });

        Ok(match inner.documents.get(id) {
            Some(doc) => StoreResponse::new(200, doc.clone()),
            None => StoreResponse::new(404, json!(ErrorBody::not_found("missing"))),
        })
    }

    async fn put_document(&self, id: &str, body: &Value) -> StoreResult<StoreResponse> {
        let mut inner = self.inner.lock();
        inner.run_pending_writer(id);

        let sent_rev = body.get("_rev").and_then(Value::as_str).map(str::to_string);
        let conflict = if inner.forced_conflicts > 0 {
            inner.forced_conflicts -= 1;
            true
        } else {
            sent_rev != inner.current_rev(id)
        };

        let response = if conflict {
            StoreResponse::new(409, json!(ErrorBody::conflict()))
        } else {
            let rev = inner.store(id, body.clone());
            StoreResponse::new(201, json!({"ok": true, "id": id, "rev": rev}))
        };

        inner.requests.push(RecordedRequest::PutDocument {
            id: id.to_string(),
            status: response.status,
        });
        Ok(response)
    }
}
