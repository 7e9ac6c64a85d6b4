//! Fluent query builder
//!
//! ```ignore
//! let rows = QueryBuilder::new("Page", &ViewConfig::default())?
//!     .filter("type ==", json!("Page"))?
//!     .filter("created_at <=", json!("2024-01-01"))?
//!     .with_documents()
//!     .with_limit(20)
//!     .fetch(&store)
//!     .await?;
//! ```
//!
//! Each `filter`/`order` call re-compiles the clause list, so an invalid
//! sequence is rejected where it is written, before anything is sent.

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{QueryError, QueryResult};
use crate::index::{derive_index_name, IndexMaterializer, ViewRequest, ViewShape};
use crate::observability::{record, Event};
use crate::planner::{
    parse_condition, parse_order, CompiledQuery, ExplainPlan, FilterClause, PlannerError,
    PlannerResult, QueryConfig, RangeCompiler,
};
use crate::store::{validate_design_document, DocumentStore, ViewConfig};
use crate::wire::{build, build_query_string, view_path, ViewResponse};

/// Builds and runs one view query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    config: QueryConfig,
    retry_budget: u32,
}

impl QueryBuilder {
    /// Starts a query over documents of `document_type`.
    pub fn new(document_type: impl Into<String>, view_config: &ViewConfig) -> PlannerResult<Self> {
        let document_type = document_type.into();
        if document_type.is_empty() {
            return Err(PlannerError::document_type_required());
        }

        let mut config = QueryConfig::new(document_type, view_config.design_document.clone());
        config.include_docs = view_config.include_docs;

        Ok(Self {
            config,
            retry_budget: view_config.retry_budget,
        })
    }

    /// Adds an equality or range condition such as `"created_at <="`.
    pub fn filter(self, condition: &str, value: impl Into<Value>) -> PlannerResult<Self> {
        let clause = parse_condition(condition, value.into())?;
        self.push(clause)
    }

    /// Adds an order instruction: `"-field"` descending, `"field"` or `"+field"` ascending.
    pub fn order(self, instruction: &str) -> PlannerResult<Self> {
        let clause = parse_order(instruction)?;
        self.push(clause)
    }

    /// Adds an already-built clause, validating the sequence.
    pub fn clause(self, clause: FilterClause) -> PlannerResult<Self> {
        self.push(clause)
    }

    fn push(mut self, clause: FilterClause) -> PlannerResult<Self> {
        self.config.clauses.push(clause);
        RangeCompiler::compile(&self.config.clauses)?;
        Ok(self)
    }

    /// Rows carry their source documents
    pub fn with_documents(mut self) -> Self {
        self.config.include_docs = true;
        self
    }

    pub fn without_documents(mut self) -> Self {
        self.config.include_docs = false;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.config.limit = Some(limit);
        self
    }

    pub fn without_limit(mut self) -> Self {
        self.config.limit = None;
        self
    }

    /// The query configuration built so far
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Name of the view this query reads
    pub fn index_name(&self) -> String {
        derive_index_name(&self.config.document_type, &self.config.fields())
    }

    pub fn compile(&self) -> PlannerResult<CompiledQuery> {
        RangeCompiler::compile_config(&self.config)
    }

    /// Relative view URL: `{design}/_view/{name}?{query}`
    pub fn url(&self) -> PlannerResult<String> {
        let compiled = self.compile()?;
        Ok(build(
            &self.config.index_container_id,
            &self.index_name(),
            &compiled,
        ))
    }

    /// Describes what the query compiles to without running it
    pub fn explain(&self) -> ExplainPlan {
        let index_name = self.index_name();
        match self.compile() {
            Ok(compiled) => ExplainPlan::from_compiled(
                &self.config,
                &index_name,
                &view_path(&self.config.index_container_id, &index_name),
                &compiled,
                &build_query_string(&compiled),
            ),
            Err(e) => ExplainPlan::from_error(&self.config, &index_name, &e),
        }
    }

    fn view_request(&self) -> PlannerResult<ViewRequest> {
        let compiled = self.compile()?;
        let index_name = self.index_name();
        Ok(ViewRequest {
            view_path: view_path(&self.config.index_container_id, &index_name),
            query_string: build_query_string(&compiled),
            shape: ViewShape::new(
                self.config.document_type.clone(),
                self.config.fields(),
                self.config.include_docs,
            ),
            index_name,
        })
    }

    /// Runs the query, creating its view first if the store lacks it.
    pub async fn fetch<S>(&self, store: &S) -> QueryResult<ViewResponse>
    where
        S: DocumentStore + ?Sized,
    {
        validate_design_document(&self.config.index_container_id)?;
        let request = self.view_request()?;
        let result = IndexMaterializer::new(
            store,
            &self.config.index_container_id,
            self.retry_budget,
        )
        .run(&request)
        .await;

        match &result {
            Ok(rows) => {
                record(Event::QueryComplete, &request.index_name);
                info!(index = %request.index_name, rows = rows.len(), "query complete");
            }
            Err(e) => {
                record(Event::QueryFailed, &request.index_name);
                warn!(index = %request.index_name, code = e.code(), error = %e, "query failed");
            }
        }
        result
    }

    /// Runs the query and hands the outcome to `callback`, exactly once.
    pub async fn execute<S, F>(&self, store: &S, callback: F)
    where
        S: DocumentStore + ?Sized,
        F: FnOnce(Result<ViewResponse, QueryError>),
    {
        callback(self.fetch(store).await);
    }
}
