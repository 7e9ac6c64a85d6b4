//! HTTP document store client
//!
//! Talks to a CouchDB-compatible server under `{base_url}/{database}/`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use super::config::{StoreConfig, DESIGN_PREFIX};
use super::errors::{StoreError, StoreResult};
use super::{DocumentStore, StoreResponse};

/// [`DocumentStore`] backed by `reqwest`
#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    config: StoreConfig,
    database_url: String,
}

impl std::fmt::Debug for HttpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStore")
            .field("database_url", &self.database_url)
            .finish_non_exhaustive()
    }
}

impl HttpStore {
    /// Create a client for the configured database
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::invalid_config(format!("failed to build HTTP client: {}", e)))?;

        let database_url = config.database_url();
        Ok(Self {
            client,
            config,
            database_url,
        })
    }

    /// URL of a document. Design document ids keep their `_design/` slash.
    fn document_url(&self, id: &str) -> String {
        match id.strip_prefix(DESIGN_PREFIX) {
            Some(name) => format!(
                "{}/{}{}",
                self.database_url,
                DESIGN_PREFIX,
                urlencoding::encode(name)
            ),
            None => format!("{}/{}", self.database_url, urlencoding::encode(id)),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.username {
            Some(user) => request.basic_auth(user, self.config.password.as_deref()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<StoreResponse> {
        let response = self.authorize(request).send().await?;
        read_response(response).await
    }
}

async fn read_response(response: Response) -> StoreResult<StoreResponse> {
    let status = response.status().as_u16();
    let text = response.text().await?;

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) if (200..300).contains(&status) => return Err(StoreError::Decode(e)),
            Err(_) => Value::String(text),
        }
    };

    Ok(StoreResponse::new(status, body))
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn query_view(&self, path: &str, query: &str) -> StoreResult<StoreResponse> {
        let url = if query.is_empty() {
            format!("{}/{}", self.database_url, path)
        } else {
            format!("{}/{}?{}", self.database_url, path, query)
        };
        debug!(%url, "GET view");
        self.send(self.client.get(&url)).await
    }

    async fn get_document(&self, id: &str) -> StoreResult<StoreResponse> {
        let url = self.document_url(id);
        debug!(%url, "GET document");
        self.send(self.client.get(&url)).await
    }

    async fn put_document(&self, id: &str, body: &Value) -> StoreResult<StoreResponse> {
        let url = self.document_url(id);
        debug!(%url, "PUT document");
        self.send(self.client.put(&url).json(body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_urls() {
        let store = HttpStore::new(StoreConfig::new("http://127.0.0.1:5984/", "pages")).unwrap();
        assert_eq!(
            store.document_url("_design/example"),
            "http://127.0.0.1:5984/pages/_design/example"
        );
        assert_eq!(
            store.document_url("Page/1"),
            "http://127.0.0.1:5984/pages/Page%2F1"
        );
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(HttpStore::new(StoreConfig::new("", "pages")).is_err());
    }
}
