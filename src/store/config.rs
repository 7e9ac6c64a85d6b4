//! Store and view configuration
//!
//! Both configurations are plain values handed to constructors. Missing
//! fields fall back to the defaults below when deserialized.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};

/// Prefix every design document id carries
pub const DESIGN_PREFIX: &str = "_design/";

/// View placement and materialization settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Design document that receives generated views (default: "_design/example")
    #[serde(default = "default_design_document")]
    pub design_document: String,

    /// Install attempts allowed on revision conflicts (default: 5)
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,

    /// Attach documents to rows unless the query says otherwise (default: false)
    #[serde(default)]
    pub include_docs: bool,
}

fn default_design_document() -> String {
    "_design/example".to_string()
}

fn default_retry_budget() -> u32 {
    5
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            design_document: default_design_document(),
            retry_budget: default_retry_budget(),
            include_docs: false,
        }
    }
}

impl ViewConfig {
    /// Create a config targeting the given design document
    pub fn with_design_document(design_document: impl Into<String>) -> Self {
        Self {
            design_document: design_document.into(),
            ..Default::default()
        }
    }

    /// Set the conflict retry budget
    pub fn retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    pub fn validate(&self) -> StoreResult<()> {
        validate_design_document(&self.design_document)
    }
}

/// Rejects ids that are not of the form `_design/<name>`
pub fn validate_design_document(id: &str) -> StoreResult<()> {
    if !id.starts_with(DESIGN_PREFIX) || id.len() == DESIGN_PREFIX.len() {
        return Err(StoreError::invalid_config(format!(
            "design document id must look like \"{}<name>\", got {:?}",
            DESIGN_PREFIX, id
        )));
    }
    Ok(())
}

/// Connection settings for an HTTP document store
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Server root, e.g. "http://127.0.0.1:5984"
    pub base_url: String,

    /// Database name
    pub database: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl StoreConfig {
    pub fn new(base_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            database: database.into(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Use HTTP basic authentication
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Reads `VIEWQUERY_URL`, `VIEWQUERY_DATABASE` and the optional
    /// `VIEWQUERY_USERNAME`, `VIEWQUERY_PASSWORD`, `VIEWQUERY_TIMEOUT_SECS`.
    pub fn from_env() -> StoreResult<Self> {
        let required = |name: &str| {
            env::var(name).map_err(|_| StoreError::invalid_config(format!("{} is not set", name)))
        };

        let mut config = Self::new(required("VIEWQUERY_URL")?, required("VIEWQUERY_DATABASE")?);
        config.username = env::var("VIEWQUERY_USERNAME").ok();
        config.password = env::var("VIEWQUERY_PASSWORD").ok();
        if let Ok(raw) = env::var("VIEWQUERY_TIMEOUT_SECS") {
            config.timeout_secs = raw.parse().map_err(|_| {
                StoreError::invalid_config(format!("VIEWQUERY_TIMEOUT_SECS is not a number: {:?}", raw))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(StoreError::invalid_config("base_url is empty"));
        }
        if self.database.trim().is_empty() {
            return Err(StoreError::invalid_config("database is empty"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Database root URL without a trailing slash
    pub fn database_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.database)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view_config() {
        let config = ViewConfig::default();
        assert_eq!(config.design_document, "_design/example");
        assert_eq!(config.retry_budget, 5);
        assert!(!config.include_docs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_view_config_from_partial_json() {
        let config: ViewConfig = serde_json::from_str(r#"{"retry_budget": 2}"#).unwrap();
        assert_eq!(config.design_document, "_design/example");
        assert_eq!(config.retry_budget, 2);
    }

    #[test]
    fn test_invalid_design_document() {
        assert!(ViewConfig::with_design_document("example").validate().is_err());
        assert!(ViewConfig::with_design_document("_design/").validate().is_err());
        assert!(ViewConfig::with_design_document("").validate().is_err());
    }

    #[test]
    fn test_database_url() {
        let config = StoreConfig::new("http://127.0.0.1:5984/", "my db");
        assert_eq!(config.database_url(), "http://127.0.0.1:5984/my%20db");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_store_config_validation() {
        assert!(StoreConfig::new("", "db").validate().is_err());
        assert!(StoreConfig::new("http://x", " ").validate().is_err());
        assert!(StoreConfig::new("http://x", "db").validate().is_ok());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = StoreConfig::new("http://x", "db").with_credentials("admin", "s3cret");
        assert!(!format!("{:?}", config).contains("s3cret"));
    }
}
