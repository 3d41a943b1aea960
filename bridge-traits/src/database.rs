//! Catalog Store Abstraction
//!
//! Provides the narrow interface the catalog core uses to reach its backing
//! relational store. The core renders SQL text plus a positional list of bound
//! parameters and hands both to a [`CatalogStore`]; the store executes them and
//! returns rows as column-name maps.
//!
//! ## Design Philosophy
//!
//! The catalog core never writes, never caches and never retries. Everything
//! it needs from the store is "run this read query with these parameters", so
//! the trait surface is deliberately small. Retry policy, connection
//! management and deadlines belong to whoever owns the implementation.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::database::{CatalogStore, QueryValue};
//!
//! let rows = store
//!     .query("SELECT t.id FROM tracks t WHERE t.id IN (?, ?)", &[
//!         QueryValue::Integer(1),
//!         QueryValue::Integer(2),
//!     ])
//!     .await?;
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings for a catalog store backed by a pooled database
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database file path or connection string
    pub database_url: String,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,

    /// Statement cache capacity per connection
    pub cache_capacity: usize,
}

impl DatabaseConfig {
    /// Create a new database configuration with the given file path
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        let path = database_path.into();
        Self::from_url(format!("sqlite:{}", path.display()))
    }

    /// Create a configuration from an already formed connection URL
    ///
    /// In-memory URLs are pinned to a single connection: every SQLite
    /// in-memory connection is a separate database.
    pub fn from_url(database_url: impl Into<String>) -> Self {
        let database_url = database_url.into();
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        Self {
            database_url,
            min_connections: 1,
            max_connections,
            acquire_timeout_secs: 30,
            cache_capacity: 100,
        }
    }

    /// Create a configuration for an in-memory database
    pub fn in_memory() -> Self {
        Self::from_url("sqlite::memory:")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

// =============================================================================
// Query Result Types
// =============================================================================

/// Represents a single row from a database query as a map of column names to values
pub type QueryRow = std::collections::HashMap<String, QueryValue>;

/// A bound parameter or a column value: null, integer, real, text, or blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl QueryValue {
    /// Convert to i64 if possible
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            QueryValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert to f64 if possible
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            QueryValue::Real(r) => Some(*r),
            QueryValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Convert to &str if possible
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert to String (owned) if possible
    pub fn as_string(&self) -> Option<String> {
        self.as_str().map(str::to_string)
    }

    /// SQLite has no boolean type; integers stand in for flags
    pub fn as_bool(&self) -> Option<bool> {
        self.as_i64().map(|v| v != 0)
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, QueryValue::Null)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<usize> for QueryValue {
    fn from(value: usize) -> Self {
        QueryValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(QueryValue::Null)
    }
}

// =============================================================================
// Catalog Store Trait
// =============================================================================

/// Read-only query execution against the catalog's relational store
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync`; a single store is shared by every
/// request the transport layer serves.
///
/// ## Error Handling
///
/// Every failure (connection, malformed query, driver decoding) is reported as
/// a [`BridgeError`](crate::error::BridgeError). Implementations must not retry
/// internally and must not return partial row sets on error.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Execute a SQL query and return rows
    ///
    /// # Arguments
    ///
    /// * `query` - SQL query string with `?` placeholders
    /// * `params` - Query parameters (positional)
    ///
    /// # Safety
    ///
    /// Parameters must be bound by the driver. Implementations must never
    /// splice parameter values into the query text.
    async fn query(&self, query: &str, params: &[QueryValue]) -> Result<Vec<QueryRow>>;

    /// Check if the store is reachable
    async fn health_check(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;

    mockall::mock! {
        Store {}

        #[async_trait::async_trait]
        impl CatalogStore for Store {
            async fn query(&self, query: &str, params: &[QueryValue]) -> Result<Vec<QueryRow>>;
            async fn health_check(&self) -> Result<()>;
        }
    }

    #[test]
    fn test_query_value_conversions() {
        let int_val = QueryValue::Integer(42);
        assert_eq!(int_val.as_i64(), Some(42));
        assert_eq!(int_val.as_f64(), Some(42.0));
        assert_eq!(int_val.as_bool(), Some(true));
        assert!(int_val.as_str().is_none());

        let text_val = QueryValue::Text("hello".to_string());
        assert_eq!(text_val.as_str(), Some("hello"));
        assert_eq!(text_val.as_string(), Some("hello".to_string()));
        assert!(text_val.as_i64().is_none());

        let null_val = QueryValue::Null;
        assert!(null_val.is_null());
        assert!(null_val.as_bool().is_none());
    }

    #[test]
    fn test_query_value_from_rust_types() {
        assert_eq!(QueryValue::from(7_i64), QueryValue::Integer(7));
        assert_eq!(QueryValue::from(3_usize), QueryValue::Integer(3));
        assert_eq!(QueryValue::from("rock"), QueryValue::Text("rock".into()));
        assert_eq!(QueryValue::from(None::<i64>), QueryValue::Null);
        assert_eq!(QueryValue::from(Some(5_i64)), QueryValue::Integer(5));
    }

    #[test]
    fn test_database_config_in_memory_uses_single_connection() {
        let config = DatabaseConfig::in_memory();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.acquire_timeout_secs, 30);
        assert_eq!(config.cache_capacity, 100);
    }

    #[test]
    fn test_database_config_from_path() {
        let config = DatabaseConfig::new("catalog.db");
        assert_eq!(config.database_url, "sqlite:catalog.db");
        assert_eq!(config.max_connections, 5);
    }

    #[tokio::test]
    async fn test_store_errors_surface_unchanged() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .returning(|_, _| Err(BridgeError::DatabaseError("connection reset".into())));

        let err = store.query("SELECT 1", &[]).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
