//! SQLite Catalog Store
//!
//! Implements [`CatalogStore`] on a `sqlx` SQLite pool. Rows are decoded
//! column by column into [`QueryValue`]s using the value's storage class, so
//! computed columns (aggregates, `EXISTS` flags) decode the same way as table
//! columns.

use crate::db;
use async_trait::async_trait;
use bridge_traits::database::{CatalogStore, DatabaseConfig, QueryRow, QueryValue};
use bridge_traits::error::{BridgeError, Result};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, warn};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// [`CatalogStore`] over a shared SQLite pool
#[derive(Clone)]
pub struct SqliteAdapter {
    pool: SqlitePool,
}

impl SqliteAdapter {
    /// Open the database described by `config`, migrating it if needed.
    pub async fn connect(config: &DatabaseConfig) -> crate::Result<Self> {
        let pool = db::create_pool(config).await?;
        Ok(Self { pool })
    }

    /// Wrap a pool that is already open and migrated.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn row_to_query_row(row: &SqliteRow) -> QueryRow {
        let mut result = HashMap::with_capacity(row.len());

        for column in row.columns() {
            let ordinal = column.ordinal();
            let value = if let Ok(v) = row.try_get::<Option<i64>, _>(ordinal) {
                v.map(QueryValue::Integer).unwrap_or(QueryValue::Null)
            } else if let Ok(v) = row.try_get::<Option<f64>, _>(ordinal) {
                v.map(QueryValue::Real).unwrap_or(QueryValue::Null)
            } else if let Ok(v) = row.try_get::<Option<String>, _>(ordinal) {
                v.map(QueryValue::Text).unwrap_or(QueryValue::Null)
            } else if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(ordinal) {
                v.map(QueryValue::Blob).unwrap_or(QueryValue::Null)
            } else {
                QueryValue::Null
            };

            result.insert(column.name().to_string(), value);
        }

        result
    }

    fn bind_params<'q>(mut query: SqliteQuery<'q>, params: &'q [QueryValue]) -> SqliteQuery<'q> {
        for param in params {
            query = match param {
                QueryValue::Null => query.bind(None::<i64>),
                QueryValue::Integer(i) => query.bind(*i),
                QueryValue::Real(r) => query.bind(*r),
                QueryValue::Text(s) => query.bind(s.as_str()),
                QueryValue::Blob(b) => query.bind(b.as_slice()),
            };
        }
        query
    }
}

#[async_trait]
impl CatalogStore for SqliteAdapter {
    async fn query(&self, query: &str, params: &[QueryValue]) -> Result<Vec<QueryRow>> {
        // Parameter values are never logged; they may carry user search text.
        debug!(query = %query, param_count = params.len(), "Executing catalog query");

        let rows = Self::bind_params(sqlx::query(query), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Catalog query failed");
                BridgeError::DatabaseError(format!("Query failed: {}", e))
            })?;

        let result: Vec<QueryRow> = rows.iter().map(Self::row_to_query_row).collect();

        debug!(row_count = result.len(), "Catalog query completed");
        Ok(result)
    }

    async fn health_check(&self) -> Result<()> {
        db::health_check(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(e.to_string()))
    }
}
