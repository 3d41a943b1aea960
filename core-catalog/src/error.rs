use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Any store-level failure: connection, malformed query, or a row that
    /// does not decode into the expected shape.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl From<BridgeError> for CatalogError {
    fn from(err: BridgeError) -> Self {
        CatalogError::CatalogUnavailable(err.to_string())
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        CatalogError::CatalogUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
