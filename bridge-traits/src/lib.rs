//! # Host Bridge Traits
//!
//! Collaborator contracts the catalog core depends on but does not implement
//! itself.
//!
//! ## Overview
//!
//! The catalog core only needs one capability from its host: a store that
//! executes rendered read queries with bound parameters. That contract lives
//! here so the core can be exercised against mocks in tests and against the
//! native SQLite adapter in production.
//!
//! ## Traits
//!
//! - [`CatalogStore`](database::CatalogStore) - Parameterised read queries
//!   against the catalog's relational store
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Store
//! implementations should:
//!
//! - Convert driver-specific errors to `BridgeError::DatabaseError`
//! - Provide actionable error messages
//! - Never retry or partially mask a failure
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so one implementation can be
//! shared across concurrent requests.

pub mod database;
pub mod error;

pub use database::{CatalogStore, DatabaseConfig, QueryRow, QueryValue};
pub use error::BridgeError;
