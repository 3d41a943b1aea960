//! # Catalog Core
//!
//! The read side of a music-streaming catalog: composes filter-driven
//! queries, samples random tracks, albums and artists, aggregates two-tier
//! search results and redacts fields the caller may not see.
//!
//! ## Overview
//!
//! - [`projection`] / [`filter`] / [`query`]: SQL building blocks and the
//!   composer that assembles them, with every value bound
//! - [`sampler`]: bounded-pool random sampling
//! - [`search`]: exact-term then partial-match search with de-duplication
//! - [`redact`]: access redaction and artwork URL resolution
//! - [`service`]: the public operations, wired to a [`CatalogStore`]
//! - [`adapters`] / [`db`]: the SQLite store, pool and migrations
//!
//! [`CatalogStore`]: bridge_traits::database::CatalogStore

pub mod adapters;
pub mod db;
pub mod error;
pub mod filter;
pub mod models;
pub mod projection;
pub mod query;
pub mod redact;
mod rows;
pub mod sampler;
pub mod search;
pub mod service;

#[cfg(test)]
mod test_support;

pub use adapters::SqliteAdapter;
pub use error::{CatalogError, Result};
pub use filter::{DistinctStrategy, FilterClause};
pub use models::{Album, AlbumRef, Artist, ArtistRef, CallerContext, SearchResult, Track};
pub use redact::{ArtworkResolver, Redact};
pub use sampler::{RandomSampler, SamplerSettings};
pub use search::{SearchAggregator, SearchLimits};
pub use service::{CatalogService, CatalogSettings};
