//! # Catalog Configuration Module
//!
//! Provides the startup configuration for the catalog core.
//!
//! ## Overview
//!
//! The configuration is assembled exactly once, either through the builder or
//! from environment variables, validated eagerly, and then passed by reference
//! to whatever constructs the catalog service. Components only ever see the
//! handful of values they need as explicit parameters.
//!
//! ## Usage
//!
//! ### Builder
//!
//! ```
//! use core_runtime::config::CatalogConfig;
//!
//! let config = CatalogConfig::builder()
//!     .database_url("sqlite:catalog.db")
//!     .media_base_url("https://cdn.example.com/media")
//!     .track_search_cap(20)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.track_search_cap, 20);
//! ```
//!
//! ### Environment
//!
//! ```ignore
//! let config = CatalogConfig::from_env()?;
//! ```
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `CATALOG_DATABASE_URL` | `database_url` | `sqlite:catalog.db` |
//! | `CATALOG_TRACK_SEARCH_CAP` | `track_search_cap` | 10 |
//! | `CATALOG_ARTIST_SEARCH_CAP` | `artist_search_cap` | 5 |
//! | `CATALOG_ALBUM_SEARCH_CAP` | `album_search_cap` | 5 |
//! | `CATALOG_SAMPLING_POOL_SIZE` | `sampling_pool_size` | 500 |
//! | `CATALOG_DEFAULT_GENRES` | `default_genres` (comma separated) | see [`DEFAULT_GENRES`] |
//! | `CATALOG_MEDIA_BASE_URL` | `media_base_url` | `/media` |

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Genres the random sampler draws its working pool from unless overridden.
pub const DEFAULT_GENRES: &[&str] = &[
    "Rock",
    "Pop",
    "Electronic",
    "Hip-Hop",
    "Jazz",
    "Classical",
];

const DEFAULT_DATABASE_URL: &str = "sqlite:catalog.db";
const DEFAULT_MEDIA_BASE_URL: &str = "/media";
const DEFAULT_TRACK_SEARCH_CAP: usize = 10;
const DEFAULT_ARTIST_SEARCH_CAP: usize = 5;
const DEFAULT_ALBUM_SEARCH_CAP: usize = 5;
const DEFAULT_SAMPLING_POOL_SIZE: usize = 500;

/// Upper bound shared by every cap and by the sampling pool size.
const MAX_LIMIT: usize = 1000;

/// Startup configuration for the catalog core.
///
/// Use [`CatalogConfig::builder`] or [`CatalogConfig::from_env`] to construct
/// instances; both validate before returning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Connection URL of the catalog store
    pub database_url: String,

    /// Maximum number of tracks returned by a search
    pub track_search_cap: usize,

    /// Maximum number of artists returned by a search
    pub artist_search_cap: usize,

    /// Maximum number of albums returned by a search
    pub album_search_cap: usize,

    /// Number of candidate tracks fetched before random sampling
    pub sampling_pool_size: usize,

    /// Genre names that bound the random sampling pool. Empty means the
    /// pool is drawn from the whole catalog.
    pub default_genres: Vec<String>,

    /// Prefix joined onto relative artwork and avatar references
    pub media_base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            track_search_cap: DEFAULT_TRACK_SEARCH_CAP,
            artist_search_cap: DEFAULT_ARTIST_SEARCH_CAP,
            album_search_cap: DEFAULT_ALBUM_SEARCH_CAP,
            sampling_pool_size: DEFAULT_SAMPLING_POOL_SIZE,
            default_genres: DEFAULT_GENRES.iter().map(|g| g.to_string()).collect(),
            media_base_url: DEFAULT_MEDIA_BASE_URL.to_string(),
        }
    }
}

impl CatalogConfig {
    /// Creates a new builder seeded with defaults.
    pub fn builder() -> CatalogConfigBuilder {
        CatalogConfigBuilder::default()
    }

    /// Reads the configuration from the process environment.
    ///
    /// Call this once during startup. Unset variables fall back to defaults;
    /// malformed ones are reported instead of being silently ignored.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// [`CatalogConfig::from_env`] is this function over `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(url) = lookup("CATALOG_DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(value) = lookup("CATALOG_TRACK_SEARCH_CAP") {
            builder = builder.track_search_cap(parse_usize("CATALOG_TRACK_SEARCH_CAP", &value)?);
        }
        if let Some(value) = lookup("CATALOG_ARTIST_SEARCH_CAP") {
            builder = builder.artist_search_cap(parse_usize("CATALOG_ARTIST_SEARCH_CAP", &value)?);
        }
        if let Some(value) = lookup("CATALOG_ALBUM_SEARCH_CAP") {
            builder = builder.album_search_cap(parse_usize("CATALOG_ALBUM_SEARCH_CAP", &value)?);
        }
        if let Some(value) = lookup("CATALOG_SAMPLING_POOL_SIZE") {
            builder =
                builder.sampling_pool_size(parse_usize("CATALOG_SAMPLING_POOL_SIZE", &value)?);
        }
        if let Some(value) = lookup("CATALOG_DEFAULT_GENRES") {
            builder = builder.default_genres(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|genre| !genre.is_empty())
                    .map(str::to_string),
            );
        }
        if let Some(url) = lookup("CATALOG_MEDIA_BASE_URL") {
            builder = builder.media_base_url(url);
        }

        builder.build()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Database URL is not empty
    /// - Every cap and the pool size are in `1..=1000`
    /// - The media base URL is absolute (`http://`, `https://`) or rooted (`/`)
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(Error::Config("Database URL cannot be empty".to_string()));
        }

        check_limit("track_search_cap", self.track_search_cap)?;
        check_limit("artist_search_cap", self.artist_search_cap)?;
        check_limit("album_search_cap", self.album_search_cap)?;
        check_limit("sampling_pool_size", self.sampling_pool_size)?;

        let base = self.media_base_url.trim();
        if base.is_empty() {
            return Err(Error::Config("Media base URL cannot be empty".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://") || base.starts_with('/'))
        {
            return Err(Error::Config(format!(
                "Media base URL must start with http://, https:// or /, got {}",
                base
            )));
        }

        if self.default_genres.iter().any(|g| g.trim().is_empty()) {
            return Err(Error::Config(
                "Default genre names cannot be blank".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_limit(key: &str, value: usize) -> Result<()> {
    if value == 0 || value > MAX_LIMIT {
        return Err(Error::InvalidSetting {
            key: key.to_string(),
            message: format!("must be between 1 and {}, got {}", MAX_LIMIT, value),
        });
    }
    Ok(())
}

fn parse_usize(key: &str, raw: &str) -> Result<usize> {
    raw.trim().parse().map_err(|_| Error::InvalidSetting {
        key: key.to_string(),
        message: format!("expected a non-negative integer, got {:?}", raw),
    })
}

/// Builder for constructing [`CatalogConfig`] instances.
///
/// Unset options keep their defaults; [`build()`](CatalogConfigBuilder::build)
/// validates the result.
#[derive(Debug, Default)]
pub struct CatalogConfigBuilder {
    database_url: Option<String>,
    track_search_cap: Option<usize>,
    artist_search_cap: Option<usize>,
    album_search_cap: Option<usize>,
    sampling_pool_size: Option<usize>,
    default_genres: Option<Vec<String>>,
    media_base_url: Option<String>,
}

impl CatalogConfigBuilder {
    /// Sets the catalog store connection URL.
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Sets the maximum number of tracks a search returns.
    pub fn track_search_cap(mut self, cap: usize) -> Self {
        self.track_search_cap = Some(cap);
        self
    }

    /// Sets the maximum number of artists a search returns.
    pub fn artist_search_cap(mut self, cap: usize) -> Self {
        self.artist_search_cap = Some(cap);
        self
    }

    /// Sets the maximum number of albums a search returns.
    pub fn album_search_cap(mut self, cap: usize) -> Self {
        self.album_search_cap = Some(cap);
        self
    }

    /// Sets how many candidate tracks the sampler loads before drawing.
    pub fn sampling_pool_size(mut self, size: usize) -> Self {
        self.sampling_pool_size = Some(size);
        self
    }

    /// Replaces the genre set bounding the sampling pool.
    pub fn default_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_genres = Some(genres.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the prefix for artwork and avatar references.
    pub fn media_base_url(mut self, url: impl Into<String>) -> Self {
        self.media_base_url = Some(url.into());
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<CatalogConfig> {
        let defaults = CatalogConfig::default();

        let config = CatalogConfig {
            database_url: self.database_url.unwrap_or(defaults.database_url),
            track_search_cap: self.track_search_cap.unwrap_or(defaults.track_search_cap),
            artist_search_cap: self.artist_search_cap.unwrap_or(defaults.artist_search_cap),
            album_search_cap: self.album_search_cap.unwrap_or(defaults.album_search_cap),
            sampling_pool_size: self
                .sampling_pool_size
                .unwrap_or(defaults.sampling_pool_size),
            default_genres: self.default_genres.unwrap_or(defaults.default_genres),
            media_base_url: self.media_base_url.unwrap_or(defaults.media_base_url),
        };

        config.validate()?;

        Ok(config)
    }
}
