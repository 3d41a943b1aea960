//! Core service façade and bootstrap helpers.
//!
//! This crate turns a validated [`CatalogConfig`] into a ready
//! [`CatalogService`]: it opens the SQLite store (migrations included),
//! wraps it in the [`CatalogStore`] adapter and hands the explicit settings
//! to the catalog core. Hosts that already own a store can skip the
//! connection step and build a [`CoreService`] from [`CoreDependencies`].

pub mod error;

pub use error::{CoreError, Result};

pub use core_catalog::{
    Album, AlbumRef, Artist, ArtistRef, CallerContext, CatalogError, CatalogService,
    CatalogSettings, DistinctStrategy, SamplerSettings, SearchLimits, SearchResult, Track,
};
pub use core_runtime::config::CatalogConfig;
pub use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};

use bridge_traits::database::{CatalogStore, DatabaseConfig};
use core_catalog::SqliteAdapter;
use std::sync::Arc;
use tracing::{info, warn};

/// Collaborators the catalog core needs from its host.
pub struct CoreDependencies {
    pub store: Arc<dyn CatalogStore>,
}

impl CoreDependencies {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }
}

/// Primary façade exposed to the transport layer.
#[derive(Clone)]
pub struct CoreService {
    catalog: CatalogService,
    config: Arc<CatalogConfig>,
}

impl CoreService {
    /// Wire the catalog core to `deps` using the values in `config`.
    pub fn new(deps: CoreDependencies, config: CatalogConfig) -> Self {
        let catalog = CatalogService::new(deps.store, catalog_settings(&config));
        Self {
            catalog,
            config: Arc::new(config),
        }
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }
}

/// Project the startup configuration onto the catalog's explicit settings.
pub fn catalog_settings(config: &CatalogConfig) -> CatalogSettings {
    CatalogSettings {
        search: SearchLimits {
            tracks: config.track_search_cap,
            artists: config.artist_search_cap,
            albums: config.album_search_cap,
        },
        sampler: SamplerSettings {
            pool_size: config.sampling_pool_size,
            genres: config.default_genres.clone(),
        },
        media_base_url: config.media_base_url.clone(),
    }
}

/// Validate `config`, open the store and return a ready service.
pub async fn bootstrap(config: CatalogConfig) -> Result<CoreService> {
    config.validate()?;
    info!(
        track_search_cap = config.track_search_cap,
        sampling_pool_size = config.sampling_pool_size,
        genres = config.default_genres.len(),
        "Bootstrapping catalog service"
    );

    let adapter = SqliteAdapter::connect(&DatabaseConfig::from_url(&config.database_url)).await?;
    let service = CoreService::new(CoreDependencies::new(Arc::new(adapter)), config);

    service.catalog().health_check().await.map_err(|e| {
        warn!(error = %e, "Catalog store failed its first health check");
        CoreError::InitializationFailed(e.to_string())
    })?;

    info!("Catalog service ready");
    Ok(service)
}

/// [`bootstrap`] with the configuration read from `CATALOG_*` variables.
pub async fn bootstrap_from_env() -> Result<CoreService> {
    bootstrap(CatalogConfig::from_env()?).await
}
