//! Public catalog operations
//!
//! [`CatalogService`] wires the sampler and the search aggregator to a store
//! and applies redaction and artwork resolution to every record on the way
//! out. It holds no mutable state and is cheap to clone.

use crate::error::Result;
use crate::filter::DistinctStrategy;
use crate::models::{Album, Artist, CallerContext, SearchResult, Track};
use crate::query::{compose_tracks, TrackQuery, TrackScope};
use crate::redact::{ArtworkResolver, Redact};
use crate::rows::{row_to_track, rows_to};
use crate::sampler::{RandomSampler, SamplerSettings};
use crate::search::{SearchAggregator, SearchLimits};
use bridge_traits::database::CatalogStore;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Immutable knobs handed to the service once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub search: SearchLimits,
    pub sampler: SamplerSettings,
    /// Prefix for relative artwork and avatar references
    pub media_base_url: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            search: SearchLimits::default(),
            sampler: SamplerSettings {
                pool_size: 500,
                genres: Vec::new(),
            },
            media_base_url: "/media".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    sampler: RandomSampler,
    search: SearchAggregator,
    resolver: ArtworkResolver,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, settings: CatalogSettings) -> Self {
        Self {
            sampler: RandomSampler::new(Arc::clone(&store), settings.sampler),
            search: SearchAggregator::new(Arc::clone(&store), settings.search),
            resolver: ArtworkResolver::new(settings.media_base_url),
            store,
        }
    }

    /// Up to `amount` distinct random tracks from the default genres.
    pub async fn random_tracks(&self, amount: usize, ctx: &CallerContext) -> Result<Vec<Track>> {
        self.random_tracks_distinct(amount, DistinctStrategy::None, ctx)
            .await
    }

    /// Like [`Self::random_tracks`], keeping at most one track per album or
    /// artist as `distinct` asks.
    #[instrument(skip(self, ctx), fields(authorized = ctx.is_authorized))]
    pub async fn random_tracks_distinct(
        &self,
        amount: usize,
        distinct: DistinctStrategy,
        ctx: &CallerContext,
    ) -> Result<Vec<Track>> {
        let tracks = self
            .sampler
            .tracks(amount, distinct, ctx.user_id)
            .await
            .inspect_err(|e| warn!(error = %e, "Random track sampling failed"))?;

        debug!(count = tracks.len(), "Sampled random tracks");
        Ok(self.shape_tracks(tracks, ctx))
    }

    #[instrument(skip(self))]
    pub async fn random_albums(&self, amount: usize) -> Result<Vec<Album>> {
        let albums = self
            .sampler
            .albums(amount)
            .await
            .inspect_err(|e| warn!(error = %e, "Random album sampling failed"))?;

        Ok(albums.into_iter().map(|a| self.resolver.album(a)).collect())
    }

    #[instrument(skip(self))]
    pub async fn random_artists(&self, amount: usize) -> Result<Vec<Artist>> {
        let artists = self
            .sampler
            .artists(amount)
            .await
            .inspect_err(|e| warn!(error = %e, "Random artist sampling failed"))?;

        Ok(artists
            .into_iter()
            .map(|a| self.resolver.artist(a))
            .collect())
    }

    /// Tracks, artists and albums matching `text`, each list capped.
    #[instrument(skip(self, ctx), fields(authorized = ctx.is_authorized))]
    pub async fn search(&self, text: &str, ctx: &CallerContext) -> Result<SearchResult> {
        let result = self
            .search
            .search(text, ctx.user_id)
            .await
            .inspect_err(|e| warn!(error = %e, "Catalog search failed"))?;

        debug!(
            tracks = result.tracks.len(),
            artists = result.artists.len(),
            albums = result.albums.len(),
            "Search completed"
        );
        Ok(self.resolver.search(result.redact(ctx)))
    }

    /// Tracks on a playlist in playlist order. Unknown playlists are empty.
    #[instrument(skip(self, ctx), fields(authorized = ctx.is_authorized))]
    pub async fn playlist_tracks(
        &self,
        playlist_id: i64,
        ctx: &CallerContext,
    ) -> Result<Vec<Track>> {
        let query = compose_tracks(
            &TrackQuery::new(TrackScope::Playlist(playlist_id)).for_viewer(ctx.user_id),
        );
        self.fetch_tracks(&query.sql, &query.params, ctx).await
    }

    /// The caller's favorite tracks; anonymous callers have none.
    #[instrument(skip(self, ctx), fields(authorized = ctx.is_authorized))]
    pub async fn favorite_tracks(&self, ctx: &CallerContext) -> Result<Vec<Track>> {
        let Some(user_id) = ctx.user_id else {
            return Ok(Vec::new());
        };

        let query = compose_tracks(
            &TrackQuery::new(TrackScope::FavoritesOf(user_id)).for_viewer(Some(user_id)),
        );
        self.fetch_tracks(&query.sql, &query.params, ctx).await
    }

    pub async fn health_check(&self) -> Result<()> {
        self.store.health_check().await?;
        Ok(())
    }

    async fn fetch_tracks(
        &self,
        sql: &str,
        params: &[bridge_traits::database::QueryValue],
        ctx: &CallerContext,
    ) -> Result<Vec<Track>> {
        let rows = self
            .store
            .query(sql, params)
            .await
            .inspect_err(|e| warn!(error = %e, "Track listing failed"))?;
        let tracks = rows_to(&rows, row_to_track)?;
        Ok(self.shape_tracks(tracks, ctx))
    }

    fn shape_tracks(&self, tracks: Vec<Track>, ctx: &CallerContext) -> Vec<Track> {
        tracks
            .into_iter()
            .map(|t| self.resolver.track(t.redact(ctx)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::test_support::{artist_row, track_row, MockStore};
    use bridge_traits::database::QueryValue;
    use bridge_traits::error::BridgeError;

    fn service(store: MockStore) -> CatalogService {
        CatalogService::new(Arc::new(store), CatalogSettings::default())
    }

    #[tokio::test]
    async fn test_search_redacts_and_resolves_for_anonymous_callers() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .withf(|sql, _| sql.contains("tracks_fts"))
            .returning(|_, _| Ok(vec![track_row(1, "Allegro Vivace", 9)]));
        store
            .expect_query()
            .withf(|sql, _| sql.contains("FROM artists ar"))
            .returning(|_, _| Ok(vec![artist_row(2, "Allegri")]));
        store.expect_query().returning(|_, _| Ok(Vec::new()));

        let result = service(store)
            .search("allegr", &CallerContext::anonymous())
            .await
            .unwrap();

        assert_eq!(result.tracks.len(), 1);
        assert_eq!(result.tracks[0].file, None);
        assert_eq!(
            result.tracks[0].album.artwork.as_deref(),
            Some("/media/art/cover.jpg")
        );
        assert_eq!(result.artists[0].avatar.as_deref(), Some("/media/avatars/2.jpg"));
    }

    #[tokio::test]
    async fn test_authorized_callers_keep_file_references() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .withf(|sql, params| {
                sql.contains("pt.playlist_id = ?") && params[1] == QueryValue::Integer(12)
            })
            .times(1)
            .returning(|_, _| Ok(vec![track_row(4, "Blue", 1)]));

        let tracks = service(store)
            .playlist_tracks(12, &CallerContext::authorized(8))
            .await
            .unwrap();

        assert_eq!(tracks[0].file.as_deref(), Some("audio/4.flac"));
    }

    #[tokio::test]
    async fn test_anonymous_favorites_skip_the_store() {
        let mut store = MockStore::new();
        store.expect_query().never();

        let tracks = service(store)
            .favorite_tracks(&CallerContext::anonymous())
            .await
            .unwrap();
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn test_favorites_are_scoped_to_the_caller() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .withf(|sql, params| {
                sql.contains("fav.user_id = ?")
                    && params == [QueryValue::Integer(8), QueryValue::Integer(8)]
            })
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        service(store)
            .favorite_tracks(&CallerContext::new(false, Some(8)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_store_errors_surface_as_unavailable() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .returning(|_, _| Err(BridgeError::DatabaseError("connection reset".into())));
        store
            .expect_health_check()
            .returning(|| Err(BridgeError::NotAvailable("closed".into())));

        let service = service(store);
        let err = service.random_artists(3).await.unwrap_err();
        assert!(matches!(err, CatalogError::CatalogUnavailable(_)));
        assert!(service.health_check().await.is_err());
    }
}
