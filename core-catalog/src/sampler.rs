//! Random sampling
//!
//! Tracks are sampled in two round-trips: a bounded pool of identities is
//! fetched with a coarse genre filter, `amount` distinct identities are drawn
//! from it in memory, and the full records are fetched by id. Cost scales
//! with the pool size and the requested amount, never with the table size.
//!
//! Albums and artists use a single store-side `ORDER BY RANDOM()` with a
//! limit; those tables stay small.

use crate::error::Result;
use crate::filter::{DistinctStrategy, FilterClause};
use crate::models::{Album, Artist, Track};
use crate::query::{
    compose_albums, compose_artists, compose_track_pool, compose_tracks, EntityOrder,
    EntityScope, TrackQuery, TrackScope,
};
use crate::rows::{required_i64, row_to_album, row_to_artist, row_to_track, rows_to};
use bridge_traits::database::CatalogStore;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Pool shape for track sampling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerSettings {
    /// Upper bound on the identities fetched per call
    pub pool_size: usize,
    /// Genres the pool is drawn from; empty means the whole catalog
    pub genres: Vec<String>,
}

impl SamplerSettings {
    fn pool_filter(&self) -> FilterClause {
        if self.genres.is_empty() {
            FilterClause::None
        } else {
            FilterClause::ByGenreNames(self.genres.clone())
        }
    }
}

#[derive(Clone)]
pub struct RandomSampler {
    store: Arc<dyn CatalogStore>,
    settings: SamplerSettings,
}

impl RandomSampler {
    pub fn new(store: Arc<dyn CatalogStore>, settings: SamplerSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }

    /// Up to `amount` distinct random tracks with every field populated.
    ///
    /// Returns fewer when the pool is smaller than `amount` or when
    /// `distinct` collapses several picks onto one album or artist. Rows come
    /// back in the order the store returns them for the id fetch.
    pub async fn tracks(
        &self,
        amount: usize,
        distinct: DistinctStrategy,
        viewer: Option<i64>,
    ) -> Result<Vec<Track>> {
        if amount == 0 {
            return Ok(Vec::new());
        }

        let pool_query = compose_track_pool(&self.settings.pool_filter(), self.settings.pool_size);
        let pool_rows = self.store.query(&pool_query.sql, &pool_query.params).await?;
        let pool = pool_rows
            .iter()
            .map(|row| required_i64(row, "id"))
            .collect::<Result<Vec<_>>>()?;

        if pool.is_empty() {
            debug!("Sampling pool is empty");
            return Ok(Vec::new());
        }

        let picked = {
            let mut rng = rand::thread_rng();
            sample_identities(&pool, amount, &mut rng)
        };
        debug!(
            pool_size = pool.len(),
            requested = amount,
            picked = picked.len(),
            "Sampled track identities"
        );

        let fetch = compose_tracks(
            &TrackQuery::new(TrackScope::Catalog)
                .with_filter(FilterClause::ByIds(picked))
                .with_distinct(distinct)
                .for_viewer(viewer),
        );
        let rows = self.store.query(&fetch.sql, &fetch.params).await?;
        rows_to(&rows, row_to_track)
    }

    /// Up to `amount` random albums.
    pub async fn albums(&self, amount: usize) -> Result<Vec<Album>> {
        if amount == 0 {
            return Ok(Vec::new());
        }

        let query = compose_albums(&EntityScope::Catalog, EntityOrder::Random, amount);
        let rows = self.store.query(&query.sql, &query.params).await?;
        rows_to(&rows, row_to_album)
    }

    /// Up to `amount` random artists.
    pub async fn artists(&self, amount: usize) -> Result<Vec<Artist>> {
        if amount == 0 {
            return Ok(Vec::new());
        }

        let query = compose_artists(&EntityScope::Catalog, EntityOrder::Random, amount);
        let rows = self.store.query(&query.sql, &query.params).await?;
        rows_to(&rows, row_to_artist)
    }
}

/// Draw `min(amount, unique ids)` distinct identities from `pool` uniformly.
///
/// Duplicates in the pool are collapsed first so a repeated id cannot be
/// picked twice or weigh more than others.
pub fn sample_identities<R: Rng + ?Sized>(pool: &[i64], amount: usize, rng: &mut R) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(pool.len());
    let unique: Vec<i64> = pool.iter().copied().filter(|id| seen.insert(*id)).collect();

    let take = amount.min(unique.len());
    rand::seq::index::sample(rng, unique.len(), take)
        .into_iter()
        .map(|index| unique[index])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::database::{QueryRow, QueryValue};
    use bridge_traits::error::BridgeError;
    use crate::test_support::MockStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings() -> SamplerSettings {
        SamplerSettings {
            pool_size: 500,
            genres: vec!["Rock".to_string(), "Pop".to_string()],
        }
    }

    fn id_row(id: i64) -> QueryRow {
        let mut row = QueryRow::new();
        row.insert("id".to_string(), QueryValue::Integer(id));
        row
    }

    #[test]
    fn test_sample_never_repeats_and_stays_in_pool() {
        let pool: Vec<i64> = (1..=20).collect();
        let mut rng = StdRng::seed_from_u64(7);

        for amount in [0, 1, 5, 20] {
            let picked = sample_identities(&pool, amount, &mut rng);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(picked.len(), amount);
            assert_eq!(unique.len(), amount);
            assert!(picked.iter().all(|id| pool.contains(id)));
        }
    }

    #[test]
    fn test_sample_is_capped_by_pool_size() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut picked = sample_identities(&[3, 1, 2], 10, &mut rng);
        picked.sort_unstable();
        assert_eq!(picked, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_pool_entries_collapse() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut picked = sample_identities(&[4, 4, 4, 9], 5, &mut rng);
        picked.sort_unstable();
        assert_eq!(picked, vec![4, 9]);
    }

    #[tokio::test]
    async fn test_zero_amount_skips_the_store() {
        let mut store = MockStore::new();
        store.expect_query().never();

        let sampler = RandomSampler::new(Arc::new(store), settings());
        assert!(sampler
            .tracks(0, DistinctStrategy::None, None)
            .await
            .unwrap()
            .is_empty());
        assert!(sampler.albums(0).await.unwrap().is_empty());
        assert!(sampler.artists(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_pool_stops_after_one_round_trip() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .withf(|sql, params| {
                sql.contains("g.name IN (?, ?)")
                    && params.first() == Some(&QueryValue::Text("Rock".to_string()))
                    && params.last() == Some(&QueryValue::Integer(500))
            })
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let sampler = RandomSampler::new(Arc::new(store), settings());
        let tracks = sampler
            .tracks(3, DistinctStrategy::None, Some(1))
            .await
            .unwrap();
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_binds_sampled_ids() {
        let mut store = MockStore::new();
        let mut seq = mockall::Sequence::new();

        store
            .expect_query()
            .withf(|sql, _| sql.starts_with("SELECT t.id FROM tracks t"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok((1..=5).map(id_row).collect()));
        store
            .expect_query()
            .withf(|sql, params| {
                // viewer, then three sampled ids
                sql.contains("t.id IN (?, ?, ?)")
                    && params.len() == 4
                    && params[1..]
                        .iter()
                        .all(|p| matches!(p.as_i64(), Some(id) if (1..=5).contains(&id)))
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Vec::new()));

        let sampler = RandomSampler::new(Arc::new(store), settings());
        sampler
            .tracks(3, DistinctStrategy::None, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .returning(|_, _| Err(BridgeError::DatabaseError("disk I/O error".to_string())));

        let sampler = RandomSampler::new(Arc::new(store), settings());
        let err = sampler.albums(2).await.unwrap_err();
        assert!(err.to_string().contains("disk I/O error"));
    }
}
