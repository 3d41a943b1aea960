//! Two-tier search
//!
//! Tracks are matched first through the full-text index (stemmed terms),
//! then, only when that tier leaves room under the cap, through a
//! case-insensitive substring match on the same search text via trigram
//! indexes. Exact-term hits
//! always keep their place ahead of substring hits. Artist names and album
//! titles are matched by substring into their own capped lists.

use crate::error::Result;
use crate::models::{Album, Artist, SearchResult, Track};
use crate::query::{
    compose_albums, compose_artists, compose_tracks, EntityOrder, EntityScope, Substring,
    TrackOrder, TrackQuery, TrackScope,
};
use crate::rows::{row_to_album, row_to_artist, row_to_track, rows_to};
use bridge_traits::database::CatalogStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

const TRIGRAM_LEN: usize = 3;

/// Result caps per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    pub tracks: usize,
    pub artists: usize,
    pub albums: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            tracks: 10,
            artists: 5,
            albums: 5,
        }
    }
}

#[derive(Clone)]
pub struct SearchAggregator {
    store: Arc<dyn CatalogStore>,
    limits: SearchLimits,
}

impl SearchAggregator {
    pub fn new(store: Arc<dyn CatalogStore>, limits: SearchLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    /// Search tracks, artists and albums for `text`.
    ///
    /// Blank input yields an empty result without touching the store. The
    /// three lists are fetched concurrently; the first store error aborts the
    /// whole call.
    pub async fn search(&self, text: &str, viewer: Option<i64>) -> Result<SearchResult> {
        let text = normalize_text(text);
        if text.is_empty() {
            return Ok(SearchResult::default());
        }

        let needle = substring_needle(&text);
        let (tracks, artists, albums) = futures::try_join!(
            self.tracks(&text, &needle, viewer),
            self.artists(&needle),
            self.albums(&needle),
        )?;

        Ok(SearchResult {
            tracks,
            artists,
            albums,
        })
    }

    async fn tracks(
        &self,
        text: &str,
        needle: &Substring,
        viewer: Option<i64>,
    ) -> Result<Vec<Track>> {
        let cap = self.limits.tracks;
        if cap == 0 {
            return Ok(Vec::new());
        }

        let exact = match exact_terms_expression(text) {
            Some(expression) => {
                self.track_tier(TrackScope::MatchingTerms(expression), viewer, cap)
                    .await?
            }
            None => Vec::new(),
        };

        if exact.len() >= cap {
            debug!(exact = exact.len(), "Exact-term tier filled the cap");
            return Ok(merge_tiers(exact, Vec::new(), cap));
        }

        let partial = self
            .track_tier(TrackScope::Containing(needle.clone()), viewer, cap)
            .await?;
        debug!(
            exact = exact.len(),
            partial = partial.len(),
            "Merging search tiers"
        );

        Ok(merge_tiers(exact, partial, cap))
    }

    async fn track_tier(
        &self,
        scope: TrackScope,
        viewer: Option<i64>,
        cap: usize,
    ) -> Result<Vec<Track>> {
        let query = compose_tracks(
            &TrackQuery::new(scope)
                .for_viewer(viewer)
                .ordered_by(TrackOrder::MostPlayed)
                .limit(cap),
        );
        let rows = self.store.query(&query.sql, &query.params).await?;
        rows_to(&rows, row_to_track)
    }

    async fn artists(&self, needle: &Substring) -> Result<Vec<Artist>> {
        if self.limits.artists == 0 {
            return Ok(Vec::new());
        }

        let query = compose_artists(
            &EntityScope::Containing(needle.clone()),
            EntityOrder::Alphabetical,
            self.limits.artists,
        );
        let rows = self.store.query(&query.sql, &query.params).await?;
        rows_to(&rows, row_to_artist)
    }

    async fn albums(&self, needle: &Substring) -> Result<Vec<Album>> {
        if self.limits.albums == 0 {
            return Ok(Vec::new());
        }

        let query = compose_albums(
            &EntityScope::Containing(needle.clone()),
            EntityOrder::Alphabetical,
            self.limits.albums,
        );
        let rows = self.store.query(&query.sql, &query.params).await?;
        rows_to(&rows, row_to_album)
    }
}

/// Keep every exact-term hit, then append partial hits not already present,
/// stopping at `cap`. First occurrence of an id wins.
pub fn merge_tiers(exact: Vec<Track>, partial: Vec<Track>, cap: usize) -> Vec<Track> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(cap.min(exact.len() + partial.len()));

    for track in exact.into_iter().chain(partial) {
        if merged.len() >= cap {
            break;
        }
        if seen.insert(track.id) {
            merged.push(track);
        }
    }

    merged
}

/// Trim, lowercase and collapse runs of whitespace to one space.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// FTS5 expression requiring every alphanumeric token of `text`.
///
/// Each token is quoted as an FTS string so operators and column filters in
/// user input stay literal. Returns `None` when no token survives.
pub fn exact_terms_expression(text: &str) -> Option<String> {
    let tokens: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| format!("\"{}\"", token.to_lowercase()))
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// Trigram phrase for `text`, or a `LIKE` pattern when `text` is too short
/// to form a trigram.
pub fn substring_needle(text: &str) -> Substring {
    if text.chars().count() >= TRIGRAM_LEN {
        Substring::Trigram(format!("\"{}\"", text.replace('"', "\"\"")))
    } else {
        Substring::Like(contains_pattern(text))
    }
}

/// `%text%` with `LIKE` metacharacters escaped by backslash.
pub fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::test_support::{album_row, artist_row, track_row, MockStore};
    use bridge_traits::database::QueryValue;
    use bridge_traits::error::BridgeError;

    fn track(id: i64) -> Track {
        row_to_track(&track_row(id, &format!("Track {}", id), 0)).unwrap()
    }

    fn ids(tracks: &[Track]) -> Vec<i64> {
        tracks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_exact_hits_keep_their_place() {
        let merged = merge_tiers(
            vec![track(1), track(2)],
            vec![track(9), track(2), track(3)],
            10,
        );
        assert_eq!(ids(&merged), vec![1, 2, 9, 3]);
    }

    #[test]
    fn test_merge_stops_at_cap() {
        let merged = merge_tiers(vec![track(1)], vec![track(2), track(3), track(4)], 3);
        assert_eq!(ids(&merged), vec![1, 2, 3]);

        let full = merge_tiers(vec![track(1), track(2), track(3)], vec![track(4)], 2);
        assert_eq!(ids(&full), vec![1, 2]);
    }

    #[test]
    fn test_merge_never_duplicates() {
        let merged = merge_tiers(vec![track(5), track(5)], vec![track(5)], 10);
        assert_eq!(ids(&merged), vec![5]);
    }

    #[test]
    fn test_exact_expression_quotes_tokens() {
        assert_eq!(
            exact_terms_expression("Allegro  Vivace").as_deref(),
            Some("\"allegro\" \"vivace\"")
        );
        assert_eq!(
            exact_terms_expression("title:NOT OR*").as_deref(),
            Some("\"title\" \"not\" \"or\"")
        );
        assert_eq!(exact_terms_expression("!!! ---"), None);
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Allegro"), "%allegro%");
        assert_eq!(contains_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }

    #[test]
    fn test_substring_needle_by_length() {
        assert_eq!(
            substring_needle("ölmüh"),
            Substring::Trigram("\"ölmüh\"".into())
        );
        assert_eq!(
            substring_needle("say \"hi\""),
            Substring::Trigram("\"say \"\"hi\"\"\"".into())
        );
        assert_eq!(substring_needle("é_"), Substring::Like("%é\\_%".into()));
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  Allegro \t VIVACE \n"), "allegro vivace");
        assert_eq!(normalize_text(" \n\t "), "");
    }

    #[tokio::test]
    async fn test_blank_text_skips_the_store() {
        let mut store = MockStore::new();
        store.expect_query().never();

        let search = SearchAggregator::new(Arc::new(store), SearchLimits::default());
        let result = search.search("   ", Some(1)).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_partial_tier_skipped_when_exact_fills_cap() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .withf(|sql, _| sql.contains("tracks_fts MATCH ?"))
            .times(1)
            .returning(|_, _| Ok((1..=2).map(|id| track_row(id, "Rain", 10)).collect()));
        store
            .expect_query()
            .withf(|sql, _| sql.contains("tracks_trigram"))
            .never();
        store
            .expect_query()
            .withf(|sql, _| sql.contains("FROM artists ar"))
            .times(1)
            .returning(|_, _| Ok(vec![artist_row(1, "Rainbow")]));
        store
            .expect_query()
            .withf(|sql, _| sql.contains("FROM albums al"))
            .times(1)
            .returning(|_, _| Ok(vec![album_row(1, "Rain Dogs")]));

        let limits = SearchLimits {
            tracks: 2,
            ..SearchLimits::default()
        };
        let search = SearchAggregator::new(Arc::new(store), limits);
        let result = search.search("rain", None).await.unwrap();

        assert_eq!(ids(&result.tracks), vec![1, 2]);
        assert_eq!(result.artists[0].name, "Rainbow");
        assert_eq!(result.albums[0].title, "Rain Dogs");
    }

    #[tokio::test]
    async fn test_partial_tier_fills_remaining_slots() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .withf(|sql, params| {
                sql.contains("tracks_fts MATCH ?")
                    && params[1] == QueryValue::Text("\"allegro\"".into())
            })
            .returning(|_, _| Ok(vec![track_row(7, "Allegro", 1)]));
        store
            .expect_query()
            .withf(|sql, params| {
                sql.contains("tracks_trigram MATCH ?")
                    && params[1] == QueryValue::Text("\"allegro\"".into())
            })
            .returning(|_, _| {
                Ok(vec![
                    track_row(8, "Allegro Vivace", 500),
                    track_row(7, "Allegro", 1),
                ])
            });
        store
            .expect_query()
            .withf(|sql, _| sql.contains("FROM artists ar") || sql.contains("FROM albums al"))
            .returning(|_, _| Ok(Vec::new()));

        let search = SearchAggregator::new(Arc::new(store), SearchLimits::default());
        let result = search.search("Allegro", Some(3)).await.unwrap();

        assert_eq!(ids(&result.tracks), vec![7, 8]);
    }

    #[tokio::test]
    async fn test_punctuation_only_text_uses_partial_tier_alone() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .withf(|sql, _| sql.contains("tracks_fts MATCH ?"))
            .never();
        store
            .expect_query()
            .withf(|sql, params| {
                sql.contains("lower(search_blob) LIKE")
                    && params[1] == QueryValue::Text("%?!%".into())
            })
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        store
            .expect_query()
            .withf(|sql, _| sql.contains("FROM artists ar") || sql.contains("FROM albums al"))
            .returning(|_, _| Ok(Vec::new()));

        let search = SearchAggregator::new(Arc::new(store), SearchLimits::default());
        let result = search.search("?!", None).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_any_store_error_fails_the_whole_search() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .withf(|sql, _| sql.contains("FROM albums al"))
            .returning(|_, _| Err(BridgeError::DatabaseError("database is locked".into())));
        store.expect_query().returning(|_, _| Ok(Vec::new()));

        let search = SearchAggregator::new(Arc::new(store), SearchLimits::default());
        let err = search.search("song", None).await.unwrap_err();

        assert!(matches!(err, CatalogError::CatalogUnavailable(msg) if msg.contains("locked")));
    }
}
