//! Query composition
//!
//! Builds parameterized SQL for every catalog read. Identifiers and
//! fragments come from [`crate::projection`] and [`crate::filter`]; every
//! caller-supplied value travels as a bound [`QueryValue`], in the same order
//! its `?` placeholder appears in the text.

use crate::filter::{DistinctStrategy, FilterClause};
use crate::projection::{
    project, ALBUM_FIELDS, ARTIST_FIELDS, OWNER_ARTIST_FIELDS, TRACK_ALBUM_FIELDS,
    TRACK_FIELDS, TRACK_GENRE_FIELDS, TRACK_ID_FIELDS,
};
use bridge_traits::database::QueryValue;

const TRACK_SOURCE: &str = "FROM tracks t \
     JOIN albums al ON al.id = t.album_id \
     JOIN artists ar ON ar.id = t.artist_id \
     LEFT JOIN genres g ON g.id = t.genre_id";

const FAVORITE_FLAG: &str =
    "EXISTS(SELECT 1 FROM favorites f WHERE f.track_id = t.id AND f.user_id = ?) AS is_favorite";

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuery {
    pub sql: String,
    pub params: Vec<QueryValue>,
}

/// Which slice of the catalog a track query reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackScope {
    Catalog,
    /// Tracks on a playlist; natural order is the playlist position.
    Playlist(i64),
    /// Tracks the given user has favorited.
    FavoritesOf(i64),
    /// Full-text match against the per-track search blob. The value is an
    /// already-sanitized FTS5 expression.
    MatchingTerms(String),
    /// Case-insensitive substring match against the search blob.
    Containing(Substring),
}

/// A case-insensitive substring needle, prepared for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substring {
    /// Quoted FTS5 phrase matched against a trigram index. Case folding is
    /// Unicode-aware.
    Trigram(String),
    /// Escaped `LIKE` pattern for needles shorter than one trigram. SQLite
    /// folds only ASCII letters here.
    Like(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackOrder {
    /// Store order, or playlist position for [`TrackScope::Playlist`].
    #[default]
    Natural,
    /// Descending play count, ties broken by ascending id.
    MostPlayed,
}

/// Everything needed to compose one track query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery {
    pub scope: TrackScope,
    pub filter: FilterClause,
    pub distinct: DistinctStrategy,
    /// User the favorite flag is computed for; `None` yields `false` everywhere.
    pub viewer: Option<i64>,
    pub order: TrackOrder,
    pub limit: Option<usize>,
}

impl TrackQuery {
    pub fn new(scope: TrackScope) -> Self {
        Self {
            scope,
            filter: FilterClause::None,
            distinct: DistinctStrategy::None,
            viewer: None,
            order: TrackOrder::Natural,
            limit: None,
        }
    }

    pub fn with_filter(mut self, filter: FilterClause) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_distinct(mut self, distinct: DistinctStrategy) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn for_viewer(mut self, viewer: Option<i64>) -> Self {
        self.viewer = viewer;
        self
    }

    pub fn ordered_by(mut self, order: TrackOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Compose a full track query.
///
/// With a distinct strategy the filtered rows are ranked per partition key
/// by ascending track id inside a subquery and only the first of each
/// partition is kept. Ordering and limit apply after the collapse.
pub fn compose_tracks(query: &TrackQuery) -> ComposedQuery {
    let mut params = vec![QueryValue::from(query.viewer)];

    let mut select = project(&[
        TRACK_FIELDS,
        TRACK_ALBUM_FIELDS,
        OWNER_ARTIST_FIELDS,
        TRACK_GENRE_FIELDS,
    ]);
    select.push_str(", ");
    select.push_str(FAVORITE_FLAG);

    let mut source = TRACK_SOURCE.to_string();
    let mut conditions = Vec::new();

    match &query.scope {
        TrackScope::Catalog => {}
        TrackScope::Playlist(playlist_id) => {
            select.push_str(", pt.position AS playlist_position");
            source.push_str(" JOIN playlist_tracks pt ON pt.track_id = t.id");
            conditions.push("pt.playlist_id = ?".to_string());
            params.push(QueryValue::Integer(*playlist_id));
        }
        TrackScope::FavoritesOf(user_id) => {
            source.push_str(" JOIN favorites fav ON fav.track_id = t.id");
            conditions.push("fav.user_id = ?".to_string());
            params.push(QueryValue::Integer(*user_id));
        }
        TrackScope::MatchingTerms(expression) => {
            conditions.push(
                "t.id IN (SELECT track_id FROM tracks_fts WHERE tracks_fts MATCH ?)".to_string(),
            );
            params.push(QueryValue::Text(expression.clone()));
        }
        TrackScope::Containing(Substring::Trigram(phrase)) => {
            conditions.push(
                "t.id IN (SELECT track_id FROM tracks_trigram WHERE tracks_trigram MATCH ?)"
                    .to_string(),
            );
            params.push(QueryValue::Text(phrase.clone()));
        }
        TrackScope::Containing(Substring::Like(pattern)) => {
            conditions.push(
                "t.id IN (SELECT track_id FROM tracks_trigram \
                 WHERE lower(search_blob) LIKE ? ESCAPE '\\')"
                    .to_string(),
            );
            params.push(QueryValue::Text(pattern.clone()));
        }
    }

    if let Some((condition, values)) = query.filter.render() {
        conditions.push(condition);
        params.extend(values);
    }

    let where_clause = where_clause(&conditions);
    let is_playlist = matches!(query.scope, TrackScope::Playlist(_));

    let mut sql = match query.distinct.partition_column() {
        None => {
            let mut sql = format!("SELECT {} {}{}", select, source, where_clause);
            sql.push_str(&track_order("t", "pt.position", query.order, is_playlist));
            sql
        }
        Some(partition) => {
            let mut sql = format!(
                "SELECT * FROM (SELECT {}, ROW_NUMBER() OVER (PARTITION BY {} ORDER BY t.id) \
                 AS distinct_rank {}{}) AS ranked WHERE ranked.distinct_rank = 1",
                select, partition, source, where_clause
            );
            sql.push_str(&track_order(
                "ranked",
                "ranked.playlist_position",
                query.order,
                is_playlist,
            ));
            sql
        }
    };

    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        params.push(QueryValue::from(limit));
    }

    ComposedQuery { sql, params }
}

fn track_order(qualifier: &str, position: &str, order: TrackOrder, is_playlist: bool) -> String {
    match order {
        TrackOrder::Natural if is_playlist => format!(" ORDER BY {} ASC", position),
        TrackOrder::Natural => String::new(),
        TrackOrder::MostPlayed => format!(
            " ORDER BY {q}.plays DESC, {q}.id ASC",
            q = qualifier
        ),
    }
}

/// Identities of at most `pool_size` tracks passing `filter`, in store order.
pub fn compose_track_pool(filter: &FilterClause, pool_size: usize) -> ComposedQuery {
    let mut params = Vec::new();
    let mut sql = format!(
        "SELECT {} FROM tracks t LEFT JOIN genres g ON g.id = t.genre_id",
        project(&[TRACK_ID_FIELDS])
    );

    if let Some((condition, values)) = filter.render() {
        sql.push_str(" WHERE ");
        sql.push_str(&condition);
        params.extend(values);
    }

    sql.push_str(" LIMIT ?");
    params.push(QueryValue::from(pool_size));

    ComposedQuery { sql, params }
}

/// Scope for album and artist queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityScope {
    Catalog,
    /// Case-insensitive substring match on the title or name.
    Containing(Substring),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityOrder {
    Random,
    /// Title or name ascending, ties broken by id.
    Alphabetical,
}

/// Albums with their owning artist and aggregated track statistics.
pub fn compose_albums(scope: &EntityScope, order: EntityOrder, limit: usize) -> ComposedQuery {
    let mut params = Vec::new();
    let mut sql = format!(
        "SELECT {}, COUNT(t.id) AS track_count, COALESCE(SUM(t.duration), 0) AS total_duration \
         FROM albums al \
         JOIN artists ar ON ar.id = al.artist_id \
         LEFT JOIN tracks t ON t.album_id = al.id",
        project(&[ALBUM_FIELDS, OWNER_ARTIST_FIELDS])
    );

    if let EntityScope::Containing(needle) = scope {
        let (condition, value) =
            substring_condition(needle, "al.id", "albums_trigram", "album_id", "al.title");
        sql.push_str(" WHERE ");
        sql.push_str(&condition);
        params.push(value);
    }

    sql.push_str(" GROUP BY al.id");
    sql.push_str(&entity_order("al.title", "al.id", order));
    sql.push_str(" LIMIT ?");
    params.push(QueryValue::from(limit));

    ComposedQuery { sql, params }
}

pub fn compose_artists(scope: &EntityScope, order: EntityOrder, limit: usize) -> ComposedQuery {
    let mut params = Vec::new();
    let mut sql = format!("SELECT {} FROM artists ar", project(&[ARTIST_FIELDS]));

    if let EntityScope::Containing(needle) = scope {
        let (condition, value) =
            substring_condition(needle, "ar.id", "artists_trigram", "artist_id", "ar.name");
        sql.push_str(" WHERE ");
        sql.push_str(&condition);
        params.push(value);
    }

    sql.push_str(&entity_order("ar.name", "ar.id", order));
    sql.push_str(" LIMIT ?");
    params.push(QueryValue::from(limit));

    ComposedQuery { sql, params }
}

fn substring_condition(
    needle: &Substring,
    id: &str,
    index: &str,
    key: &str,
    label: &str,
) -> (String, QueryValue) {
    match needle {
        Substring::Trigram(phrase) => (
            format!("{} IN (SELECT {} FROM {} WHERE {} MATCH ?)", id, key, index, index),
            QueryValue::Text(phrase.clone()),
        ),
        Substring::Like(pattern) => (
            format!("lower({}) LIKE ? ESCAPE '\\'", label),
            QueryValue::Text(pattern.clone()),
        ),
    }
}

fn entity_order(label: &str, id: &str, order: EntityOrder) -> String {
    match order {
        EntityOrder::Random => " ORDER BY RANDOM()".to_string(),
        EntityOrder::Alphabetical => format!(" ORDER BY {} COLLATE NOCASE ASC, {} ASC", label, id),
    }
}

fn where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}
