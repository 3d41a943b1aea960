//! Inclusion filters and distinct-on strategies for track queries.

use bridge_traits::database::QueryValue;
use serde::{Deserialize, Serialize};

/// Inclusion filter applied to a track query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterClause {
    /// No WHERE condition; the whole catalog is in scope.
    #[default]
    None,
    /// Keep tracks whose genre name is in the list.
    ByGenreNames(Vec<String>),
    /// Keep tracks whose id is in the list.
    ByIds(Vec<i64>),
}

impl FilterClause {
    /// Render the condition and its bound values.
    ///
    /// Returns `None` for [`FilterClause::None`]. An empty inclusion list
    /// renders a condition that matches nothing.
    pub fn render(&self) -> Option<(String, Vec<QueryValue>)> {
        match self {
            FilterClause::None => None,
            FilterClause::ByGenreNames(names) => Some(in_list(
                "g.name",
                names.iter().map(|name| QueryValue::Text(name.clone())).collect(),
            )),
            FilterClause::ByIds(ids) => Some(in_list(
                "t.id",
                ids.iter().copied().map(QueryValue::Integer).collect(),
            )),
        }
    }
}

fn in_list(column: &str, values: Vec<QueryValue>) -> (String, Vec<QueryValue>) {
    if values.is_empty() {
        return ("1 = 0".to_string(), values);
    }
    (
        format!("{} IN ({})", column, placeholders(values.len())),
        values,
    )
}

/// `?, ?, ?` with `count` placeholders.
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Store-side de-duplication of track rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistinctStrategy {
    #[default]
    None,
    /// At most one track per album: the one with the lowest id.
    FirstPerAlbum,
    /// At most one track per artist: the one with the lowest id.
    FirstPerArtist,
}

impl DistinctStrategy {
    /// Column the rows are partitioned on, if any.
    pub fn partition_column(self) -> Option<&'static str> {
        match self {
            DistinctStrategy::None => None,
            DistinctStrategy::FirstPerAlbum => Some("t.album_id"),
            DistinctStrategy::FirstPerArtist => Some("t.artist_id"),
        }
    }
}
