//! Shared fixtures for unit tests.

use bridge_traits::database::{CatalogStore, QueryRow, QueryValue};
use mockall::mock;

mock! {
    pub Store {}

    #[async_trait::async_trait]
    impl CatalogStore for Store {
        async fn query(&self, query: &str, params: &[QueryValue]) -> bridge_traits::error::Result<Vec<QueryRow>>;
        async fn health_check(&self) -> bridge_traits::error::Result<()>;
    }
}

/// A complete track row as [`crate::query::compose_tracks`] would return it.
pub fn track_row(id: i64, title: &str, plays: i64) -> QueryRow {
    let mut row = QueryRow::new();
    row.insert("id".into(), QueryValue::Integer(id));
    row.insert("title".into(), QueryValue::Text(title.into()));
    row.insert("explicit".into(), QueryValue::Integer(0));
    row.insert("track_number".into(), QueryValue::Integer(1));
    row.insert("file".into(), QueryValue::Text(format!("audio/{}.flac", id)));
    row.insert("plays".into(), QueryValue::Integer(plays));
    row.insert("duration".into(), QueryValue::Integer(180));
    row.insert("lossless".into(), QueryValue::Integer(1));
    row.insert("album_id".into(), QueryValue::Integer(100 + id));
    row.insert("album_title".into(), QueryValue::Text("Album".into()));
    row.insert("album_artwork".into(), QueryValue::Text("art/cover.jpg".into()));
    row.insert("artist_id".into(), QueryValue::Integer(200 + id));
    row.insert("artist_name".into(), QueryValue::Text("Artist".into()));
    row.insert("genre_name".into(), QueryValue::Text("Rock".into()));
    row.insert("is_favorite".into(), QueryValue::Integer(0));
    row
}

pub fn artist_row(id: i64, name: &str) -> QueryRow {
    let mut row = QueryRow::new();
    row.insert("id".into(), QueryValue::Integer(id));
    row.insert("name".into(), QueryValue::Text(name.into()));
    row.insert("avatar".into(), QueryValue::Text(format!("avatars/{}.jpg", id)));
    row.insert("bio".into(), QueryValue::Null);
    row.insert("video".into(), QueryValue::Null);
    row
}

pub fn album_row(id: i64, title: &str) -> QueryRow {
    let mut row = QueryRow::new();
    row.insert("id".into(), QueryValue::Integer(id));
    row.insert("title".into(), QueryValue::Text(title.into()));
    row.insert("year".into(), QueryValue::Integer(1999));
    row.insert("artwork".into(), QueryValue::Text(format!("art/{}.jpg", id)));
    row.insert("artist_id".into(), QueryValue::Integer(1));
    row.insert("artist_name".into(), QueryValue::Text("Artist".into()));
    row.insert("track_count".into(), QueryValue::Integer(10));
    row.insert("total_duration".into(), QueryValue::Integer(2400));
    row
}
