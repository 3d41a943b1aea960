//! Row decoding
//!
//! Column names match the output names produced by [`crate::projection`].
//! A missing or mistyped column is a store-side fault and surfaces as
//! [`CatalogError::CatalogUnavailable`].

use crate::error::{CatalogError, Result};
use crate::models::{Album, AlbumRef, Artist, ArtistRef, Track};
use bridge_traits::database::QueryRow;

pub(crate) fn row_to_track(row: &QueryRow) -> Result<Track> {
    Ok(Track {
        id: required_i64(row, "id")?,
        title: required_string(row, "title")?,
        explicit: required_flag(row, "explicit")?,
        genre: optional_string(row, "genre_name"),
        track_number: optional_i64(row, "track_number"),
        file: Some(required_string(row, "file")?),
        plays: required_i64(row, "plays")?,
        duration: required_i64(row, "duration")?,
        lossless: required_flag(row, "lossless")?,
        album: AlbumRef {
            id: required_i64(row, "album_id")?,
            title: required_string(row, "album_title")?,
            artwork: optional_string(row, "album_artwork"),
        },
        artist: owner_artist(row)?,
        is_favorite: required_flag(row, "is_favorite")?,
    })
}

pub(crate) fn row_to_album(row: &QueryRow) -> Result<Album> {
    Ok(Album {
        id: required_i64(row, "id")?,
        title: required_string(row, "title")?,
        year: optional_i64(row, "year"),
        artwork: optional_string(row, "artwork"),
        artist: owner_artist(row)?,
        track_count: required_i64(row, "track_count")?,
        duration: required_i64(row, "total_duration")?,
    })
}

pub(crate) fn row_to_artist(row: &QueryRow) -> Result<Artist> {
    Ok(Artist {
        id: required_i64(row, "id")?,
        name: required_string(row, "name")?,
        avatar: optional_string(row, "avatar"),
        bio: optional_string(row, "bio"),
        video: optional_string(row, "video"),
    })
}

pub(crate) fn rows_to<T>(
    rows: &[QueryRow],
    decode: impl Fn(&QueryRow) -> Result<T>,
) -> Result<Vec<T>> {
    rows.iter().map(decode).collect()
}

fn owner_artist(row: &QueryRow) -> Result<ArtistRef> {
    Ok(ArtistRef {
        id: required_i64(row, "artist_id")?,
        name: required_string(row, "artist_name")?,
    })
}

pub(crate) fn required_i64(row: &QueryRow, column: &str) -> Result<i64> {
    optional_i64(row, column).ok_or_else(|| missing_column(column))
}

fn optional_i64(row: &QueryRow, column: &str) -> Option<i64> {
    row.get(column).and_then(|value| value.as_i64())
}

fn required_string(row: &QueryRow, column: &str) -> Result<String> {
    optional_string(row, column).ok_or_else(|| missing_column(column))
}

fn optional_string(row: &QueryRow, column: &str) -> Option<String> {
    row.get(column).and_then(|value| value.as_string())
}

fn required_flag(row: &QueryRow, column: &str) -> Result<bool> {
    row.get(column)
        .and_then(|value| value.as_bool())
        .ok_or_else(|| missing_column(column))
}

fn missing_column(column: &str) -> CatalogError {
    CatalogError::CatalogUnavailable(format!("missing or mistyped column `{}` in result set", column))
}
