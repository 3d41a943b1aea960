//! Domain models for the music catalog
//!
//! These are the shapes the catalog hands to the transport layer. Every
//! record is built complete from a store row and only trimmed by
//! [`crate::redact`] on its way out.

use serde::{Deserialize, Serialize};

// =============================================================================
// Embedded references
// =============================================================================

/// Owning album as embedded in a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: i64,
    pub title: String,
    /// Artwork reference (relative media path or absolute URL)
    pub artwork: Option<String>,
}

/// Owning artist as embedded in a track or album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Track
// =============================================================================

/// A playable track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub title: String,
    /// Explicit content flag
    pub explicit: bool,
    /// Genre name, if the track is tagged with one
    pub genre: Option<String>,
    /// Position on the owning album
    pub track_number: Option<i64>,
    /// Storage reference for the audio file.
    ///
    /// Always present when the record leaves the store; cleared for callers
    /// that are not authorized to stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Play counter
    pub plays: i64,
    /// Duration in seconds
    pub duration: i64,
    pub lossless: bool,
    pub album: AlbumRef,
    pub artist: ArtistRef,
    /// Whether the requesting user has favorited this track
    #[serde(default)]
    pub is_favorite: bool,
}

// =============================================================================
// Album
// =============================================================================

/// An album with aggregated track statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub year: Option<i64>,
    pub artwork: Option<String>,
    pub artist: ArtistRef,
    /// Number of tracks on the album
    pub track_count: i64,
    /// Sum of track durations in seconds
    pub duration: i64,
}

// =============================================================================
// Artist
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub video: Option<String>,
}

// =============================================================================
// Search
// =============================================================================

/// Combined search output. Each list is capped by its configured limit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub tracks: Vec<Track>,
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty() && self.artists.is_empty() && self.albums.is_empty()
    }
}

// =============================================================================
// Caller
// =============================================================================

/// Who is asking. Read-only for the catalog; produced by the transport layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    /// Whether the caller may stream audio (and therefore see file references)
    pub is_authorized: bool,
    /// Identity used for the favorite flag
    pub user_id: Option<i64>,
}

impl CallerContext {
    pub fn new(is_authorized: bool, user_id: Option<i64>) -> Self {
        Self {
            is_authorized,
            user_id,
        }
    }

    /// An authenticated user with streaming rights
    pub fn authorized(user_id: i64) -> Self {
        Self::new(true, Some(user_id))
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}
