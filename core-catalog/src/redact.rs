//! Outbound shaping
//!
//! [`Redact`] strips fields the caller may not see; [`ArtworkResolver`]
//! turns stored media references into client-usable URLs. Both run on
//! complete records as the last step before they leave the catalog.

use crate::models::{Album, Artist, CallerContext, SearchResult, Track};

/// Per-record access redaction. Must be idempotent.
pub trait Redact {
    fn redact(self, ctx: &CallerContext) -> Self;
}

impl Redact for Track {
    fn redact(mut self, ctx: &CallerContext) -> Self {
        if !ctx.is_authorized {
            self.file = None;
        }
        self
    }
}

// Albums and artists carry no protected fields.
impl Redact for Album {
    fn redact(self, _ctx: &CallerContext) -> Self {
        self
    }
}

impl Redact for Artist {
    fn redact(self, _ctx: &CallerContext) -> Self {
        self
    }
}

impl<T: Redact> Redact for Vec<T> {
    fn redact(self, ctx: &CallerContext) -> Self {
        self.into_iter().map(|item| item.redact(ctx)).collect()
    }
}

impl Redact for SearchResult {
    fn redact(self, ctx: &CallerContext) -> Self {
        SearchResult {
            tracks: self.tracks.redact(ctx),
            artists: self.artists.redact(ctx),
            albums: self.albums.redact(ctx),
        }
    }
}

/// Prefixes relative artwork and avatar references with the media base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkResolver {
    base_url: String,
}

impl ArtworkResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute `http(s)://` references pass through untouched.
    pub fn resolve(&self, reference: Option<String>) -> Option<String> {
        let reference = reference?;
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Some(reference);
        }
        Some(format!(
            "{}/{}",
            self.base_url,
            reference.trim_start_matches('/')
        ))
    }

    pub fn track(&self, mut track: Track) -> Track {
        track.album.artwork = self.resolve(track.album.artwork.take());
        track
    }

    pub fn album(&self, mut album: Album) -> Album {
        album.artwork = self.resolve(album.artwork.take());
        album
    }

    pub fn artist(&self, mut artist: Artist) -> Artist {
        artist.avatar = self.resolve(artist.avatar.take());
        artist
    }

    pub fn search(&self, result: SearchResult) -> SearchResult {
        SearchResult {
            tracks: result.tracks.into_iter().map(|t| self.track(t)).collect(),
            artists: result.artists.into_iter().map(|a| self.artist(a)).collect(),
            albums: result.albums.into_iter().map(|a| self.album(a)).collect(),
        }
    }
}
