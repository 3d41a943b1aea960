//! Column projection fragments.
//!
//! Every catalog query selects columns through a [`FieldSet`]: a fixed, ordered
//! list of column names qualified by a table alias. Rendering is pure string
//! assembly over `'static` identifiers; no user input ever reaches this module.

/// Track columns read from `tracks t`.
pub const TRACK_FIELDS: FieldSet = FieldSet::new(
    "t",
    &[
        "id",
        "title",
        "explicit",
        "track_number",
        "file",
        "plays",
        "duration",
        "lossless",
    ],
);

/// Owning-album columns embedded in a track row.
pub const TRACK_ALBUM_FIELDS: FieldSet =
    FieldSet::new("al", &["id", "title", "artwork"]).prefixed("album_");

/// Owning-artist columns embedded in a track or album row.
pub const OWNER_ARTIST_FIELDS: FieldSet = FieldSet::new("ar", &["id", "name"]).prefixed("artist_");

/// Genre name embedded in a track row.
pub const TRACK_GENRE_FIELDS: FieldSet = FieldSet::new("g", &["name"]).prefixed("genre_");

/// Identity-only projection used for the sampling pool.
pub const TRACK_ID_FIELDS: FieldSet = FieldSet::new("t", &["id"]);

/// Album columns read from `albums al`.
pub const ALBUM_FIELDS: FieldSet = FieldSet::new("al", &["id", "title", "year", "artwork"]);

/// Artist columns read from `artists ar`.
pub const ARTIST_FIELDS: FieldSet =
    FieldSet::new("ar", &["id", "name", "avatar", "bio", "video"]);

/// An ordered set of columns on one aliased table.
///
/// Without a prefix a set renders as `alias.col1, alias.col2`; with a prefix
/// each column is renamed `alias.col AS prefixcol` so that several tables can
/// share one result row without name collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSet {
    alias: &'static str,
    columns: &'static [&'static str],
    prefix: Option<&'static str>,
}

impl FieldSet {
    pub const fn new(alias: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            alias,
            columns,
            prefix: None,
        }
    }

    /// Rename every output column to `prefix + column`.
    pub const fn prefixed(self, prefix: &'static str) -> Self {
        Self {
            prefix: Some(prefix),
            ..self
        }
    }

    pub fn alias(&self) -> &'static str {
        self.alias
    }

    /// Name the column will carry in the result row.
    pub fn output_name(&self, column: &str) -> String {
        match self.prefix {
            Some(prefix) => format!("{}{}", prefix, column),
            None => column.to_string(),
        }
    }

    /// Render the projection fragment.
    ///
    /// # Panics
    ///
    /// Panics if the set has no columns. Field sets are compile-time
    /// constants, so an empty one is a programming error.
    pub fn render(&self) -> String {
        assert!(
            !self.columns.is_empty(),
            "field set on alias `{}` must name at least one column",
            self.alias
        );

        self.columns
            .iter()
            .map(|column| match self.prefix {
                Some(prefix) => format!("{}.{} AS {}{}", self.alias, column, prefix, column),
                None => format!("{}.{}", self.alias, column),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Render several field sets into one select list.
///
/// # Panics
///
/// Panics if `sets` is empty or any set has no columns.
pub fn project(sets: &[FieldSet]) -> String {
    assert!(!sets.is_empty(), "projection needs at least one field set");
    sets.iter()
        .map(FieldSet::render)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_alias_qualified_columns_in_order() {
        let set = FieldSet::new("t", &["id", "title", "plays"]);
        assert_eq!(set.render(), "t.id, t.title, t.plays");
    }

    #[test]
    fn test_prefixed_set_renames_columns() {
        assert_eq!(
            TRACK_ALBUM_FIELDS.render(),
            "al.id AS album_id, al.title AS album_title, al.artwork AS album_artwork"
        );
        assert_eq!(TRACK_ALBUM_FIELDS.output_name("id"), "album_id");
        assert_eq!(TRACK_FIELDS.output_name("id"), "id");
    }

    #[test]
    fn test_project_joins_sets() {
        let sql = project(&[TRACK_ID_FIELDS, TRACK_GENRE_FIELDS]);
        assert_eq!(sql, "t.id, g.name AS genre_name");
    }

    #[test]
    #[should_panic(expected = "must name at least one column")]
    fn test_empty_field_set_fails_fast() {
        FieldSet::new("t", &[]).render();
    }

    #[test]
    #[should_panic(expected = "at least one field set")]
    fn test_empty_projection_fails_fast() {
        project(&[]);
    }
}
