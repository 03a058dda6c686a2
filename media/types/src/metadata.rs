/*!
    Container and stream metadata.
*/

use serde::Serialize;

/**
    Well-known metadata keys.

    Containers carry arbitrary key/value tags; these are the keys FFmpeg's
    muxers and demuxers map to their native tag formats.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MetadataKey {
    BrandMajor,
    BrandCompatible,
    /// Creation time, ISO 8601
    CreationTime,
    /// Name of the tool that produced the file
    Encoder,
    Album,
    Artist,
    Comment,
    Composer,
    Copyright,
    /// Release date or year
    Date,
    Disc,
    EncodedBy,
    Filename,
    Genre,
    /// ISO 639-2 language code (usually on streams)
    Language,
    Performer,
    Publisher,
    ServiceName,
    ServiceProvider,
    Title,
    Track,
    VersionMajor,
    VersionMinor,
    Show,
    Season,
    EpisodeSort,
    EpisodeId,
    Compilation,
    GaplessPlayback,
    AccountId,
    Description,
    MediaType,
    PurchaseDate,
    AlbumSort,
    ArtistSort,
    TitleSort,
    Synopsis,
    Grouping,
}

name_table!(MetadataKey, "metadata key", {
    BrandMajor => "major_brand",
    BrandCompatible => "compatible_brands",
    CreationTime => "creation_time",
    Encoder => "encoder",
    Album => "album",
    Artist => "artist",
    Comment => "comment",
    Composer => "composer",
    Copyright => "copyright",
    Date => "date",
    Disc => "disc",
    EncodedBy => "encoded_by",
    Filename => "filename",
    Genre => "genre",
    Language => "language",
    Performer => "performer",
    Publisher => "publisher",
    ServiceName => "service_name",
    ServiceProvider => "service_provider",
    Title => "title",
    Track => "track",
    VersionMajor => "major_version",
    VersionMinor => "minor_version",
    Show => "show",
    Season => "season_number",
    EpisodeSort => "episode_sort",
    EpisodeId => "episode_id",
    Compilation => "compilation",
    GaplessPlayback => "gapless_playback",
    AccountId => "account_id",
    Description => "description",
    MediaType => "media_type",
    PurchaseDate => "purchase_date",
    AlbumSort => "sort_album",
    ArtistSort => "sort_artist",
    TitleSort => "sort_name",
    Synopsis => "synopsis",
    Grouping => "grouping",
});

/**
    A single metadata entry.

    Keys are kept as written by the container; use [`Metadata::key`] to
    recognize well-known ones.
*/
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub key: String,
    pub value: String,
}

impl Metadata {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /**
        Returns the well-known key, if this entry has one.

        Matching is case-insensitive since some demuxers report upper-case
        tag names.
    */
    pub fn key(&self) -> Option<MetadataKey> {
        self.key.to_ascii_lowercase().parse().ok()
    }
}

impl From<(MetadataKey, &str)> for Metadata {
    fn from((key, value): (MetadataKey, &str)) -> Self {
        Self::new(key.name(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::assert_table_round_trips;

    #[test]
    fn names() {
        assert_table_round_trips(MetadataKey::ALL);
        assert_eq!(MetadataKey::Season.name(), "season_number");
        assert_eq!(MetadataKey::TitleSort.name(), "sort_name");
    }

    #[test]
    fn recognizes_known_keys() {
        assert_eq!(Metadata::new("title", "x").key(), Some(MetadataKey::Title));
        assert_eq!(Metadata::new("TITLE", "x").key(), Some(MetadataKey::Title));
        assert_eq!(Metadata::new("handler_name", "x").key(), None);
    }

    #[test]
    fn from_known_key() {
        let m: Metadata = (MetadataKey::Encoder, "mediatool").into();
        assert_eq!(m.key, "encoder");
        assert_eq!(m.value, "mediatool");
    }
}
