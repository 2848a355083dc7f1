//! Detail levels per media type
//!
//! Each level lists dotted field paths. Levels are cumulative: exporting at
//! level N includes every path listed at levels ≤ N. Level
//! [`FULL_SCHEMA_LEVEL`] bypasses the tables and exports the full schema.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::models::MediaType;

/// Level → dotted field paths introduced at that level
pub type LevelIndex = BTreeMap<u32, Vec<&'static str>>;

/// Sentinel level selecting every field
pub const FULL_SCHEMA_LEVEL: u32 = 9;

static MOVIE_LEVELS: Lazy<LevelIndex> = Lazy::new(|| {
    LevelIndex::from([
        (
            1,
            vec![
                "ratingKey",
                "title",
                "titleSort",
                "originalTitle",
                "originallyAvailableAt",
                "year",
                "rating",
                "ratingImage",
                "audienceRating",
                "audienceRatingImage",
                "userRating",
                "contentRating",
                "studio",
                "tagline",
                "summary",
                "guid",
                "duration",
                "durationHuman",
                "type",
            ],
        ),
        (
            2,
            vec![
                "directors.tag",
                "writers.tag",
                "producers.tag",
                "roles.tag",
                "roles.role",
                "countries.tag",
                "genres.tag",
                "collections.tag",
                "labels.tag",
                "fields.name",
                "fields.locked",
            ],
        ),
        (
            3,
            vec![
                "art",
                "thumb",
                "key",
                "chapterSource",
                "chapters.tag",
                "chapters.index",
                "chapters.start",
                "chapters.end",
                "chapters.thumb",
                "updatedAt",
                "lastViewedAt",
                "viewCount",
            ],
        ),
        (
            4,
            vec![
                "locations",
                "media.aspectRatio",
                "media.audioChannels",
                "media.audioCodec",
                "media.audioProfile",
                "media.bitrate",
                "media.container",
                "media.duration",
                "media.height",
                "media.width",
                "media.videoCodec",
                "media.videoFrameRate",
                "media.videoProfile",
                "media.videoResolution",
                "media.optimizedVersion",
            ],
        ),
        (
            5,
            vec![
                "media.parts.accessible",
                "media.parts.exists",
                "media.parts.file",
                "media.parts.duration",
                "media.parts.container",
                "media.parts.indexes",
                "media.parts.size",
                "media.parts.sizeHuman",
                "media.parts.audioProfile",
                "media.parts.videoProfile",
                "media.parts.optimizedForStreaming",
                "media.parts.deepAnalysisVersion",
            ],
        ),
        (
            6,
            vec![
                "media.parts.videoStreams.codec",
                "media.parts.videoStreams.bitrate",
                "media.parts.videoStreams.language",
                "media.parts.videoStreams.languageCode",
                "media.parts.videoStreams.title",
                "media.parts.videoStreams.displayTitle",
                "media.parts.videoStreams.extendedDisplayTitle",
                "media.parts.videoStreams.hdr",
                "media.parts.videoStreams.bitDepth",
                "media.parts.videoStreams.colorSpace",
                "media.parts.videoStreams.frameRate",
                "media.parts.videoStreams.level",
                "media.parts.videoStreams.profile",
                "media.parts.videoStreams.refFrames",
                "media.parts.videoStreams.scanType",
                "media.parts.videoStreams.default",
                "media.parts.videoStreams.height",
                "media.parts.videoStreams.width",
                "media.parts.audioStreams.codec",
                "media.parts.audioStreams.bitrate",
                "media.parts.audioStreams.language",
                "media.parts.audioStreams.languageCode",
                "media.parts.audioStreams.title",
                "media.parts.audioStreams.displayTitle",
                "media.parts.audioStreams.extendedDisplayTitle",
                "media.parts.audioStreams.bitDepth",
                "media.parts.audioStreams.channels",
                "media.parts.audioStreams.audioChannelLayout",
                "media.parts.audioStreams.profile",
                "media.parts.audioStreams.samplingRate",
                "media.parts.audioStreams.default",
                "media.parts.subtitleStreams.codec",
                "media.parts.subtitleStreams.format",
                "media.parts.subtitleStreams.language",
                "media.parts.subtitleStreams.languageCode",
                "media.parts.subtitleStreams.title",
                "media.parts.subtitleStreams.displayTitle",
                "media.parts.subtitleStreams.extendedDisplayTitle",
                "media.parts.subtitleStreams.forced",
                "media.parts.subtitleStreams.default",
            ],
        ),
    ])
});

static SHOW_LEVELS: Lazy<LevelIndex> = Lazy::new(|| {
    LevelIndex::from([
        (
            1,
            vec![
                "ratingKey",
                "title",
                "titleSort",
                "originallyAvailableAt",
                "year",
                "rating",
                "userRating",
                "contentRating",
                "studio",
                "summary",
                "guid",
                "duration",
                "durationHuman",
                "type",
                "childCount",
                "leafCount",
            ],
        ),
        (
            2,
            vec![
                "roles.tag",
                "roles.role",
                "genres.tag",
                "collections.tag",
                "labels.tag",
                "fields.name",
                "fields.locked",
            ],
        ),
        (
            3,
            vec![
                "art",
                "banner",
                "theme",
                "thumb",
                "key",
                "updatedAt",
                "lastViewedAt",
                "viewCount",
                "viewedLeafCount",
                "locations",
            ],
        ),
    ])
});

static SEASON_LEVELS: Lazy<LevelIndex> = Lazy::new(|| {
    LevelIndex::from([
        (
            1,
            vec![
                "ratingKey",
                "title",
                "titleSort",
                "index",
                "parentTitle",
                "parentIndex",
                "parentRatingKey",
                "summary",
                "guid",
                "type",
                "leafCount",
            ],
        ),
        (2, vec!["fields.name", "fields.locked"]),
        (
            3,
            vec![
                "art",
                "thumb",
                "key",
                "parentThumb",
                "parentTheme",
                "updatedAt",
                "lastViewedAt",
                "viewCount",
                "viewedLeafCount",
            ],
        ),
    ])
});

static EPISODE_LEVELS: Lazy<LevelIndex> = Lazy::new(|| {
    LevelIndex::from([
        (
            1,
            vec![
                "ratingKey",
                "title",
                "titleSort",
                "index",
                "parentTitle",
                "parentIndex",
                "grandparentTitle",
                "originallyAvailableAt",
                "year",
                "rating",
                "userRating",
                "contentRating",
                "summary",
                "guid",
                "duration",
                "durationHuman",
                "type",
            ],
        ),
        (
            2,
            vec![
                "directors.tag",
                "writers.tag",
                "fields.name",
                "fields.locked",
            ],
        ),
        (
            3,
            vec![
                "art",
                "thumb",
                "key",
                "chapterSource",
                "grandparentThumb",
                "parentThumb",
                "updatedAt",
                "lastViewedAt",
                "viewCount",
                "locations",
            ],
        ),
    ])
});

static ARTIST_LEVELS: Lazy<LevelIndex> = Lazy::new(|| {
    LevelIndex::from([
        (
            1,
            vec![
                "ratingKey",
                "title",
                "titleSort",
                "rating",
                "userRating",
                "summary",
                "guid",
                "type",
            ],
        ),
        (
            2,
            vec![
                "collections.tag",
                "countries.tag",
                "genres.tag",
                "moods.tag",
                "styles.tag",
                "fields.name",
                "fields.locked",
            ],
        ),
        (
            3,
            vec![
                "art",
                "thumb",
                "key",
                "updatedAt",
                "lastViewedAt",
                "viewCount",
                "locations",
            ],
        ),
    ])
});

static ALBUM_LEVELS: Lazy<LevelIndex> = Lazy::new(|| {
    LevelIndex::from([
        (
            1,
            vec![
                "ratingKey",
                "title",
                "titleSort",
                "parentTitle",
                "originallyAvailableAt",
                "rating",
                "userRating",
                "summary",
                "guid",
                "type",
                "leafCount",
            ],
        ),
        (
            2,
            vec![
                "collections.tag",
                "genres.tag",
                "labels.tag",
                "moods.tag",
                "styles.tag",
                "fields.name",
                "fields.locked",
            ],
        ),
        (
            3,
            vec![
                "art",
                "thumb",
                "key",
                "parentThumb",
                "updatedAt",
                "lastViewedAt",
                "viewCount",
                "viewedLeafCount",
                "loudnessAnalysisVersion",
            ],
        ),
    ])
});

static TRACK_LEVELS: Lazy<LevelIndex> = Lazy::new(|| {
    LevelIndex::from([
        (
            1,
            vec![
                "ratingKey",
                "title",
                "titleSort",
                "originalTitle",
                "index",
                "parentTitle",
                "parentIndex",
                "grandparentTitle",
                "year",
                "ratingCount",
                "userRating",
                "summary",
                "guid",
                "duration",
                "durationHuman",
                "type",
            ],
        ),
        (2, vec!["moods.tag"]),
        (
            3,
            vec![
                "art",
                "thumb",
                "key",
                "parentThumb",
                "grandparentThumb",
                "updatedAt",
                "lastViewedAt",
                "viewCount",
            ],
        ),
    ])
});

static PHOTO_ALBUM_LEVELS: Lazy<LevelIndex> = Lazy::new(|| {
    LevelIndex::from([
        (1, vec!["ratingKey", "title", "summary", "guid", "type"]),
        (2, vec!["index", "librarySectionTitle"]),
        (3, vec!["art", "thumb", "composite", "key", "addedAt", "updatedAt"]),
    ])
});

static PHOTO_LEVELS: Lazy<LevelIndex> = Lazy::new(|| {
    LevelIndex::from([
        (
            1,
            vec![
                "ratingKey",
                "title",
                "parentTitle",
                "originallyAvailableAt",
                "year",
                "summary",
                "guid",
                "type",
            ],
        ),
        (2, vec!["tag.tag", "tag.title"]),
        (
            3,
            vec![
                "thumb",
                "key",
                "parentThumb",
                "addedAt",
                "updatedAt",
                "createdAtAccuracy",
                "createdAtTZOffset",
            ],
        ),
    ])
});

static COLLECTION_LEVELS: Lazy<LevelIndex> = Lazy::new(|| {
    LevelIndex::from([
        (
            1,
            vec![
                "ratingKey",
                "title",
                "subtype",
                "summary",
                "guid",
                "type",
                "childCount",
                "minYear",
                "maxYear",
            ],
        ),
        (
            2,
            vec![
                "contentRating",
                "collectionMode",
                "collectionSort",
                "fields.name",
                "fields.locked",
            ],
        ),
        (3, vec!["thumb", "key", "addedAt", "updatedAt"]),
    ])
});

static PLAYLIST_LEVELS: Lazy<LevelIndex> = Lazy::new(|| {
    LevelIndex::from([
        (
            1,
            vec![
                "ratingKey",
                "title",
                "playlistType",
                "smart",
                "summary",
                "guid",
                "duration",
                "durationHuman",
                "type",
                "leafCount",
            ],
        ),
        (2, vec!["addedAt", "updatedAt"]),
        (3, vec!["composite", "key"]),
    ])
});

/// Level table for a media type
pub fn levels_for(media_type: MediaType) -> &'static LevelIndex {
    match media_type {
        MediaType::Movie => &MOVIE_LEVELS,
        MediaType::Show => &SHOW_LEVELS,
        MediaType::Season => &SEASON_LEVELS,
        MediaType::Episode => &EPISODE_LEVELS,
        MediaType::Artist => &ARTIST_LEVELS,
        MediaType::Album => &ALBUM_LEVELS,
        MediaType::Track => &TRACK_LEVELS,
        MediaType::PhotoAlbum => &PHOTO_ALBUM_LEVELS,
        MediaType::Photo => &PHOTO_LEVELS,
        MediaType::Collection => &COLLECTION_LEVELS,
        MediaType::Playlist => &PLAYLIST_LEVELS,
    }
}
