//! Full field schema for every exportable media type
//!
//! Built once per process on first use. Detail levels select subsets of
//! these tables (see `schema::levels`); level 9 exports them whole.

use once_cell::sync::Lazy;

use super::transforms::{
    CHILDREN, HDR, HUMAN_DURATION, HUMAN_FILE_SIZE, ISO_DATE, ISO_DATETIME, REQUIRED_BANDWIDTHS,
};
use super::Schema;
use crate::models::MediaType;

// ============================================================================
// Shared sub-schemas
// ============================================================================

/// `{id, tag}` tag lists (genres, directors, collections...)
fn tags() -> Schema {
    Schema::builder().scalars(&["id", "tag"]).build()
}

fn fields() -> Schema {
    Schema::builder().scalars(&["name", "locked"]).build()
}

fn roles() -> Schema {
    Schema::builder()
        .scalars(&["id", "tag", "role", "thumb"])
        .build()
}

fn chapters() -> Schema {
    Schema::builder()
        .scalars(&["id", "tag", "index", "start", "end", "thumb"])
        .build()
}

/// Attributes common to every stream kind
const STREAM_COMMON: &[&str] = &[
    "codec",
    "codecID",
    "default",
    "displayTitle",
    "extendedDisplayTitle",
    "id",
    "index",
    "streamType",
    "title",
    "type",
];

fn video_stream() -> Schema {
    Schema::builder()
        .scalars(STREAM_COMMON)
        .scalars(&[
            "language",
            "languageCode",
            "selected",
            "bitDepth",
            "bitrate",
            "cabac",
            "chromaLocation",
            "chromaSubsampling",
            "colorPrimaries",
            "colorRange",
            "colorSpace",
            "colorTrc",
            "duration",
            "frameRate",
            "frameRateMode",
            "hasScalingMatrix",
            "height",
            "level",
            "pixelAspectRatio",
            "pixelFormat",
            "profile",
            "refFrames",
            "scanType",
            "streamIdentifier",
            "width",
        ])
        .transform("hdr", HDR)
        .transform("requiredBandwidths", REQUIRED_BANDWIDTHS)
        .build()
}

fn video_audio_stream() -> Schema {
    Schema::builder()
        .scalars(STREAM_COMMON)
        .scalars(&[
            "language",
            "languageCode",
            "selected",
            "audioChannelLayout",
            "bitDepth",
            "bitrate",
            "bitrateMode",
            "channels",
            "dialogNorm",
            "duration",
            "profile",
            "samplingRate",
        ])
        .transform("requiredBandwidths", REQUIRED_BANDWIDTHS)
        .build()
}

fn subtitle_stream() -> Schema {
    Schema::builder()
        .scalars(STREAM_COMMON)
        .scalars(&[
            "language",
            "languageCode",
            "selected",
            "forced",
            "format",
            "headerCompression",
            "key",
        ])
        .transform("requiredBandwidths", REQUIRED_BANDWIDTHS)
        .build()
}

/// Media versions of movies and episodes
fn video_media() -> Schema {
    let parts = Schema::builder()
        .scalars(&[
            "accessible",
            "audioProfile",
            "container",
            "deepAnalysisVersion",
            "duration",
            "exists",
            "file",
            "has64bitOffsets",
            "id",
            "indexes",
            "key",
            "size",
            "optimizedForStreaming",
            "syncItemId",
            "syncState",
            "videoProfile",
        ])
        .transform("sizeHuman", HUMAN_FILE_SIZE)
        .transform("requiredBandwidths", REQUIRED_BANDWIDTHS)
        .nested("videoStreams", video_stream())
        .nested("audioStreams", video_audio_stream())
        .nested("subtitleStreams", subtitle_stream())
        .build();

    Schema::builder()
        .scalars(&[
            "aspectRatio",
            "audioChannels",
            "audioCodec",
            "audioProfile",
            "bitrate",
            "container",
            "duration",
            "height",
            "id",
            "has64bitOffsets",
            "optimizedForStreaming",
            "optimizedVersion",
            "target",
            "title",
            "videoCodec",
            "videoFrameRate",
            "videoProfile",
            "videoResolution",
            "width",
        ])
        .nested("parts", parts)
        .build()
}

fn track_media() -> Schema {
    let audio_streams = Schema::builder()
        .scalars(STREAM_COMMON)
        .scalars(&[
            "selected",
            "albumGain",
            "albumPeak",
            "albumRange",
            "audioChannelLayout",
            "bitrate",
            "channels",
            "duration",
            "endRamp",
            "gain",
            "loudness",
            "lra",
            "peak",
            "samplingRate",
            "startRamp",
        ])
        .transform("requiredBandwidths", REQUIRED_BANDWIDTHS)
        .build();

    let lyric_streams = Schema::builder()
        .scalars(STREAM_COMMON)
        .scalars(&["minLines", "provider", "timed", "format", "key"])
        .build();

    let parts = Schema::builder()
        .scalars(&[
            "accessible",
            "audioProfile",
            "container",
            "deepAnalysisVersion",
            "duration",
            "exists",
            "file",
            "hasThumbnail",
            "id",
            "key",
            "size",
            "syncItemId",
            "syncState",
        ])
        .transform("sizeHuman", HUMAN_FILE_SIZE)
        .transform("requiredBandwidths", REQUIRED_BANDWIDTHS)
        .nested("audioStreams", audio_streams)
        .nested("lyricStreams", lyric_streams)
        .build();

    Schema::builder()
        .scalars(&[
            "audioChannels",
            "audioCodec",
            "audioProfile",
            "bitrate",
            "container",
            "duration",
            "id",
            "title",
        ])
        .nested("parts", parts)
        .build()
}

fn photo_media() -> Schema {
    let parts = Schema::builder()
        .scalars(&["accessible", "container", "exists", "file", "id", "key", "size"])
        .transform("sizeHuman", HUMAN_FILE_SIZE)
        .build();

    Schema::builder()
        .scalars(&[
            "aperture",
            "aspectRatio",
            "container",
            "height",
            "id",
            "iso",
            "lens",
            "make",
            "model",
            "width",
        ])
        .nested("parts", parts)
        .build()
}

// ============================================================================
// Per-type schemas
// ============================================================================

static MOVIE: Lazy<Schema> = Lazy::new(|| {
    Schema::builder()
        .transform("addedAt", ISO_DATETIME)
        .scalars(&[
            "art",
            "audienceRating",
            "audienceRatingImage",
            "chapterSource",
            "contentRating",
            "duration",
            "guid",
            "key",
            "librarySectionID",
            "librarySectionKey",
            "librarySectionTitle",
            "locations",
            "originalTitle",
            "rating",
            "ratingImage",
            "ratingKey",
            "studio",
            "summary",
            "tagline",
            "thumb",
            "title",
            "titleSort",
            "type",
            "userRating",
            "viewCount",
            "year",
        ])
        .nested("chapters", chapters())
        .nested("collections", tags())
        .nested("countries", tags())
        .nested("directors", tags())
        .transform("durationHuman", HUMAN_DURATION)
        .nested("fields", fields())
        .nested("genres", tags())
        .nested("labels", tags())
        .transform("lastViewedAt", ISO_DATETIME)
        .nested("media", video_media())
        .transform("originallyAvailableAt", ISO_DATE)
        .nested("producers", tags())
        .nested("roles", roles())
        .transform("updatedAt", ISO_DATETIME)
        .nested("writers", tags())
        .build()
});

static SHOW: Lazy<Schema> = Lazy::new(|| {
    Schema::builder()
        .transform("addedAt", ISO_DATETIME)
        .scalars(&[
            "art",
            "banner",
            "childCount",
            "contentRating",
            "duration",
            "guid",
            "index",
            "key",
            "leafCount",
            "librarySectionID",
            "librarySectionKey",
            "librarySectionTitle",
            "locations",
            "rating",
            "ratingKey",
            "studio",
            "summary",
            "theme",
            "thumb",
            "title",
            "titleSort",
            "type",
            "userRating",
            "viewCount",
            "viewedLeafCount",
            "year",
        ])
        .nested("collections", tags())
        .transform("durationHuman", HUMAN_DURATION)
        .nested("fields", fields())
        .nested("genres", tags())
        .nested("labels", tags())
        .transform("lastViewedAt", ISO_DATETIME)
        .transform("originallyAvailableAt", ISO_DATE)
        .nested("roles", roles())
        .transform("seasons", CHILDREN)
        .transform("updatedAt", ISO_DATETIME)
        .build()
});

static SEASON: Lazy<Schema> = Lazy::new(|| {
    Schema::builder()
        .transform("addedAt", ISO_DATETIME)
        .scalars(&[
            "art",
            "guid",
            "index",
            "key",
            "leafCount",
            "librarySectionID",
            "librarySectionKey",
            "librarySectionTitle",
            "parentGuid",
            "parentIndex",
            "parentKey",
            "parentRatingKey",
            "parentTheme",
            "parentThumb",
            "parentTitle",
            "ratingKey",
            "summary",
            "thumb",
            "title",
            "titleSort",
            "type",
            "userRating",
            "viewCount",
            "viewedLeafCount",
        ])
        .transform("episodes", CHILDREN)
        .nested("fields", fields())
        .transform("lastViewedAt", ISO_DATETIME)
        .transform("updatedAt", ISO_DATETIME)
        .build()
});

static EPISODE: Lazy<Schema> = Lazy::new(|| {
    Schema::builder()
        .transform("addedAt", ISO_DATETIME)
        .scalars(&[
            "art",
            "chapterSource",
            "contentRating",
            "duration",
            "grandparentArt",
            "grandparentGuid",
            "grandparentKey",
            "grandparentRatingKey",
            "grandparentTheme",
            "grandparentThumb",
            "grandparentTitle",
            "guid",
            "index",
            "key",
            "librarySectionID",
            "librarySectionKey",
            "librarySectionTitle",
            "locations",
            "parentGuid",
            "parentIndex",
            "parentKey",
            "parentRatingKey",
            "parentThumb",
            "parentTitle",
            "rating",
            "ratingKey",
            "summary",
            "thumb",
            "title",
            "titleSort",
            "type",
            "userRating",
            "viewCount",
            "year",
        ])
        .nested("directors", tags())
        .transform("durationHuman", HUMAN_DURATION)
        .nested("fields", fields())
        .transform("lastViewedAt", ISO_DATETIME)
        .nested("media", video_media())
        .transform("originallyAvailableAt", ISO_DATE)
        .transform("updatedAt", ISO_DATETIME)
        .nested("writers", tags())
        .build()
});

static ARTIST: Lazy<Schema> = Lazy::new(|| {
    Schema::builder()
        .transform("addedAt", ISO_DATETIME)
        .scalars(&[
            "art",
            "guid",
            "index",
            "key",
            "librarySectionID",
            "librarySectionKey",
            "librarySectionTitle",
            "locations",
            "rating",
            "ratingKey",
            "summary",
            "thumb",
            "title",
            "titleSort",
            "type",
            "userRating",
            "viewCount",
        ])
        .transform("albums", CHILDREN)
        .nested("collections", tags())
        .nested("countries", tags())
        .nested("fields", fields())
        .nested("genres", tags())
        .transform("lastViewedAt", ISO_DATETIME)
        .nested("moods", tags())
        .nested("styles", tags())
        .transform("updatedAt", ISO_DATETIME)
        .build()
});

static ALBUM: Lazy<Schema> = Lazy::new(|| {
    Schema::builder()
        .transform("addedAt", ISO_DATETIME)
        .scalars(&[
            "art",
            "guid",
            "index",
            "key",
            "leafCount",
            "librarySectionID",
            "librarySectionKey",
            "librarySectionTitle",
            "loudnessAnalysisVersion",
            "parentGuid",
            "parentKey",
            "parentRatingKey",
            "parentThumb",
            "parentTitle",
            "rating",
            "ratingKey",
            "summary",
            "thumb",
            "title",
            "titleSort",
            "type",
            "userRating",
            "viewCount",
            "viewedLeafCount",
        ])
        .nested("collections", tags())
        .nested("fields", fields())
        .nested("genres", tags())
        .nested("labels", tags())
        .transform("lastViewedAt", ISO_DATETIME)
        .nested("moods", tags())
        .transform("originallyAvailableAt", ISO_DATE)
        .nested("styles", tags())
        .transform("tracks", CHILDREN)
        .transform("updatedAt", ISO_DATETIME)
        .build()
});

static TRACK: Lazy<Schema> = Lazy::new(|| {
    Schema::builder()
        .transform("addedAt", ISO_DATETIME)
        .scalars(&[
            "art",
            "duration",
            "grandparentArt",
            "grandparentGuid",
            "grandparentKey",
            "grandparentRatingKey",
            "grandparentThumb",
            "grandparentTitle",
            "guid",
            "index",
            "key",
            "librarySectionID",
            "librarySectionKey",
            "librarySectionTitle",
            "originalTitle",
            "parentGuid",
            "parentIndex",
            "parentKey",
            "parentRatingKey",
            "parentThumb",
            "parentTitle",
            "ratingCount",
            "ratingKey",
            "summary",
            "thumb",
            "title",
            "titleSort",
            "type",
            "userRating",
            "viewCount",
            "year",
        ])
        .transform("durationHuman", HUMAN_DURATION)
        .transform("lastViewedAt", ISO_DATETIME)
        .nested("media", track_media())
        .nested("moods", tags())
        .transform("updatedAt", ISO_DATETIME)
        .build()
});

static PHOTO_ALBUM: Lazy<Schema> = Lazy::new(|| {
    Schema::builder()
        .transform("addedAt", ISO_DATETIME)
        .scalars(&[
            "art",
            "composite",
            "guid",
            "index",
            "key",
            "librarySectionID",
            "librarySectionKey",
            "librarySectionTitle",
            "ratingKey",
            "summary",
            "thumb",
            "title",
            "type",
        ])
        .transform("photos", CHILDREN)
        .transform("updatedAt", ISO_DATETIME)
        .build()
});

static PHOTO: Lazy<Schema> = Lazy::new(|| {
    Schema::builder()
        .transform("addedAt", ISO_DATETIME)
        .scalars(&[
            "createdAtAccuracy",
            "createdAtTZOffset",
            "guid",
            "index",
            "key",
            "librarySectionID",
            "librarySectionKey",
            "librarySectionTitle",
            "parentGuid",
            "parentIndex",
            "parentKey",
            "parentRatingKey",
            "parentThumb",
            "parentTitle",
            "ratingKey",
            "summary",
            "thumb",
            "title",
            "type",
            "year",
        ])
        .nested("media", photo_media())
        .transform("originallyAvailableAt", ISO_DATE)
        .nested("tag", Schema::builder().scalars(&["id", "tag", "title"]).build())
        .transform("updatedAt", ISO_DATETIME)
        .build()
});

static COLLECTION: Lazy<Schema> = Lazy::new(|| {
    Schema::builder()
        .transform("addedAt", ISO_DATETIME)
        .scalars(&[
            "childCount",
            "collectionMode",
            "collectionSort",
            "contentRating",
            "guid",
            "index",
            "key",
            "librarySectionID",
            "librarySectionKey",
            "librarySectionTitle",
            "maxYear",
            "minYear",
            "ratingKey",
            "subtype",
            "summary",
            "thumb",
            "title",
            "type",
        ])
        .transform("children", CHILDREN)
        .nested("fields", fields())
        .transform("updatedAt", ISO_DATETIME)
        .build()
});

static PLAYLIST: Lazy<Schema> = Lazy::new(|| {
    Schema::builder()
        .transform("addedAt", ISO_DATETIME)
        .scalars(&[
            "composite",
            "duration",
            "guid",
            "key",
            "leafCount",
            "playlistType",
            "ratingKey",
            "smart",
            "summary",
            "title",
            "type",
        ])
        .transform("durationHuman", HUMAN_DURATION)
        .transform("items", CHILDREN)
        .transform("updatedAt", ISO_DATETIME)
        .build()
});

/// Full schema for a media type
pub fn schema_for(media_type: MediaType) -> &'static Schema {
    match media_type {
        MediaType::Movie => &MOVIE,
        MediaType::Show => &SHOW,
        MediaType::Season => &SEASON,
        MediaType::Episode => &EPISODE,
        MediaType::Artist => &ARTIST,
        MediaType::Album => &ALBUM,
        MediaType::Track => &TRACK,
        MediaType::PhotoAlbum => &PHOTO_ALBUM,
        MediaType::Photo => &PHOTO,
        MediaType::Collection => &COLLECTION,
        MediaType::Playlist => &PLAYLIST,
    }
}
