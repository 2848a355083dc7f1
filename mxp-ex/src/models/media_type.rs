//! Exportable media types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Media type of an exportable item or library section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Show,
    Season,
    Episode,
    Artist,
    Album,
    Track,
    #[serde(rename = "photo album")]
    PhotoAlbum,
    Photo,
    Collection,
    Playlist,
}

impl MediaType {
    pub const ALL: [MediaType; 11] = [
        MediaType::Movie,
        MediaType::Show,
        MediaType::Season,
        MediaType::Episode,
        MediaType::Artist,
        MediaType::Album,
        MediaType::Track,
        MediaType::PhotoAlbum,
        MediaType::Photo,
        MediaType::Collection,
        MediaType::Playlist,
    ];

    /// Stored/wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Show => "show",
            MediaType::Season => "season",
            MediaType::Episode => "episode",
            MediaType::Artist => "artist",
            MediaType::Album => "album",
            MediaType::Track => "track",
            MediaType::PhotoAlbum => "photo album",
            MediaType::Photo => "photo",
            MediaType::Collection => "collection",
            MediaType::Playlist => "playlist",
        }
    }

    /// Title-cased name used in export filenames ("Photo Album")
    pub fn title(&self) -> String {
        title_case(self.as_str())
    }
}

/// Title-case every whitespace-separated word ("photo album" → "Photo Album")
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::ALL
            .iter()
            .copied()
            .find(|mt| mt.as_str() == s)
            .ok_or_else(|| format!("Unknown media type: {}", s))
    }
}
