//! Export filenames
//!
//! ```text
//! Movie - Heat [1234].20240131120000.json
//! Library - Movies [1].20240131120000.csv
//! ```

use mxp_common::time::format_ymdhms;

use crate::models::{ExportFormat, MediaType};
use crate::source::SourceItem;

const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Strip characters that are not portable in filenames
pub fn clean_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !FORBIDDEN.contains(c) && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn item_filename(
    media_type: MediaType,
    title: &str,
    item_id: i64,
    created_at: i64,
    format: ExportFormat,
) -> String {
    clean_filename(&format!(
        "{} - {} [{}].{}.{}",
        media_type.title(),
        title,
        item_id,
        format_ymdhms(created_at),
        format.extension()
    ))
}

pub fn library_filename(
    library_title: &str,
    section_id: i64,
    created_at: i64,
    format: ExportFormat,
) -> String {
    clean_filename(&format!(
        "Library - {} [{}].{}.{}",
        library_title,
        section_id,
        format_ymdhms(created_at),
        format.extension()
    ))
}

/// Title used in item filenames
///
/// Children of shows and artists carry their parents' titles so files from
/// different shows stay distinguishable.
pub fn display_title(item: &dyn SourceItem, media_type: MediaType) -> String {
    let text = |name: &str| {
        let attr = item.attr(name);
        match attr.as_str() {
            Some(s) => s.to_string(),
            None => attr.as_i64().map(|n| n.to_string()).unwrap_or_default(),
        }
    };

    match media_type {
        MediaType::Season | MediaType::Album => {
            format!("{} - {}", text("parentTitle"), text("title"))
        }
        MediaType::Episode => format!(
            "{} - {} - (s{:0>2}e{:0>2}) {}",
            text("grandparentTitle"),
            text("parentTitle"),
            text("parentIndex"),
            text("index"),
            text("title")
        ),
        MediaType::Track => format!(
            "{} - {} - {}",
            text("grandparentTitle"),
            text("parentTitle"),
            text("title")
        ),
        _ => text("title"),
    }
}
