//! Human-readable duration and file size formatting
//!
//! Used for the derived `durationHuman` and `sizeHuman` export fields.

const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

const SIZE_UNITS: [&str; 8] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];

/// Format a millisecond duration as days, hours and minutes.
///
/// Seconds are truncated. Zero-valued units are omitted; anything shorter
/// than a minute (including negative input) formats as `"0 mins"`.
///
/// # Examples
///
/// ```
/// use mxp_common::human::format_human_duration;
///
/// assert_eq!(format_human_duration(5_400_000), "1 hr 30 mins");
/// assert_eq!(format_human_duration(90_061_000), "1 day 1 hr 1 min");
/// assert_eq!(format_human_duration(0), "0 mins");
/// ```
pub fn format_human_duration(ms: i64) -> String {
    if ms < MS_PER_MINUTE {
        return "0 mins".to_string();
    }

    let days = ms / MS_PER_DAY;
    let hours = (ms % MS_PER_DAY) / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;

    let mut parts = Vec::with_capacity(3);
    for (value, unit) in [(days, "day"), (hours, "hr"), (minutes, "min")] {
        if value > 0 {
            let plural = if value == 1 { "" } else { "s" };
            parts.push(format!("{} {}{}", value, unit, plural));
        }
    }

    parts.join(" ")
}

/// Format a byte count with binary (1024) units and one decimal place.
///
/// # Examples
///
/// ```
/// use mxp_common::human::format_human_file_size;
///
/// assert_eq!(format_human_file_size(512), "512 B");
/// assert_eq!(format_human_file_size(1536), "1.5 KiB");
/// assert_eq!(format_human_file_size(5 * 1024 * 1024 * 1024), "5.0 GiB");
/// ```
pub fn format_human_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    value /= 1024.0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, SIZE_UNITS[unit])
}
