//! Time formatting helpers.

use strato_types::Timestamp;

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Time left from `now` until `then`, or `"due"` once it has passed.
pub fn format_until(now: Timestamp, then: Timestamp) -> String {
    match then.as_secs().checked_sub(now.as_secs()) {
        Some(0) | None => "due".to_string(),
        Some(secs) => format_duration(secs),
    }
}
