use chrono::{DateTime, Datelike, Utc};
use std::path::Path;

pub const NO_EXTENSION: &str = "(none)";

pub fn month_key(timestamp: &DateTime<Utc>) -> String {
    format!("{}-{:02}", timestamp.year(), timestamp.month())
}

/// Lower-cased extension with its leading dot, or [`NO_EXTENSION`].
pub fn extension_key(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}
