//! Archive naming conventions.
//!
//! Layout on disk:
//!
//! ```text
//! {output_dir}/{YYYYMMDD_HHMMSS}_{message_id}/image_{N}.{ext}
//! {output_dir}/{YYYYMMDD_HHMMSS}_{message_id}/metadata.json
//! ```
//!
//! Images are served back under `/output/{entry_key}/{filename}`.

use chrono::{DateTime, TimeZone};

use crate::error::CoreError;

/// `chrono` format string for the entry timestamp prefix.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Length of a formatted timestamp (`YYYYMMDD_HHMMSS`).
pub const TIMESTAMP_LEN: usize = 15;

/// Name of the metadata record inside each entry directory.
pub const METADATA_FILE: &str = "metadata.json";

/// URL prefix under which archived files are served.
pub const OUTPUT_URL_PREFIX: &str = "/output";

/// Extension used when a URL carries none.
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// Format a timestamp the way entry directory names expect it.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Directory name (and index key) for one archive entry.
///
/// ```
/// use novagen_core::naming::entry_key;
///
/// assert_eq!(entry_key("20240101_120000", "abc123"), "20240101_120000_abc123");
/// ```
pub fn entry_key(timestamp: &str, message_id: &str) -> String {
    format!("{timestamp}_{message_id}")
}

/// Split an entry key back into `(timestamp, message_id)`.
///
/// Returns `None` for directory names that do not follow the
/// `{YYYYMMDD_HHMMSS}_{message_id}` convention.
pub fn split_entry_key(key: &str) -> Option<(&str, &str)> {
    let (timestamp, rest) = (key.get(..TIMESTAMP_LEN)?, key.get(TIMESTAMP_LEN..)?);
    let message_id = rest.strip_prefix('_').filter(|id| !id.is_empty())?;

    let well_formed = timestamp.char_indices().all(|(i, c)| {
        if i == 8 {
            c == '_'
        } else {
            c.is_ascii_digit()
        }
    });
    well_formed.then_some((timestamp, message_id))
}

/// Derive a file extension from an image URL.
///
/// Query string and fragment are dropped, then the text after the final
/// `.` of the last path segment is used. Falls back to
/// [`DEFAULT_IMAGE_EXTENSION`] when there is no dot, the extension is
/// empty, or it contains anything other than ASCII alphanumerics.
pub fn image_extension(url: &str) -> String {
    let clean = url.split(['?', '#']).next().unwrap_or(url);
    let segment = clean.rsplit('/').next().unwrap_or(clean);

    match segment.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            ext.to_string()
        }
        _ => DEFAULT_IMAGE_EXTENSION.to_string(),
    }
}

/// File name for the image at zero-based `index` of the remote URL list.
///
/// Numbering follows the position in the remote list, so failed downloads
/// leave gaps rather than shifting later images down.
pub fn image_filename(index: usize, url: &str) -> String {
    format!("image_{}.{}", index + 1, image_extension(url))
}

/// Served path for an archived file, e.g. `/output/{key}/image_1.png`.
pub fn served_path(entry_key: &str, filename: &str) -> String {
    format!("{OUTPUT_URL_PREFIX}/{entry_key}/{filename}")
}

/// Reject message ids that could escape the output directory when used as
/// part of a directory name.
pub fn validate_message_id(message_id: &str) -> Result<(), CoreError> {
    if message_id.trim().is_empty() {
        return Err(CoreError::Validation("No message ID provided".to_string()));
    }
    if message_id.contains(['/', '\\', '\0']) || message_id.contains("..") {
        return Err(CoreError::Validation(format!(
            "Invalid message ID format: '{message_id}'"
        )));
    }
    Ok(())
}
