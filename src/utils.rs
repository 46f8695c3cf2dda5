//! Utility functions for string formatting, dates, and file system checks.
//!
//! This module provides helper functions used throughout the crate:
//! - String truncation for logging response bodies
//! - Capitalization for category labels
//! - Publication date formatting for article cards
//! - File system validation for output directories

use chrono::DateTime;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Capitalize the first character of a string.
///
/// Used for category labels (e.g. "technology" -> "Technology").
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Format an RFC 3339 timestamp as a short date, e.g. `Jan 15, 2024`.
///
/// Returns `None` if the timestamp does not parse.
pub fn format_published_date(timestamp: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(timestamp.trim())
        .ok()
        .map(|dt| dt.format("%b %-d, %Y").to_string())
}

/// Create `path` if needed and confirm files can be written into it.
///
/// Writability is checked by creating a uniquely named temporary file inside
/// the directory; it is removed again when dropped.
///
/// # Errors
///
/// Returns the I/O error from creating the directory or the temporary file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;

    let dir = path.to_string();
    let check = tokio::task::spawn_blocking(move || {
        tempfile::Builder::new()
            .prefix(".headline_desk-")
            .tempfile_in(&dir)
            .map(drop)
    })
    .await?;
    check?;

    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        // 'é' is two bytes; cutting at 3 would split the second one.
        let result = truncate_for_log("éééé", 3);
        assert!(result.starts_with("é…"));
        assert!(result.contains("(+6 bytes)"));
    }

    #[test]
    fn test_upcase() {
        assert_eq!(upcase("business"), "Business");
        assert_eq!(upcase("all"), "All");
        assert_eq!(upcase(""), "");
        assert_eq!(upcase("a"), "A");
    }

    #[test]
    fn test_format_published_date() {
        assert_eq!(
            format_published_date("2024-01-15T10:30:00Z").as_deref(),
            Some("Jan 15, 2024")
        );
        assert_eq!(
            format_published_date("2023-12-03T23:59:59+02:00").as_deref(),
            Some("Dec 3, 2023")
        );
        assert_eq!(format_published_date("not a date"), None);
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/c");
        let nested = nested.to_str().unwrap();

        ensure_writable_dir(nested).await.unwrap();
        assert!(std::path::Path::new(nested).is_dir());
        // The writability check leaves nothing behind.
        assert_eq!(std::fs::read_dir(nested).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_rejects_a_file_path() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        assert!(ensure_writable_dir(file.to_str().unwrap()).await.is_err());
    }
}
