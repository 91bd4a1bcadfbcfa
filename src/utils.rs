//! Utility functions

/// Format a byte count as a human-readable size string
///
/// Sizes are rendered with one decimal place in the largest unit that keeps
/// the value above 1, e.g. `3.4 MB`. Bytes are shown without a decimal.
///
/// # Examples
///
/// ```
/// use media_dl::utils::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }

    format!("{:.1} {}", value, unit)
}
