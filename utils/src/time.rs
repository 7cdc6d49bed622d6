//! Duration formatting helpers.

/// Format a duration in milliseconds to a human-readable string.
pub fn format_millis(millis: u64) -> String {
    let secs = millis / 1000;
    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_unit() {
        assert_eq!(format_millis(250), "250ms");
        assert_eq!(format_millis(42_000), "42s");
        assert_eq!(format_millis(15 * 60_000), "15m 0s");
        assert_eq!(format_millis(3 * 3_600_000 + 120_000), "3h 2m");
        assert_eq!(format_millis(2 * 86_400_000), "2d 0h");
    }
}
