//! Formatting helpers for terminal output.

use chrono::{DateTime, Utc};
use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Format a duration as its largest whole unit.
///
/// ```
/// use std::time::Duration;
/// use triage::format::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(59)), "59s");
/// assert_eq!(format_duration(Duration::from_secs(60)), "1m");
/// assert_eq!(format_duration(Duration::from_secs(48 * 3600)), "2d");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < MINUTE {
        format!("{secs}s")
    } else if secs < HOUR {
        format!("{}m", secs / MINUTE)
    } else if secs < DAY {
        format!("{}h", secs / HOUR)
    } else {
        format!("{}d", secs / DAY)
    }
}

/// Age of `timestamp` relative to `now`, e.g. `5m`.
///
/// Timestamps in the future (clock skew) read as `0s`; a missing timestamp
/// reads as `?`.
pub fn format_age(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match timestamp {
        Some(ts) => format_duration((now - ts).to_std().unwrap_or_default()),
        None => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_boundaries() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0s");
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(59)), "59s");
        assert_eq!(format_duration(Duration::from_secs(60)), "1m");
        assert_eq!(format_duration(Duration::from_secs(3599)), "59m");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
        assert_eq!(format_duration(Duration::from_secs(3 * 3600)), "3h");
        assert_eq!(format_duration(Duration::from_secs(24 * 3600 - 1)), "23h");
        assert_eq!(format_duration(Duration::from_secs(24 * 3600)), "1d");
        assert_eq!(format_duration(Duration::from_secs(48 * 3600)), "2d");
    }

    #[test]
    fn test_subsecond_truncates() {
        assert_eq!(format_duration(Duration::from_millis(59_999)), "59s");
    }

    #[test]
    fn test_format_age() {
        let now = Utc::now();
        assert_eq!(
            format_age(Some(now - chrono::Duration::seconds(90)), now),
            "1m"
        );
        assert_eq!(
            format_age(Some(now + chrono::Duration::seconds(5)), now),
            "0s"
        );
        assert_eq!(format_age(None, now), "?");
    }
}
