//! Time utilities for mrfoods
//!
//! Orders carry both an ISO-8601 creation date and a unix-millisecond
//! `orderTime`; the helpers here convert between the two.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `MRFOODS_MOCK_TIME` environment variable can be set
//! to override the system time for all time-sensitive operations. This is
//! useful for watching pending orders get promoted without waiting.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` in local time (e.g., `2025-12-25 14:30:00`)

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "MRFOODS_MOCK_TIME";

/// Format accepted by [`MOCK_TIME_ENV_VAR`]
pub const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offset between mock time and real time, computed once at process start.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // wraps Utc::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            let mock_time_str = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
            let Ok(naive_dt) = NaiveDateTime::parse_from_str(&mock_time_str, MOCK_TIME_FORMAT)
            else {
                tracing::warn!(
                    mock_time = %mock_time_str,
                    expected_format = MOCK_TIME_FORMAT,
                    "Invalid mock time format"
                );
                return None;
            };
            let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() else {
                tracing::warn!(
                    mock_time = %mock_time_str,
                    "Failed to convert mock time to local timezone"
                );
                return None;
            };
            let offset = mock_dt.with_timezone(&Utc).signed_duration_since(Utc::now());
            tracing::info!(
                mock_time = %mock_time_str,
                offset_secs = offset.num_seconds(),
                "Mock time enabled"
            );
            Some(offset)
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Whether `MRFOODS_MOCK_TIME` shifted the clock for this process
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // the wrapper that provides mock time support
pub fn now() -> DateTime<Utc> {
    let real_now = Utc::now();
    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Milliseconds since the unix epoch
pub fn unix_millis(dt: &DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Time elapsed between `millis` and `now`, or zero if `millis` is in the future
pub fn elapsed_since_millis(millis: i64, now: &DateTime<Utc>) -> Duration {
    let diff = unix_millis(now).saturating_sub(millis);
    Duration::from_millis(u64::try_from(diff).unwrap_or(0))
}

/// Format a timestamp in local time for order history listings.
pub fn format_datetime_full(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Helper to format durations in human-readable form
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_unix_millis() {
        let dt = Utc.with_ymd_and_hms(2025, 12, 25, 14, 30, 0).unwrap();
        assert_eq!(unix_millis(&dt), 1_766_673_000_000);
        assert_eq!(unix_millis(&(dt + chrono::Duration::milliseconds(5))), 1_766_673_000_005);
    }

    #[test]
    fn test_elapsed_since_millis() {
        let now = Utc.with_ymd_and_hms(2025, 12, 25, 14, 30, 0).unwrap();
        let fifteen_ago = unix_millis(&now) - 15 * 60 * 1000;
        assert_eq!(
            elapsed_since_millis(fifteen_ago, &now),
            Duration::from_secs(15 * 60)
        );

        // Future timestamps clamp to zero
        let future = unix_millis(&now) + 1000;
        assert_eq!(elapsed_since_millis(future, &now), Duration::ZERO);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m 1s");
    }

    #[test]
    fn test_now_returns_time() {
        let t = now();
        assert!(t.year() >= 2020);
        assert!(t.year() <= 2100);
    }

    #[test]
    fn test_parse_mock_time_invalid_formats() {
        let invalid_formats = [
            "2025-12-25",
            "14:30:00",
            "2025/12/25 14:30:00",
            "2025-12-25T14:30:00",
            "",
        ];

        for format_str in &invalid_formats {
            let result = NaiveDateTime::parse_from_str(format_str, MOCK_TIME_FORMAT);
            assert!(
                result.is_err(),
                "Expected '{}' to fail parsing, but it succeeded",
                format_str
            );
        }
    }
}
