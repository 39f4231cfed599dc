//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC time as RFC 3339 text, the format stored in every
/// `created_at` / `started_at` / `ended_at` column
pub fn now_iso() -> String {
    now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Convert a configured millisecond interval to a duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
        assert!(timestamp.timestamp() < 4_102_444_800); // 2100-01-01 00:00:00 UTC
    }

    #[test]
    fn test_now_iso_parses_back() {
        let text = now_iso();
        assert!(text.ends_with('Z'));
        let parsed = DateTime::parse_from_rfc3339(&text).expect("RFC 3339 timestamp");
        assert!(parsed.timestamp() > 946_684_800);
    }

    #[tokio::test]
    async fn test_now_iso_is_ordered() {
        let first = now_iso();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = now_iso();
        // Same-width RFC 3339 UTC text sorts chronologically
        assert!(second > first);
    }

    #[test]
    fn test_millis_to_duration() {
        assert_eq!(millis_to_duration(0), Duration::ZERO);
        assert_eq!(millis_to_duration(250), Duration::from_millis(250));
        assert_eq!(millis_to_duration(1000), Duration::from_secs(1));
    }
}
