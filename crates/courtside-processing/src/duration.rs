//! Human-readable formatting for derived metadata.

use chrono::{DateTime, Utc};

/// Render a duration as `"1 hour 1 minute 1 second"`.
///
/// Zero-valued units are omitted, except that a total of zero renders as
/// `"0 seconds"` rather than an empty string.
pub fn format_duration(total_seconds: u64) -> String {
    if total_seconds == 0 {
        return "0 seconds".to_string();
    }

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(unit(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(unit(minutes, "minute"));
    }
    if seconds > 0 {
        parts.push(unit(seconds, "second"));
    }
    parts.join(" ")
}

fn unit(value: u64, singular: &str) -> String {
    if value == 1 {
        format!("{} {}", value, singular)
    } else {
        format!("{} {}s", value, singular)
    }
}

/// Coarse recency for upload timestamps, e.g. `"3 days ago"`.
pub fn uploaded_ago(at: DateTime<Utc>) -> String {
    let seconds = Utc::now().signed_duration_since(at).num_seconds().max(0);

    match seconds {
        0..=59 => "just now".to_string(),
        60..=3599 => ago(seconds / 60, "minute"),
        3600..=86_399 => ago(seconds / 3600, "hour"),
        86_400..=2_591_999 => ago(seconds / 86_400, "day"),
        2_592_000..=31_535_999 => ago(seconds / 2_592_000, "month"),
        _ => ago(seconds / 31_536_000, "year"),
    }
}

fn ago(value: i64, singular: &str) -> String {
    if value == 1 {
        format!("1 {} ago", singular)
    } else {
        format!("{} {}s ago", value, singular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_duration_zero() {
        assert_eq!(format_duration(0), "0 seconds");
    }

    #[test]
    fn test_format_duration_all_units() {
        assert_eq!(format_duration(3661), "1 hour 1 minute 1 second");
    }

    #[test]
    fn test_format_duration_omits_zero_units() {
        assert_eq!(format_duration(3600), "1 hour");
        assert_eq!(format_duration(61), "1 minute 1 second");
        assert_eq!(format_duration(59), "59 seconds");
        assert_eq!(format_duration(7322), "2 hours 2 minutes 2 seconds");
    }

    #[test]
    fn test_uploaded_ago() {
        assert_eq!(uploaded_ago(Utc::now()), "just now");
        assert_eq!(
            uploaded_ago(Utc::now() - Duration::minutes(5)),
            "5 minutes ago"
        );
        assert_eq!(uploaded_ago(Utc::now() - Duration::hours(1)), "1 hour ago");
        assert_eq!(uploaded_ago(Utc::now() - Duration::days(3)), "3 days ago");
    }

    #[test]
    fn test_uploaded_ago_future_clamped() {
        assert_eq!(uploaded_ago(Utc::now() + Duration::hours(2)), "just now");
    }
}
