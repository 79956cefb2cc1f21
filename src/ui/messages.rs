//! Throttle message wording.

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};

/// Human-readable reset instant in local time.
///
/// `HH:MM:SS` when the reset falls on the same local day as `now_ms`,
/// otherwise prefixed with the date.
pub fn format_reset_time(reset_at_ms: i64, now_ms: i64) -> String {
    let (Some(reset), Some(now)) = (local(reset_at_ms), local(now_ms)) else {
        return reset_at_ms.to_string();
    };
    if reset.date_naive() == now.date_naive() {
        reset.format("%H:%M:%S").to_string()
    } else {
        reset.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn local(ms: i64) -> Option<DateTime<Local>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.with_timezone(&Local))
}

fn window_hours(window: Duration) -> u64 {
    (window.as_secs() / 3600).max(1)
}

/// Message shown when a throttled action is attempted again.
pub fn throttle_notice(budget: u32, window: Duration, reset_at_ms: i64, now_ms: i64) -> String {
    format!(
        "Rate limit exceeded: You have reached the limit of {} requests per {} hours. Please wait until {} to try again.",
        budget,
        window_hours(window),
        format_reset_time(reset_at_ms, now_ms)
    )
}

/// Message shown right after a 429: the server's text plus the reset time.
pub fn throttled_response_message(
    server_message: Option<&str>,
    budget: u32,
    window: Duration,
    reset_at_ms: i64,
    now_ms: i64,
) -> String {
    match server_message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(message) => format!(
            "{}. Please wait until {} to try again.",
            message.trim_end_matches('.'),
            format_reset_time(reset_at_ms, now_ms)
        ),
        None => throttle_notice(budget, window, reset_at_ms, now_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWELVE_HOURS: Duration = Duration::from_secs(12 * 3600);

    #[test]
    fn test_notice_wording() {
        let now = Local::now().timestamp_millis();
        let reset = now + 1000;
        let notice = throttle_notice(10, TWELVE_HOURS, reset, now);
        assert!(notice.starts_with(
            "Rate limit exceeded: You have reached the limit of 10 requests per 12 hours. Please wait until "
        ));
        assert!(notice.ends_with(" to try again."));
    }

    #[test]
    fn test_reset_time_adds_date_on_other_day() {
        let now = Local::now().timestamp_millis();
        let same_day = format_reset_time(now, now);
        assert_eq!(same_day.len(), "HH:MM:SS".len());

        let two_days = now + 48 * 3600 * 1000;
        let other_day = format_reset_time(two_days, now);
        assert_eq!(other_day.len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[test]
    fn test_response_message_uses_server_text() {
        let now = Local::now().timestamp_millis();
        let message = throttled_response_message(
            Some("Rate limit exceeded: 3 per 12 hours."),
            3,
            TWELVE_HOURS,
            now,
            now,
        );
        assert!(message.starts_with("Rate limit exceeded: 3 per 12 hours. Please wait until "));

        let fallback = throttled_response_message(None, 3, TWELVE_HOURS, now, now);
        assert!(fallback.contains("limit of 3 requests per 12 hours"));
    }
}
