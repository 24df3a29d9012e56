//! Coarse "time since" labels and count pluralization.

use time::OffsetDateTime;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Format the time elapsed between `timestamp` (Unix seconds) and `now_ms`
/// (Unix milliseconds).
///
/// ```text
/// < 5 minutes   just now
/// < 1 hour      17 minutes ago
/// < 1 day       1 hour ago / 3 hours ago
/// otherwise     1 day ago / 12 days ago
/// ```
pub fn format_time_since(timestamp: f64, now_ms: i64) -> String {
    let elapsed = now_ms.saturating_sub((timestamp * 1000.0).round() as i64);

    if elapsed < 5 * MINUTE_MS {
        "just now".to_string()
    } else if elapsed < HOUR_MS {
        format!("{} minutes ago", elapsed / MINUTE_MS)
    } else if elapsed < DAY_MS {
        let hours = elapsed / HOUR_MS;
        format!("{} ago", plural(hours, "hour"))
    } else {
        let days = elapsed / DAY_MS;
        format!("{} ago", plural(days, "day"))
    }
}

/// Current Unix time in milliseconds.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// `"1 part"`, `"2 parts"`, `"0 parts"`: singular exactly when `n == 1`.
pub fn plural<N>(n: N, noun: &str) -> String
where
    N: Into<i128> + Copy + std::fmt::Display,
{
    if n.into() == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
