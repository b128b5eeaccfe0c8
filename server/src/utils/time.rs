//! Time utility functions

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Convert signed nanoseconds since Unix epoch to DateTime<Utc>.
///
/// Returns None when the value is outside chrono's representable range.
pub fn nanos_to_datetime(nanos: i64) -> Option<DateTime<Utc>> {
    let secs = nanos.div_euclid(NANOS_PER_SEC as i64);
    let nsecs = nanos.rem_euclid(NANOS_PER_SEC as i64) as u32;
    Utc.timestamp_opt(secs, nsecs).single()
}

/// Parse a decimal nanosecond string (as Tempo sends them) to DateTime<Utc>
pub fn parse_nanos_str(nanos: &str) -> Option<DateTime<Utc>> {
    nanos.parse::<i64>().ok().and_then(nanos_to_datetime)
}

/// RFC 3339 with whole seconds, e.g. `2023-11-14T22:13:20Z`
pub fn to_rfc3339_secs(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// RFC 3339 with nanoseconds, e.g. `2023-11-14T22:13:20.000000123Z`
///
/// Always prints nine fractional digits (`.500000000Z`, `.000000000Z`), unlike
/// Go's `time.RFC3339Nano` which trims trailing zeros (`.5Z`, no fraction at all).
/// Fixed width keeps search listings aligned.
pub fn to_rfc3339_nanos(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Render a nanosecond span as compact text: `0s`, `850ns`, `1.5µs`, `250ms`,
/// `1.5s`, `2m3s`, `1h0m0s`.
///
/// Sub-second spans use the largest unit below one second; longer spans are
/// broken into hours, minutes and fractional seconds with trailing zeros removed.
pub fn format_duration_nanos(nanos: i64) -> String {
    if nanos == 0 {
        return "0s".to_string();
    }

    let u = nanos.unsigned_abs();
    let text = if u < 1_000 {
        format!("{u}ns")
    } else if u < 1_000_000 {
        format!("{}µs", fractional(u / 1_000, u % 1_000, 3))
    } else if u < NANOS_PER_SEC {
        format!("{}ms", fractional(u / 1_000_000, u % 1_000_000, 6))
    } else {
        let total_secs = u / NANOS_PER_SEC;
        let secs = fractional(total_secs % 60, u % NANOS_PER_SEC, 9);
        let total_mins = total_secs / 60;
        if total_mins == 0 {
            format!("{secs}s")
        } else if total_mins < 60 {
            format!("{total_mins}m{secs}s")
        } else {
            format!("{}h{}m{secs}s", total_mins / 60, total_mins % 60)
        }
    };

    if nanos < 0 { format!("-{text}") } else { text }
}

fn fractional(whole: u64, remainder: u64, digits: usize) -> String {
    if remainder == 0 {
        return whole.to_string();
    }
    let frac = format!("{remainder:0digits$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}
