//! Time expression resolution
//!
//! Tool callers pass times as text. Accepted forms, tried in order:
//!
//! | Form | Example |
//! |------|---------|
//! | keyword | `now` |
//! | relative | `-1h`, `-30m`, `-1h30m`, `-1.5h` |
//! | unix epoch seconds | `1700000000` |
//! | RFC 3339 | `2024-01-15T10:30:00Z` |
//! | naive date-time (UTC) | `2024-01-15T10:30:00`, `2024-01-15 10:30:00` |
//! | naive date (UTC midnight) | `2024-01-15` |

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

use super::error::TempoError;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const NAIVE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Resolve a time expression against the current instant
pub fn resolve_time(expr: &str) -> Result<DateTime<Utc>, TempoError> {
    resolve_time_at(expr, Utc::now())
}

/// Resolve a time expression against a fixed `now`
pub fn resolve_time_at(expr: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, TempoError> {
    if expr == "now" {
        return Ok(now);
    }

    if expr.starts_with('-')
        && let Some(delta) = parse_duration(expr)
    {
        return Ok(now + delta);
    }

    if !expr.is_empty()
        && expr.bytes().all(|b| b.is_ascii_digit())
        && let Some(dt) = expr
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    {
        return Ok(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(expr) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(expr, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(expr, NAIVE_DATE_FORMAT)
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(naive.and_utc());
    }

    Err(TempoError::InvalidTimeFormat(expr.to_string()))
}

/// Parse a signed duration such as `-1h30m`, `+15s`, `-1.5h`, `250ms`.
///
/// Units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`. Every number needs a unit,
/// except a lone `0`.
pub fn parse_duration(text: &str) -> Option<TimeDelta> {
    let (negative, mut rest) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    if rest == "0" {
        return Some(TimeDelta::zero());
    }
    if rest.is_empty() {
        return None;
    }

    let mut total_nanos: f64 = 0.0;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return None;
        }
        let value: f64 = rest[..num_len].parse().ok()?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = unit_nanos(&rest[..unit_len])?;
        rest = &rest[unit_len..];

        total_nanos += value * scale;
    }

    if !total_nanos.is_finite() || total_nanos > i64::MAX as f64 {
        return None;
    }
    let delta = TimeDelta::nanoseconds(total_nanos.round() as i64);
    Some(if negative { -delta } else { delta })
}

fn unit_nanos(unit: &str) -> Option<f64> {
    Some(match unit {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1e3,
        "ms" => 1e6,
        "s" => 1e9,
        "m" => 60e9,
        "h" => 3_600e9,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_now_keyword() {
        assert_eq!(resolve_time_at("now", fixed_now()).unwrap(), fixed_now());
    }

    #[test]
    fn test_now_keyword_live_clock() {
        let before = Utc::now();
        let resolved = resolve_time("now").unwrap();
        let after = Utc::now();
        assert!(resolved >= before && resolved <= after);
    }

    #[test]
    fn test_relative_hours_and_minutes() {
        let now = fixed_now();
        for n in [1, 2, 24, 168] {
            let expr = format!("-{n}h");
            assert_eq!(
                resolve_time_at(&expr, now).unwrap(),
                now - TimeDelta::hours(n)
            );
        }
        for n in [1, 5, 30, 90] {
            let expr = format!("-{n}m");
            assert_eq!(
                resolve_time_at(&expr, now).unwrap(),
                now - TimeDelta::minutes(n)
            );
        }
    }

    #[test]
    fn test_relative_live_clock_within_tolerance() {
        let resolved = resolve_time("-1h").unwrap();
        let expected = Utc::now() - TimeDelta::hours(1);
        let diff = (expected - resolved).num_milliseconds().abs();
        assert!(diff < 1_000, "drift of {diff}ms");
    }

    #[test]
    fn test_relative_compound_and_fractional() {
        let now = fixed_now();
        assert_eq!(
            resolve_time_at("-1h30m", now).unwrap(),
            now - TimeDelta::minutes(90)
        );
        assert_eq!(
            resolve_time_at("-1.5h", now).unwrap(),
            now - TimeDelta::minutes(90)
        );
        assert_eq!(
            resolve_time_at("-250ms", now).unwrap(),
            now - TimeDelta::milliseconds(250)
        );
    }

    #[test]
    fn test_epoch_seconds() {
        assert_eq!(
            resolve_time_at("1700000000", fixed_now()).unwrap(),
            Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap()
        );
        assert_eq!(
            resolve_time_at("0", fixed_now()).unwrap().timestamp(),
            0
        );
    }

    #[test]
    fn test_rfc3339() {
        let dt = resolve_time_at("2024-01-15T10:30:00Z", fixed_now()).unwrap();
        assert_eq!(dt.timestamp(), 1_705_314_600);
    }

    #[test]
    fn test_rfc3339_with_offset_normalized_to_utc() {
        let dt = resolve_time_at("2024-01-15T10:30:00+05:00", fixed_now()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 5, 30, 0).unwrap());
    }

    #[test]
    fn test_naive_formats_are_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(
            resolve_time_at("2024-01-15T10:30:00", fixed_now()).unwrap(),
            expected
        );
        assert_eq!(
            resolve_time_at("2024-01-15 10:30:00", fixed_now()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_date_only_is_utc_midnight() {
        assert_eq!(
            resolve_time_at("2024-01-15", fixed_now()).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_unsupported_formats() {
        for expr in [
            "yesterday",
            "",
            "-",
            "-1x",
            "-h",
            "15/01/2024",
            "1h",
            "170000000x",
            "99999999999999999999",
        ] {
            let err = resolve_time_at(expr, fixed_now()).unwrap_err();
            assert!(
                matches!(err, TempoError::InvalidTimeFormat(ref s) if s == expr),
                "{expr:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_duration_zero_and_sign() {
        assert_eq!(parse_duration("0"), Some(TimeDelta::zero()));
        assert_eq!(parse_duration("-0"), Some(TimeDelta::zero()));
        assert_eq!(parse_duration("+2s"), Some(TimeDelta::seconds(2)));
        assert_eq!(parse_duration("90s"), Some(TimeDelta::seconds(90)));
    }

    #[test]
    fn test_parse_duration_rejects_bare_numbers() {
        assert_eq!(parse_duration("-5"), None);
        assert_eq!(parse_duration("1.2.3s"), None);
    }
}
