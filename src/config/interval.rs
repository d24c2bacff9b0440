//! Compact duration codec for the auto-schedule interval
//!
//! The wire format is `XdYhZm`: any subset of days/hours/minutes, in that
//! order, no duplicate units, at least one unit, non-zero total. `2d5h10m`,
//! `45m`, and `1d` are valid; `10m5h`, `3h3h`, and `0m` are not.

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    static ref UNIT_RE: Regex = Regex::new(r"(\d+)([dhm])").expect("valid interval regex");
}

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Parse an `XdYhZm` interval string into a `Duration`
///
/// # Errors
///
/// Returns `Error::InvalidInterval` for malformed input (unknown characters,
/// units out of order, duplicate units) and `Error::IntervalZero` when the
/// well-formed value sums to zero.
pub fn parse_interval(value: &str) -> Result<Duration> {
    let value = value.trim();
    let mut days: Option<u64> = None;
    let mut hours: Option<u64> = None;
    let mut minutes: Option<u64> = None;
    let mut matched_len = 0;

    for caps in UNIT_RE.captures_iter(value) {
        matched_len += caps.get(0).map_or(0, |m| m.len());

        let amount: u64 = caps[1]
            .parse()
            .map_err(|_| Error::InvalidInterval(value.to_string()))?;
        let unit = caps.get(2).map_or("", |m| m.as_str());

        // Units after a later-ordered one mean out-of-order input (e.g. 5m2h)
        if (unit == "d" && (hours.is_some() || minutes.is_some()))
            || (unit == "h" && minutes.is_some())
        {
            return Err(Error::InvalidInterval(value.to_string()));
        }
        let slot = match unit {
            "d" => &mut days,
            "h" => &mut hours,
            _ => &mut minutes,
        };
        if slot.is_some() {
            return Err(Error::InvalidInterval(value.to_string()));
        }
        *slot = Some(amount);
    }

    if matched_len == 0 || matched_len != value.len() {
        return Err(Error::InvalidInterval(value.to_string()));
    }

    // Absurdly large counts overflow u64 seconds; treat them as malformed
    let total = days
        .unwrap_or(0)
        .checked_mul(DAY)
        .and_then(|total| total.checked_add(hours.unwrap_or(0).checked_mul(HOUR)?))
        .and_then(|total| total.checked_add(minutes.unwrap_or(0).checked_mul(MINUTE)?))
        .ok_or_else(|| Error::InvalidInterval(value.to_string()))?;
    if total == 0 {
        return Err(Error::IntervalZero);
    }
    Ok(Duration::from_secs(total))
}

/// Format a `Duration` back into the compact `XdYhZm` form
///
/// Sub-minute remainders are truncated; a zero duration formats as `0m`.
pub fn format_interval(interval: Duration) -> String {
    let total = interval.as_secs();
    let days = total / DAY;
    let hours = (total % DAY) / HOUR;
    let minutes = (total % HOUR) / MINUTE;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}d"));
    }
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if out.is_empty() {
        out.push_str("0m");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_interval() {
        let d = parse_interval("2d5h10m").unwrap();
        assert_eq!(d, Duration::from_secs(2 * DAY + 5 * HOUR + 10 * MINUTE));
    }

    #[test]
    fn test_parse_single_units() {
        assert_eq!(parse_interval("45m").unwrap(), Duration::from_secs(45 * 60));
        assert_eq!(parse_interval("3h").unwrap(), Duration::from_secs(3 * HOUR));
        assert_eq!(parse_interval("1d").unwrap(), Duration::from_secs(DAY));
    }

    #[test]
    fn test_parse_rejects_zero() {
        assert!(matches!(parse_interval("0m"), Err(Error::IntervalZero)));
        assert!(matches!(parse_interval("0d0h0m"), Err(Error::IntervalZero)));
    }

    #[test]
    fn test_parse_rejects_duplicates() {
        assert!(matches!(
            parse_interval("3h3h"),
            Err(Error::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_parse_rejects_out_of_order() {
        assert!(matches!(
            parse_interval("10m5h"),
            Err(Error::InvalidInterval(_))
        ));
        assert!(matches!(
            parse_interval("5h2d"),
            Err(Error::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_parse_rejects_overflowing_amounts() {
        // Seconds no longer fit in u64; must be an error, not a panic
        assert!(matches!(
            parse_interval("300000000000000d"),
            Err(Error::InvalidInterval(_))
        ));
        assert!(matches!(
            parse_interval("18446744073709551615d1h"),
            Err(Error::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "abc", "5x", "d", "5", "5m extra", "1.5h"] {
            assert!(parse_interval(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_format_roundtrip() {
        for s in ["2d5h10m", "45m", "3h", "1d", "1d1m"] {
            let parsed = parse_interval(s).unwrap();
            assert_eq!(format_interval(parsed), s);
        }
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(format_interval(Duration::ZERO), "0m");
    }
}
