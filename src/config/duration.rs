//! Human-readable duration values.
//!
//! TOML has no duration literal, so durations are written as strings such as
//! `"5s"`, `"300ms"`, `"1.5h"` or `"2h30m"`: a sequence of decimal numbers,
//! each with an optional fraction and a required unit suffix.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;

// Fraction digits beyond this are below nanosecond resolution for every unit.
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,

    #[error("negative duration not supported: '{0}'")]
    Negative(String),

    #[error("invalid number in duration '{0}'")]
    InvalidNumber(String),

    #[error("missing unit in duration '{0}'")]
    MissingUnit(String),

    #[error("unknown unit '{unit}' in duration '{input}'")]
    UnknownUnit { unit: String, input: String },

    #[error("duration out of range: '{0}'")]
    Overflow(String),
}

/// A [`std::time::Duration`] that reads and writes as a duration string.
///
/// ```
/// use serde::Deserialize;
/// use xdg_cascade::Duration;
///
/// #[derive(Deserialize)]
/// struct Timeouts {
///     idle: Duration,
/// }
///
/// let t: Timeouts = toml::from_str(r#"idle = "2h30m""#).unwrap();
/// assert_eq!(t.idle.as_secs(), 150 * 60);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(pub std::time::Duration);

impl Duration {
    pub fn into_inner(self) -> std::time::Duration {
        self.0
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Self(d)
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> Self {
        d.0
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s).map(Self)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.0;
        if d.is_zero() {
            return f.write_str("0s");
        }

        let secs = d.as_secs();
        let nanos = d.subsec_nanos();

        if secs == 0 {
            if nanos < 1_000 {
                return write!(f, "{nanos}ns");
            }
            if nanos < 1_000_000 {
                write_fraction(f, nanos / 1_000, nanos % 1_000, 3)?;
                return f.write_str("µs");
            }
            write_fraction(f, nanos / 1_000_000, nanos % 1_000_000, 6)?;
            return f.write_str("ms");
        }

        let hours = secs / 3600;
        let minutes = secs / 60 % 60;
        if hours > 0 {
            write!(f, "{hours}h")?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        write_fraction(f, secs % 60, nanos, 9)?;
        f.write_str("s")
    }
}

fn write_fraction(
    f: &mut fmt::Formatter<'_>,
    whole: impl fmt::Display,
    fraction: u32,
    width: usize,
) -> fmt::Result {
    write!(f, "{whole}")?;
    if fraction > 0 {
        let digits = format!("{fraction:0width$}");
        write!(f, ".{}", digits.trim_end_matches('0'))?;
    }
    Ok(())
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a duration string such as `"2h30m"` or `"1.5s"`.
///
/// Accepted units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare
/// `"0"` is the only value allowed without a unit.
pub fn parse_duration(input: &str) -> Result<std::time::Duration, DurationParseError> {
    let mut s = input;
    if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    } else if let Some(rest) = s.strip_prefix('-') {
        if rest == "0" {
            return Ok(std::time::Duration::ZERO);
        }
        return Err(DurationParseError::Negative(input.to_string()));
    }

    if s == "0" {
        return Ok(std::time::Duration::ZERO);
    }
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let overflow = || DurationParseError::Overflow(input.to_string());
    let mut total: u128 = 0;

    while !s.is_empty() {
        let (whole_digits, rest) = split_digits(s);
        s = rest;

        let mut fraction_digits = "";
        if let Some(rest) = s.strip_prefix('.') {
            (fraction_digits, s) = split_digits(rest);
        }
        if whole_digits.is_empty() && fraction_digits.is_empty() {
            return Err(DurationParseError::InvalidNumber(input.to_string()));
        }

        let unit_len = s
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        let (unit, rest) = s.split_at(unit_len);
        s = rest;

        if unit.is_empty() {
            return Err(DurationParseError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let whole = parse_digits(whole_digits)
            .and_then(|w| w.checked_mul(scale))
            .ok_or_else(overflow)?;
        let fraction = fraction_nanos(fraction_digits, scale);

        total = total
            .checked_add(whole)
            .and_then(|t| t.checked_add(fraction))
            .ok_or_else(overflow)?;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| overflow())?;
    let nanos = (total % NANOS_PER_SEC) as u32;
    Ok(std::time::Duration::new(secs, nanos))
}

fn split_digits(s: &str) -> (&str, &str) {
    let len = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(len)
}

fn parse_digits(digits: &str) -> Option<u128> {
    digits.bytes().try_fold(0u128, |acc, b| {
        acc.checked_mul(10)?.checked_add(u128::from(b - b'0'))
    })
}

fn fraction_nanos(digits: &str, scale: u128) -> u128 {
    let digits = &digits[..digits.len().min(MAX_FRACTION_DIGITS)];
    let value = parse_digits(digits).unwrap_or(0);
    value * scale / 10u128.pow(digits.len() as u32)
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3600 * NANOS_PER_SEC,
        _ => return None,
    };
    Some(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[test]
    fn test_parse_compound() {
        assert_eq!(
            parse_duration("2h30m").unwrap(),
            StdDuration::from_secs(150 * 60)
        );
        assert_eq!(
            parse_duration("1h2m3s4ms").unwrap(),
            StdDuration::from_millis(3_723_004)
        );
    }

    #[test]
    fn test_parse_single_units() {
        assert_eq!(parse_duration("5s").unwrap(), StdDuration::from_secs(5));
        assert_eq!(parse_duration("300ms").unwrap(), StdDuration::from_millis(300));
        assert_eq!(parse_duration("15us").unwrap(), StdDuration::from_micros(15));
        assert_eq!(parse_duration("15µs").unwrap(), StdDuration::from_micros(15));
        assert_eq!(parse_duration("7ns").unwrap(), StdDuration::from_nanos(7));
    }

    #[test]
    fn test_parse_fractions() {
        assert_eq!(parse_duration("1.5h").unwrap(), StdDuration::from_secs(5400));
        assert_eq!(parse_duration(".5s").unwrap(), StdDuration::from_millis(500));
        assert_eq!(parse_duration("1.s").unwrap(), StdDuration::from_secs(1));
        assert_eq!(
            parse_duration("0.000000001s").unwrap(),
            StdDuration::from_nanos(1)
        );
    }

    #[test]
    fn test_parse_zero_and_sign() {
        assert_eq!(parse_duration("0").unwrap(), StdDuration::ZERO);
        assert_eq!(parse_duration("-0").unwrap(), StdDuration::ZERO);
        assert_eq!(parse_duration("+3m").unwrap(), StdDuration::from_secs(180));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_duration(""), Err(DurationParseError::Empty));
        assert!(matches!(
            parse_duration("-5s"),
            Err(DurationParseError::Negative(_))
        ));
        assert!(matches!(
            parse_duration("10"),
            Err(DurationParseError::MissingUnit(_))
        ));
        assert!(matches!(
            parse_duration("3d"),
            Err(DurationParseError::UnknownUnit { ref unit, .. }) if unit == "d"
        ));
        assert!(matches!(
            parse_duration(".s"),
            Err(DurationParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_duration("99999999999999999999999999h"),
            Err(DurationParseError::Overflow(_))
        ));
    }

    #[test]
    fn test_display() {
        let cases = [
            (StdDuration::ZERO, "0s"),
            (StdDuration::from_nanos(7), "7ns"),
            (StdDuration::from_nanos(1_500), "1.5µs"),
            (StdDuration::from_millis(300), "300ms"),
            (StdDuration::from_millis(1_500), "1.5s"),
            (StdDuration::from_secs(150 * 60), "2h30m0s"),
            (StdDuration::from_secs(61), "1m1s"),
        ];
        for (d, expected) in cases {
            assert_eq!(Duration(d).to_string(), expected);
        }
    }

    #[test]
    fn test_display_parses_back() {
        for d in [
            StdDuration::from_nanos(1_234_567),
            StdDuration::from_millis(90_061_001),
            StdDuration::from_micros(42),
        ] {
            assert_eq!(parse_duration(&Duration(d).to_string()).unwrap(), d);
        }
    }

    #[test]
    fn test_toml_field() {
        #[derive(Debug, Deserialize, Serialize, PartialEq)]
        struct Timeouts {
            idle: Duration,
        }

        let t: Timeouts = toml::from_str(r#"idle = "2h30m""#).unwrap();
        assert_eq!(*t.idle, StdDuration::from_secs(150 * 60));

        let bad = toml::from_str::<Timeouts>(r#"idle = "forever""#);
        assert!(bad.is_err());
    }
}
