//! Human-readable duration scalar (`1h30m0s`, `500ms`, `1.5µs`).
//!
//! The text form is a signed sequence of `<number><unit>` pairs with units
//! `h`, `m`, `s`, `ms`, `us`/`µs`/`μs` and `ns`. Values are limited to the
//! signed 64-bit nanosecond range.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const MICROSECOND: u64 = 1_000;
const MILLISECOND: u64 = 1_000_000;
const SECOND: u64 = 1_000_000_000;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Magnitude of `i64::MIN` in nanoseconds.
const LIMIT: u64 = 1 << 63;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("invalid duration \"{0}\"")]
    Invalid(String),
    #[error("missing unit in duration \"{0}\"")]
    MissingUnit(String),
    #[error("unknown unit \"{unit}\" in duration \"{input}\"")]
    UnknownUnit { unit: String, input: String },
    #[error("duration \"{0}\" is out of range")]
    Overflow(String),
}

/// Signed time span with nanosecond resolution
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Duration(time::Duration);

impl Duration {
    pub const ZERO: Duration = Duration(time::Duration::ZERO);

    pub const fn nanoseconds(ns: i64) -> Self {
        Self(time::Duration::nanoseconds(ns))
    }
    pub const fn milliseconds(ms: i64) -> Self {
        Self(time::Duration::milliseconds(ms))
    }
    pub const fn seconds(secs: i64) -> Self {
        Self(time::Duration::seconds(secs))
    }
    pub const fn minutes(mins: i64) -> Self {
        Self(time::Duration::minutes(mins))
    }
    pub const fn hours(hours: i64) -> Self {
        Self(time::Duration::hours(hours))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn as_time(&self) -> time::Duration {
        self.0
    }

    /// `None` for negative spans.
    pub fn to_std(&self) -> Option<std::time::Duration> {
        std::time::Duration::try_from(self.0).ok()
    }

    pub fn parse(input: &str) -> Result<Self, DurationParseError> {
        let invalid = || DurationParseError::Invalid(input.to_string());
        let overflow = || DurationParseError::Overflow(input.to_string());

        let mut s = input;
        let mut neg = false;
        if let Some(rest) = s.strip_prefix('-') {
            neg = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('+') {
            s = rest;
        }
        if s == "0" {
            return Ok(Self::ZERO);
        }
        if s.is_empty() {
            return Err(invalid());
        }

        let mut total: u64 = 0;
        while let Some(&first) = s.as_bytes().first() {
            if !(first == b'.' || first.is_ascii_digit()) {
                return Err(invalid());
            }

            let (whole, rest) = leading_int(s).ok_or_else(overflow)?;
            let pre = rest.len() != s.len();
            s = rest;

            let mut frac = 0u64;
            let mut frac_scale = 1f64;
            let mut post = false;
            if let Some(rest) = s.strip_prefix('.') {
                let (f, scale, rest2) = leading_fraction(rest);
                post = rest2.len() != rest.len();
                frac = f;
                frac_scale = scale;
                s = rest2;
            }
            if !pre && !post {
                return Err(invalid());
            }

            let unit_len = s
                .bytes()
                .take_while(|b| *b != b'.' && !b.is_ascii_digit())
                .count();
            if unit_len == 0 {
                return Err(DurationParseError::MissingUnit(input.to_string()));
            }
            let (unit, rest) = s.split_at(unit_len);
            s = rest;
            let unit_ns = unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit {
                unit: unit.to_string(),
                input: input.to_string(),
            })?;

            if whole > LIMIT / unit_ns {
                return Err(overflow());
            }
            let mut v = whole * unit_ns;
            if frac > 0 {
                v += (frac as f64 * (unit_ns as f64 / frac_scale)) as u64;
                if v > LIMIT {
                    return Err(overflow());
                }
            }
            total = total
                .checked_add(v)
                .filter(|t| *t <= LIMIT)
                .ok_or_else(overflow)?;
        }

        let nanos = if neg {
            if total == LIMIT {
                i64::MIN
            } else {
                -(total as i64)
            }
        } else {
            i64::try_from(total).map_err(|_| overflow())?
        };
        Ok(Self::nanoseconds(nanos))
    }
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        // ASCII, micro sign U+00B5 and greek mu U+03BC
        "us" | "\u{b5}s" | "\u{3bc}s" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// `None` on overflow.
fn leading_int(s: &str) -> Option<(u64, &str)> {
    let n = s.bytes().take_while(u8::is_ascii_digit).count();
    let (digits, rest) = s.split_at(n);
    let mut x: u64 = 0;
    for b in digits.bytes() {
        if x > LIMIT / 10 {
            return None;
        }
        x = x * 10 + u64::from(b - b'0');
        if x > LIMIT {
            return None;
        }
    }
    Some((x, rest))
}

/// Digits past the representable precision are consumed and ignored.
fn leading_fraction(s: &str) -> (u64, f64, &str) {
    let n = s.bytes().take_while(u8::is_ascii_digit).count();
    let (digits, rest) = s.split_at(n);
    let mut x: u64 = 0;
    let mut scale = 1f64;
    let mut saturated = false;
    for b in digits.bytes() {
        if saturated {
            continue;
        }
        if x > i64::MAX as u64 / 10 {
            saturated = true;
            continue;
        }
        let y = x * 10 + u64::from(b - b'0');
        if y > LIMIT {
            saturated = true;
            continue;
        }
        x = y;
        scale *= 10.0;
    }
    (x, scale, rest)
}

/// `.ddd` with trailing zeros removed, empty when `rem` is zero.
fn fraction(rem: u128, prec: usize) -> String {
    if rem == 0 {
        return String::new();
    }
    let digits = format!("{rem:0prec$}");
    format!(".{}", digits.trim_end_matches('0'))
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.whole_nanoseconds();
        let sign = if nanos < 0 { "-" } else { "" };
        let u = nanos.unsigned_abs();

        if u == 0 {
            return f.write_str("0s");
        }
        if u < u128::from(SECOND) {
            let (unit, prec) = if u < u128::from(MICROSECOND) {
                ("ns", 0u32)
            } else if u < u128::from(MILLISECOND) {
                ("\u{b5}s", 3)
            } else {
                ("ms", 6)
            };
            let div = 10u128.pow(prec);
            return write!(
                f,
                "{sign}{}{}{unit}",
                u / div,
                fraction(u % div, prec as usize)
            );
        }

        let frac = fraction(u % u128::from(SECOND), 9);
        let secs = u / u128::from(SECOND);
        let mins = secs / 60;
        let hours = mins / 60;
        if hours > 0 {
            write!(f, "{sign}{hours}h{}m{}{frac}s", mins % 60, secs % 60)
        } else if mins > 0 {
            write!(f, "{sign}{mins}m{}{frac}s", secs % 60)
        } else {
            write!(f, "{sign}{secs}{frac}s")
        }
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<time::Duration> for Duration {
    fn from(d: time::Duration) -> Self {
        Self(d)
    }
}

impl From<Duration> for time::Duration {
    fn from(d: Duration) -> Self {
        d.0
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_normalizes_units() {
        let cases = [
            (Duration::ZERO, "0s"),
            (Duration::nanoseconds(1), "1ns"),
            (Duration::nanoseconds(1_100), "1.1\u{b5}s"),
            (Duration::nanoseconds(2_200_000), "2.2ms"),
            (Duration::milliseconds(500), "500ms"),
            (Duration::milliseconds(3_300), "3.3s"),
            (Duration::seconds(4 * 60 + 5), "4m5s"),
            (Duration::minutes(5), "5m0s"),
            (Duration::minutes(90), "1h30m0s"),
            (Duration::nanoseconds(8 * 60 * 1_000_000_000 + 1), "8m0.000000001s"),
            (Duration::milliseconds(-1_500), "-1.5s"),
            (Duration::nanoseconds(i64::MAX), "2562047h47m16.854775807s"),
            (Duration::nanoseconds(i64::MIN), "-2562047h47m16.854775808s"),
        ];
        for (d, want) in cases {
            assert_eq!(d.to_string(), want);
        }
    }

    #[test]
    fn test_parse_accepts_grammar() {
        let cases = [
            ("0", 0),
            ("-0", 0),
            ("+0", 0),
            ("0s", 0),
            ("5s", 5 * SECOND as i64),
            ("+5s", 5 * SECOND as i64),
            ("-5s", -5 * SECOND as i64),
            ("5.s", 5 * SECOND as i64),
            (".5s", 500 * MILLISECOND as i64),
            ("1.004s", 1_004 * MILLISECOND as i64),
            ("100.00100s", 100_001 * MILLISECOND as i64),
            ("10ns", 10),
            ("11us", 11_000),
            ("12\u{b5}s", 12_000),
            ("12\u{3bc}s", 12_000),
            ("13ms", 13 * MILLISECOND as i64),
            ("15m", 15 * MINUTE as i64),
            ("16h", 16 * HOUR as i64),
            ("1h30m", 90 * MINUTE as i64),
            ("10.5s4m", 4 * MINUTE as i64 + 10_500 * MILLISECOND as i64),
            ("-2m3.4s", -(2 * MINUTE as i64 + 3_400 * MILLISECOND as i64)),
            ("1h2m3s4ms5us6ns", (HOUR + 2 * MINUTE + 3 * SECOND + 4 * MILLISECOND + 5_006) as i64),
            ("0.3333333333333333333h", 20 * MINUTE as i64),
            ("9223372036854775807ns", i64::MAX),
            ("-9223372036854775808ns", i64::MIN),
        ];
        for (s, want) in cases {
            assert_eq!(Duration::parse(s).unwrap(), Duration::nanoseconds(want), "{s}");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for s in ["", "abc", "3", "-", "s", ".", "-.", ".s", "+.s", "1h 30m"] {
            assert!(Duration::parse(s).is_err(), "accepted {s:?}");
        }
        assert_eq!(
            Duration::parse("abc"),
            Err(DurationParseError::Invalid("abc".into()))
        );
        assert_eq!(
            Duration::parse("3"),
            Err(DurationParseError::MissingUnit("3".into()))
        );
        assert_eq!(
            Duration::parse("1d"),
            Err(DurationParseError::UnknownUnit {
                unit: "d".into(),
                input: "1d".into()
            })
        );
        assert!(matches!(
            Duration::parse("9223372036854775808ns"),
            Err(DurationParseError::Overflow(_))
        ));
        assert!(matches!(
            Duration::parse("-9223372036854775809ns"),
            Err(DurationParseError::Overflow(_))
        ));
        assert!(matches!(
            Duration::parse("3000000h"),
            Err(DurationParseError::Overflow(_))
        ));
    }

    #[test]
    fn test_decode_of_encode_is_identity() {
        let values = [
            0,
            1,
            999,
            1_500,
            500 * MILLISECOND as i64,
            SECOND as i64 + 1,
            5 * MINUTE as i64,
            90 * MINUTE as i64,
            26 * HOUR as i64 + 7,
            -(3 * SECOND as i64),
            i64::MAX,
            i64::MIN,
        ];
        for ns in values {
            let d = Duration::nanoseconds(ns);
            assert_eq!(Duration::parse(&d.to_string()).unwrap(), d, "{ns}");
        }
    }

    #[test]
    fn test_std_conversion() {
        assert_eq!(
            Duration::minutes(5).to_std(),
            Some(std::time::Duration::from_secs(300))
        );
        assert_eq!(Duration::seconds(-1).to_std(), None);
        assert_eq!(Duration::minutes(5).as_time(), time::Duration::minutes(5));
    }

    #[test]
    fn test_serde_string_form() {
        let d: Duration = serde_json::from_str("\"1h30m\"").unwrap();
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"1h30m0s\"");
        assert!(serde_json::from_str::<Duration>("\"abc\"").is_err());
        assert!(serde_json::from_str::<Duration>("300").is_err());
    }
}
