//! Signed durations with nanosecond resolution.
//!
//! The text form is a sequence of decimal numbers, each with an optional
//! fraction and a mandatory unit, with an optional leading sign:
//! `300ms`, `-1.5h`, `2h45m`. Valid units are `ns`, `us` (or `µs`/`μs`),
//! `ms`, `s`, `m` and `h`.

use std::fmt;

use thiserror::Error;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration {0:?}")]
pub struct DurationError(pub String);

/// A signed count of nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(i64);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub fn from_nanos(nanos: i64) -> Self {
        Duration(nanos)
    }

    pub fn as_nanos(self) -> i64 {
        self.0
    }

    /// Duration as a floating point number of seconds.
    pub fn as_secs_f64(self) -> f64 {
        let secs = self.0 / SECOND as i64;
        let nanos = self.0 % SECOND as i64;
        secs as f64 + nanos as f64 / 1e9
    }

    pub fn parse(text: &str) -> Result<Self, DurationError> {
        parse_duration(text).ok_or_else(|| DurationError(text.to_string()))
    }
}

fn unit_of(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "\u{00B5}s" | "\u{03BC}s" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Leading run of ASCII digits as an integer (`None` on overflow) and the rest
/// of the text.
fn leading_int(text: &str) -> (Option<u64>, &str) {
    let end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    let mut value: Option<u64> = Some(0);
    for digit in text[..end].bytes() {
        value = value
            .and_then(|v| v.checked_mul(10))
            .and_then(|v| v.checked_add(u64::from(digit - b'0')));
    }
    (value, &text[end..])
}

/// Leading run of digits read as a fraction: numerator and denominator.
/// Digits that no longer fit are dropped.
fn leading_fraction(text: &str) -> (u64, f64, &str) {
    let end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    let mut value: u64 = 0;
    let mut scale = 1.0;
    let mut overflow = false;
    for digit in text[..end].bytes() {
        if overflow {
            continue;
        }
        match value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(digit - b'0')))
        {
            Some(v) => {
                value = v;
                scale *= 10.0;
            }
            None => overflow = true,
        }
    }
    (value, scale, &text[end..])
}

fn parse_duration(text: &str) -> Option<Duration> {
    let (negative, mut rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        let before_int = rest.len();
        let (whole, after_int) = leading_int(rest);
        let whole = whole?;
        let had_int = after_int.len() != before_int;
        rest = after_int;

        let mut fraction = (0, 1.0);
        let mut had_fraction = false;
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (numerator, scale, after_fraction) = leading_fraction(after_dot);
            had_fraction = after_fraction.len() != after_dot.len();
            fraction = (numerator, scale);
            rest = after_fraction;
        }
        if !had_int && !had_fraction {
            return None;
        }

        let unit_end = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = unit_of(&rest[..unit_end])?;
        rest = &rest[unit_end..];

        let mut component = whole.checked_mul(unit)?;
        if fraction.0 > 0 {
            let extra = (fraction.0 as f64 * (unit as f64 / fraction.1)) as u64;
            component = component.checked_add(extra)?;
        }
        total = total.checked_add(component)?;
    }

    let limit = i64::MAX as u64;
    if negative {
        if total > limit + 1 {
            return None;
        }
        Some(Duration(-(total as i128) as i64))
    } else {
        if total > limit {
            return None;
        }
        Some(Duration(total as i64))
    }
}

/// `value / 10^precision` and the fractional digits, trailing zeros removed.
fn split_fraction(value: u64, precision: u32) -> (u64, String) {
    let scale = 10u64.pow(precision);
    let fraction = value % scale;
    if fraction == 0 {
        return (value / scale, String::new());
    }
    let digits = format!("{:0width$}", fraction, width = precision as usize);
    (value / scale, format!(".{}", digits.trim_end_matches('0')))
}

impl fmt::Display for Duration {
    /// Renders like `72h3m0.5s`; durations under a second use a smaller
    /// unit (`1.5µs`, `35ms`). Zero is `0s`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let nanos = self.0.unsigned_abs();

        if nanos == 0 {
            return f.write_str("0s");
        }

        if nanos < SECOND {
            let (precision, unit) = if nanos < MICROSECOND {
                (0, "ns")
            } else if nanos < MILLISECOND {
                (3, "\u{00B5}s")
            } else {
                (6, "ms")
            };
            let (whole, fraction) = split_fraction(nanos, precision);
            return write!(f, "{sign}{whole}{fraction}{unit}");
        }

        let (secs, fraction) = split_fraction(nanos, 9);
        let minutes = secs / 60;
        let hours = minutes / 60;
        if hours > 0 {
            write!(f, "{sign}{hours}h{}m{}{fraction}s", minutes % 60, secs % 60)
        } else if minutes > 0 {
            write!(f, "{sign}{minutes}m{}{fraction}s", secs % 60)
        } else {
            write!(f, "{sign}{secs}{fraction}s")
        }
    }
}
