//! Size literals such as `10MB` or `512kB`, as printed by `go tool pprof`.
//!
//! Units are two characters, case-insensitive, and use binary multipliers
//! even though they are spelled like decimal prefixes.

use thiserror::Error;

pub const KILOBYTE: u64 = 1024;
pub const MEGABYTE: u64 = KILOBYTE * 1024;
pub const GIGABYTE: u64 = MEGABYTE * 1024;
pub const TERABYTE: u64 = GIGABYTE * 1024;

/// Every unit suffix is exactly this many bytes long.
const UNIT_LEN: usize = 2;

/// Errors from parsing a size literal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SizeError {
    #[error("invalid number '{number}': {reason}")]
    InvalidNumber { number: String, reason: String },

    #[error("incorrect data unit {0}")]
    UnknownUnit(String),
}

/// A supported byte unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteUnit {
    Kb,
    Mb,
    Gb,
    Tb,
}

impl ByteUnit {
    pub const ALL: [Self; 4] = [Self::Kb, Self::Mb, Self::Gb, Self::Tb];

    /// Look up a unit by its suffix, ignoring ASCII case.
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "kb" => Some(Self::Kb),
            "mb" => Some(Self::Mb),
            "gb" => Some(Self::Gb),
            "tb" => Some(Self::Tb),
            _ => None,
        }
    }

    #[must_use]
    pub const fn multiplier(self) -> u64 {
        match self {
            Self::Kb => KILOBYTE,
            Self::Mb => MEGABYTE,
            Self::Gb => GIGABYTE,
            Self::Tb => TERABYTE,
        }
    }

    /// Canonical upper-case spelling used by the `-limit` flag.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Kb => "KB",
            Self::Mb => "MB",
            Self::Gb => "GB",
            Self::Tb => "TB",
        }
    }
}

/// Convert a size literal (`"10GB"`, `"2.5mb"`) to a byte count.
///
/// The numeric part is everything except the final two bytes and must be a
/// floating-point literal. The result is rounded down; negative values
/// saturate to zero.
///
/// Strings of two bytes or fewer parse to `0` without error. Callers rely on
/// this to treat an empty `-limit` as "no limit", but it also accepts junk
/// like `"xx"`.
///
/// # Errors
///
/// Returns [`SizeError::InvalidNumber`] when the numeric part does not parse,
/// and [`SizeError::UnknownUnit`] when the suffix is not kb/mb/gb/tb.
pub fn parse_size(s: &str) -> Result<u64, SizeError> {
    let Some(split) = s.len().checked_sub(UNIT_LEN).filter(|n| *n > 0) else {
        return Ok(0);
    };

    let Some((number, suffix)) = s.split_at_checked(split) else {
        let tail: String = s
            .chars()
            .skip(s.chars().count().saturating_sub(UNIT_LEN))
            .collect();
        return Err(SizeError::UnknownUnit(tail.to_lowercase()));
    };

    let value: f64 = number.parse().map_err(|e: std::num::ParseFloatError| {
        SizeError::InvalidNumber {
            number: number.to_string(),
            reason: e.to_string(),
        }
    })?;

    let unit = ByteUnit::from_suffix(suffix)
        .ok_or_else(|| SizeError::UnknownUnit(suffix.to_lowercase()))?;

    Ok(scale(value, unit))
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)] // float-to-int `as` saturates, which is the behavior we want for out-of-range values
fn scale(value: f64, unit: ByteUnit) -> u64 {
    (value * unit.multiplier() as f64).floor() as u64
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_whole_units() {
        assert_eq!(parse_size("10MB"), Ok(10_485_760));
        assert_eq!(parse_size("1KB"), Ok(1024));
        assert_eq!(parse_size("3GB"), Ok(3 * GIGABYTE));
        assert_eq!(parse_size("1TB"), Ok(TERABYTE));
    }

    #[test]
    fn test_parse_fractional_rounds_down() {
        assert_eq!(parse_size("2.5GB"), Ok(2_684_354_560));
        assert_eq!(parse_size("0.5KB"), Ok(512));
        assert_eq!(parse_size("1.0009KB"), Ok(1024));
    }

    #[test]
    fn test_units_are_case_insensitive() {
        assert_eq!(parse_size("512kB"), Ok(512 * KILOBYTE));
        assert_eq!(parse_size("512kb"), Ok(512 * KILOBYTE));
        assert_eq!(parse_size("1.50Mb"), Ok(1_572_864));
    }

    #[test]
    fn test_short_strings_parse_to_zero() {
        // Lenient default kept on purpose: anything of two bytes or fewer is "no size".
        assert_eq!(parse_size(""), Ok(0));
        assert_eq!(parse_size("xx"), Ok(0));
        assert_eq!(parse_size("MB"), Ok(0));
        assert_eq!(parse_size("7"), Ok(0));
    }

    #[test]
    fn test_unknown_unit_is_named() {
        let err = parse_size("5XY").unwrap_err();
        assert_eq!(err, SizeError::UnknownUnit("xy".to_string()));
        assert_eq!(err.to_string(), "incorrect data unit xy");

        // pprof prints plain bytes as e.g. "512B", which is not a two-letter unit
        assert!(matches!(parse_size("512B"), Err(SizeError::UnknownUnit(u)) if u == "2b"));
    }

    #[test]
    fn test_number_is_checked_before_unit() {
        assert!(matches!(
            parse_size("abcXY"),
            Err(SizeError::InvalidNumber { number, .. }) if number == "abc"
        ));
        assert!(matches!(
            parse_size("1.2.3MB"),
            Err(SizeError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_negative_saturates_to_zero() {
        assert_eq!(parse_size("-1KB"), Ok(0));
    }

    #[test]
    fn test_non_ascii_suffix_is_rejected() {
        assert!(matches!(parse_size("10µB"), Err(SizeError::UnknownUnit(_))));
    }

    proptest! {
        #[test]
        fn prop_integral_sizes_round_trip(
            count in 0u64..100_000,
            unit in prop::sample::select(ByteUnit::ALL.to_vec()),
        ) {
            let literal = format!("{count}{}", unit.suffix());
            prop_assert_eq!(parse_size(&literal), Ok(count * unit.multiplier()));
            prop_assert_eq!(
                parse_size(&literal.to_lowercase()),
                Ok(count * unit.multiplier())
            );
        }
    }
}
