//! Byte sizes and the size cache
//!
//! `ByteSize` parses human input such as `70MiB` or `1.5 GB` and prints sizes
//! the same way back. Every unit is a power of 1024, so `MB` and `MiB` are the
//! same thing here.

pub mod cache;

use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

const UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

static BYTE_SIZE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*([A-Za-z]*)\s*$").expect("Invalid byte size regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteSize(u64);

impl ByteSize {
    pub const fn b(bytes: u64) -> Self {
        ByteSize(bytes)
    }

    pub const fn mib(mib: u64) -> Self {
        ByteSize(mib * 1024 * 1024)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ByteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "0B");
        }

        let mut exponent = 0;
        while exponent + 1 < UNITS.len() && self.0 >= 1u64 << (10 * (exponent + 1)) {
            exponent += 1;
        }

        let scaled = self.0 as f64 / (1u64 << (10 * exponent)) as f64;
        let rounded = format!("{scaled:.2}");
        let rounded = rounded.trim_end_matches('0').trim_end_matches('.');

        write!(f, "{} {}", rounded, UNITS[exponent])
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ByteSizeError {
    #[error("invalid size '{0}', expected a number followed by an optional unit like 70MiB")]
    Malformed(String),
    #[error("unknown size unit '{0}'")]
    UnknownUnit(String),
    #[error("size '{0}' does not fit in 64 bits")]
    Overflow(String),
}

impl FromStr for ByteSize {
    type Err = ByteSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = BYTE_SIZE_REGEX
            .captures(s)
            .ok_or_else(|| ByteSizeError::Malformed(s.to_string()))?;

        let unit = captures[2].to_ascii_lowercase();
        let exponent = match unit.as_str() {
            "" | "b" => 0,
            "k" | "kb" | "kib" => 1,
            "m" | "mb" | "mib" => 2,
            "g" | "gb" | "gib" => 3,
            "t" | "tb" | "tib" => 4,
            _ => return Err(ByteSizeError::UnknownUnit(captures[2].to_string())),
        };
        let multiplier = 1u64 << (10 * exponent);

        let number = &captures[1];
        if let Ok(whole) = number.parse::<u64>() {
            return whole
                .checked_mul(multiplier)
                .map(ByteSize)
                .ok_or_else(|| ByteSizeError::Overflow(s.to_string()));
        }

        let fractional = number
            .parse::<f64>()
            .map_err(|_| ByteSizeError::Malformed(s.to_string()))?;
        let bytes = (fractional * multiplier as f64).round();
        if bytes >= u64::MAX as f64 {
            return Err(ByteSizeError::Overflow(s.to_string()));
        }

        Ok(ByteSize(bytes as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0B")]
    #[case(512, "512 B")]
    #[case(1024, "1 KB")]
    #[case(1536, "1.5 KB")]
    #[case(70 * 1024 * 1024, "70 MB")]
    #[case(1024 * 1024 * 1024 + 1024 * 1024 * 10, "1.01 GB")]
    fn formats_sizes_in_binary_units(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(ByteSize::b(bytes).to_string(), expected);
    }

    #[rstest]
    #[case("100", 100)]
    #[case("70MiB", 70 * 1024 * 1024)]
    #[case("100MB", 100 * 1024 * 1024)]
    #[case("1.5 GB", 1536 * 1024 * 1024)]
    #[case(" 4k ", 4096)]
    #[case("0B", 0)]
    fn parses_human_sizes(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(input.parse::<ByteSize>(), Ok(ByteSize::b(expected)));
    }

    #[test]
    fn rejects_unknown_units_and_garbage() {
        assert_eq!(
            "10 parsecs".parse::<ByteSize>(),
            Err(ByteSizeError::UnknownUnit("parsecs".to_string()))
        );
        assert!(matches!(
            "-5MB".parse::<ByteSize>(),
            Err(ByteSizeError::Malformed(_))
        ));
        assert!(matches!(
            "99999999999TB".parse::<ByteSize>(),
            Err(ByteSizeError::Overflow(_))
        ));
    }
}
