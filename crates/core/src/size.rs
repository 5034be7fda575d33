//! Byte sizes that accept either a raw number or a human-readable string.
//!
//! Units are binary multiples (`1KB == 1024`), matching how trackers and the
//! configuration template express sizes. Accepted suffixes are `B`, `KB`,
//! `MB`, `GB`, `TB` and `PB`, with an optional `i` (`MiB`), case-insensitive,
//! with or without whitespace before the unit.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub const fn bytes(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse `"100MB"`, `"1.5 GiB"`, `"2048"` and similar.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("empty size".into()));
        }

        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);

        let value: f64 = number
            .parse()
            .map_err(|_| CoreError::Validation(format!("invalid size: '{input}'")))?;

        let unit = unit.trim().to_ascii_uppercase().replace('I', "");
        let exponent = match unit.as_str() {
            "" => 0,
            "K" => 1,
            "M" => 2,
            "G" => 3,
            "T" => 4,
            "P" => 5,
            other => UNITS
                .iter()
                .position(|u| *u == other)
                .ok_or_else(|| CoreError::Validation(format!("invalid size unit in '{input}'")))?,
        };

        let bytes = value * 1024f64.powi(exponent as i32);
        if !bytes.is_finite() || bytes > u64::MAX as f64 {
            return Err(CoreError::Validation(format!("size out of range: '{input}'")));
        }
        Ok(Self(bytes.round() as u64))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut value = self.0 as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            write!(f, "{}B", self.0)
        } else {
            write!(f, "{value:.2}{}", UNITS[unit])
        }
    }
}

impl Serialize for ByteSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ByteSizeVisitor)
    }
}

struct ByteSizeVisitor;

impl Visitor<'_> for ByteSizeVisitor {
    type Value = ByteSize;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a byte count or a size string such as \"100MB\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ByteSize, E> {
        Ok(ByteSize(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ByteSize, E> {
        u64::try_from(v)
            .map(ByteSize)
            .map_err(|_| E::custom(format!("size cannot be negative: {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ByteSize, E> {
        if v < 0.0 || !v.is_finite() {
            return Err(E::custom(format!("invalid size: {v}")));
        }
        Ok(ByteSize(v.round() as u64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ByteSize, E> {
        if v.trim().is_empty() {
            return Ok(ByteSize(0));
        }
        ByteSize::parse(v).map_err(|e| E::custom(e.to_string()))
    }
}
