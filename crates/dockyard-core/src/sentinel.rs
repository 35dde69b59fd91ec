#![forbid(unsafe_code)]

//! Sentinel codec for non-finite sizes.
//!
//! JSON has no representation for infinity, so unbounded sizes are written as
//! the strings `"Infinity"` / `"-Infinity"` and read back exactly. Finite
//! values are plain numbers. Use with `#[serde(with = "dockyard_core::sentinel")]`.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

/// String written for `f64::INFINITY`.
pub const INFINITY_SENTINEL: &str = "Infinity";

/// String written for `f64::NEG_INFINITY`.
pub const NEG_INFINITY_SENTINEL: &str = "-Infinity";

pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_infinite() {
        if value.is_sign_positive() {
            serializer.serialize_str(INFINITY_SENTINEL)
        } else {
            serializer.serialize_str(NEG_INFINITY_SENTINEL)
        }
    } else {
        serializer.serialize_f64(*value)
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(SentinelVisitor)
}

struct SentinelVisitor;

impl Visitor<'_> for SentinelVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a number or one of \"{INFINITY_SENTINEL}\" / \"{NEG_INFINITY_SENTINEL}\""
        )
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
        Ok(value)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
        Ok(value as f64)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
        Ok(value as f64)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
        match value {
            INFINITY_SENTINEL => Ok(f64::INFINITY),
            NEG_INFINITY_SENTINEL => Ok(f64::NEG_INFINITY),
            other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
        }
    }
}
