//! Serde helper storing a [`TimeDelta`] as integer milliseconds.
//!
//! Use with `#[serde(with = "millis")]`.

use chrono::TimeDelta;
use serde::{Deserialize, Deserializer, Serializer, de::Error};

/// Serializes a duration as milliseconds.
pub fn serialize<S>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(delta.num_milliseconds())
}

/// Deserializes a duration from milliseconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<TimeDelta, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = i64::deserialize(deserializer)?;
    TimeDelta::try_milliseconds(millis)
        .ok_or_else(|| D::Error::custom(format!("duration out of range: {} ms", millis)))
}
