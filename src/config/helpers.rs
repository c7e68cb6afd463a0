use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Deserializes a `Duration` written as a whole number of milliseconds.
pub fn deserialize_duration_from_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}
