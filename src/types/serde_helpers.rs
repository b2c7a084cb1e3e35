//! Custom serde deserializers for flexible type handling
//!
//! The web client has shipped session payloads where identifiers are JSON
//! strings in some builds and integers in others.

use serde::{Deserialize, Deserializer, de};

/// Deserialize an identifier that can be:
/// - JSON string: `"1234"` (must not be blank)
/// - Non-negative integer: `1234`, normalised to `"1234"`
///
/// Floats, booleans, negative numbers, objects and arrays are rejected so that
/// a type mismatch surfaces as a decode error instead of a bogus identifier.
pub fn deserialize_flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleId {
        Text(String),
        Number(u64),
    }

    match FlexibleId::deserialize(deserializer) {
        Ok(FlexibleId::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(de::Error::custom("identifier is empty"));
            }
            Ok(trimmed.to_string())
        }
        Ok(FlexibleId::Number(n)) => Ok(n.to_string()),
        Err(_) => Err(de::Error::custom(
            "expected a string or non-negative integer identifier",
        )),
    }
}

/// Deserialize an optional unix timestamp (seconds) into a UTC datetime
pub fn deserialize_unix_seconds<'de, D>(
    deserializer: D,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<i64> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(secs) => chrono::DateTime::from_timestamp(secs, 0)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", secs))),
    }
}
