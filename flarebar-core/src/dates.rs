//! Flexible timestamp parsing for Cloudflare API payloads.
//!
//! Cloudflare endpoints are inconsistent about fractional seconds: the same
//! field may arrive as `2024-01-01T00:00:00.123456Z`, `…00.1Z`, or with no
//! fraction at all. [`parse_api_date`] normalizes any fractional part to
//! exactly three digits (pad or truncate) before parsing, so every variant
//! decodes to the same millisecond-precision instant.

use chrono::{DateTime, SecondsFormat, Utc};

/// Parses a Cloudflare API timestamp, tolerating variable fractional-second
/// precision. Returns `None` if the value is not a recognizable ISO-8601
/// instant.
pub fn parse_api_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Some(normalized) = normalize_fraction(value) {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Rewrites the fractional-seconds substring to exactly three digits.
///
/// Returns `None` when the value carries no fraction; the caller then parses
/// the value as-is.
fn normalize_fraction(value: &str) -> Option<String> {
    let dot = value.find('.')?;
    let digits_start = dot + 1;
    let digits_end = value[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(value.len(), |i| digits_start + i);

    if digits_end == digits_start {
        return None;
    }

    let mut fraction = value[digits_start..digits_end].to_string();
    fraction.truncate(3);
    while fraction.len() < 3 {
        fraction.push('0');
    }

    Some(format!(
        "{}{}{}",
        &value[..digits_start],
        fraction,
        &value[digits_end..]
    ))
}

/// Serde adapter for required timestamp fields.
///
/// Use with `#[serde(with = "flarebar_core::dates::flexible_date")]`.
pub mod flexible_date {
    use super::{DateTime, SecondsFormat, Utc, parse_api_date};
    use serde::{Deserialize, Deserializer, Serializer, de};

    /// Deserializes a timestamp with flexible fractional seconds.
    ///
    /// # Errors
    ///
    /// Fails when the value is not a recognizable ISO-8601 instant.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_api_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    /// Serializes to RFC 3339 with millisecond precision.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Serde adapter for optional timestamp fields.
///
/// Use with `#[serde(default, with = "flarebar_core::dates::flexible_date_opt")]`.
/// A missing or `null` field decodes to `None`; a present but unparseable
/// value is a decoding error.
pub mod flexible_date_opt {
    use super::{DateTime, SecondsFormat, Utc, parse_api_date};
    use serde::{Deserialize, Deserializer, Serializer, de};

    /// Deserializes an optional timestamp with flexible fractional seconds.
    ///
    /// # Errors
    ///
    /// Fails when a present value is not a recognizable ISO-8601 instant.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse_api_date(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}"))),
        }
    }

    /// Serializes to RFC 3339 with millisecond precision, or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
