//! Timestamp conversion between RFC 3339 strings and epoch seconds.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::ConversionError;
use crate::value::Value;

/// Parses an RFC 3339 timestamp into signed seconds since the epoch.
///
/// # Errors
///
/// Returns [`ConversionError::InvalidTimestamp`] if the string is not a
/// valid RFC 3339 timestamp.
pub fn to_epoch(timestamp: &str) -> Result<i64, ConversionError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.timestamp())
        .map_err(|e| ConversionError::InvalidTimestamp {
            value: timestamp.to_owned(),
            message: e.to_string(),
        })
}

/// Formats epoch seconds as an RFC 3339 timestamp in UTC.
///
/// Out-of-range values are reported as a conversion error.
///
/// # Errors
///
/// Returns [`ConversionError::InvalidTimestamp`] if the value does not fit
/// the supported date range.
pub fn from_epoch(seconds: i64) -> Result<String, ConversionError> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| ConversionError::InvalidTimestamp {
            value: seconds.to_string(),
            message: String::from("out of range"),
        })
}

/// Converts an optional plan timestamp for the wire.
///
/// # Errors
///
/// See [`to_epoch`].
pub fn value_to_epoch(value: &Value<String>) -> Result<Option<i64>, ConversionError> {
    value.as_known().map(|ts| to_epoch(ts)).transpose()
}

/// Converts an optional wire timestamp into a plan value.
///
/// # Errors
///
/// See [`from_epoch`].
pub fn value_from_epoch(seconds: Option<i64>) -> Result<Value<String>, ConversionError> {
    Ok(seconds.map(from_epoch).transpose()?.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_epoch() {
        assert_eq!(to_epoch("1970-01-01T00:00:00Z").unwrap(), 0);
        assert_eq!(to_epoch("2024-03-01T12:00:00Z").unwrap(), 1_709_294_400);
        assert_eq!(to_epoch("2024-03-01T14:00:00+02:00").unwrap(), 1_709_294_400);
        assert_eq!(to_epoch("1969-12-31T23:59:00Z").unwrap(), -60);
    }

    #[test]
    fn test_from_epoch_is_utc() {
        assert_eq!(from_epoch(1_709_294_400).unwrap(), "2024-03-01T12:00:00Z");
        assert_eq!(from_epoch(-60).unwrap(), "1969-12-31T23:59:00Z");
    }

    #[test]
    fn test_invalid_timestamp() {
        let err = to_epoch("yesterday").unwrap_err();
        assert!(matches!(
            err,
            ConversionError::InvalidTimestamp { ref value, .. } if value == "yesterday"
        ));
    }

    #[test]
    fn test_optional_values() {
        assert_eq!(value_to_epoch(&Value::Null).unwrap(), None);
        assert_eq!(value_to_epoch(&Value::Unknown).unwrap(), None);
        assert_eq!(value_from_epoch(None).unwrap(), Value::Null);
        assert_eq!(
            value_from_epoch(Some(0)).unwrap(),
            Value::Known(String::from("1970-01-01T00:00:00Z"))
        );
    }
}
