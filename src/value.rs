//! Tri-state attribute values.
//!
//! Every attribute in a prior state, config or plan is either absent
//! (`Null`), not yet known until apply (`Unknown`), or a concrete value.
//! `Unknown` is serialized as the marker object `{"$unknown": true}` so
//! plan documents survive a round trip through YAML or JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Key of the marker object used to serialize [`Value::Unknown`].
pub const UNKNOWN_MARKER: &str = "$unknown";

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<T> {
    /// The attribute is absent.
    Null,
    /// The attribute will only be known after apply.
    Unknown,
    /// The attribute has a concrete value.
    Known(T),
}

/// A translation map as it appears in config and plan documents.
///
/// Elements are themselves tri-state so a map carrying an unknown or null
/// entry can be represented (and rejected) rather than silently dropped.
pub type TranslationMap = BTreeMap<String, Value<String>>;

impl<T> Default for Value<T> {
    fn default() -> Self {
        Self::Null
    }
}

impl<T> Value<T> {
    /// Wraps a concrete value.
    #[must_use]
    pub const fn known(value: T) -> Self {
        Self::Known(value)
    }

    /// Returns true if the value is absent.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if the value is not yet known.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns true if the value is concrete.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Returns the concrete value, if any.
    #[must_use]
    pub const fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Null | Self::Unknown => None,
        }
    }

    /// Consumes the value and returns the concrete value, if any.
    #[must_use]
    pub fn into_known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Null | Self::Unknown => None,
        }
    }

    /// Marks the value as unknown.
    pub fn set_unknown(&mut self) {
        *self = Self::Unknown;
    }

    /// Marks the value as absent.
    pub fn set_null(&mut self) {
        *self = Self::Null;
    }

    /// Maps the concrete value, keeping null and unknown as they are.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Value<U> {
        match self {
            Self::Null => Value::Null,
            Self::Unknown => Value::Unknown,
            Self::Known(value) => Value::Known(f(value)),
        }
    }

    /// Borrows the concrete value.
    #[must_use]
    pub const fn as_ref(&self) -> Value<&T> {
        match self {
            Self::Null => Value::Null,
            Self::Unknown => Value::Unknown,
            Self::Known(value) => Value::Known(value),
        }
    }
}

impl<T: Clone> Value<T> {
    /// Returns the concrete value cloned into an `Option`.
    #[must_use]
    pub fn to_option(&self) -> Option<T> {
        self.as_known().cloned()
    }
}

impl<T> From<Option<T>> for Value<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Known)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnknownMarker {
    #[serde(rename = "$unknown")]
    unknown: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr<T> {
    Unknown(UnknownMarker),
    Plain(Option<T>),
}

impl<T: Serialize> Serialize for Value<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Unknown => UnknownMarker { unknown: true }.serialize(serializer),
            Self::Known(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Value<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Repr::<T>::deserialize(deserializer)? {
            Repr::Unknown(marker) if marker.unknown => Ok(Self::Unknown),
            Repr::Unknown(_) | Repr::Plain(None) => Ok(Self::Null),
            Repr::Plain(Some(value)) => Ok(Self::Known(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(default)]
    struct Holder {
        name: Value<String>,
        count: Value<i64>,
        translations: Value<TranslationMap>,
    }

    #[test]
    fn test_missing_fields_are_null() {
        let holder: Holder = serde_json::from_str("{}").unwrap();
        assert!(holder.name.is_null());
        assert!(holder.count.is_null());
        assert!(holder.translations.is_null());
    }

    #[test]
    fn test_unknown_marker() {
        let holder: Holder =
            serde_json::from_str(r#"{"name": {"$unknown": true}, "count": 3}"#).unwrap();
        assert!(holder.name.is_unknown());
        assert_eq!(holder.count, Value::Known(3));

        let json = serde_json::to_value(&holder).unwrap();
        assert_eq!(json["name"], serde_json::json!({"$unknown": true}));
        assert_eq!(json["translations"], serde_json::Value::Null);
    }

    #[test]
    fn test_unknown_map_is_not_a_translation_map() {
        let holder: Holder =
            serde_json::from_str(r#"{"translations": {"$unknown": true}}"#).unwrap();
        assert!(holder.translations.is_unknown());
    }

    #[test]
    fn test_map_with_unknown_element() {
        let holder: Holder = serde_yaml::from_str(
            "translations:\n  original: en\n  en: hi\n  fr:\n    $unknown: true\n",
        )
        .unwrap();
        let map = holder.translations.as_known().unwrap();
        assert_eq!(map.get("en"), Some(&Value::Known(String::from("hi"))));
        assert!(map.get("fr").unwrap().is_unknown());
    }

    #[test]
    fn test_map_and_set_unknown() {
        let mut value = Value::Known(2_i64);
        assert_eq!(value.clone().map(|v| v * 2), Value::Known(4));
        value.set_unknown();
        assert_eq!(value.map(|v| v * 2), Value::Unknown);
    }

    #[test]
    fn test_holders_of_eq_payloads_are_eq() {
        fn distinct<T: Eq + std::fmt::Debug>(a: &T, b: &T) -> bool {
            a != b
        }

        let known = Holder {
            name: Value::Known(String::from("API")),
            ..Holder::default()
        };
        let unknown = Holder {
            name: Value::Unknown,
            ..Holder::default()
        };
        assert!(distinct(&known, &unknown));
        assert!(!distinct(&known, &known.clone()));
    }
}
