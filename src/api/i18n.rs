//! Translatable strings.
//!
//! Hund accepts a translatable field either as a plain string or as a flat
//! map of language code to text. A map always carries an `original` entry
//! whose value names the default language, so `{original: "en", en: "Hi"}`
//! resolves to the original text `"Hi"`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use crate::value::{TranslationMap, Value};

/// Key of the entry naming the default language.
pub const ORIGINAL_KEY: &str = "original";

/// Wire form of a translatable string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum I18nString {
    /// A single string in the default language.
    Plain(String),
    /// A map of language code to text, including the `original` pointer.
    Translations(BTreeMap<String, String>),
}

/// Canonical form of a translatable field pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTranslatable {
    /// Text in the default language.
    pub original: String,
    /// Full translation map, empty when only the original was supplied.
    pub translations: BTreeMap<String, String>,
}

impl ResolvedTranslatable {
    /// Returns the wire form sent to Hund.
    ///
    /// A field without translations is sent as a plain string; the server
    /// expands it into the single-language map itself.
    #[must_use]
    pub fn to_wire(&self) -> I18nString {
        if self.translations.is_empty() {
            I18nString::Plain(self.original.clone())
        } else {
            I18nString::Translations(self.translations.clone())
        }
    }

    /// Returns the resolved pair as plan values.
    #[must_use]
    pub fn to_values(&self) -> (Value<String>, Value<TranslationMap>) {
        let map = if self.translations.is_empty() {
            Value::Null
        } else {
            Value::Known(known_map(&self.translations))
        };
        (Value::Known(self.original.clone()), map)
    }
}

/// Resolves a config-side `(original, translations)` pair.
///
/// A known translation map is authoritative: the original text is read
/// through its `original` pointer. Otherwise a known original is used
/// alone. Returns `None` when neither side is known.
///
/// # Errors
///
/// Returns [`ConversionError::NonStringElement`] if a map entry is not a
/// known string and [`ConversionError::MissingDefaultKey`] if the map has
/// no `original` entry or the language it names is absent.
pub fn resolve(
    original: &Value<String>,
    translations: &Value<TranslationMap>,
) -> Result<Option<ResolvedTranslatable>, ConversionError> {
    if let Some(map) = translations.as_known() {
        let flat = flatten(map)?;
        let text = default_text(&flat).ok_or_else(|| ConversionError::MissingDefaultKey {
            pointer: flat.get(ORIGINAL_KEY).cloned(),
        })?;

        return Ok(Some(ResolvedTranslatable {
            original: text.to_owned(),
            translations: flat,
        }));
    }

    Ok(original.as_known().map(|text| ResolvedTranslatable {
        original: text.clone(),
        translations: BTreeMap::new(),
    }))
}

/// Splits a server-provided translatable string into plan values.
///
/// # Errors
///
/// Returns [`ConversionError::NotAMap`] for a plain string,
/// [`ConversionError::MissingOriginalField`] when the map has no
/// `original` entry and [`ConversionError::MissingDefaultKey`] when the
/// default language is absent.
pub fn from_wire(wire: &I18nString) -> Result<ResolvedTranslatable, ConversionError> {
    let I18nString::Translations(map) = wire else {
        return Err(ConversionError::NotAMap);
    };

    let pointer = map.get(ORIGINAL_KEY).ok_or(ConversionError::MissingOriginalField)?;
    let text = map
        .get(pointer)
        .ok_or_else(|| ConversionError::MissingDefaultKey {
            pointer: Some(pointer.clone()),
        })?;

    Ok(ResolvedTranslatable {
        original: text.clone(),
        translations: map.clone(),
    })
}

/// Decodes an optional server-side field into plan values, mapping an
/// absent field to a pair of nulls.
///
/// # Errors
///
/// See [`from_wire`].
pub fn values_from_wire(
    wire: Option<&I18nString>,
) -> Result<(Value<String>, Value<TranslationMap>), ConversionError> {
    match wire {
        None => Ok((Value::Null, Value::Null)),
        Some(wire) => {
            let resolved = from_wire(wire)?;
            Ok((
                Value::Known(resolved.original),
                Value::Known(known_map(&resolved.translations)),
            ))
        }
    }
}

/// Encodes a config-side pair for the wire, or `None` if both are unset.
///
/// # Errors
///
/// See [`resolve`].
pub fn to_wire(
    original: &Value<String>,
    translations: &Value<TranslationMap>,
) -> Result<Option<I18nString>, ConversionError> {
    Ok(resolve(original, translations)?.map(|r| r.to_wire()))
}

fn flatten(map: &TranslationMap) -> Result<BTreeMap<String, String>, ConversionError> {
    map.iter()
        .map(|(key, value)| match value {
            Value::Known(text) => Ok((key.clone(), text.clone())),
            Value::Null | Value::Unknown => {
                Err(ConversionError::NonStringElement { key: key.clone() })
            }
        })
        .collect()
}

fn default_text(map: &BTreeMap<String, String>) -> Option<&str> {
    let pointer = map.get(ORIGINAL_KEY)?;
    map.get(pointer).map(String::as_str)
}

fn known_map(map: &BTreeMap<String, String>) -> TranslationMap {
    map.iter()
        .map(|(k, v)| (k.clone(), Value::Known(v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> TranslationMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::Known((*v).to_string())))
            .collect()
    }

    #[test]
    fn test_translations_are_authoritative() {
        let translations = Value::Known(map(&[("original", "o"), ("o", "hi"), ("fr", "salut")]));
        let resolved = resolve(&Value::Known(String::from("stale")), &translations)
            .unwrap()
            .unwrap();

        assert_eq!(resolved.original, "hi");
        assert_eq!(resolved.translations.len(), 3);
        assert_eq!(resolved.translations["fr"], "salut");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let translations = Value::Known(map(&[("original", "o"), ("o", "hi"), ("fr", "salut")]));
        let first = resolve(&Value::Null, &translations).unwrap().unwrap();
        let (original, map) = first.to_values();
        let second = resolve(&original, &map).unwrap().unwrap();
        assert_eq!(first, second);

        let plain = resolve(&Value::Known(String::from("Hello")), &Value::Null)
            .unwrap()
            .unwrap();
        let (original, map) = plain.to_values();
        assert_eq!(resolve(&original, &map).unwrap().unwrap(), plain);
    }

    #[test]
    fn test_original_only_is_sent_plain() {
        let resolved = resolve(&Value::Known(String::from("Hello")), &Value::Null)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.to_wire(), I18nString::Plain(String::from("Hello")));
    }

    #[test]
    fn test_neither_side_known() {
        assert_eq!(resolve(&Value::Null, &Value::Null).unwrap(), None);
        assert_eq!(resolve(&Value::Unknown, &Value::Unknown).unwrap(), None);
    }

    #[test]
    fn test_missing_default_key() {
        let missing_pointer = Value::Known(map(&[("en", "hi")]));
        assert_eq!(
            resolve(&Value::Null, &missing_pointer),
            Err(ConversionError::MissingDefaultKey { pointer: None })
        );

        let dangling = Value::Known(map(&[("original", "de"), ("en", "hi")]));
        assert_eq!(
            resolve(&Value::Null, &dangling),
            Err(ConversionError::MissingDefaultKey {
                pointer: Some(String::from("de"))
            })
        );
    }

    #[test]
    fn test_non_string_element() {
        let mut translations = map(&[("original", "en"), ("en", "hi")]);
        translations.insert(String::from("fr"), Value::Unknown);
        assert_eq!(
            resolve(&Value::Null, &Value::Known(translations)),
            Err(ConversionError::NonStringElement {
                key: String::from("fr")
            })
        );
    }

    #[test]
    fn test_from_wire_round_trip() {
        let wire: I18nString =
            serde_json::from_str(r#"{"original": "o", "o": "hi", "fr": "salut"}"#).unwrap();
        let resolved = from_wire(&wire).unwrap();
        assert_eq!(resolved.original, "hi");
        assert_eq!(resolved.to_wire(), wire);
    }

    #[test]
    fn test_from_wire_errors() {
        let no_original: I18nString = serde_json::from_str(r#"{"en": "hi"}"#).unwrap();
        assert_eq!(from_wire(&no_original), Err(ConversionError::MissingOriginalField));

        let plain: I18nString = serde_json::from_str(r#""hi""#).unwrap();
        assert_eq!(from_wire(&plain), Err(ConversionError::NotAMap));
    }

    #[test]
    fn test_values_from_wire_absent() {
        assert_eq!(values_from_wire(None).unwrap(), (Value::Null, Value::Null));
    }
}
