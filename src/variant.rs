//! Exactly-one-of polymorphic objects.
//!
//! In config and plan documents a polymorphic object is a struct of
//! optional slots, one per variant. Only one slot may be set. On the wire
//! the same object is a flat JSON object whose discriminator field
//! (`type`, or `method` for native checks) names the variant.
//!
//! Slot structs implement [`SlotSet`] and convert into a proper Rust enum
//! implementing [`Variant`] once the arity check has passed; everything
//! past the input boundary works on the enum.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};

use crate::diagnostics::{AttrPath, Diagnostics};
use crate::error::VariantError;
use crate::value::UNKNOWN_MARKER;

/// Summary shared by both arity diagnostics.
pub const ARITY_SUMMARY: &str = "Expected a single non-null Object field.";

/// A polymorphic object after slot selection.
pub trait Variant: Sized {
    /// Human-readable union name used in errors.
    const UNION: &'static str;

    /// Name of the selected slot.
    fn slot_name(&self) -> &'static str;

    /// Decodes the wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the discriminator is missing or unknown, or the
    /// payload does not match the tag.
    fn decode(wire: &Json) -> Result<Self, VariantError>;

    /// Encodes the wire form, discriminator(s) included.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    fn encode(&self) -> Result<Json, VariantError>;
}

/// A struct of optional slots standing in for a [`Variant`] in documents.
pub trait SlotSet {
    /// Human-readable union name used in errors.
    const UNION: &'static str;

    /// The enum produced by selecting a slot.
    type Selected;

    /// Slot names paired with whether each slot is set, in declaration order.
    fn slots(&self) -> Vec<(&'static str, bool)>;

    /// Converts the single set slot into the enum.
    ///
    /// # Errors
    ///
    /// Returns [`VariantError::NoSlotSelected`] or
    /// [`VariantError::TooManySlots`] when the arity is wrong.
    fn select(&self) -> Result<Self::Selected, VariantError>;

    /// Name of the single set slot, if the arity is right.
    #[must_use]
    fn selected_name(&self) -> Option<&'static str> {
        require_single(Self::UNION, &self.slots()).ok()
    }
}

/// Checks that exactly one slot is set.
///
/// Produces a single error diagnostic at `path` when zero or several slots
/// are set, listing the offending slot names.
#[must_use]
pub fn validate_exactly_one(path: &AttrPath, slots: &[(&'static str, bool)]) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let set: Vec<&str> = slots.iter().filter(|(_, set)| *set).map(|(n, _)| *n).collect();

    if set.len() == 1 {
        return diags;
    }

    let detail = if set.is_empty() {
        let names: Vec<&str> = slots.iter().map(|(n, _)| *n).collect();
        format!(
            "Less than one field in this Object is Non-null. There are 0; expected one of: [{}]",
            names.join(", ")
        )
    } else {
        format!(
            "More than one field in this Object is Non-null. There are {}: [{}]",
            set.len(),
            set.join(", ")
        )
    };

    diags.add_attribute_error(path.clone(), ARITY_SUMMARY, detail);
    diags
}

/// Returns the name of the single set slot.
///
/// # Errors
///
/// Returns [`VariantError::NoSlotSelected`] when no slot is set and
/// [`VariantError::TooManySlots`] when several are.
pub fn require_single(
    union: &'static str,
    slots: &[(&'static str, bool)],
) -> Result<&'static str, VariantError> {
    let set: Vec<&'static str> = slots.iter().filter(|(_, set)| *set).map(|(n, _)| *n).collect();
    match set.as_slice() {
        [] => Err(VariantError::NoSlotSelected { union }),
        [one] => Ok(*one),
        _ => Err(VariantError::TooManySlots { union, slots: set }),
    }
}

/// Reads a string discriminator from a wire object.
///
/// # Errors
///
/// Returns [`VariantError::MissingDiscriminator`] if the field is absent or
/// not a string.
pub fn discriminator<'a>(
    union: &'static str,
    key: &'static str,
    wire: &'a Json,
) -> Result<&'a str, VariantError> {
    wire.get(key)
        .and_then(Json::as_str)
        .ok_or(VariantError::MissingDiscriminator { union, key })
}

/// Decodes the payload of a recognised tag.
///
/// Discriminator fields are ignored by the payload structs.
///
/// # Errors
///
/// Returns [`VariantError::Decode`] if the payload does not match.
pub fn decode_payload<T: DeserializeOwned>(
    union: &'static str,
    tag: &str,
    wire: &Json,
) -> Result<T, VariantError> {
    T::deserialize(wire).map_err(|e| VariantError::Decode {
        union,
        tag: tag.to_owned(),
        message: e.to_string(),
    })
}

/// Serializes a payload into a wire object and prepends its discriminators.
///
/// Null members and unknown markers are dropped, so only settled values
/// reach the server.
///
/// # Errors
///
/// Returns [`VariantError::Encode`] if the payload does not serialize to
/// an object.
pub fn tagged<T: Serialize>(
    union: &'static str,
    tags: &[(&'static str, &'static str)],
    payload: &T,
) -> Result<Json, VariantError> {
    let encoded = serde_json::to_value(payload).map_err(|e| VariantError::Encode {
        union,
        message: e.to_string(),
    })?;

    let Json::Object(fields) = encoded else {
        return Err(VariantError::Encode {
            union,
            message: String::from("payload is not an object"),
        });
    };

    let mut form = Map::new();
    for (key, tag) in tags {
        form.insert((*key).to_owned(), Json::String((*tag).to_owned()));
    }
    for (key, value) in fields {
        if !is_unsettled(&value) {
            form.insert(key, value);
        }
    }

    Ok(Json::Object(form))
}

fn is_unsettled(value: &Json) -> bool {
    match value {
        Json::Null => true,
        Json::Object(map) => map.len() == 1 && map.contains_key(UNKNOWN_MARKER),
        _ => false,
    }
}
