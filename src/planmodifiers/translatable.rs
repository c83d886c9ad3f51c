//! Consistency between a translatable field's original and its map.
//!
//! The user configures one side of a pair and the server computes the
//! other. When the configured side changes, the computed side is marked
//! unknown in the plan. Only the immutable config and prior state are read,
//! so rewriting the plan cannot retrigger the rule.

use tracing::debug;

use crate::value::{TranslationMap, Value};

/// Borrowed view of one translatable pair.
#[derive(Debug, Clone, Copy)]
pub struct Pair<'a> {
    /// Text in the default language.
    pub original: &'a Value<String>,
    /// Translation map.
    pub translations: &'a Value<TranslationMap>,
}

impl<'a> Pair<'a> {
    /// Borrows a pair of fields.
    #[must_use]
    pub const fn new(original: &'a Value<String>, translations: &'a Value<TranslationMap>) -> Self {
        Self {
            original,
            translations,
        }
    }
}

/// Side of a pair rewritten to unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The scalar original.
    Original,
    /// The translation map.
    Translations,
}

/// Decides which side of a pair becomes unknown.
///
/// A non-null map in config is authoritative; otherwise a non-null original
/// is. Returns `None` when the authoritative side matches the prior state
/// or neither side is configured.
#[must_use]
pub fn decide(state: Pair<'_>, config: Pair<'_>) -> Option<Side> {
    if !config.translations.is_null() {
        return (config.translations != state.translations).then_some(Side::Original);
    }

    if !config.original.is_null() {
        return (config.original != state.original).then_some(Side::Translations);
    }

    None
}

/// Applies the rule for one pair, rewriting the plan in place.
pub fn plan_pair(
    name: &str,
    state: Pair<'_>,
    config: Pair<'_>,
    plan_original: &mut Value<String>,
    plan_translations: &mut Value<TranslationMap>,
) -> Option<Side> {
    let side = decide(state, config)?;

    match side {
        Side::Original => {
            debug!(field = name, "Translations changed, original becomes unknown");
            plan_original.set_unknown();
        }
        Side::Translations => {
            debug!(field = name, "Original changed, translations become unknown");
            plan_translations.set_unknown();
        }
    }

    Some(side)
}

/// Applies [`plan_pair`] to a pair of fields named `$orig` and `$trans`
/// on three values of the same type.
macro_rules! translatable_pair {
    ($state:expr, $config:expr, $plan:expr, $orig:ident, $trans:ident) => {
        $crate::planmodifiers::translatable::plan_pair(
            stringify!($orig),
            $crate::planmodifiers::translatable::Pair::new(&$state.$orig, &$state.$trans),
            $crate::planmodifiers::translatable::Pair::new(&$config.$orig, &$config.$trans),
            &mut $plan.$orig,
            &mut $plan.$trans,
        )
    };
}

pub(crate) use translatable_pair;
