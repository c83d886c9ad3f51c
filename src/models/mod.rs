//! Resource models.
//!
//! Every resource is a plain struct of [`Value`] fields so the same type
//! carries prior state, config and plan. Server responses have their own
//! `*Response` structs and convert into models through `from_response`.

pub mod component;
pub mod group;
pub mod issue;
pub mod issue_template;
pub mod issue_update;
pub mod metric_provider;
pub mod native;
pub mod template;
pub mod watchdog;

pub use component::ComponentModel;
pub use group::GroupModel;
pub use issue::{IssueModel, ScheduleModel};
pub use issue_template::{IssueTemplateKind, IssueTemplateModel};
pub use issue_update::IssueUpdateModel;
pub use metric_provider::{MetricInstanceModel, MetricProviderModel, MetricProviderService};
pub use native::NativeService;
pub use template::{TemplateApplicationModel, TemplateVariable, VariableDecl};
pub use watchdog::{WatchdogModel, WatchdogService};

use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::api::i18n;
use crate::error::HundError;
use crate::value::{TranslationMap, Value};

/// Inserts a known value into a form, skipping null and unknown ones.
pub(crate) fn put_known<T: Serialize>(
    form: &mut Map<String, Json>,
    key: &str,
    value: &Value<T>,
) -> Result<(), HundError> {
    if let Some(inner) = value.as_known() {
        let encoded = serde_json::to_value(inner)
            .map_err(|e| HundError::internal(format!("encoding `{key}`: {e}")))?;
        form.insert(key.to_owned(), encoded);
    }
    Ok(())
}

/// Inserts a translatable pair into a form.
///
/// An unset pair is sent as `null` when `nullable`, and omitted otherwise.
pub(crate) fn put_i18n(
    form: &mut Map<String, Json>,
    key: &str,
    original: &Value<String>,
    translations: &Value<TranslationMap>,
    nullable: bool,
) -> Result<(), HundError> {
    match i18n::to_wire(original, translations)? {
        Some(wire) => {
            let encoded = serde_json::to_value(wire)
                .map_err(|e| HundError::internal(format!("encoding `{key}`: {e}")))?;
            form.insert(key.to_owned(), encoded);
        }
        None if nullable => {
            form.insert(key.to_owned(), Json::Null);
        }
        None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_put_known_skips_unsettled() {
        let mut form = Map::new();
        put_known(&mut form, "a", &Value::Known(1)).unwrap();
        put_known::<i64>(&mut form, "b", &Value::Unknown).unwrap();
        put_known::<i64>(&mut form, "c", &Value::Null).unwrap();
        assert_eq!(Json::Object(form), serde_json::json!({"a": 1}));
    }

    #[test]
    fn test_put_i18n() {
        let mut form = Map::new();
        let name = Value::Known(String::from("API"));
        put_i18n(&mut form, "name", &name, &Value::Null, false).unwrap();
        put_i18n(&mut form, "description", &Value::Null, &Value::Null, true).unwrap();
        put_i18n(&mut form, "title", &Value::Null, &Value::Unknown, false).unwrap();

        let mut translations = BTreeMap::new();
        translations.insert(String::from("original"), Value::Known(String::from("de")));
        translations.insert(String::from("de"), Value::Known(String::from("Hallo")));
        put_i18n(&mut form, "body", &Value::Unknown, &Value::Known(translations), false).unwrap();

        assert_eq!(
            Json::Object(form),
            serde_json::json!({
                "name": "API",
                "description": null,
                "body": {"original": "de", "de": "Hallo"}
            })
        );
    }
}
