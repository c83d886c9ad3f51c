//! Components and their update form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::api::i18n::{self, I18nString};
use crate::api::timestamp;
use crate::error::HundError;
use crate::models::watchdog::{WatchdogModel, WatchdogResponse};
use crate::models::{put_i18n, put_known};
use crate::value::{TranslationMap, Value};

/// A status page component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentModel {
    /// Server id.
    pub id: Value<String>,
    /// Creation time, RFC 3339.
    pub created_at: Value<String>,
    /// Last modification time, RFC 3339.
    pub updated_at: Value<String>,
    /// Display name.
    pub name: Value<String>,
    /// Display name translations.
    pub name_translations: Value<TranslationMap>,
    /// Markdown description.
    pub description: Value<String>,
    /// Markdown description translations.
    pub description_translations: Value<TranslationMap>,
    /// Rendered description.
    pub description_html: Value<String>,
    /// Rendered description translations.
    pub description_html_translations: Value<TranslationMap>,
    /// Hide the component's events from the global history.
    pub exclude_from_global_history: Value<bool>,
    /// Exclude the component from the global uptime figure.
    pub exclude_from_global_uptime: Value<bool>,
    /// Owning group id.
    pub group: Value<String>,
    /// Time of the most recent event, RFC 3339.
    pub last_event_at: Value<String>,
    /// Uptime over the default window.
    pub percent_uptime: Value<f64>,
    /// Monitoring configuration.
    pub watchdog: WatchdogModel,
}

/// Wire form of a component with its watchdog expanded.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentResponse {
    /// Server id.
    pub id: String,
    /// Creation time, epoch seconds.
    pub created_at: i64,
    /// Last modification time, epoch seconds.
    pub updated_at: i64,
    /// Display name.
    pub name: I18nString,
    /// Markdown description.
    #[serde(default)]
    pub description: Option<I18nString>,
    /// Rendered description.
    pub description_html: I18nString,
    /// History exclusion flag.
    #[serde(default)]
    pub exclude_from_global_history: bool,
    /// Uptime exclusion flag.
    #[serde(default)]
    pub exclude_from_global_uptime: bool,
    /// Owning group id.
    pub group: String,
    /// Time of the most recent event, epoch seconds.
    #[serde(default)]
    pub last_event_at: Option<i64>,
    /// Uptime over the default window.
    #[serde(default)]
    pub percent_uptime: f64,
    /// Expanded watchdog.
    pub watchdog: WatchdogResponse,
}

impl ComponentModel {
    /// Builds the state model from a server response.
    ///
    /// # Errors
    ///
    /// Returns an error if a translatable field, timestamp or the watchdog
    /// service cannot be decoded.
    pub fn from_response(response: &ComponentResponse) -> Result<Self, HundError> {
        let (name, name_translations) = i18n::values_from_wire(Some(&response.name))?;
        let (description, description_translations) =
            i18n::values_from_wire(response.description.as_ref())?;
        let (description_html, description_html_translations) =
            i18n::values_from_wire(Some(&response.description_html))?;

        Ok(Self {
            id: Value::Known(response.id.clone()),
            created_at: Value::Known(timestamp::from_epoch(response.created_at)?),
            updated_at: Value::Known(timestamp::from_epoch(response.updated_at)?),
            name,
            name_translations,
            description,
            description_translations,
            description_html,
            description_html_translations,
            exclude_from_global_history: Value::Known(response.exclude_from_global_history),
            exclude_from_global_uptime: Value::Known(response.exclude_from_global_uptime),
            group: Value::Known(response.group.clone()),
            last_event_at: timestamp::value_from_epoch(response.last_event_at)?,
            percent_uptime: Value::Known(response.percent_uptime),
            watchdog: WatchdogModel::from_response(&response.watchdog)?,
        })
    }

    /// Builds the component update form, nesting `watchdog` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unset or a translatable field is
    /// malformed.
    pub fn to_update_form(&self, watchdog: Option<Json>) -> Result<Json, HundError> {
        let mut form = Map::new();

        put_i18n(&mut form, "name", &self.name, &self.name_translations, false)?;
        if !form.contains_key("name") {
            return Err(HundError::internal("component name is not set"));
        }
        put_i18n(
            &mut form,
            "description",
            &self.description,
            &self.description_translations,
            true,
        )?;
        put_known(&mut form, "group", &self.group)?;
        put_known(
            &mut form,
            "exclude_from_global_history",
            &self.exclude_from_global_history,
        )?;
        put_known(
            &mut form,
            "exclude_from_global_uptime",
            &self.exclude_from_global_uptime,
        )?;

        if let Some(watchdog) = watchdog {
            form.insert(String::from("watchdog"), watchdog);
        }

        Ok(Json::Object(form))
    }
}
