//! Issue template applications.
//!
//! An issue or issue update may be rendered from an issue template. The
//! application names the template, supplies values for its variables and
//! may override the rendered title, body and label.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::api::i18n::{self, I18nString};
use crate::api::timestamp;
use crate::diagnostics::{AttrPath, Diagnostics};
use crate::error::{HundError, TemplateError, VariantError};
use crate::value::{TranslationMap, Value};
use crate::variant::{self, SlotSet};

/// Declared variable types understood by the engine.
pub const VARIABLE_TYPES: [&str; 4] = ["string", "number", "datetime", "i18n-string"];

/// Schema entry for one template variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableDecl {
    /// Declared type, one of [`VARIABLE_TYPES`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the variable must be supplied.
    pub required: bool,
}

/// A template variable value with its slot selected.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateVariable {
    /// Plain text.
    String(String),
    /// Floating point number.
    Number(f64),
    /// RFC 3339 timestamp, sent as epoch seconds.
    Datetime(String),
    /// Translated text.
    I18nString(BTreeMap<String, String>),
}

impl TemplateVariable {
    /// Document slot name.
    #[must_use]
    pub const fn slot_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Datetime(_) => "datetime",
            Self::I18nString(_) => "i18n_string",
        }
    }

    /// Encodes the value for the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if a datetime is not valid RFC 3339.
    pub fn encode(&self) -> Result<Json, HundError> {
        Ok(match self {
            Self::String(s) => Json::String(s.clone()),
            Self::Number(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
            Self::Datetime(ts) => Json::from(timestamp::to_epoch(ts)?),
            Self::I18nString(map) => serde_json::to_value(map)
                .map_err(|e| HundError::internal(format!("encoding i18n variable: {e}")))?,
        })
    }

    /// Decodes a wire value according to its declared type.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Decode`] if the value does not match the
    /// declared type and [`TemplateError::UnsupportedType`] for an unknown
    /// declared type.
    pub fn decode(name: &str, wire: &Json, decl: &VariableDecl) -> Result<Self, TemplateError> {
        let mismatch = || TemplateError::Decode {
            variable: name.to_owned(),
            declared: decl.kind.clone(),
        };

        match decl.kind.as_str() {
            "string" => wire.as_str().map(|s| Self::String(s.to_owned())).ok_or_else(mismatch),
            "number" => wire.as_f64().map(Self::Number).ok_or_else(mismatch),
            "datetime" => wire
                .as_i64()
                .and_then(|secs| timestamp::from_epoch(secs).ok())
                .map(Self::Datetime)
                .ok_or_else(mismatch),
            "i18n-string" => serde_json::from_value(wire.clone())
                .map(Self::I18nString)
                .map_err(|_| mismatch()),
            other => Err(TemplateError::UnsupportedType {
                variable: name.to_owned(),
                declared: other.to_owned(),
            }),
        }
    }
}

/// Declared type a document slot corresponds to.
#[must_use]
pub fn declared_type_of_slot(slot: &str) -> Option<&'static str> {
    match slot {
        "string" => Some("string"),
        "number" => Some("number"),
        "datetime" => Some("datetime"),
        "i18n_string" => Some("i18n-string"),
        _ => None,
    }
}

/// Document form of [`TemplateVariable`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateVariableSlots {
    /// Plain text slot.
    pub string: Value<String>,
    /// Number slot.
    pub number: Value<f64>,
    /// Datetime slot, RFC 3339.
    pub datetime: Value<String>,
    /// Translated text slot.
    pub i18n_string: Value<TranslationMap>,
}

impl SlotSet for TemplateVariableSlots {
    const UNION: &'static str = "Template Variable";
    type Selected = TemplateVariable;

    fn slots(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("string", !self.string.is_null()),
            ("number", !self.number.is_null()),
            ("datetime", !self.datetime.is_null()),
            ("i18n_string", !self.i18n_string.is_null()),
        ]
    }

    fn select(&self) -> Result<TemplateVariable, VariantError> {
        let slot = variant::require_single(Self::UNION, &self.slots())?;
        let unsettled = || VariantError::Encode {
            union: Self::UNION,
            message: format!("value of slot `{slot}` is not known yet"),
        };

        let selected = match slot {
            "string" => self.string.to_option().map(TemplateVariable::String),
            "number" => self.number.to_option().map(TemplateVariable::Number),
            "datetime" => self.datetime.to_option().map(TemplateVariable::Datetime),
            _ => match &self.i18n_string {
                Value::Known(map) => map
                    .iter()
                    .map(|(k, v)| v.as_known().map(|s| (k.clone(), s.clone())))
                    .collect::<Option<BTreeMap<_, _>>>()
                    .map(TemplateVariable::I18nString),
                Value::Null | Value::Unknown => None,
            },
        };
        selected.ok_or_else(unsettled)
    }
}

impl From<TemplateVariable> for TemplateVariableSlots {
    fn from(variable: TemplateVariable) -> Self {
        let mut slots = Self::default();
        match variable {
            TemplateVariable::String(s) => slots.string = Value::Known(s),
            TemplateVariable::Number(n) => slots.number = Value::Known(n),
            TemplateVariable::Datetime(ts) => slots.datetime = Value::Known(ts),
            TemplateVariable::I18nString(map) => {
                slots.i18n_string = Value::Known(
                    map.into_iter().map(|(k, v)| (k, Value::Known(v))).collect(),
                );
            }
        }
        slots
    }
}

/// Template application attached to an issue or issue update.
///
/// Issue updates never carry a title, so their `title` fields stay null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateApplicationModel {
    /// Server id of the application.
    pub id: Value<String>,
    /// Applied issue template.
    pub issue_template_id: Value<String>,
    /// Variable schema, copied from the template unless overridden.
    pub schema: Value<BTreeMap<String, VariableDecl>>,
    /// Variable values keyed by name.
    pub variables: Value<BTreeMap<String, TemplateVariableSlots>>,
    /// Title override.
    pub title: Value<String>,
    /// Title override translations.
    pub title_translations: Value<TranslationMap>,
    /// Body override.
    pub body: Value<String>,
    /// Body override translations.
    pub body_translations: Value<TranslationMap>,
    /// Label override.
    pub label: Value<String>,
}

impl TemplateApplicationModel {
    /// Returns the fields that together decide the rendered output.
    #[must_use]
    pub fn source(
        &self,
    ) -> (
        &Value<String>,
        &Value<BTreeMap<String, VariableDecl>>,
        &Value<BTreeMap<String, TemplateVariableSlots>>,
    ) {
        (&self.issue_template_id, &self.schema, &self.variables)
    }

    /// Marks every rendered field as unknown.
    pub fn invalidate_rendered(&mut self) {
        self.title.set_unknown();
        self.title_translations.set_unknown();
        self.body.set_unknown();
        self.body_translations.set_unknown();
        self.label.set_unknown();
    }

    /// Validates variable arity, values and types against the schema.
    ///
    /// Types are only checked when the schema is known; a variable without
    /// a schema entry is reported as such.
    #[must_use]
    pub fn check_variables(&self, path: &AttrPath) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let Some(variables) = self.variables.as_known() else {
            return diags;
        };
        let variables_path = path.at_name("variables");

        for (name, slots) in variables {
            let var_path = variables_path.at_key(name);
            let arity = variant::validate_exactly_one(&var_path, &slots.slots());
            if arity.has_error() {
                diags.extend(arity);
                continue;
            }

            if let Err(e) = check_variable_value(name, slots) {
                diags.push(HundError::from(e).to_diagnostic_at(var_path));
                continue;
            }

            let Some(schema) = self.schema.as_known() else {
                continue;
            };

            if let Err(e) = check_variable_type(name, slots, schema) {
                diags.push(HundError::from(e).to_diagnostic_at(var_path));
            }
        }

        diags
    }

    /// Builds the template application form.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is unsettled or a translatable
    /// override is malformed.
    pub fn to_form(&self) -> Result<Json, HundError> {
        let mut form = Map::new();

        if let Some(id) = self.issue_template_id.as_known() {
            form.insert(String::from("issue_template"), Json::String(id.clone()));
        }

        let mut variables = Map::new();
        if let Some(values) = self.variables.as_known() {
            for (name, slots) in values {
                variables.insert(name.clone(), slots.select()?.encode()?);
            }
        }
        form.insert(String::from("variables"), Json::Object(variables));

        if let Some(title) = i18n::to_wire(&self.title, &self.title_translations)? {
            form.insert(String::from("title"), to_json(&title)?);
        }
        if let Some(body) = i18n::to_wire(&self.body, &self.body_translations)? {
            form.insert(String::from("body"), to_json(&body)?);
        }

        match &self.label {
            Value::Known(label) => {
                form.insert(String::from("label"), Json::String(label.clone()));
            }
            Value::Null => {
                form.insert(String::from("label"), Json::Null);
            }
            Value::Unknown => {}
        }

        if let Some(schema) = self.schema.as_known() {
            form.insert(String::from("schema"), to_json(schema)?);
        }

        Ok(Json::Object(form))
    }

    /// Builds the plan model from a server response.
    ///
    /// # Errors
    ///
    /// Returns an error if a translatable field or variable cannot be
    /// decoded.
    pub fn from_response(response: &TemplateApplicationResponse) -> Result<Self, HundError> {
        let (title, title_translations) = i18n::values_from_wire(response.title.as_ref())?;
        let (body, body_translations) = i18n::values_from_wire(response.body.as_ref())?;

        let mut variables = BTreeMap::new();
        for (name, wire) in &response.variables {
            let decl = response
                .schema
                .get(name)
                .ok_or_else(|| TemplateError::MissingSchema {
                    variable: name.clone(),
                })?;
            variables.insert(name.clone(), TemplateVariable::decode(name, wire, decl)?.into());
        }

        Ok(Self {
            id: Value::Known(response.id.clone()),
            issue_template_id: Value::Known(response.issue_template.clone()),
            schema: Value::Known(response.schema.clone()),
            variables: Value::Known(variables),
            title,
            title_translations,
            body,
            body_translations,
            label: response.label.clone().into(),
        })
    }
}

/// Wire form of a template application.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateApplicationResponse {
    /// Server id.
    pub id: String,
    /// Applied template id.
    pub issue_template: String,
    /// Variable schema.
    #[serde(default)]
    pub schema: BTreeMap<String, VariableDecl>,
    /// Variable values as sent by the server.
    #[serde(default)]
    pub variables: Map<String, Json>,
    /// Title override.
    #[serde(default)]
    pub title: Option<I18nString>,
    /// Body override.
    #[serde(default)]
    pub body: Option<I18nString>,
    /// Label override.
    #[serde(default)]
    pub label: Option<String>,
}

/// Checks one variable's selected slot against its schema entry.
///
/// # Errors
///
/// Returns [`TemplateError::MissingSchema`] when the variable is not
/// declared, [`TemplateError::UnsupportedType`] for an unknown declared type
/// and [`TemplateError::TypeMismatch`] when the slot does not match.
pub fn check_variable_type(
    name: &str,
    slots: &TemplateVariableSlots,
    schema: &BTreeMap<String, VariableDecl>,
) -> Result<(), TemplateError> {
    let decl = schema.get(name).ok_or_else(|| TemplateError::MissingSchema {
        variable: name.to_owned(),
    })?;

    if !VARIABLE_TYPES.contains(&decl.kind.as_str()) {
        return Err(TemplateError::UnsupportedType {
            variable: name.to_owned(),
            declared: decl.kind.clone(),
        });
    }

    let Some(slot) = slots.selected_name() else {
        return Ok(());
    };

    if declared_type_of_slot(slot) == Some(decl.kind.as_str()) {
        Ok(())
    } else {
        Err(TemplateError::TypeMismatch {
            variable: name.to_owned(),
            declared: decl.kind.clone(),
            supplied: slot.to_owned(),
        })
    }
}

/// Checks that a known variable value can be encoded for the wire.
///
/// # Errors
///
/// Returns [`TemplateError::InvalidValue`] for a datetime that is not
/// RFC 3339 and for a number that is not finite.
pub fn check_variable_value(
    name: &str,
    slots: &TemplateVariableSlots,
) -> Result<(), TemplateError> {
    let invalid = |message: String| TemplateError::InvalidValue {
        variable: name.to_owned(),
        message,
    };

    if let Some(ts) = slots.datetime.as_known() {
        timestamp::to_epoch(ts).map_err(|e| invalid(e.to_string()))?;
    }
    if let Some(n) = slots.number.as_known() {
        if !n.is_finite() {
            return Err(invalid(format!("number {n} is not finite")));
        }
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<Json, HundError> {
    serde_json::to_value(value).map_err(|e| HundError::internal(format!("encoding form: {e}")))
}
