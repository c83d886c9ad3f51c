//! Config validation.
//!
//! Validation runs on the config document before any plan rule. A config
//! with error diagnostics is never planned.

use tracing::debug;

use crate::api::i18n;
use crate::diagnostics::{AttrPath, Diagnostics};
use crate::error::HundError;
use crate::models::metric_provider::default_instances;
use crate::models::watchdog::WatchdogModel;
use crate::models::{
    ComponentModel, GroupModel, IssueModel, IssueTemplateKind, IssueTemplateModel,
    IssueUpdateModel, MetricProviderModel, MetricProviderService, WatchdogService,
};
use crate::models::template::TemplateApplicationModel;
use crate::value::{TranslationMap, Value};
use crate::variant::{self, SlotSet};

/// Summary of attribute combination errors.
pub const COMBINATION_SUMMARY: &str = "Invalid Attribute Combination";

/// A resource config that can be validated on its own.
pub trait ValidateConfig {
    /// Returns every problem found in the config.
    fn validate_config(&self) -> Diagnostics;
}

/// Requires exactly one of the named attributes to be configured.
///
/// Unknown values count as configured.
#[must_use]
pub fn exactly_one_of(fields: &[(&'static str, bool)]) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let names: Vec<&str> = fields.iter().map(|(n, _)| *n).collect();
    let set: Vec<&str> = fields.iter().filter(|(_, s)| *s).map(|(n, _)| *n).collect();

    match set.len() {
        1 => {}
        0 => diags.add_attribute_error(
            AttrPath::root(names.first().copied().unwrap_or_default()),
            COMBINATION_SUMMARY,
            format!(
                "No attribute specified when one (and only one) of [{}] is required",
                names.join(",")
            ),
        ),
        n => {
            for name in &set {
                diags.add_attribute_error(
                    AttrPath::root(*name),
                    COMBINATION_SUMMARY,
                    format!(
                        "{n} attributes specified when one (and only one) of [{}] is required",
                        names.join(",")
                    ),
                );
            }
        }
    }

    diags
}

/// Forbids configuring more than one of the named attributes.
#[must_use]
pub fn conflicting(fields: &[(&'static str, bool)]) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let set: Vec<&str> = fields.iter().filter(|(_, s)| *s).map(|(n, _)| *n).collect();

    if set.len() > 1 {
        let names: Vec<&str> = fields.iter().map(|(n, _)| *n).collect();
        for name in &set {
            diags.add_attribute_error(
                AttrPath::root(*name),
                COMBINATION_SUMMARY,
                format!(
                    "These attributes cannot be configured together: [{}]",
                    names.join(",")
                ),
            );
        }
    }

    diags
}

/// Decodes a configured translation map, reporting a malformed one at `path`.
///
/// Null and unknown maps are not checked.
#[must_use]
pub fn translations_decode(path: AttrPath, translations: &Value<TranslationMap>) -> Diagnostics {
    let mut diags = Diagnostics::new();
    if let Err(e) = i18n::resolve(&Value::Null, translations) {
        debug!("Translation map at {path} does not decode: {e}");
        diags.push(HundError::from(e).to_diagnostic_at(path));
    }
    diags
}

/// Decodes every named translation map under `root`, or at the top level.
fn translation_fields(
    root: Option<&AttrPath>,
    fields: &[(&'static str, &Value<TranslationMap>)],
) -> Diagnostics {
    let mut diags = Diagnostics::new();
    for (name, translations) in fields {
        let path = root.map_or_else(|| AttrPath::root(*name), |r| r.at_name(*name));
        diags.extend(translations_decode(path, translations));
    }
    diags
}

fn template_translations_decode(template: &TemplateApplicationModel) -> Diagnostics {
    translation_fields(
        Some(&AttrPath::root("template")),
        &[
            ("title_translations", &template.title_translations),
            ("body_translations", &template.body_translations),
        ],
    )
}

/// Checks the watchdog's service arity and its native check fields.
#[must_use]
pub fn validate_watchdog(path: &AttrPath, watchdog: &WatchdogModel) -> Diagnostics {
    let service_path = path.at_name("service");
    let mut diags = variant::validate_exactly_one(&service_path, &watchdog.service.slots());

    if let Ok(WatchdogService::Native(native)) = watchdog.service.select() {
        diags.extend(native.validate(&service_path));
    }

    diags
}

/// Checks that configured metric instances are exactly the service's
/// default metrics.
#[must_use]
pub fn metric_instances_match_service(config: &MetricProviderModel) -> Diagnostics {
    let mut diags = Diagnostics::new();

    let Some(instances) = config.instances.as_known() else {
        return diags;
    };
    let Some(service) = config.service.selected_name() else {
        return diags;
    };
    let Some(expected) = default_instances(service) else {
        return diags;
    };

    let path = AttrPath::root("instances");

    for metric in expected {
        if !instances.contains_key(*metric) {
            diags.add_attribute_error(
                path.clone(),
                "Missing instance from MetricProvider",
                format!(
                    "An expected instance for this MetricProvider's service type ({service}) \
                     was missing from the configuration: {metric}"
                ),
            );
        }
    }

    if instances.len() > expected.len() {
        diags.add_attribute_error(
            path,
            "Extraneous instance in MetricProvider",
            format!(
                "An unexpected instance for this MetricProvider's service type ({service}) \
                 was found in the configuration. The expected instances are: [{}]",
                expected.join(" ")
            ),
        );
    }

    diags
}

/// Forbids title fields on templates of kind `update`.
#[must_use]
pub fn issue_template_kind_fields(config: &IssueTemplateModel) -> Diagnostics {
    let mut diags = Diagnostics::new();

    if config.kind.as_known() != Some(&IssueTemplateKind::Update) {
        return diags;
    }

    let path = if !config.title.is_null() {
        AttrPath::root("title")
    } else if !config.title_translations.is_null() {
        AttrPath::root("title_translations")
    } else {
        return diags;
    };

    diags.add_attribute_error(
        path,
        "Incompatible Issue Template Field Given",
        "Issue Templates of kind `update` cannot set title fields.",
    );
    diags
}

impl ValidateConfig for ComponentModel {
    fn validate_config(&self) -> Diagnostics {
        let mut diags = exactly_one_of(&[
            ("name", !self.name.is_null()),
            ("name_translations", !self.name_translations.is_null()),
        ]);
        diags.extend(conflicting(&[
            ("description", !self.description.is_null()),
            ("description_translations", !self.description_translations.is_null()),
        ]));
        diags.extend(translation_fields(
            None,
            &[
                ("name_translations", &self.name_translations),
                ("description_translations", &self.description_translations),
            ],
        ));
        diags.extend(validate_watchdog(&AttrPath::root("watchdog"), &self.watchdog));

        debug!(errors = diags.errors().count(), "Validated component config");
        diags
    }
}

impl ValidateConfig for GroupModel {
    fn validate_config(&self) -> Diagnostics {
        let mut diags = exactly_one_of(&[
            ("name", !self.name.is_null()),
            ("name_translations", !self.name_translations.is_null()),
        ]);
        diags.extend(conflicting(&[
            ("description", !self.description.is_null()),
            ("description_translations", !self.description_translations.is_null()),
        ]));
        diags.extend(translation_fields(
            None,
            &[
                ("name_translations", &self.name_translations),
                ("description_translations", &self.description_translations),
            ],
        ));
        diags
    }
}

impl ValidateConfig for IssueModel {
    fn validate_config(&self) -> Diagnostics {
        let templated = self.template.is_some();
        let mut diags = exactly_one_of(&[
            ("body", !self.body.is_null()),
            ("body_translations", !self.body_translations.is_null()),
            ("template", templated),
        ]);
        diags.extend(exactly_one_of(&[
            ("title", !self.title.is_null()),
            ("title_translations", !self.title_translations.is_null()),
            ("template", templated),
        ]));
        diags.extend(conflicting(&[
            ("began_at", !self.began_at.is_null()),
            ("schedule", self.schedule.is_some()),
        ]));
        diags.extend(conflicting(&[
            ("ended_at", !self.ended_at.is_null()),
            ("updates", !self.updates.is_null()),
        ]));

        diags.extend(translation_fields(
            None,
            &[
                ("title_translations", &self.title_translations),
                ("body_translations", &self.body_translations),
            ],
        ));

        if let Some(template) = &self.template {
            diags.extend(template.check_variables(&AttrPath::root("template")));
            diags.extend(template_translations_decode(template));
        }

        diags
    }
}

impl ValidateConfig for IssueUpdateModel {
    fn validate_config(&self) -> Diagnostics {
        let mut diags = conflicting(&[
            ("body", !self.body.is_null()),
            ("body_translations", !self.body_translations.is_null()),
            ("template", self.template.is_some()),
        ]);

        diags.extend(translation_fields(
            None,
            &[
                ("body_translations", &self.body_translations),
            ],
        ));

        if let Some(template) = &self.template {
            diags.extend(template.check_variables(&AttrPath::root("template")));
            diags.extend(template_translations_decode(template));
        }

        diags
    }
}

impl ValidateConfig for IssueTemplateModel {
    fn validate_config(&self) -> Diagnostics {
        let mut diags = conflicting(&[
            ("title", !self.title.is_null()),
            ("title_translations", !self.title_translations.is_null()),
        ]);
        diags.extend(conflicting(&[
            ("body", !self.body.is_null()),
            ("body_translations", !self.body_translations.is_null()),
        ]));
        diags.extend(translation_fields(
            None,
            &[
                ("title_translations", &self.title_translations),
                ("body_translations", &self.body_translations),
            ],
        ));
        diags.extend(issue_template_kind_fields(self));
        diags
    }
}

impl ValidateConfig for MetricProviderModel {
    fn validate_config(&self) -> Diagnostics {
        let path = AttrPath::root("service");
        let mut diags = variant::validate_exactly_one(&path, &self.service.slots());

        if let Ok(MetricProviderService::Native(native)) = self.service.select() {
            diags.extend(native.validate(&path));
        }

        diags.extend(metric_instances_match_service(self));
        diags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::native::{NativeService, TcpCheck};
    use std::collections::BTreeMap;

    fn map(entries: &[(&str, Value<String>)]) -> Value<TranslationMap> {
        Value::Known(
            entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        )
    }

    fn text(s: &str) -> Value<String> {
        Value::Known(s.to_string())
    }

    #[test]
    fn test_exactly_one_of() {
        assert!(!exactly_one_of(&[("a", true), ("b", false)]).has_error());

        let none = exactly_one_of(&[("a", false), ("b", false)]);
        assert_eq!(none.len(), 1);

        let both = exactly_one_of(&[("a", true), ("b", true), ("c", false)]);
        assert_eq!(both.len(), 2);
        let detail = &both.iter().next().unwrap().detail;
        assert!(detail.starts_with("2 attributes specified"));
    }

    #[test]
    fn test_conflicting_allows_none() {
        assert!(conflicting(&[("a", false), ("b", false)]).is_empty());
        assert!(conflicting(&[("a", true), ("b", false)]).is_empty());
        assert_eq!(conflicting(&[("a", true), ("b", true)]).len(), 2);
    }

    #[test]
    fn test_component_requires_a_name_and_one_service() {
        let component = ComponentModel::default();
        let diags = component.validate_config();
        let paths: Vec<String> = diags
            .iter()
            .filter_map(|d| d.path.as_ref().map(ToString::to_string))
            .collect();
        assert!(paths.contains(&String::from("name")));
        assert!(paths.contains(&String::from("watchdog.service")));
    }

    #[test]
    fn test_component_native_field_validation() {
        let mut component = ComponentModel {
            name: Value::Known(String::from("API")),
            ..ComponentModel::default()
        };
        component.watchdog.service = WatchdogService::Native(NativeService::Tcp(TcpCheck {
            ip_version: Value::Known(String::from("ipx")),
            ..TcpCheck::default()
        }))
        .into();

        let diags = component.validate_config();
        assert_eq!(diags.errors().count(), 1);
    }

    #[test]
    fn test_issue_template_or_body() {
        let issue = IssueModel {
            title: Value::Known(String::from("Outage")),
            body: Value::Known(String::from("Down")),
            ..IssueModel::default()
        };
        assert!(!issue.validate_config().has_error());

        let templated = IssueModel {
            title: Value::Known(String::from("Outage")),
            template: Some(TemplateApplicationModel::default()),
            ..IssueModel::default()
        };
        let diags = templated.validate_config();
        assert!(diags.has_error());
        assert!(diags
            .iter()
            .any(|d| d.path == Some(AttrPath::root("template"))));
    }

    #[test]
    fn test_update_kind_template_rejects_title() {
        let template = IssueTemplateModel {
            kind: Value::Known(IssueTemplateKind::Update),
            title_translations: Value::Unknown,
            ..IssueTemplateModel::default()
        };
        let diags = issue_template_kind_fields(&template);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.path, Some(AttrPath::root("title_translations")));

        let issue_kind = IssueTemplateModel {
            kind: Value::Known(IssueTemplateKind::Issue),
            title: Value::Known(String::from("t")),
            ..IssueTemplateModel::default()
        };
        assert!(issue_template_kind_fields(&issue_kind).is_empty());
    }

    #[test]
    fn test_metric_instances_match_service() {
        let mut provider = MetricProviderModel {
            service: MetricProviderService::Builtin(Default::default()).into(),
            ..MetricProviderModel::default()
        };
        assert!(metric_instances_match_service(&provider).is_empty());

        let mut instances = BTreeMap::new();
        instances.insert(String::from("percent_uptime"), Default::default());
        provider.instances = Value::Known(instances.clone());
        let diags = metric_instances_match_service(&provider);
        assert_eq!(diags.len(), 1);
        assert!(diags.iter().next().unwrap().detail.ends_with("incidents_reported"));

        instances.insert(String::from("incidents_reported"), Default::default());
        instances.insert(String::from("apdex"), Default::default());
        provider.instances = Value::Known(instances);
        let diags = metric_instances_match_service(&provider);
        assert_eq!(diags.iter().next().unwrap().summary, "Extraneous instance in MetricProvider");
    }

    #[test]
    fn test_translations_need_an_original_pointer() {
        let group = GroupModel {
            name_translations: map(&[("en", text("Core"))]),
            ..GroupModel::default()
        };
        let diags = group.validate_config();
        assert_eq!(diags.errors().count(), 1);
        assert_eq!(
            diags.iter().next().unwrap().path,
            Some(AttrPath::root("name_translations"))
        );

        let dangling = GroupModel {
            name_translations: map(&[("original", text("fr")), ("en", text("Core"))]),
            ..GroupModel::default()
        };
        assert!(dangling.validate_config().has_error());

        let valid = GroupModel {
            name_translations: map(&[("original", text("en")), ("en", text("Core"))]),
            ..GroupModel::default()
        };
        assert!(!valid.validate_config().has_error());
    }

    #[test]
    fn test_translation_elements_must_be_known_strings() {
        let component = ComponentModel {
            name: text("API"),
            description_translations: map(&[
                ("original", text("en")),
                ("en", text("Public")),
                ("de", Value::Unknown),
            ]),
            ..ComponentModel::default()
        };
        let diags = component.validate_config();
        assert!(diags
            .iter()
            .any(|d| d.path == Some(AttrPath::root("description_translations"))));
    }

    #[test]
    fn test_unknown_translation_map_is_not_decoded() {
        let path = AttrPath::root("body_translations");
        assert!(translations_decode(path.clone(), &Value::Unknown).is_empty());
        assert!(translations_decode(path, &Value::Null).is_empty());
    }

    #[test]
    fn test_template_translations_are_decoded() {
        let update = IssueUpdateModel {
            template: Some(TemplateApplicationModel {
                body_translations: map(&[("en", text("Down"))]),
                ..TemplateApplicationModel::default()
            }),
            ..IssueUpdateModel::default()
        };
        let diags = update.validate_config();
        let expected = AttrPath::root("template").at_name("body_translations");
        assert!(diags.iter().any(|d| d.path == Some(expected.clone())));
    }
}
