//! Plan rules for issues and updates rendered from a template.
//!
//! The rendered title, body and label of a templated issue depend on the
//! compound source `(issue_template_id, schema, variables)`. Any change to
//! the template application leaves the rendered output unknown until the
//! server has rendered it again.

use tracing::debug;

use crate::models::template::TemplateApplicationModel;
use crate::models::{IssueModel, IssueUpdateModel};
use crate::value::Value;

use super::translatable::translatable_pair;

/// A resource that may be rendered from a template.
pub trait Templated {
    /// The applied template, if any.
    fn template(&self) -> Option<&TemplateApplicationModel>;

    /// The applied template, mutably.
    fn template_mut(&mut self) -> Option<&mut TemplateApplicationModel>;

    /// Root label.
    fn label(&self) -> &Value<String>;

    /// Root label, mutably.
    fn label_mut(&mut self) -> &mut Value<String>;

    /// Marks every rendered root field not set in `config` as unknown.
    fn invalidate_rendered(&mut self, config: &Self);
}

fn unknown_unless_configured<T>(config: &Value<T>, plan: &mut Value<T>) {
    if config.is_null() {
        plan.set_unknown();
    }
}

impl Templated for IssueModel {
    fn template(&self) -> Option<&TemplateApplicationModel> {
        self.template.as_ref()
    }

    fn template_mut(&mut self) -> Option<&mut TemplateApplicationModel> {
        self.template.as_mut()
    }

    fn label(&self) -> &Value<String> {
        &self.label
    }

    fn label_mut(&mut self) -> &mut Value<String> {
        &mut self.label
    }

    fn invalidate_rendered(&mut self, config: &Self) {
        unknown_unless_configured(&config.label, &mut self.label);
        unknown_unless_configured(&config.title, &mut self.title);
        unknown_unless_configured(&config.title_translations, &mut self.title_translations);
        unknown_unless_configured(&config.body, &mut self.body);
        unknown_unless_configured(&config.body_translations, &mut self.body_translations);
        self.body_html.set_unknown();
        self.body_html_translations.set_unknown();
    }
}

impl Templated for IssueUpdateModel {
    fn template(&self) -> Option<&TemplateApplicationModel> {
        self.template.as_ref()
    }

    fn template_mut(&mut self) -> Option<&mut TemplateApplicationModel> {
        self.template.as_mut()
    }

    fn label(&self) -> &Value<String> {
        &self.label
    }

    fn label_mut(&mut self) -> &mut Value<String> {
        &mut self.label
    }

    fn invalidate_rendered(&mut self, config: &Self) {
        unknown_unless_configured(&config.label, &mut self.label);
        unknown_unless_configured(&config.body, &mut self.body);
        unknown_unless_configured(&config.body_translations, &mut self.body_translations);
        self.body_html.set_unknown();
        self.body_html_translations.set_unknown();
    }
}

/// Whether the compound source of the rendered output changed.
#[must_use]
pub fn source_changed(
    state: Option<&TemplateApplicationModel>,
    baseline: Option<&TemplateApplicationModel>,
) -> bool {
    state.map(TemplateApplicationModel::source) != baseline.map(TemplateApplicationModel::source)
}

/// Applies the template rules to a plan.
///
/// Returns whether the template application changed at all, in which case
/// the rendered root fields were marked unknown.
pub fn plan_template_application<R: Templated>(
    state: &R,
    config: &R,
    baseline: &R,
    plan: &mut R,
) -> bool {
    if let (Some(state_t), Some(config_t), Some(plan_t)) =
        (state.template(), config.template(), plan.template_mut())
    {
        translatable_pair!(state_t, config_t, plan_t, title, title_translations);
        translatable_pair!(state_t, config_t, plan_t, body, body_translations);

        if source_changed(state.template(), baseline.template()) {
            debug!("Template source changed, rendered template fields become unknown");
            unknown_unless_configured(&config_t.title, &mut plan_t.title);
            unknown_unless_configured(&config_t.title_translations, &mut plan_t.title_translations);
            unknown_unless_configured(&config_t.body, &mut plan_t.body);
            unknown_unless_configured(&config_t.body_translations, &mut plan_t.body_translations);
            unknown_unless_configured(&config_t.label, &mut plan_t.label);
        }
    }

    let changed = state.template() != baseline.template();

    if changed {
        debug!("Template application changed, rendered fields become unknown");
        plan.invalidate_rendered(config);
    } else if state.label().is_null() && config.label().is_null() && plan.label().is_unknown() {
        plan.label_mut().set_null();
    }

    changed
}
