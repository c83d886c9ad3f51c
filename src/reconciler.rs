//! Plan reconciliation.
//!
//! Given the prior state, the config and the baseline plan of one resource,
//! the reconciler validates the config, runs every plan rule of the
//! resource kind and returns the final plan with its diagnostics. The
//! inputs are never modified; only the final plan is written.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::PlanRequest;
use crate::diagnostics::{AttrPath, Diagnostics};
use crate::error::{HundError, PlanError};
use crate::models::{
    ComponentModel, GroupModel, IssueModel, IssueTemplateModel, IssueUpdateModel,
    MetricProviderModel,
};
use crate::planmodifiers::dependent;
use crate::planmodifiers::high_frequency::plan_high_frequency;
use crate::planmodifiers::metric_instances::plan_default_instances;
use crate::planmodifiers::null_default::plan_issue_timestamps;
use crate::planmodifiers::template::plan_template_application;
use crate::planmodifiers::translatable::translatable_pair;
use crate::planner::{classify_for, MetricProviderOwner, ServiceTransition, WatchdogOwner};
use crate::validators::ValidateConfig;
use crate::value::Value;

/// Summary of the warning shown when an issue or update is destroyed.
pub const DESTRUCTION_SUMMARY: &str = "Issue/Update Destruction Considerations";

/// Summary of the extra warning for updates that changed an issue's standing.
pub const STANDING_UPDATE_SUMMARY: &str = "Cannot destroy Reopening/Resolving Issue Updates";

/// The three inputs of one resource instance.
///
/// `prior_state` is absent on create; `baseline_plan` is absent on destroy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceTriple<R> {
    /// State recorded after the last apply.
    #[serde(default)]
    pub prior_state: Option<R>,
    /// Configuration as written by the user.
    #[serde(default)]
    pub config: R,
    /// Plan proposed by the orchestrator before any rule ran.
    #[serde(default)]
    pub baseline_plan: Option<R>,
}

/// Outcome of reconciling one resource.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResult<R> {
    /// Final plan, absent on destroy or when an error was found.
    pub final_plan: Option<R>,
    /// Every problem found, in order.
    pub diagnostics: Diagnostics,
    /// Service transition of resources that own a service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<ServiceTransition>,
    /// Attributes whose change forces the resource to be recreated.
    pub requires_replace: Vec<AttrPath>,
    /// SHA-256 of the final plan document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl<R> ReconciliationResult<R> {
    fn empty() -> Self {
        Self {
            final_plan: None,
            diagnostics: Diagnostics::new(),
            transition: None,
            requires_replace: Vec::new(),
            fingerprint: None,
        }
    }

    /// Returns true if the plan can be applied.
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        self.final_plan.is_some() && !self.diagnostics.has_error()
    }

    /// Returns true if the plan forces the resource to be recreated.
    #[must_use]
    pub fn requires_replacement(&self) -> bool {
        !self.requires_replace.is_empty()
    }
}

impl<R: Serialize> ReconciliationResult<R> {
    /// Converts the final plan into a JSON document.
    #[must_use]
    pub fn into_json(self) -> ReconciliationResult<Json> {
        let mut diagnostics = self.diagnostics;
        let final_plan = self.final_plan.and_then(|plan| match serde_json::to_value(plan) {
            Ok(json) => Some(json),
            Err(e) => {
                let err = HundError::internal(format!("encoding final plan: {e}"));
                diagnostics.push(err.to_diagnostic());
                None
            }
        });

        ReconciliationResult {
            final_plan,
            diagnostics,
            transition: self.transition,
            requires_replace: self.requires_replace,
            fingerprint: self.fingerprint,
        }
    }
}

impl<R: Reconcile> ReconciliationResult<R> {
    /// Takes the final plan of an in-place update.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Blocked`] if there is no applicable plan and
    /// [`PlanError::ReplacementRequired`] if the plan forces replacement.
    pub fn into_update_plan(self) -> Result<R, HundError> {
        let count = self.diagnostics.errors().count();
        let plan = match self.final_plan {
            Some(plan) if count == 0 => plan,
            _ => return Err(PlanError::Blocked { count }.into()),
        };

        if !self.requires_replace.is_empty() {
            let attributes: Vec<String> =
                self.requires_replace.iter().map(ToString::to_string).collect();
            return Err(PlanError::ReplacementRequired {
                kind: R::KIND,
                attributes: attributes.join(", "),
            }
            .into());
        }

        Ok(plan)
    }
}

/// Mutable side channels filled by the plan rules.
#[derive(Debug, Default)]
pub struct PlanOutput {
    /// Diagnostics produced by the rules.
    pub diagnostics: Diagnostics,
    /// Service transition, if the resource owns a service.
    pub transition: Option<ServiceTransition>,
    /// Attributes forcing replacement.
    pub requires_replace: Vec<AttrPath>,
}

/// A resource kind with its own plan rules.
pub trait Reconcile: ValidateConfig + Clone + PartialEq + Serialize {
    /// Resource kind, used in logs.
    const KIND: &'static str;

    /// Rules applied when the resource already exists.
    fn plan_update(
        state: &Self,
        config: &Self,
        baseline: &Self,
        plan: &mut Self,
        out: &mut PlanOutput,
    );

    /// Rules applied when the resource is created.
    fn plan_create(_config: &Self, _plan: &mut Self, _out: &mut PlanOutput) {}

    /// Diagnostics shown when the resource is destroyed.
    fn plan_destroy(_state: &Self, _diagnostics: &mut Diagnostics) {}
}

impl<R: Reconcile> ResourceTriple<R> {
    /// Reconciles this triple.
    #[must_use]
    pub fn reconcile(&self) -> ReconciliationResult<R> {
        reconcile(self)
    }
}

/// Reconciles one resource triple into a final plan.
#[must_use]
pub fn reconcile<R: Reconcile>(triple: &ResourceTriple<R>) -> ReconciliationResult<R> {
    let mut result = ReconciliationResult::empty();

    let Some(baseline) = &triple.baseline_plan else {
        match &triple.prior_state {
            Some(state) => {
                info!("Planning destruction of {}", R::KIND);
                R::plan_destroy(state, &mut result.diagnostics);
            }
            None => {
                let err = HundError::from(PlanError::MissingInput {
                    what: "a prior state or a baseline plan",
                });
                result.diagnostics.push(err.to_diagnostic());
            }
        }
        return result;
    };

    result.diagnostics = triple.config.validate_config();
    if result.diagnostics.has_error() {
        info!(
            "{} config has {} error(s), not planning",
            R::KIND,
            result.diagnostics.errors().count()
        );
        return result;
    }

    let mut plan = baseline.clone();
    let mut out = PlanOutput::default();

    match &triple.prior_state {
        Some(state) => R::plan_update(state, &triple.config, baseline, &mut plan, &mut out),
        None => R::plan_create(&triple.config, &mut plan, &mut out),
    }

    result.diagnostics.extend(out.diagnostics);
    result.transition = out.transition;
    result.requires_replace = out.requires_replace;

    if result.diagnostics.has_error() {
        info!("{} plan has errors, discarding it", R::KIND);
        return result;
    }

    match fingerprint(&plan) {
        Ok(hash) => result.fingerprint = Some(hash),
        Err(e) => result.diagnostics.push(e.to_diagnostic()),
    }

    info!(
        "Planned {}{}{}",
        R::KIND,
        result
            .transition
            .map(|t| format!(", service: {t}"))
            .unwrap_or_default(),
        if result.requires_replacement() {
            " (requires replacement)"
        } else {
            ""
        }
    );

    result.final_plan = Some(plan);
    result
}

/// Reconciles a request of any kind into a JSON plan.
#[must_use]
pub fn reconcile_request(request: &PlanRequest) -> ReconciliationResult<Json> {
    match request {
        PlanRequest::Component(triple) => triple.reconcile().into_json(),
        PlanRequest::Group(triple) => triple.reconcile().into_json(),
        PlanRequest::Issue(triple) => triple.reconcile().into_json(),
        PlanRequest::IssueUpdate(triple) => triple.reconcile().into_json(),
        PlanRequest::IssueTemplate(triple) => triple.reconcile().into_json(),
        PlanRequest::MetricProvider(triple) => triple.reconcile().into_json(),
    }
}

/// Hex SHA-256 of a plan's JSON form.
///
/// # Errors
///
/// Returns an error if the plan cannot be serialized.
pub fn fingerprint<R: Serialize>(plan: &R) -> Result<String, HundError> {
    let bytes = serde_json::to_vec(plan)
        .map_err(|e| HundError::internal(format!("encoding plan for fingerprint: {e}")))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

fn destruction_warning(diagnostics: &mut Diagnostics, archive_on_destroy: &Value<bool>) {
    if archive_on_destroy == &Value::Known(true) {
        return;
    }
    diagnostics.add_warning(
        DESTRUCTION_SUMMARY,
        "Hund recommends leaving behind resolved Issues and their Updates, so that the history \
         remains shown on your status page. If you no longer need to manage this Issue and its \
         Updates, consider forgetting them instead, or set `archive_on_destroy` to true to \
         squelch this warning and keep the Issue/Update in your status page history.",
    );
}

impl Reconcile for ComponentModel {
    const KIND: &'static str = "component";

    fn plan_update(
        state: &Self,
        config: &Self,
        baseline: &Self,
        plan: &mut Self,
        out: &mut PlanOutput,
    ) {
        out.diagnostics.extend(plan_high_frequency(
            &AttrPath::root("watchdog"),
            &config.watchdog,
            &mut plan.watchdog,
        ));

        translatable_pair!(state, config, plan, name, name_translations);
        translatable_pair!(state, config, plan, description, description_translations);

        let invalidated = dependent::COMPONENT.apply(state, baseline, plan);
        debug!(?invalidated, "Invalidated component fields");

        out.transition = Some(classify_for::<WatchdogOwner>(
            &state.watchdog.service,
            &plan.watchdog.service,
        ));
    }

    fn plan_create(config: &Self, plan: &mut Self, out: &mut PlanOutput) {
        out.diagnostics.extend(plan_high_frequency(
            &AttrPath::root("watchdog"),
            &config.watchdog,
            &mut plan.watchdog,
        ));
    }
}

impl Reconcile for GroupModel {
    const KIND: &'static str = "group";

    fn plan_update(
        state: &Self,
        config: &Self,
        baseline: &Self,
        plan: &mut Self,
        _out: &mut PlanOutput,
    ) {
        translatable_pair!(state, config, plan, name, name_translations);
        translatable_pair!(state, config, plan, description, description_translations);

        let invalidated = dependent::GROUP.apply(state, baseline, plan);
        debug!(?invalidated, "Invalidated group fields");
    }
}

impl Reconcile for IssueModel {
    const KIND: &'static str = "issue";

    fn plan_update(
        state: &Self,
        config: &Self,
        baseline: &Self,
        plan: &mut Self,
        _out: &mut PlanOutput,
    ) {
        plan_template_application(state, config, baseline, plan);

        translatable_pair!(state, config, plan, title, title_translations);
        translatable_pair!(state, config, plan, body, body_translations);

        let invalidated = dependent::ISSUE.apply(state, baseline, plan);
        debug!(?invalidated, "Invalidated issue fields");

        plan_issue_timestamps(Some(state), config, plan);
        plan_updates(Some(state), plan);
    }

    fn plan_create(config: &Self, plan: &mut Self, _out: &mut PlanOutput) {
        plan_issue_timestamps(None, config, plan);
        plan_updates(None, plan);
    }

    fn plan_destroy(state: &Self, diagnostics: &mut Diagnostics) {
        destruction_warning(diagnostics, &state.archive_on_destroy);
    }
}

/// Resolves an unknown `updates` list: the prior list if there is one,
/// otherwise the updates the server creates along with the issue.
fn plan_updates(state: Option<&IssueModel>, plan: &mut IssueModel) {
    if !plan.updates.is_unknown() {
        return;
    }

    if let Some(Value::Known(updates)) = state.map(|s| &s.updates) {
        plan.updates = Value::Known(updates.clone());
        return;
    }

    plan.updates = Value::Known(plan.expected_updates());
}

impl Reconcile for IssueUpdateModel {
    const KIND: &'static str = "issue update";

    fn plan_update(
        state: &Self,
        config: &Self,
        baseline: &Self,
        plan: &mut Self,
        out: &mut PlanOutput,
    ) {
        if plan.issue_id.is_known() && plan.issue_id != state.issue_id {
            out.requires_replace.push(AttrPath::root("issue_id"));
        }

        plan_template_application(state, config, baseline, plan);

        translatable_pair!(state, config, plan, body, body_translations);

        let invalidated = dependent::ISSUE_UPDATE.apply(state, baseline, plan);
        debug!(?invalidated, "Invalidated issue update fields");
    }

    fn plan_destroy(state: &Self, diagnostics: &mut Diagnostics) {
        if state.archive_on_destroy == Value::Known(true) {
            return;
        }
        if state.affects_standing() {
            diagnostics.add_warning(
                STANDING_UPDATE_SUMMARY,
                "Updates that affect the standing/resolved state of an Issue cannot be deleted. \
                 Applying this destruction only forgets the Update. It is only removed from \
                 Hund when the Issue itself is destroyed.",
            );
        }
        destruction_warning(diagnostics, &state.archive_on_destroy);
    }
}

impl Reconcile for IssueTemplateModel {
    const KIND: &'static str = "issue template";

    fn plan_update(
        state: &Self,
        config: &Self,
        baseline: &Self,
        plan: &mut Self,
        _out: &mut PlanOutput,
    ) {
        translatable_pair!(state, config, plan, title, title_translations);
        translatable_pair!(state, config, plan, body, body_translations);

        let invalidated = dependent::ISSUE_TEMPLATE.apply(state, baseline, plan);
        debug!(?invalidated, "Invalidated issue template fields");
    }
}

impl Reconcile for MetricProviderModel {
    const KIND: &'static str = "metric provider";

    fn plan_update(
        state: &Self,
        _config: &Self,
        _baseline: &Self,
        plan: &mut Self,
        out: &mut PlanOutput,
    ) {
        if !plan.default.is_unknown() && plan.default != state.default {
            out.requires_replace.push(AttrPath::root("default"));
        }

        let transition = classify_for::<MetricProviderOwner>(&state.service, &plan.service);
        if transition.requires_replacement() {
            out.requires_replace.push(AttrPath::root("service"));
        }
        out.transition = Some(transition);
    }

    fn plan_create(_config: &Self, plan: &mut Self, out: &mut PlanOutput) {
        out.diagnostics.extend(plan_default_instances(plan));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::models::native::{HttpCheck, NativeCommon, NativeService};
    use crate::models::watchdog::{ManualService, WebhookWatchdogService};
    use crate::models::{MetricProviderService, WatchdogService};
    use crate::value::TranslationMap;

    fn text(s: &str) -> Value<String> {
        Value::Known(s.to_string())
    }

    fn translations(entries: &[(&str, &str)]) -> Value<TranslationMap> {
        Value::Known(
            entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), text(v)))
                .collect(),
        )
    }

    fn component(description: &str) -> ComponentModel {
        let mut component = ComponentModel {
            id: text("c1"),
            updated_at: text("2024-01-01T00:00:00Z"),
            name: text("API"),
            name_translations: translations(&[("original", "en"), ("en", "API")]),
            description: text(description),
            description_translations: translations(&[("original", "en"), ("en", description)]),
            description_html: text(&format!("<p>{description}</p>")),
            ..ComponentModel::default()
        };
        component.watchdog.id = text("w1");
        component.watchdog.high_frequency = Value::Known(false);
        component.watchdog.service = WatchdogService::Manual(ManualService {
            state: Value::Known(1),
        })
        .into();
        component
    }

    fn config_of(state: &ComponentModel, description: &str) -> ComponentModel {
        ComponentModel {
            name: text("API"),
            description: text(description),
            watchdog: crate::models::WatchdogModel {
                service: state.watchdog.service.clone(),
                ..Default::default()
            },
            ..ComponentModel::default()
        }
    }

    #[test]
    fn test_description_change_invalidates_rendered_fields() {
        let state = component("Public API");
        let config = config_of(&state, "Internal API");
        let mut baseline = state.clone();
        baseline.description = text("Internal API");

        let result = ResourceTriple {
            prior_state: Some(state.clone()),
            config,
            baseline_plan: Some(baseline),
        }
        .reconcile();

        assert!(result.is_applicable());
        let plan = result.final_plan.unwrap();
        assert!(plan.description_html.is_unknown());
        assert!(plan.description_translations.is_unknown());
        assert!(plan.updated_at.is_unknown());
        assert_eq!(plan.name, state.name);
        assert_eq!(result.transition, Some(ServiceTransition::NoChange));
        assert!(result.fingerprint.is_some());
    }

    #[test]
    fn test_no_change_keeps_prior_values() {
        let state = component("Public API");
        let config = config_of(&state, "Public API");

        let result = ResourceTriple {
            prior_state: Some(state.clone()),
            config,
            baseline_plan: Some(state.clone()),
        }
        .reconcile();

        assert_eq!(result.final_plan, Some(state));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_reconcile_is_pure() {
        let state = component("Public API");
        let triple = ResourceTriple {
            prior_state: Some(state.clone()),
            config: config_of(&state, "Other"),
            baseline_plan: Some({
                let mut b = state.clone();
                b.description = text("Other");
                b
            }),
        };
        let before = triple.clone();

        let first = triple.reconcile();
        let second = triple.reconcile();
        assert_eq!(first.fingerprint, second.fingerprint);
        assert_eq!(triple.prior_state, before.prior_state);
        assert_eq!(triple.baseline_plan, before.baseline_plan);
    }

    #[test]
    fn test_watchdog_type_change_is_a_conversion() {
        let state = component("Public API");
        let mut config = config_of(&state, "Public API");
        config.watchdog.service =
            WatchdogService::Webhook(WebhookWatchdogService::default()).into();
        let mut baseline = state.clone();
        baseline.watchdog.service = config.watchdog.service.clone();

        let result = ResourceTriple {
            prior_state: Some(state),
            config,
            baseline_plan: Some(baseline),
        }
        .reconcile();

        assert_eq!(result.transition, Some(ServiceTransition::TypeConversion));
        assert!(!result.requires_replacement());
    }

    #[test]
    fn test_invalid_config_produces_no_plan() {
        let state = component("Public API");
        let mut config = config_of(&state, "Public API");
        config.name_translations = translations(&[("original", "en"), ("en", "API")]);

        let result = ResourceTriple {
            prior_state: Some(state.clone()),
            config,
            baseline_plan: Some(state),
        }
        .reconcile();

        assert!(result.final_plan.is_none());
        assert!(result.diagnostics.has_error());
        assert!(result.fingerprint.is_none());
    }

    #[test]
    fn test_malformed_translations_produce_no_plan() {
        let config = GroupModel {
            name_translations: translations(&[("en", "Core")]),
            ..GroupModel::default()
        };
        let result = ResourceTriple {
            prior_state: None,
            config: config.clone(),
            baseline_plan: Some(config),
        }
        .reconcile();

        assert!(result.final_plan.is_none());
        let diag = result.diagnostics.errors().next().unwrap();
        assert_eq!(diag.path, Some(AttrPath::root("name_translations")));
    }

    #[test]
    fn test_native_high_frequency_is_derived_on_create() {
        let service: crate::models::watchdog::WatchdogServiceSlots =
            WatchdogService::Native(NativeService::Http(HttpCheck {
                common: NativeCommon {
                    target: text("https://example.com"),
                    frequency: Value::Known(30_000),
                    ..NativeCommon::default()
                },
                ..HttpCheck::default()
            }))
            .into();
        let config = ComponentModel {
            name: text("Site"),
            watchdog: crate::models::WatchdogModel {
                service,
                ..Default::default()
            },
            ..ComponentModel::default()
        };
        let mut baseline = config.clone();
        baseline.watchdog.high_frequency = Value::Unknown;

        let result = ResourceTriple {
            prior_state: None,
            config,
            baseline_plan: Some(baseline),
        }
        .reconcile();

        let plan = result.final_plan.unwrap();
        assert_eq!(plan.watchdog.high_frequency, Value::Known(true));
    }

    #[test]
    fn test_metric_provider_type_change_requires_replacement() {
        let state = MetricProviderModel {
            id: text("mp1"),
            default: Value::Known(false),
            service: MetricProviderService::Builtin(Default::default()).into(),
            ..MetricProviderModel::default()
        };
        let config = MetricProviderModel {
            service: MetricProviderService::Webhook(Default::default()).into(),
            ..MetricProviderModel::default()
        };
        let mut baseline = state.clone();
        baseline.service = config.service.clone();
        baseline.default = Value::Known(true);

        let result = ResourceTriple {
            prior_state: Some(state),
            config,
            baseline_plan: Some(baseline),
        }
        .reconcile();

        assert_eq!(result.transition, Some(ServiceTransition::Replace));
        assert_eq!(
            result.requires_replace,
            vec![AttrPath::root("default"), AttrPath::root("service")]
        );
    }

    #[test]
    fn test_moving_an_update_to_another_issue_requires_replacement() {
        let state = IssueUpdateModel {
            id: text("u1"),
            issue_id: text("i1"),
            body: text("Investigating"),
            ..IssueUpdateModel::default()
        };
        let config = IssueUpdateModel {
            issue_id: text("i2"),
            body: text("Investigating"),
            ..IssueUpdateModel::default()
        };
        let mut baseline = state.clone();
        baseline.issue_id = text("i2");

        let result = ResourceTriple {
            prior_state: Some(state.clone()),
            config: config.clone(),
            baseline_plan: Some(baseline),
        }
        .reconcile();
        assert!(result.requires_replacement());
        assert_eq!(result.requires_replace, vec![AttrPath::root("issue_id")]);

        let result = ResourceTriple {
            prior_state: Some(state.clone()),
            config,
            baseline_plan: Some(state),
        }
        .reconcile();
        assert!(!result.requires_replacement());
    }

    #[test]
    fn test_replacement_plan_is_not_an_update() {
        let state = MetricProviderModel {
            id: text("mp1"),
            default: Value::Known(false),
            service: MetricProviderService::Builtin(Default::default()).into(),
            ..MetricProviderModel::default()
        };
        let config = MetricProviderModel {
            service: state.service.clone(),
            ..MetricProviderModel::default()
        };
        let mut baseline = state.clone();
        baseline.default = Value::Known(true);

        let result = ResourceTriple {
            prior_state: Some(state.clone()),
            config: config.clone(),
            baseline_plan: Some(baseline),
        }
        .reconcile();
        assert!(result.is_applicable());
        let err = result.into_update_plan().unwrap_err();
        assert!(matches!(
            err,
            HundError::Plan(PlanError::ReplacementRequired { ref attributes, .. })
                if attributes == "default"
        ));

        let unchanged = ResourceTriple {
            prior_state: Some(state.clone()),
            config,
            baseline_plan: Some(state),
        }
        .reconcile();
        assert!(unchanged.into_update_plan().is_ok());
    }

    #[test]
    fn test_metric_provider_create_fills_instances() {
        let config = MetricProviderModel {
            service: MetricProviderService::Builtin(Default::default()).into(),
            ..MetricProviderModel::default()
        };
        let mut baseline = config.clone();
        baseline.instances = Value::Unknown;

        let result = ResourceTriple {
            prior_state: None,
            config,
            baseline_plan: Some(baseline),
        }
        .reconcile();

        let plan = result.final_plan.unwrap();
        assert_eq!(plan.instances.as_known().map(|i| i.len()), Some(2));
    }

    #[test]
    fn test_issue_create_with_end_time_expects_resolving_update() {
        let config = IssueModel {
            title: text("Outage"),
            body: text("Down"),
            ended_at: text("2024-01-01T01:00:00Z"),
            ..IssueModel::default()
        };
        let mut baseline = config.clone();
        baseline.updates = Value::Unknown;
        baseline.cancelled_at = Value::Unknown;

        let result = ResourceTriple {
            prior_state: None,
            config,
            baseline_plan: Some(baseline),
        }
        .reconcile();

        let plan = result.final_plan.unwrap();
        let updates = plan.updates.as_known().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].effective_after, text("2024-01-01T01:00:00Z"));
        assert!(plan.cancelled_at.is_null());
    }

    #[test]
    fn test_destroying_a_resolving_update_warns_twice() {
        let state = IssueUpdateModel {
            id: text("u1"),
            label: text("resolved"),
            ..IssueUpdateModel::default()
        };

        let result = ResourceTriple {
            prior_state: Some(state),
            config: IssueUpdateModel::default(),
            baseline_plan: None,
        }
        .reconcile();

        assert!(result.final_plan.is_none());
        let summaries: Vec<&str> = result.diagnostics.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(summaries, vec![STANDING_UPDATE_SUMMARY, DESTRUCTION_SUMMARY]);
        assert!(result.diagnostics.iter().all(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn test_archived_issue_destroys_silently() {
        let state = IssueModel {
            archive_on_destroy: Value::Known(true),
            ..IssueModel::default()
        };
        let result = ResourceTriple {
            prior_state: Some(state),
            config: IssueModel::default(),
            baseline_plan: None,
        }
        .reconcile();
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_inputs() {
        let result = ResourceTriple::<GroupModel> {
            prior_state: None,
            config: GroupModel::default(),
            baseline_plan: None,
        }
        .reconcile();
        assert!(result.diagnostics.has_error());
    }

    #[test]
    fn test_request_dispatch_to_json() {
        let request: PlanRequest = serde_yaml::from_str(
            "kind: group\nconfig:\n  name: Core\nbaseline_plan:\n  name: Core\n",
        )
        .unwrap();
        let result = reconcile_request(&request);
        assert_eq!(result.final_plan.unwrap()["name"], serde_json::json!("Core"));
    }
}
