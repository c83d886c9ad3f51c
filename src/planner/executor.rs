//! Apply-time execution of planned updates.
//!
//! The executor turns a reconciled plan into the remote calls that realise
//! it, choosing the call from the service transition. It never writes to
//! the prior state; the new state is returned only once every call has
//! succeeded.

use serde_json::{Map, Value as Json};
use tracing::{error, info};

use crate::api::HundApi;
use crate::error::{PlanError, Result};
use crate::models::metric_provider::MetricProviderServiceSlots;
use crate::models::watchdog::{WatchdogModel, WatchdogServiceSlots};
use crate::models::{ComponentModel, MetricProviderModel};
use crate::models::put_known;
use crate::value::Value;
use crate::variant::{SlotSet, Variant};

use super::transition::{
    classify_for, MetricProviderOwner, ServiceOwner, ServiceTransition, WatchdogOwner,
};

/// Executor for planned updates against the Hund API.
#[derive(Debug)]
pub struct ApplyExecutor<'a, A: HundApi + ?Sized> {
    /// Remote API.
    api: &'a A,
}

impl<'a, A: HundApi + ?Sized> ApplyExecutor<'a, A> {
    /// Creates a new executor.
    #[must_use]
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Reads the current state of a component.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the response cannot be decoded.
    pub async fn read_component(&self, id: &str) -> Result<ComponentModel> {
        let response = self.api.get_component(id).await?;
        ComponentModel::from_response(&response)
    }

    /// Reads the current state of a metric provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the response cannot be decoded.
    pub async fn read_metric_provider(&self, id: &str) -> Result<MetricProviderModel> {
        let response = self.api.get_metric_provider(id).await?;
        MetricProviderModel::from_response(&response)
    }

    /// Applies a planned component update.
    ///
    /// A watchdog service type change is converted first, the component is
    /// then updated with the watchdog form nested only when the watchdog
    /// itself changed in place.
    ///
    /// # Errors
    ///
    /// Returns an error if a form cannot be built or a remote call fails.
    pub async fn apply_component_update(
        &self,
        prior: &ComponentModel,
        plan: &ComponentModel,
    ) -> Result<ComponentModel> {
        let id = known_id(&prior.id, "component id")?;
        let transition =
            classify_for::<WatchdogOwner>(&prior.watchdog.service, &plan.watchdog.service);
        info!("Updating component {id} ({transition} of watchdog service)");

        let mut watchdog_form = None;

        match transition {
            ServiceTransition::TypeConversion => {
                let watchdog_id = known_id(&prior.watchdog.id, "watchdog id")?;
                let mut form = watchdog_form_for(&plan.watchdog)?;
                form.insert(
                    String::from("keep_original_default_metric_provider"),
                    Json::Bool(false),
                );

                if let Err(e) = self.api.convert_watchdog(watchdog_id, Json::Object(form)).await {
                    error!("Failed to convert watchdog {watchdog_id}: {e}");
                    return Err(e);
                }
            }
            ServiceTransition::InPlaceUpdate => {
                watchdog_form = Some(Json::Object(watchdog_form_for(&plan.watchdog)?));
            }
            ServiceTransition::NoChange
                if high_frequency_changed(&prior.watchdog, &plan.watchdog) =>
            {
                watchdog_form = Some(Json::Object(watchdog_form_for(&plan.watchdog)?));
            }
            ServiceTransition::NoChange | ServiceTransition::Replace => {}
        }

        let form = plan.to_update_form(watchdog_form)?;
        let response = match self.api.update_component(id, form).await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to update component {id}: {e}");
                return Err(e);
            }
        };

        let mut state = ComponentModel::from_response(&response)?;
        state.watchdog.service =
            carry_watchdog_secrets(&state.watchdog.service, &plan.watchdog.service)?;

        info!("Updated component {id}");
        Ok(state)
    }

    /// Applies a planned metric provider update.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::RequiresReplacement`] if the service type
    /// changed, [`PlanError::ReplacementRequired`] if `default` changed, or
    /// an error if a form cannot be built or the call fails.
    pub async fn apply_metric_provider_update(
        &self,
        prior: &MetricProviderModel,
        plan: &MetricProviderModel,
    ) -> Result<MetricProviderModel> {
        let id = known_id(&prior.id, "metric provider id")?;
        if plan.default.is_known() && plan.default != prior.default {
            error!("Refusing to update metric provider {id}: `default` cannot change in place");
            return Err(PlanError::ReplacementRequired {
                kind: "metric provider",
                attributes: String::from("default"),
            }
            .into());
        }
        let transition = classify_for::<MetricProviderOwner>(&prior.service, &plan.service);

        let mut form = Map::new();
        match transition {
            ServiceTransition::TypeConversion | ServiceTransition::Replace => {
                return Err(PlanError::RequiresReplacement {
                    owner: MetricProviderOwner::OWNER,
                    from: prior.service.selected_name().unwrap_or("none"),
                    to: plan.service.selected_name().unwrap_or("none"),
                }
                .into());
            }
            ServiceTransition::InPlaceUpdate => {
                form.insert(String::from("service"), plan.service.select()?.encode()?);
            }
            ServiceTransition::NoChange => {}
        }

        let instances = plan.instance_forms(prior)?;
        form.insert(String::from("instances"), Json::Array(instances));

        info!("Updating metric provider {id} ({transition} of service)");
        let response = match self.api.update_metric_provider(id, Json::Object(form)).await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to update metric provider {id}: {e}");
                return Err(e);
            }
        };

        let mut state = MetricProviderModel::from_response(&response)?;
        state.service = carry_metric_secrets(&state.service, &plan.service)?;
        Ok(state)
    }
}

fn known_id<'v>(id: &'v Value<String>, what: &'static str) -> Result<&'v str> {
    id.as_known()
        .map(String::as_str)
        .ok_or_else(|| PlanError::MissingInput { what }.into())
}

fn high_frequency_changed(prior: &WatchdogModel, plan: &WatchdogModel) -> bool {
    plan.high_frequency.is_known() && plan.high_frequency != prior.high_frequency
}

/// `{high_frequency?, service}` shared by the conversion and update forms.
fn watchdog_form_for(watchdog: &WatchdogModel) -> Result<Map<String, Json>> {
    let mut form = Map::new();
    put_known(&mut form, "high_frequency", &watchdog.high_frequency)?;
    form.insert(String::from("service"), watchdog.service.select()?.encode()?);
    Ok(form)
}

fn carry_watchdog_secrets(
    decoded: &WatchdogServiceSlots,
    planned: &WatchdogServiceSlots,
) -> Result<WatchdogServiceSlots> {
    let mut service = decoded.select()?;
    if let Ok(planned) = planned.select() {
        service.replace_sensitive(&planned);
    }
    Ok(service.into())
}

fn carry_metric_secrets(
    decoded: &MetricProviderServiceSlots,
    planned: &MetricProviderServiceSlots,
) -> Result<MetricProviderServiceSlots> {
    let mut service = decoded.select()?;
    if let Ok(planned) = planned.select() {
        service.replace_sensitive(&planned);
    }
    Ok(service.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::MockHundApi;
    use crate::models::component::ComponentResponse;
    use crate::models::metric_provider::{MetricProviderResponse, PingdomMetricService};
    use crate::models::watchdog::{ManualService, WatchdogResponse, WebhookWatchdogService};
    use crate::error::{ApiError, HundError};
    use serde_json::json;

    fn component_response(service: Json) -> ComponentResponse {
        serde_json::from_value(json!({
            "id": "c1",
            "created_at": 0,
            "updated_at": 0,
            "name": {"original": "en", "en": "API"},
            "description_html": {"original": "en", "en": ""},
            "group": "g1",
            "watchdog": {"id": "w1", "high_frequency": false, "service": service}
        }))
        .unwrap()
    }

    fn prior_component() -> ComponentModel {
        let response = component_response(json!({"type": "manual", "state": 1}));
        ComponentModel::from_response(&response).unwrap()
    }

    fn with_service(
        mut component: ComponentModel,
        service: WatchdogServiceSlots,
    ) -> ComponentModel {
        component.watchdog.service = service;
        component
    }

    fn webhook_slots(key: &str) -> WatchdogServiceSlots {
        WatchdogServiceSlots {
            webhook: Some(WebhookWatchdogService {
                webhook_key: Value::Known(key.to_string()),
                deadman: Value::Known(false),
                ..WebhookWatchdogService::default()
            }),
            ..WatchdogServiceSlots::default()
        }
    }

    #[tokio::test]
    async fn test_type_conversion_converts_before_update() {
        let prior = prior_component();
        let plan = with_service(prior.clone(), webhook_slots("abc"));

        let mut api = MockHundApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_convert_watchdog()
            .withf(|id, form| {
                id == "w1"
                    && form["keep_original_default_metric_provider"] == json!(false)
                    && form["service"]["type"] == json!("webhook")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(serde_json::from_value::<WatchdogResponse>(json!({
                    "id": "w1",
                    "service": {"type": "webhook", "webhook_key": "abc"}
                }))
                .unwrap())
            });
        api.expect_update_component()
            .withf(|id, form| id == "c1" && form.get("watchdog").is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(component_response(
                    json!({"type": "webhook", "webhook_key": "abc", "deadman": false}),
                ))
            });

        let state = ApplyExecutor::new(&api)
            .apply_component_update(&prior, &plan)
            .await
            .unwrap();
        assert_eq!(state.watchdog.service, webhook_slots("abc"));
        assert!(prior.watchdog.service.manual.is_some());
    }

    #[tokio::test]
    async fn test_in_place_update_nests_watchdog_form() {
        let prior = with_service(prior_component(), webhook_slots("abc"));
        let plan = with_service(prior.clone(), webhook_slots("def"));

        let mut api = MockHundApi::new();
        api.expect_convert_watchdog().never();
        api.expect_update_component()
            .withf(|_, form| {
                form["watchdog"]["service"]
                    == json!({"type": "webhook", "webhook_key": "def", "deadman": false})
                    && form["watchdog"]["high_frequency"] == json!(false)
            })
            .times(1)
            .returning(|_, _| {
                Ok(component_response(
                    json!({"type": "webhook", "webhook_key": "def", "deadman": false}),
                ))
            });

        let state = ApplyExecutor::new(&api)
            .apply_component_update(&prior, &plan)
            .await
            .unwrap();
        assert_eq!(state.watchdog.service, webhook_slots("def"));
    }

    #[tokio::test]
    async fn test_unchanged_watchdog_is_omitted() {
        let prior = prior_component();
        let mut plan = prior.clone();
        plan.name = Value::Known(String::from("Public API"));
        plan.name_translations = Value::Null;

        let mut api = MockHundApi::new();
        api.expect_update_component()
            .withf(|_, form| form.get("watchdog").is_none() && form["name"] == json!("Public API"))
            .times(1)
            .returning(|_, _| Ok(component_response(json!({"type": "manual", "state": 1}))));

        assert!(ApplyExecutor::new(&api)
            .apply_component_update(&prior, &plan)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_failed_conversion_stops_before_update() {
        let prior = prior_component();
        let plan = with_service(prior.clone(), webhook_slots("abc"));

        let mut api = MockHundApi::new();
        api.expect_convert_watchdog().times(1).returning(|_, _| {
            Err(ApiError::UnexpectedStatus {
                status: 500,
                body: String::from("boom"),
            }
            .into())
        });
        api.expect_update_component().never();

        let err = ApplyExecutor::new(&api)
            .apply_component_update(&prior, &plan)
            .await
            .unwrap_err();
        assert!(matches!(err, HundError::Api(ApiError::UnexpectedStatus { status: 500, .. })));
        assert_eq!(prior.watchdog.service.manual, Some(ManualService { state: Value::Known(1) }));
    }

    fn metric_provider_response(service: Json) -> MetricProviderResponse {
        serde_json::from_value(json!({
            "id": "mp1",
            "watchdog": "w1",
            "default": false,
            "instances": [{"id": "mi1", "slug": "res", "definition_slug": "res"}],
            "service": service
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_metric_provider_type_change_is_refused() {
        let response = metric_provider_response(json!({"type": "builtin"}));
        let prior = MetricProviderModel::from_response(&response).unwrap();
        let mut plan = prior.clone();
        plan.service = MetricProviderServiceSlots {
            pingdom: Some(PingdomMetricService::default()),
            ..MetricProviderServiceSlots::default()
        };

        let api = MockHundApi::new();
        let err = ApplyExecutor::new(&api)
            .apply_metric_provider_update(&prior, &plan)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HundError::Plan(PlanError::RequiresReplacement {
                from: "builtin",
                to: "pingdom",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_metric_provider_default_change_is_refused() {
        let response = metric_provider_response(json!({"type": "builtin"}));
        let prior = MetricProviderModel::from_response(&response).unwrap();
        let mut plan = prior.clone();
        plan.default = Value::Known(true);

        let mut api = MockHundApi::new();
        api.expect_update_metric_provider().never();

        let err = ApplyExecutor::new(&api)
            .apply_metric_provider_update(&prior, &plan)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HundError::Plan(PlanError::ReplacementRequired { ref attributes, .. })
                if attributes == "default"
        ));
        assert_eq!(prior.default, Value::Known(false));
    }

    #[tokio::test]
    async fn test_metric_provider_in_place_keeps_secret() {
        let prior = MetricProviderModel::from_response(&metric_provider_response(
            json!({"type": "pingdom", "check_id": "1"}),
        ))
        .unwrap();
        let mut plan = prior.clone();
        plan.service = MetricProviderServiceSlots {
            pingdom: Some(PingdomMetricService {
                api_token: Value::Known(String::from("token")),
                check_id: Value::Known(String::from("2")),
                ..PingdomMetricService::default()
            }),
            ..MetricProviderServiceSlots::default()
        };

        let mut api = MockHundApi::new();
        api.expect_update_metric_provider()
            .withf(|id, form| {
                id == "mp1"
                    && form["service"]["check_id"] == json!("2")
                    && form["instances"][0]["id"] == json!("mi1")
            })
            .times(1)
            .returning(|_, _| {
                Ok(metric_provider_response(json!({"type": "pingdom", "check_id": "2"})))
            });

        let state = ApplyExecutor::new(&api)
            .apply_metric_provider_update(&prior, &plan)
            .await
            .unwrap();
        let pingdom = state.service.pingdom.unwrap();
        assert_eq!(pingdom.api_token, Value::Known(String::from("token")));
        assert_eq!(pingdom.check_id, Value::Known(String::from("2")));
    }
}
