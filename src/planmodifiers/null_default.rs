//! Null default for optional timestamps.
//!
//! Timestamps like `ended_at` are optional and also set by the server. When
//! the user leaves one unset, the plan keeps whatever the prior state knew
//! instead of showing a pending change.

use tracing::debug;

use crate::models::IssueModel;
use crate::value::Value;

/// Resolves one optional timestamp.
///
/// `state` is `None` on create.
pub fn null_default(
    name: &str,
    state: Option<&Value<String>>,
    config: &Value<String>,
    plan: &mut Value<String>,
) {
    if !config.is_null() {
        return;
    }

    match state {
        Some(Value::Unknown) => {
            if plan.is_unknown() {
                debug!(field = name, "Resolving unknown timestamp to null");
                plan.set_null();
            }
        }
        Some(prior) => *plan = prior.clone(),
        None => plan.set_null(),
    }
}

/// Applies the null default to the optional timestamps of an issue.
pub fn plan_issue_timestamps(
    state: Option<&IssueModel>,
    config: &IssueModel,
    plan: &mut IssueModel,
) {
    null_default("ended_at", state.map(|s| &s.ended_at), &config.ended_at, &mut plan.ended_at);
    null_default(
        "cancelled_at",
        state.map(|s| &s.cancelled_at),
        &config.cancelled_at,
        &mut plan.cancelled_at,
    );

    let unset = Value::Null;
    let config_notify = config
        .schedule
        .as_ref()
        .map_or(&unset, |s| &s.notify_subscribers_at);
    let state_notify = state.and_then(|s| s.schedule.as_ref()).map(|s| &s.notify_subscribers_at);

    if let Some(schedule) = plan.schedule.as_mut() {
        null_default(
            "schedule.notify_subscribers_at",
            state_notify,
            config_notify,
            &mut schedule.notify_subscribers_at,
        );
    }
}
