//! Default metric instances for a new metric provider.

use std::collections::BTreeMap;

use crate::diagnostics::{AttrPath, Diagnostics};
use crate::error::{HundError, VariantError};
use crate::models::metric_provider::default_instances;
use crate::models::{MetricInstanceModel, MetricProviderModel, MetricProviderService};
use crate::value::Value;
use crate::variant::{SlotSet, Variant};

/// Fills an unknown `instances` map on create with one pending instance per
/// default metric of the selected service.
#[must_use]
pub fn plan_default_instances(plan: &mut MetricProviderModel) -> Diagnostics {
    let mut diags = Diagnostics::new();

    if !plan.instances.is_unknown() {
        return diags;
    }

    let slot = match plan.service.select() {
        Ok(service) => service.slot_name(),
        Err(e) => {
            diags.push(HundError::from(e).to_diagnostic_at(AttrPath::root("service")));
            return diags;
        }
    };

    let Some(slugs) = default_instances(slot) else {
        let err = VariantError::UnknownDiscriminator {
            union: MetricProviderService::UNION,
            tag: slot.to_owned(),
        };
        diags.push(HundError::from(err).to_diagnostic_at(AttrPath::root("service")));
        return diags;
    };

    let instances: BTreeMap<String, MetricInstanceModel> = slugs
        .iter()
        .map(|slug| ((*slug).to_owned(), MetricInstanceModel::unknown()))
        .collect();
    plan.instances = Value::Known(instances);

    diags
}
