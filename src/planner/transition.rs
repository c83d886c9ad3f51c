//! Classification of a change to a polymorphic service object.
//!
//! Switching a service between variants is a different remote operation
//! than editing the fields of the current variant, and not every owner can
//! switch in place. The classification made at plan time picks the call
//! made at apply time.

use std::fmt;

use serde::Serialize;

use crate::models::metric_provider::MetricProviderServiceSlots;
use crate::models::watchdog::WatchdogServiceSlots;
use crate::variant::SlotSet;

/// How a planned service differs from the prior one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceTransition {
    /// Same variant, same fields.
    NoChange,
    /// Same variant, different fields.
    InPlaceUpdate,
    /// Different variant, switched through a dedicated endpoint.
    TypeConversion,
    /// Different variant, the owning resource must be recreated.
    Replace,
}

impl ServiceTransition {
    /// Returns true if the owning resource must be destroyed and recreated.
    #[must_use]
    pub const fn requires_replacement(self) -> bool {
        matches!(self, Self::Replace)
    }

    /// Returns true if a remote call touching the service is needed.
    #[must_use]
    pub const fn is_change(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

impl fmt::Display for ServiceTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoChange => "no change",
            Self::InPlaceUpdate => "in-place update",
            Self::TypeConversion => "type conversion",
            Self::Replace => "replace",
        };
        write!(f, "{s}")
    }
}

/// Whether an owner can switch its service variant in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionSupport {
    /// A conversion endpoint exists.
    ConvertEndpoint,
    /// Only destroy and recreate.
    ReplaceOnly,
}

/// A resource owning a polymorphic service.
pub trait ServiceOwner {
    /// Resource kind, used in errors.
    const OWNER: &'static str;

    /// Conversion capability of this resource kind.
    const CONVERSION: ConversionSupport;

    /// Document form of the owned service.
    type Slots: SlotSet + PartialEq;
}

/// Watchdogs switch service type through `convert_watchdog`.
#[derive(Debug, Clone, Copy)]
pub struct WatchdogOwner;

impl ServiceOwner for WatchdogOwner {
    const OWNER: &'static str = "Watchdog";
    const CONVERSION: ConversionSupport = ConversionSupport::ConvertEndpoint;
    type Slots = WatchdogServiceSlots;
}

/// Metric providers have no conversion endpoint.
#[derive(Debug, Clone, Copy)]
pub struct MetricProviderOwner;

impl ServiceOwner for MetricProviderOwner {
    const OWNER: &'static str = "MetricProvider";
    const CONVERSION: ConversionSupport = ConversionSupport::ReplaceOnly;
    type Slots = MetricProviderServiceSlots;
}

/// Classifies the change from `prior` to `plan`.
#[must_use]
pub fn classify<S: SlotSet + PartialEq>(
    prior: &S,
    plan: &S,
    support: ConversionSupport,
) -> ServiceTransition {
    if prior.selected_name() != plan.selected_name() {
        return match support {
            ConversionSupport::ConvertEndpoint => ServiceTransition::TypeConversion,
            ConversionSupport::ReplaceOnly => ServiceTransition::Replace,
        };
    }

    if prior == plan {
        ServiceTransition::NoChange
    } else {
        ServiceTransition::InPlaceUpdate
    }
}

/// Classifies a change using the owner's conversion capability.
#[must_use]
pub fn classify_for<O: ServiceOwner>(prior: &O::Slots, plan: &O::Slots) -> ServiceTransition {
    classify(prior, plan, O::CONVERSION)
}
