//! Service transition planning and apply-time execution.
//!
//! This module classifies how a polymorphic service changes between the
//! prior state and the plan, and turns a reconciled plan into remote calls.

mod executor;
mod transition;

pub use executor::ApplyExecutor;
pub use transition::{
    classify, classify_for, ConversionSupport, MetricProviderOwner, ServiceOwner,
    ServiceTransition, WatchdogOwner,
};
