//! Plan rules.
//!
//! Each rule reads the immutable prior state, config and baseline plan and
//! writes only the plan being produced.

pub mod dependent;
pub mod high_frequency;
pub mod metric_instances;
pub mod null_default;
pub mod template;
pub mod translatable;

pub use dependent::{Edge, Invalidator};
pub use template::Templated;
pub use translatable::{Pair, Side};
