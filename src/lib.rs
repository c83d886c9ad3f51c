// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Hund Provider
//!
//! Plan reconciliation for the resources of a Hund status page.
//!
//! ## Overview
//!
//! Before a change to a component, group, issue, issue update, issue
//! template or metric provider is applied, an orchestrator proposes a
//! baseline plan. This crate turns that proposal into an honest final plan:
//!
//! - Values the server will recompute become unknown instead of stale
//! - Translated text fields stay consistent with their original value
//! - Template applications invalidate what the template renders
//! - Polymorphic watchdog and metric services get a transition class
//!
//! ## Architecture
//!
//! Each resource is reconciled from a triple:
//!
//! 1. **Prior state**: what the last apply recorded (absent on create)
//! 2. **Config**: what the user wrote
//! 3. **Baseline plan**: the orchestrator's proposal (absent on destroy)
//!
//! The [`reconciler`] validates the config, runs the plan rules of the
//! resource kind and returns the final plan with its diagnostics.
//!
//! ## Modules
//!
//! - [`value`]: Three-state attribute values
//! - [`variant`]: Exactly-one-of polymorphic objects
//! - [`models`]: Resource models and their wire forms
//! - [`planmodifiers`]: Per-attribute plan rules
//! - [`validators`]: Config validation
//! - [`planner`]: Service transitions and apply execution
//! - [`reconciler`]: Plan reconciliation engine
//! - [`api`]: Hund REST client and wire codecs
//! - [`config`]: Provider settings and plan requests
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! kind: group
//! prior_state:
//!   id: "5f3b"
//!   name: Core
//!   description: Core services
//! config:
//!   name: Core
//!   description: Core systems
//! baseline_plan:
//!   id: "5f3b"
//!   name: Core
//!   description: Core systems
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod api;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod planmodifiers;
pub mod planner;
pub mod reconciler;
pub mod validators;
pub mod value;
pub mod variant;

// ============================================================================
// Re-exports
// ============================================================================

pub use api::{HundApi, HundClient};
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{PlanRequest, ProviderConfig, ProviderSettings};
pub use diagnostics::{AttrPath, Diagnostic, Diagnostics, Severity};
pub use error::{HundError, Result};
pub use planner::{ApplyExecutor, ServiceTransition};
pub use reconciler::{reconcile, reconcile_request, Reconcile, ReconciliationResult, ResourceTriple};
pub use value::Value;
