//! CLI module for the Hund plan tool.
//!
//! This module provides the command-line interface for validating,
//! planning and applying Hund resources.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat, ProviderArgs};
pub use output::OutputFormatter;
