//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ProviderConfig, ProviderSettings};
use crate::error::Result;

/// Hund - plan reconciliation for Hund status page resources.
#[derive(Parser, Debug)]
#[command(name = "hund")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the config of a plan request.
    Validate {
        /// Plan request file (YAML or JSON).
        request: PathBuf,
    },

    /// Reconcile a plan request and print the final plan.
    Plan {
        /// Plan request file (YAML or JSON).
        request: PathBuf,

        /// Print the final plan document too.
        #[arg(short, long)]
        detailed: bool,
    },

    /// Reconcile a plan request and send the update to Hund.
    Apply {
        /// Plan request file (YAML or JSON).
        request: PathBuf,

        /// Connection settings.
        #[command(flatten)]
        provider: ProviderArgs,
    },
}

/// Connection settings for commands that talk to Hund.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ProviderArgs {
    /// Status page domain. Falls back to the provider file, then `HUND_DOMAIN`.
    #[arg(long)]
    pub domain: Option<String>,

    /// API key. Falls back to the provider file, then `HUND_KEY`.
    #[arg(long)]
    pub key: Option<String>,

    /// YAML file with `domain` and `key`.
    #[arg(long)]
    pub provider_file: Option<PathBuf>,
}

impl ProviderArgs {
    /// Resolves the connection settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider file is unreadable or a value is missing.
    pub fn resolve(&self) -> Result<ProviderConfig> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolves the connection settings. Flags win over the provider file,
    /// which wins over `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider file is unreadable or a value is missing.
    pub fn resolve_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<ProviderConfig> {
        let mut settings = match &self.provider_file {
            Some(path) => ProviderSettings::load_file(path)?,
            None => ProviderSettings::default(),
        };

        if self.domain.is_some() {
            settings.domain.clone_from(&self.domain);
        }
        if self.key.is_some() {
            settings.key.clone_from(&self.key);
        }

        settings.with_fallback(lookup).resolve()
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
