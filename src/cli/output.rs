//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use serde_json::Value as Json;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::planner::ServiceTransition;
use crate::reconciler::ReconciliationResult;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Diagnostic row for table display.
#[derive(Tabled)]
struct DiagnosticRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Attribute")]
    path: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&Diagnostic> for DiagnosticRow {
    fn from(d: &Diagnostic) -> Self {
        Self {
            severity: OutputFormatter::format_severity(d.severity),
            path: d.path.as_ref().map_or_else(|| "-".to_string(), ToString::to_string),
            summary: d.summary.clone(),
            detail: OutputFormatter::truncate(&d.detail, 60),
        }
    }
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the diagnostics of a validation run.
    #[must_use]
    pub fn format_validation(&self, kind: &str, diagnostics: &Diagnostics) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "kind": kind,
                "valid": !diagnostics.has_error(),
                "diagnostics": diagnostics,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = if diagnostics.has_error() {
                    format!("{} {kind} config is invalid\n", "✗".red())
                } else {
                    format!("{} {kind} config is valid\n", "✓".green())
                };
                output.push_str(&Self::diagnostics_table(diagnostics));
                output
            }
        }
    }

    /// Formats a reconciliation result.
    #[must_use]
    pub fn format_plan(
        &self,
        kind: &str,
        result: &ReconciliationResult<Json>,
        detailed: bool,
    ) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "kind": kind,
                "result": result,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => Self::format_plan_text(kind, result, detailed),
        }
    }

    fn format_plan_text(kind: &str, result: &ReconciliationResult<Json>, detailed: bool) -> String {
        let mut output = String::new();

        let status = match &result.final_plan {
            Some(_) if result.requires_replacement() => {
                format!("{} {kind} must be replaced", "⚠".yellow())
            }
            Some(_) => format!("{} {kind} plan is ready", "✓".green()),
            None if result.diagnostics.has_error() => {
                format!("{} {kind} cannot be planned", "✗".red())
            }
            None => format!("{} {kind} will be destroyed", "-".red()),
        };
        let _ = writeln!(output, "\n{status}\n");

        if let Some(transition) = result.transition {
            let _ = writeln!(output, "   Service: {}", Self::format_transition(transition));
        }
        if result.requires_replacement() {
            let paths: Vec<String> =
                result.requires_replace.iter().map(ToString::to_string).collect();
            let _ = writeln!(output, "   Forces replacement: {}", paths.join(", "));
        }
        if let Some(fingerprint) = &result.fingerprint {
            let short = &fingerprint[..12.min(fingerprint.len())];
            let _ = writeln!(output, "   Fingerprint: {short}");
        }

        output.push_str(&Self::diagnostics_table(&result.diagnostics));

        if detailed {
            if let Some(plan) = &result.final_plan {
                let _ = write!(
                    output,
                    "\nFinal plan:\n{}\n",
                    serde_json::to_string_pretty(plan).unwrap_or_default()
                );
            }
        }

        output
    }

    /// Formats the model read back after an apply.
    #[must_use]
    pub fn format_applied(&self, kind: &str, model: &Json) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "kind": kind,
                "status": "applied",
                "state": model,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => {
                let id = model.get("id").and_then(Json::as_str).unwrap_or("?");
                format!("{} Applied {kind} {id}\n", "✓".green())
            }
        }
    }

    fn diagnostics_table(diagnostics: &Diagnostics) -> String {
        if diagnostics.is_empty() {
            return String::new();
        }

        let rows: Vec<DiagnosticRow> = diagnostics.iter().map(DiagnosticRow::from).collect();
        let mut table = Table::new(rows).to_string();
        table.push('\n');

        let errors = diagnostics.errors().count();
        let _ = write!(
            table,
            "\n{} error(s), {} warning(s)\n",
            errors.to_string().red(),
            (diagnostics.len() - errors).to_string().yellow()
        );
        table
    }

    fn format_severity(severity: Severity) -> String {
        match severity {
            Severity::Error => "error".red().to_string(),
            Severity::Warning => "warning".yellow().to_string(),
        }
    }

    fn format_transition(transition: ServiceTransition) -> String {
        let label = transition.to_string();
        match transition {
            ServiceTransition::NoChange => label.dimmed().to_string(),
            ServiceTransition::Replace => label.red().to_string(),
            ServiceTransition::InPlaceUpdate | ServiceTransition::TypeConversion => {
                label.yellow().to_string()
            }
        }
    }

    /// Truncates a string to a maximum number of characters.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let head: String = s.chars().take(max_len - 3).collect();
            format!("{head}...")
        }
    }
}
