//! Hund CLI entrypoint.
//!
//! This is the main entrypoint for the hund command-line tool.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use hund_provider::api::HundClient;
use hund_provider::cli::{Cli, Commands, OutputFormatter, ProviderArgs};
use hund_provider::config::{load_dotenv, load_request, PlanRequest};
use hund_provider::error::{HundError, PlanError, Result};
use hund_provider::planner::ApplyExecutor;
use hund_provider::reconciler::{reconcile_request, ReconciliationResult, Reconcile, ResourceTriple};
use hund_provider::validators::ValidateConfig;

use clap::Parser;
use serde_json::Value as Json;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point. Returns whether the command succeeded.
async fn run(cli: Cli) -> Result<bool> {
    let formatter = OutputFormatter::new(cli.output);
    load_dotenv(None)?;

    match cli.command {
        Commands::Validate { request } => cmd_validate(&request, &formatter),
        Commands::Plan { request, detailed } => cmd_plan(&request, detailed, &formatter),
        Commands::Apply { request, provider } => cmd_apply(&request, &provider, &formatter).await,
    }
}

fn emit(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

/// Validate the config of a request.
fn cmd_validate(path: &Path, formatter: &OutputFormatter) -> Result<bool> {
    let request = load_request(path)?;
    info!("Validating {} config", request.kind());

    let diagnostics = match &request {
        PlanRequest::Component(t) => t.config.validate_config(),
        PlanRequest::Group(t) => t.config.validate_config(),
        PlanRequest::Issue(t) => t.config.validate_config(),
        PlanRequest::IssueUpdate(t) => t.config.validate_config(),
        PlanRequest::IssueTemplate(t) => t.config.validate_config(),
        PlanRequest::MetricProvider(t) => t.config.validate_config(),
    };

    emit(&formatter.format_validation(request.kind(), &diagnostics))?;
    Ok(!diagnostics.has_error())
}

/// Reconcile a request and show the final plan.
fn cmd_plan(path: &Path, detailed: bool, formatter: &OutputFormatter) -> Result<bool> {
    let request = load_request(path)?;
    let result = reconcile_request(&request);

    emit(&formatter.format_plan(request.kind(), &result, detailed))?;
    Ok(!result.diagnostics.has_error())
}

/// Reconcile a request and send the update to Hund.
async fn cmd_apply(
    path: &Path,
    provider: &ProviderArgs,
    formatter: &OutputFormatter,
) -> Result<bool> {
    let request = load_request(path)?;
    let kind = request.kind();

    let config = provider.resolve()?;
    let client = HundClient::new(&config)?;
    let executor = ApplyExecutor::new(&client);
    debug!("Applying against {}", client.endpoint());

    let applied = match &request {
        PlanRequest::Component(triple) => {
            let (prior, plan) = planned_update(triple, formatter, kind)?;
            serde_json::to_value(executor.apply_component_update(prior, &plan).await?)
        }
        PlanRequest::MetricProvider(triple) => {
            let (prior, plan) = planned_update(triple, formatter, kind)?;
            serde_json::to_value(executor.apply_metric_provider_update(prior, &plan).await?)
        }
        PlanRequest::Group(_)
        | PlanRequest::Issue(_)
        | PlanRequest::IssueUpdate(_)
        | PlanRequest::IssueTemplate(_) => {
            error!("Cannot apply {kind} resources");
            return Err(PlanError::UnsupportedApply { kind }.into());
        }
    };

    let applied: Json =
        applied.map_err(|e| HundError::internal(format!("encoding applied state: {e}")))?;
    emit(&formatter.format_applied(kind, &applied))?;
    Ok(true)
}

/// Reconciles an update and returns the prior state with the final plan.
///
/// Shows the plan first so blocking diagnostics reach the user. Plans that
/// force replacement are refused.
fn planned_update<'t, R: Reconcile>(
    triple: &'t ResourceTriple<R>,
    formatter: &OutputFormatter,
    kind: &str,
) -> Result<(&'t R, R)> {
    let prior = triple.prior_state.as_ref().ok_or(PlanError::MissingInput {
        what: "a prior state to update",
    })?;
    if triple.baseline_plan.is_none() {
        return Err(PlanError::MissingInput { what: "a baseline plan" }.into());
    }

    let result: ReconciliationResult<R> = triple.reconcile();
    emit(&formatter.format_plan(kind, &result.clone().into_json(), false))?;

    Ok((prior, result.into_update_plan()?))
}
