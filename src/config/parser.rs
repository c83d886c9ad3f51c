//! Loading plan requests from YAML or JSON files.
//!
//! A plan request names a resource kind and carries the triple the
//! reconciler works on:
//!
//! ```yaml
//! kind: component
//! prior_state: null
//! config:
//!   name: API
//!   watchdog:
//!     service:
//!       manual:
//!         state: 1
//! baseline_plan:
//!   ...
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, HundError, Result};
use crate::models::{
    ComponentModel, GroupModel, IssueModel, IssueTemplateModel, IssueUpdateModel,
    MetricProviderModel,
};
use crate::reconciler::ResourceTriple;

/// A resource triple tagged with its kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanRequest {
    /// A component and its watchdog.
    Component(ResourceTriple<ComponentModel>),
    /// A component group.
    Group(ResourceTriple<GroupModel>),
    /// An issue.
    Issue(ResourceTriple<IssueModel>),
    /// An issue update.
    IssueUpdate(ResourceTriple<IssueUpdateModel>),
    /// An issue template.
    IssueTemplate(ResourceTriple<IssueTemplateModel>),
    /// A metric provider.
    MetricProvider(ResourceTriple<MetricProviderModel>),
}

impl PlanRequest {
    /// Resource kind as written in the request.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Component(_) => "component",
            Self::Group(_) => "group",
            Self::Issue(_) => "issue",
            Self::IssueUpdate(_) => "issue_update",
            Self::IssueTemplate(_) => "issue_template",
            Self::MetricProvider(_) => "metric_provider",
        }
    }
}

/// Document format of a request file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    /// YAML, the default.
    Yaml,
    /// JSON.
    Json,
}

impl RequestFormat {
    /// Picks the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Loads a plan request from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_request(path: impl AsRef<Path>) -> Result<PlanRequest> {
    let path = path.as_ref();
    info!("Loading plan request from: {}", path.display());

    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
        what: "plan request",
        message: format!("Failed to read file: {e}"),
        location: Some(path.display().to_string()),
    })?;

    parse_request(&content, RequestFormat::from_path(path), Some(path))
}

/// Parses a plan request from a string.
///
/// # Errors
///
/// Returns an error if the document is malformed.
pub fn parse_request(
    content: &str,
    format: RequestFormat,
    source: Option<&Path>,
) -> Result<PlanRequest> {
    let location = || source.map(|p| p.display().to_string());

    let request: PlanRequest = match format {
        RequestFormat::Yaml => serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            what: "plan request",
            message: format!("YAML parse error: {e}"),
            location: location(),
        }),
        RequestFormat::Json => serde_json::from_str(content).map_err(|e| ConfigError::ParseError {
            what: "plan request",
            message: format!("JSON parse error: {e}"),
            location: location(),
        }),
    }
    .map_err(HundError::from)?;

    debug!("Parsed {} plan request", request.kind());
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use crate::variant::SlotSet;
    use std::io::Write;

    const COMPONENT_YAML: &str = r"
kind: component
config:
  name: API
  watchdog:
    service:
      manual:
        state: 1
";

    #[test]
    fn test_parse_minimal_component_request() {
        let request = parse_request(COMPONENT_YAML, RequestFormat::Yaml, None).unwrap();
        let PlanRequest::Component(triple) = request else {
            panic!("expected a component request");
        };
        assert!(triple.prior_state.is_none());
        assert!(triple.baseline_plan.is_none());
        assert_eq!(triple.config.name, Value::Known(String::from("API")));
        assert_eq!(triple.config.watchdog.service.selected_name(), Some("manual"));
    }

    #[test]
    fn test_unknown_marker_in_baseline() {
        let yaml = r"
kind: group
config:
  name: Core
baseline_plan:
  name: Core
  description_html:
    $unknown: true
";
        let request = parse_request(yaml, RequestFormat::Yaml, None).unwrap();
        let PlanRequest::Group(triple) = request else {
            panic!("expected a group request");
        };
        let baseline = triple.baseline_plan.unwrap();
        assert!(baseline.description_html.is_unknown());
        assert!(baseline.description.is_null());
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"kind": "metric_provider", "config": {{"service": {{"builtin": {{}}}}}}}}"#
        )
        .unwrap();

        let request = load_request(file.path()).unwrap();
        assert_eq!(request.kind(), "metric_provider");
    }

    #[test]
    fn test_unknown_kind_is_a_parse_error() {
        let err =
            parse_request("kind: widget\nconfig: {}\n", RequestFormat::Yaml, None).unwrap_err();
        assert!(matches!(
            err,
            HundError::Config(ConfigError::ParseError { what: "plan request", .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_request("/nonexistent/request.yaml").unwrap_err();
        assert!(matches!(err, HundError::Config(ConfigError::FileNotFound { .. })));
    }
}
