//! Issue updates.

use serde::{Deserialize, Serialize};

use crate::models::template::TemplateApplicationModel;
use crate::value::{TranslationMap, Value};

/// Label of an update that resolves its issue.
pub const RESOLVED_LABEL: &str = "resolved";

/// An update posted to an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueUpdateModel {
    /// Server id.
    pub id: Value<String>,
    /// Parent issue id.
    pub issue_id: Value<String>,
    /// Creation time, RFC 3339.
    pub created_at: Value<String>,
    /// Last modification time, RFC 3339.
    pub updated_at: Value<String>,
    /// Whether `effective_after` has passed.
    pub effective: Value<bool>,
    /// Whether the update reopens a resolved issue.
    pub reopening: Value<bool>,
    /// Time the update takes effect, RFC 3339.
    pub effective_after: Value<String>,
    /// Markdown body.
    pub body: Value<String>,
    /// Markdown body translations.
    pub body_translations: Value<TranslationMap>,
    /// Rendered body.
    pub body_html: Value<String>,
    /// Rendered body translations.
    pub body_html_translations: Value<TranslationMap>,
    /// Update label, e.g. `resolved`.
    pub label: Value<String>,
    /// Component state override.
    pub state_override: Value<i64>,
    /// Template the body is rendered from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateApplicationModel>,
    /// Archive the update instead of forgetting it on destroy.
    pub archive_on_destroy: Value<bool>,
}

impl IssueUpdateModel {
    /// An update whose every server-computed field is unknown.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            id: Value::Unknown,
            issue_id: Value::Unknown,
            created_at: Value::Unknown,
            updated_at: Value::Unknown,
            effective: Value::Unknown,
            reopening: Value::Unknown,
            effective_after: Value::Unknown,
            body: Value::Unknown,
            body_translations: Value::Unknown,
            body_html: Value::Unknown,
            body_html_translations: Value::Unknown,
            label: Value::Unknown,
            state_override: Value::Unknown,
            template: None,
            archive_on_destroy: Value::Null,
        }
    }

    /// Whether the update changes the standing or resolved state of its
    /// issue, which prevents deleting it on its own.
    #[must_use]
    pub fn affects_standing(&self) -> bool {
        self.reopening == Value::Known(true)
            || self.label.as_known().is_some_and(|l| l == RESOLVED_LABEL)
    }
}
