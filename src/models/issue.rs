//! Issues and their schedules.

use serde::{Deserialize, Serialize};

use crate::models::issue_update::IssueUpdateModel;
use crate::models::template::TemplateApplicationModel;
use crate::value::{TranslationMap, Value};

/// Schedule of a planned maintenance issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleModel {
    /// Server id.
    pub id: Value<String>,
    /// Whether the maintenance window has started.
    pub started: Value<bool>,
    /// Whether the maintenance window has ended.
    pub ended: Value<bool>,
    /// Whether subscribers have been notified.
    pub notified: Value<bool>,
    /// Window start, RFC 3339.
    pub starts_at: Value<String>,
    /// Window end, RFC 3339.
    pub ends_at: Value<String>,
    /// Time subscribers are notified, RFC 3339.
    pub notify_subscribers_at: Value<String>,
}

/// An incident or maintenance issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueModel {
    /// Server id.
    pub id: Value<String>,
    /// Creation time, RFC 3339.
    pub created_at: Value<String>,
    /// Last modification time, RFC 3339.
    pub updated_at: Value<String>,
    /// Time the issue began, RFC 3339.
    pub began_at: Value<String>,
    /// Time the issue ended, RFC 3339.
    pub ended_at: Value<String>,
    /// Time the issue was cancelled, RFC 3339.
    pub cancelled_at: Value<String>,
    /// Title.
    pub title: Value<String>,
    /// Title translations.
    pub title_translations: Value<TranslationMap>,
    /// Markdown body.
    pub body: Value<String>,
    /// Markdown body translations.
    pub body_translations: Value<TranslationMap>,
    /// Rendered body.
    pub body_html: Value<String>,
    /// Rendered body translations.
    pub body_html_translations: Value<TranslationMap>,
    /// Issue label.
    pub label: Value<String>,
    /// Affected component ids.
    pub component_ids: Value<Vec<String>>,
    /// Updates posted to the issue.
    pub updates: Value<Vec<IssueUpdateModel>>,
    /// Maintenance schedule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleModel>,
    /// Duration in seconds.
    pub duration: Value<i64>,
    /// Social preview image.
    pub open_graph_image_url: Value<String>,
    /// Priority.
    pub priority: Value<i64>,
    /// Whether the issue is resolved.
    pub resolved: Value<bool>,
    /// Whether the issue was recorded after the fact.
    pub retrospective: Value<bool>,
    /// Whether the issue is scheduled maintenance.
    pub scheduled: Value<bool>,
    /// Server-assigned kind of issue.
    pub specialization: Value<String>,
    /// Whether the issue is ongoing.
    pub standing: Value<bool>,
    /// Component state override.
    pub state_override: Value<i64>,
    /// Template the title and body are rendered from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateApplicationModel>,
    /// Archive the issue instead of forgetting it on destroy.
    pub archive_on_destroy: Value<bool>,
}

impl IssueModel {
    /// Updates the issue is expected to carry after apply.
    ///
    /// An issue created with an end time gets one resolving update effective
    /// at that time; otherwise there are none yet.
    #[must_use]
    pub fn expected_updates(&self) -> Vec<IssueUpdateModel> {
        match &self.ended_at {
            Value::Known(ended_at) => vec![IssueUpdateModel {
                effective_after: Value::Known(ended_at.clone()),
                ..IssueUpdateModel::unknown()
            }],
            Value::Null | Value::Unknown => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_updates() {
        let mut issue = IssueModel::default();
        assert!(issue.expected_updates().is_empty());

        issue.ended_at = Value::Unknown;
        assert!(issue.expected_updates().is_empty());

        issue.ended_at = Value::Known(String::from("2024-01-01T00:00:00Z"));
        let updates = issue.expected_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].effective_after, issue.ended_at);
        assert!(updates[0].id.is_unknown());
    }
}
