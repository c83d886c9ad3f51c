//! Component groups.

use serde::{Deserialize, Serialize};

use crate::value::{TranslationMap, Value};

/// A group of components on the status page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupModel {
    /// Server id.
    pub id: Value<String>,
    /// Creation time, RFC 3339.
    pub created_at: Value<String>,
    /// Last modification time, RFC 3339.
    pub updated_at: Value<String>,
    /// Display name.
    pub name: Value<String>,
    /// Display name translations.
    pub name_translations: Value<TranslationMap>,
    /// Markdown description.
    pub description: Value<String>,
    /// Markdown description translations.
    pub description_translations: Value<TranslationMap>,
    /// Rendered description.
    pub description_html: Value<String>,
    /// Rendered description translations.
    pub description_html_translations: Value<TranslationMap>,
    /// Whether the group starts collapsed.
    pub collapsed: Value<bool>,
    /// Position on the status page.
    pub position: Value<i64>,
    /// Member component ids, in display order.
    pub components: Value<Vec<String>>,
}
