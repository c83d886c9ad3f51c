//! Issue templates.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::template::VariableDecl;
use crate::value::{TranslationMap, Value};

/// What an issue template can be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueTemplateKind {
    /// Applied to issues; may carry a title.
    Issue,
    /// Applied to issue updates; never carries a title.
    Update,
}

impl fmt::Display for IssueTemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Issue => "issue",
            Self::Update => "update",
        };
        write!(f, "{s}")
    }
}

/// A reusable issue template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueTemplateModel {
    /// Server id.
    pub id: Value<String>,
    /// Creation time, RFC 3339.
    pub created_at: Value<String>,
    /// Last modification time, RFC 3339.
    pub updated_at: Value<String>,
    /// Template name.
    pub name: Value<String>,
    /// Liquid title template.
    pub title: Value<String>,
    /// Liquid title template translations.
    pub title_translations: Value<TranslationMap>,
    /// Liquid body template.
    pub body: Value<String>,
    /// Liquid body template translations.
    pub body_translations: Value<TranslationMap>,
    /// What the template applies to.
    pub kind: Value<IssueTemplateKind>,
    /// Label given to the rendered issue or update.
    pub label: Value<String>,
    /// Declared variables.
    pub variables: Value<BTreeMap<String, VariableDecl>>,
}
