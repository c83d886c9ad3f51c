//! Error types for the Hund reconciliation engine.
//!
//! This module provides the error hierarchy for every stage of a resource's
//! lifecycle: configuration, wire conversion, polymorphic service objects,
//! issue templates, the remote API and planning.

use std::path::PathBuf;
use thiserror::Error;

use crate::diagnostics::{AttrPath, Diagnostic};

/// The main error type for the Hund reconciliation engine.
#[derive(Debug, Error)]
pub enum HundError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Translation map or timestamp conversion errors.
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Polymorphic object errors.
    #[error("Variant error: {0}")]
    Variant(#[from] VariantError),

    /// Issue template application errors.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Hund API errors.
    #[error("Hund API error: {0}")]
    Api(#[from] ApiError),

    /// Planning errors.
    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file was not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A file could not be parsed.
    #[error("Failed to parse {what}: {message}")]
    ParseError {
        /// What was being parsed.
        what: &'static str,
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// The API domain is missing.
    #[error("Missing Hund API Domain: set `domain` or the HUND_DOMAIN environment variable")]
    MissingDomain,

    /// The API key is missing.
    #[error("Missing Hund API Key: set `key` or the HUND_KEY environment variable")]
    MissingKey,

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Translation map and timestamp conversion errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The map has no entry for its default language.
    #[error("translation map lacks its default key{}", quoted_pointer(pointer.as_deref()))]
    MissingDefaultKey {
        /// The language named by the `original` entry, if there was one.
        pointer: Option<String>,
    },

    /// A map element is not a known string.
    #[error("i18n key {key:?} has non-string type")]
    NonStringElement {
        /// Offending key.
        key: String,
    },

    /// The server omitted the `original` field.
    #[error("The `original` field was missing")]
    MissingOriginalField,

    /// The server sent a plain string where a translation map was expected.
    #[error("expected a translation map, got a plain string")]
    NotAMap,

    /// A timestamp could not be parsed.
    #[error("invalid timestamp {value:?}: {message}")]
    InvalidTimestamp {
        /// The rejected value.
        value: String,
        /// Parser message.
        message: String,
    },
}

/// Errors raised while resolving a polymorphic object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    /// No parser is registered for the discriminator value.
    #[error("Got an unknown {union} type: {tag}")]
    UnknownDiscriminator {
        /// Name of the union.
        union: &'static str,
        /// The unrecognised tag.
        tag: String,
    },

    /// The payload carries no discriminator.
    #[error("{union} payload has no `{key}` discriminator")]
    MissingDiscriminator {
        /// Name of the union.
        union: &'static str,
        /// Discriminator field name.
        key: &'static str,
    },

    /// No slot is set.
    #[error("no {union} slot is set")]
    NoSlotSelected {
        /// Name of the union.
        union: &'static str,
    },

    /// More than one slot is set.
    #[error("more than one {union} slot is set: {}", slots.join(", "))]
    TooManySlots {
        /// Name of the union.
        union: &'static str,
        /// Names of the non-null slots.
        slots: Vec<&'static str>,
    },

    /// The payload for a recognised tag is malformed.
    #[error("Got error decoding {union} object as {tag}: {message}")]
    Decode {
        /// Name of the union.
        union: &'static str,
        /// Tag being decoded.
        tag: String,
        /// Underlying message.
        message: String,
    },

    /// The selected payload could not be encoded.
    #[error("Got error encoding {union}: {message}")]
    Encode {
        /// Name of the union.
        union: &'static str,
        /// Underlying message.
        message: String,
    },
}

fn quoted_pointer(pointer: Option<&str>) -> String {
    pointer.map(|p| format!(" `{p}`")).unwrap_or_default()
}

/// Issue template application errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The supplied slot does not match the declared variable type.
    #[error("Variable `{variable}`: declared as {declared}, got {supplied}")]
    TypeMismatch {
        /// Variable name.
        variable: String,
        /// Type declared by the template schema.
        declared: String,
        /// Slot the value was supplied in.
        supplied: String,
    },

    /// The variable has no schema entry.
    #[error("Variable `{variable}`: missing schema")]
    MissingSchema {
        /// Variable name.
        variable: String,
    },

    /// The schema declares a type this engine does not understand.
    #[error("Variable `{variable}`: unsupported variable schema type: {declared}")]
    UnsupportedType {
        /// Variable name.
        variable: String,
        /// The declared type.
        declared: String,
    },

    /// A wire value does not decode as the declared type.
    #[error("Variable `{variable}`: failed to parse variable as {declared}")]
    Decode {
        /// Variable name.
        variable: String,
        /// The declared type.
        declared: String,
    },
    /// A configured value cannot be sent to Hund.
    #[error("Variable `{variable}`: {message}")]
    InvalidValue {
        /// Variable name.
        variable: String,
        /// Why the value is rejected.
        message: String,
    },
}

/// Hund API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response not read.
    #[error("Network error communicating with Hund: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("Received a non-200 status code: {status}\nError: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("Invalid response from Hund API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Planning errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The plan carries error diagnostics and cannot be applied.
    #[error("Plan has {count} error diagnostic(s) and cannot be applied")]
    Blocked {
        /// Number of error diagnostics.
        count: usize,
    },

    /// The requested transition cannot be performed in place.
    #[error("{owner} service change from {from} to {to} requires replacement")]
    RequiresReplacement {
        /// Owning resource kind.
        owner: &'static str,
        /// Prior service tag.
        from: &'static str,
        /// Planned service tag.
        to: &'static str,
    },

    /// The plan changes attributes that cannot be updated in place.
    #[error("Changing {attributes} of a {kind} requires replacement")]
    ReplacementRequired {
        /// Resource kind.
        kind: &'static str,
        /// Attributes forcing the replacement.
        attributes: String,
    },

    /// A required input is missing from the request.
    #[error("Plan request is missing {what}")]
    MissingInput {
        /// Description of the missing input.
        what: &'static str,
    },

    /// Applying this resource kind is not supported.
    #[error("Applying {kind} resources is not supported")]
    UnsupportedApply {
        /// Resource kind.
        kind: &'static str,
    },
}

/// Result type alias for Hund operations.
pub type Result<T> = std::result::Result<T, HundError>;

impl HundError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Converts the error into a plan diagnostic.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        let summary = match self {
            Self::Config(_) => "Invalid provider configuration",
            Self::Conversion(_) => "I18nString conversion error",
            Self::Variant(VariantError::UnknownDiscriminator { .. }) => "Service decoding error",
            Self::Variant(_) => "Service conversion error",
            Self::Template(_) => "Could not parse IssueTemplate Variable Application",
            Self::Api(ApiError::UnexpectedStatus { .. }) => "Failed response code from Hund API",
            Self::Api(_) => "Hund API request failed",
            Self::Plan(_) => "Plan cannot be applied",
            Self::Io(_) | Self::Internal(_) => "Internal error",
        };

        let detail = match self {
            Self::Config(e) => e.to_string(),
            Self::Conversion(e) => e.to_string(),
            Self::Variant(e) => e.to_string(),
            Self::Template(e) => e.to_string(),
            Self::Api(e) => e.to_string(),
            Self::Plan(e) => e.to_string(),
            Self::Io(e) => e.to_string(),
            Self::Internal(e) => e.clone(),
        };

        Diagnostic::error(summary, detail)
    }

    /// Converts the error into a plan diagnostic at an attribute path.
    #[must_use]
    pub fn to_diagnostic_at(&self, path: AttrPath) -> Diagnostic {
        self.to_diagnostic().at(path)
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl ApiError {
    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_detail_keeps_body() {
        let err = HundError::from(ApiError::UnexpectedStatus {
            status: 422,
            body: String::from("{\"error\":\"bad\"}"),
        });
        let diag = err.to_diagnostic();
        assert_eq!(diag.summary, "Failed response code from Hund API");
        assert!(diag.detail.contains("422"));
        assert!(diag.detail.contains("{\"error\":\"bad\"}"));
    }

    #[test]
    fn test_missing_default_key_message() {
        let err = ConversionError::MissingDefaultKey {
            pointer: Some(String::from("de")),
        };
        assert_eq!(err.to_string(), "translation map lacks its default key `de`");
        assert_eq!(
            ConversionError::MissingDefaultKey { pointer: None }.to_string(),
            "translation map lacks its default key"
        );
    }

    #[test]
    fn test_unknown_discriminator_summary() {
        let err = HundError::from(VariantError::UnknownDiscriminator {
            union: "Service",
            tag: String::from("carrier-pigeon"),
        });
        let diag = err.to_diagnostic_at(AttrPath::root("service"));
        assert_eq!(diag.summary, "Service decoding error");
        assert_eq!(diag.detail, "Got an unknown Service type: carrier-pigeon");
        assert_eq!(diag.path, Some(AttrPath::root("service")));
    }
}
