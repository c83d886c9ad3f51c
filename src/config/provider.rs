//! Provider configuration: where the Hund API lives and how to authenticate.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ConfigError, HundError, Result};

/// Environment variable supplying the domain.
pub const DOMAIN_ENV: &str = "HUND_DOMAIN";

/// Environment variable supplying the API key.
pub const KEY_ENV: &str = "HUND_KEY";

/// Domain suffix served by a local development server.
const LOCAL_SUFFIX: &str = ".localhost";

/// Settings as written in a provider file or passed on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSettings {
    /// Status page domain, e.g. `status.example.com`.
    pub domain: Option<String>,
    /// API key.
    pub key: Option<String>,
}

impl ProviderSettings {
    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading provider settings from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            what: "provider settings",
            message: format!("Failed to read file: {e}"),
            location: Some(path.display().to_string()),
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            HundError::from(ConfigError::ParseError {
                what: "provider settings",
                message: format!("YAML parse error: {e}"),
                location: Some(path.display().to_string()),
            })
        })
    }

    /// Fills unset values from the environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_fallback(|name| std::env::var(name).ok())
    }

    /// Fills unset values from `lookup`. Explicit values always win.
    #[must_use]
    pub fn with_fallback(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.domain.is_none() {
            debug!("Reading domain from {DOMAIN_ENV}");
            self.domain = lookup(DOMAIN_ENV);
        }
        if self.key.is_none() {
            debug!("Reading key from {KEY_ENV}");
            self.key = lookup(KEY_ENV);
        }
        self
    }

    /// Checks that both values are present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDomain`] or [`ConfigError::MissingKey`].
    pub fn resolve(self) -> Result<ProviderConfig> {
        let domain = self
            .domain
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty())
            .ok_or(ConfigError::MissingDomain)?;
        let key = self
            .key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingKey)?;

        Ok(ProviderConfig { domain, key })
    }
}

/// Validated provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Status page domain.
    pub domain: String,
    /// API key.
    pub key: String,
}

impl ProviderConfig {
    /// Base URL of the v1 API.
    #[must_use]
    pub fn endpoint(&self) -> String {
        if self.domain.ends_with(LOCAL_SUFFIX) {
            format!("http://{}:3000/api/v1", self.domain)
        } else {
            format!("https://{}/api/v1", self.domain)
        }
    }
}

/// Loads the `.env` file in `dir` if there is one.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be loaded.
pub fn load_dotenv(dir: Option<&Path>) -> Result<()> {
    let env_path = dir.map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

    if env_path.exists() {
        info!("Loading environment from: {}", env_path.display());
        dotenvy::from_path(&env_path).map_err(|e| ConfigError::ParseError {
            what: ".env file",
            message: e.to_string(),
            location: Some(env_path.display().to_string()),
        })?;
    } else {
        debug!(".env file not found at: {}", env_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings(domain: Option<&str>, key: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            domain: domain.map(String::from),
            key: key.map(String::from),
        }
    }

    #[test]
    fn test_endpoint() {
        let config = settings(Some("status.example.com"), Some("k")).resolve().unwrap();
        assert_eq!(config.endpoint(), "https://status.example.com/api/v1");

        let local = settings(Some("acme.hund.localhost"), Some("k")).resolve().unwrap();
        assert_eq!(local.endpoint(), "http://acme.hund.localhost:3000/api/v1");
    }

    #[test]
    fn test_explicit_values_win_over_environment() {
        let env = |name: &str| match name {
            DOMAIN_ENV => Some(String::from("env.example.com")),
            KEY_ENV => Some(String::from("env-key")),
            _ => None,
        };

        let config = settings(Some("file.example.com"), None)
            .with_fallback(env)
            .resolve()
            .unwrap();
        assert_eq!(config.domain, "file.example.com");
        assert_eq!(config.key, "env-key");
    }

    #[test]
    fn test_missing_or_empty_values() {
        let err = settings(Some("  "), Some("k")).resolve().unwrap_err();
        assert!(matches!(err, HundError::Config(ConfigError::MissingDomain)));

        let err = settings(Some("status.example.com"), Some("")).resolve().unwrap_err();
        assert!(matches!(err, HundError::Config(ConfigError::MissingKey)));

        let err = settings(None, None).with_fallback(|_| None).resolve().unwrap_err();
        assert!(matches!(err, HundError::Config(ConfigError::MissingDomain)));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "domain: status.example.com\nkey: secret").unwrap();

        let loaded = ProviderSettings::load_file(file.path()).unwrap();
        assert_eq!(loaded.domain.as_deref(), Some("status.example.com"));
        assert_eq!(loaded.key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_load_file_rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "domain: status.example.com\ntoken: secret").unwrap();

        let err = ProviderSettings::load_file(file.path()).unwrap_err();
        assert!(matches!(err, HundError::Config(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_missing_file() {
        let err = ProviderSettings::load_file("/nonexistent/hund.yaml").unwrap_err();
        assert!(matches!(err, HundError::Config(ConfigError::FileNotFound { .. })));
    }
}
