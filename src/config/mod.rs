//! Configuration module.
//!
//! This module handles:
//! - Provider settings (domain and API key) from files, flags and the
//!   environment
//! - Loading plan requests from YAML or JSON files

mod parser;
mod provider;

pub use parser::{load_request, parse_request, PlanRequest, RequestFormat};
pub use provider::{load_dotenv, ProviderConfig, ProviderSettings, DOMAIN_ENV, KEY_ENV};
