//! Hund REST API client.
//!
//! Only the calls the apply path makes are modelled. Forms are sent as
//! already-encoded JSON and responses decoded into the wire structs of
//! [`crate::models`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use tracing::{debug, trace};

use crate::config::ProviderConfig;
use crate::error::{ApiError, Result};
use crate::models::component::ComponentResponse;
use crate::models::metric_provider::MetricProviderResponse;
use crate::models::watchdog::WatchdogResponse;

/// API version pinned by every request.
pub const HUND_VERSION: &str = "2021-09-01";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The remote calls needed to apply a plan.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HundApi: Send + Sync {
    /// Fetches a component with its watchdog expanded.
    async fn get_component(&self, id: &str) -> Result<ComponentResponse>;

    /// Updates a component, returning it with its watchdog expanded.
    async fn update_component(&self, id: &str, form: Json) -> Result<ComponentResponse>;

    /// Switches a watchdog to a different service type.
    async fn convert_watchdog(&self, id: &str, form: Json) -> Result<WatchdogResponse>;

    /// Fetches a metric provider.
    async fn get_metric_provider(&self, id: &str) -> Result<MetricProviderResponse>;

    /// Updates a metric provider.
    async fn update_metric_provider(&self, id: &str, form: Json) -> Result<MetricProviderResponse>;
}

/// HTTP implementation of [`HundApi`].
#[derive(Debug, Clone)]
pub struct HundClient {
    /// HTTP client.
    client: Client,
    /// Base URL ending in `/api/v1`.
    endpoint: String,
    /// API key.
    api_key: String,
}

impl HundClient {
    /// Creates a client for the configured domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Self::with_endpoint(config.endpoint(), &config.key)
    }

    /// Creates a client against an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_endpoint(endpoint: impl Into<String>, api_key: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert("Hund-Version", header::HeaderValue::from_static(HUND_VERSION));
        headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_static("*"));

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        form: Option<&Json>,
    ) -> Result<T> {
        let url = format!("{}{path}", self.endpoint);
        trace!("{method} {url}");

        let mut request = self
            .client
            .request(method, &url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .query(query);
        if let Some(form) = form {
            request = request.json(form);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Hund API returned a failure status");
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parsed = response
            .json::<T>()
            .await
            .map_err(|e| ApiError::invalid_response(format!("Failed to parse response: {e}")))?;
        Ok(parsed)
    }
}

const EXPAND_WATCHDOG: [(&str, &str); 1] = [("expand[]", "watchdog")];

#[async_trait]
impl HundApi for HundClient {
    async fn get_component(&self, id: &str) -> Result<ComponentResponse> {
        self.request(Method::GET, &format!("/components/{id}"), &EXPAND_WATCHDOG, None)
            .await
    }

    async fn update_component(&self, id: &str, form: Json) -> Result<ComponentResponse> {
        debug!(component = id, "Updating component");
        self.request(
            Method::PATCH,
            &format!("/components/{id}"),
            &EXPAND_WATCHDOG,
            Some(&form),
        )
        .await
    }

    async fn convert_watchdog(&self, id: &str, form: Json) -> Result<WatchdogResponse> {
        debug!(watchdog = id, "Converting watchdog service type");
        self.request(Method::PATCH, &format!("/watchdogs/{id}/convert"), &[], Some(&form))
            .await
    }

    async fn get_metric_provider(&self, id: &str) -> Result<MetricProviderResponse> {
        self.request(Method::GET, &format!("/metric_providers/{id}"), &[], None)
            .await
    }

    async fn update_metric_provider(&self, id: &str, form: Json) -> Result<MetricProviderResponse> {
        debug!(metric_provider = id, "Updating metric provider");
        self.request(
            Method::PATCH,
            &format!("/metric_providers/{id}"),
            &[],
            Some(&form),
        )
        .await
    }
}
