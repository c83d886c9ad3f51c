//! Native checks run by Hund itself.
//!
//! A native check is the nested level of the service union: on the wire it
//! is `{"type": "native", "method": "<method>", ...}`, in documents each
//! method is its own slot next to the third-party services.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::diagnostics::{AttrPath, Diagnostics};
use crate::error::VariantError;
use crate::value::Value;
use crate::variant::{self, Variant};

/// Frequency used when a check does not set one, in milliseconds.
pub const DEFAULT_FREQUENCY_MS: i64 = 60_000;

/// Fraction of regions that must fail before the check fails, by default.
pub const DEFAULT_REGIONS_FAILED_THRESHOLD: f64 = 0.5;

/// Top-level service tag shared by every native method.
pub const NATIVE_TAG: &str = "native";

/// Accepted `ip_version` values.
pub const IP_VERSIONS: [&str; 2] = ["inet", "inet6"];

/// Accepted string containment modes.
pub const CONTAINMENT_MODES: [&str; 2] = ["exact", "regex"];

/// Fields shared by every native method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeCommon {
    /// Host, address or URL being checked.
    pub target: Value<String>,
    /// Consecutive failures before the component is degraded.
    pub consecutive_check_degraded_threshold: Value<i64>,
    /// Consecutive failures before the component is in outage.
    pub consecutive_check_outage_threshold: Value<i64>,
    /// Check frequency in milliseconds.
    pub frequency: Value<i64>,
    /// Fraction of failing regions that fails the check.
    pub percentage_regions_failed_threshold: Value<f64>,
    /// Regions the check runs from.
    pub regions: Value<Vec<String>>,
    /// Timeout in milliseconds.
    pub timeout: Value<i64>,
}

/// ICMP ping check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcmpCheck {
    /// Shared fields.
    #[serde(flatten)]
    pub common: NativeCommon,
    /// `inet` or `inet6`.
    pub ip_version: Value<String>,
    /// Fraction of failed pings that fails the check.
    pub percentage_failed_threshold: Value<f64>,
}

/// HTTP(S) request check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpCheck {
    /// Shared fields.
    #[serde(flatten)]
    pub common: NativeCommon,
    /// Extra request headers.
    pub headers: Value<BTreeMap<String, String>>,
    /// Text the response body must contain.
    pub response_body_must_contain: Value<String>,
    /// `exact` or `regex`.
    pub response_body_must_contain_mode: Value<String>,
    /// Required status code.
    pub response_code_must_be: Value<i64>,
    /// Whether TLS peers are verified.
    pub ssl_verify_peer: Value<bool>,
    /// Whether redirects are followed.
    pub follow_redirects: Value<bool>,
    /// Basic auth user.
    pub username: Value<String>,
    /// Basic auth password, never returned by the server.
    pub password: Value<String>,
}

/// DNS resolution check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsCheck {
    /// Shared fields.
    #[serde(flatten)]
    pub common: NativeCommon,
    /// Record type, e.g. `A` or `MX`.
    pub record_type: Value<String>,
    /// Nameservers to query.
    pub nameservers: Value<Vec<String>>,
    /// How `responses_must_contain` is matched.
    pub response_containment: Value<String>,
    /// Records the response must contain.
    pub responses_must_contain: Value<Vec<String>>,
}

/// TCP connection check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpCheck {
    /// Shared fields.
    #[serde(flatten)]
    pub common: NativeCommon,
    /// `inet` or `inet6`.
    pub ip_version: Value<String>,
    /// Port to connect to.
    pub port: Value<i64>,
    /// Text the response must contain.
    pub response_must_contain: Value<String>,
    /// `exact` or `regex`.
    pub response_must_contain_mode: Value<String>,
    /// Data sent after connecting.
    pub send_data: Value<String>,
    /// Whether to wait for the server to speak first.
    pub wait_for_initial_response: Value<bool>,
}

/// UDP datagram check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UdpCheck {
    /// Shared fields.
    #[serde(flatten)]
    pub common: NativeCommon,
    /// `inet` or `inet6`.
    pub ip_version: Value<String>,
    /// Port to send to.
    pub port: Value<i64>,
    /// Text the response must contain.
    pub response_must_contain: Value<String>,
    /// `exact` or `regex`.
    pub response_must_contain_mode: Value<String>,
    /// Datagram payload.
    pub send_data: Value<String>,
}

/// A native check, selected by its `method`.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeService {
    /// ICMP ping.
    Icmp(IcmpCheck),
    /// HTTP(S) request.
    Http(HttpCheck),
    /// DNS resolution.
    Dns(DnsCheck),
    /// TCP connection.
    Tcp(TcpCheck),
    /// UDP datagram.
    Udp(UdpCheck),
}

impl NativeService {
    /// Every method, in slot order.
    pub const METHODS: [&'static str; 5] = ["icmp", "http", "dns", "tcp", "udp"];

    /// Returns the `method` discriminator.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Icmp(_) => "icmp",
            Self::Http(_) => "http",
            Self::Dns(_) => "dns",
            Self::Tcp(_) => "tcp",
            Self::Udp(_) => "udp",
        }
    }

    /// Returns the fields shared by every method.
    #[must_use]
    pub const fn common(&self) -> &NativeCommon {
        match self {
            Self::Icmp(c) => &c.common,
            Self::Http(c) => &c.common,
            Self::Dns(c) => &c.common,
            Self::Tcp(c) => &c.common,
            Self::Udp(c) => &c.common,
        }
    }

    /// Returns the check frequency, if it is settled.
    ///
    /// An unset frequency means the server default; an unknown one is
    /// reported as `None`.
    #[must_use]
    pub fn frequency(&self) -> Option<i64> {
        match &self.common().frequency {
            Value::Known(ms) => Some(*ms),
            Value::Null => Some(DEFAULT_FREQUENCY_MS),
            Value::Unknown => None,
        }
    }

    /// Copies write-only fields from the planned check.
    pub fn replace_sensitive(&mut self, planned: &Self) {
        if let (Self::Http(current), Self::Http(planned)) = (self, planned) {
            current.password = planned.password.clone();
        }
    }

    /// Validates enumerated string fields.
    #[must_use]
    pub fn validate(&self, path: &AttrPath) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let path = path.at_name(self.method());

        match self {
            Self::Icmp(c) => check_ip_version(&mut diags, &path, &c.ip_version),
            Self::Http(c) => check_containment_mode(
                &mut diags,
                &path.at_name("response_body_must_contain_mode"),
                &c.response_body_must_contain_mode,
            ),
            Self::Dns(_) => {}
            Self::Tcp(c) => {
                check_ip_version(&mut diags, &path, &c.ip_version);
                check_containment_mode(
                    &mut diags,
                    &path.at_name("response_must_contain_mode"),
                    &c.response_must_contain_mode,
                );
            }
            Self::Udp(c) => {
                check_ip_version(&mut diags, &path, &c.ip_version);
                check_containment_mode(
                    &mut diags,
                    &path.at_name("response_must_contain_mode"),
                    &c.response_must_contain_mode,
                );
            }
        }

        diags
    }
}

impl Variant for NativeService {
    const UNION: &'static str = "Native Service";

    fn slot_name(&self) -> &'static str {
        self.method()
    }

    fn decode(wire: &Json) -> Result<Self, VariantError> {
        let union = Self::UNION;
        let method = variant::discriminator(union, "method", wire)?;

        match method {
            "icmp" => variant::decode_payload(union, method, wire).map(Self::Icmp),
            "http" => variant::decode_payload(union, method, wire).map(Self::Http),
            "dns" => variant::decode_payload(union, method, wire).map(Self::Dns),
            "tcp" => variant::decode_payload(union, method, wire).map(Self::Tcp),
            "udp" => variant::decode_payload(union, method, wire).map(Self::Udp),
            other => Err(VariantError::UnknownDiscriminator {
                union,
                tag: other.to_owned(),
            }),
        }
    }

    fn encode(&self) -> Result<Json, VariantError> {
        let tags = [("type", NATIVE_TAG), ("method", self.method())];
        match self {
            Self::Icmp(c) => variant::tagged(Self::UNION, &tags, c),
            Self::Http(c) => variant::tagged(Self::UNION, &tags, c),
            Self::Dns(c) => variant::tagged(Self::UNION, &tags, c),
            Self::Tcp(c) => variant::tagged(Self::UNION, &tags, c),
            Self::Udp(c) => variant::tagged(Self::UNION, &tags, c),
        }
    }
}

fn check_ip_version(diags: &mut Diagnostics, path: &AttrPath, value: &Value<String>) {
    if let Some(version) = value.as_known() {
        if !IP_VERSIONS.contains(&version.as_str()) {
            diags.add_attribute_error(
                path.at_name("ip_version"),
                "Invalid IP version",
                format!("Expected one of `inet` or `inet6`, got `{version}`"),
            );
        }
    }
}

fn check_containment_mode(diags: &mut Diagnostics, path: &AttrPath, value: &Value<String>) {
    if let Some(mode) = value.as_known() {
        if !CONTAINMENT_MODES.contains(&mode.as_str()) {
            diags.add_attribute_error(
                path.clone(),
                "Invalid string containment mode",
                format!("Expected one of `exact` or `regex`, got `{mode}`"),
            );
        }
    }
}
