//! Watchdogs and their monitoring services.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::VariantError;
use crate::value::Value;
use crate::variant::{self, SlotSet, Variant};

use super::native::{DnsCheck, HttpCheck, IcmpCheck, NativeService, NATIVE_TAG, TcpCheck, UdpCheck};

/// Manually driven state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualService {
    /// Current state code.
    pub state: Value<i64>,
}

/// updown.io monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdownService {
    /// Monitor token.
    pub monitor_token: Value<String>,
    /// API key, write-only.
    pub monitor_api_key: Value<String>,
}

/// Pingdom check feeding a watchdog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingdomWatchdogService {
    /// API token, write-only.
    pub api_token: Value<String>,
    /// Pingdom check id.
    pub check_id: Value<String>,
    /// Pingdom check type.
    pub check_type: Value<String>,
    /// Whether unconfirmed downtime counts as down.
    pub unconfirmed_is_down: Value<bool>,
}

/// UptimeRobot monitor feeding a watchdog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UptimerobotWatchdogService {
    /// API key, write-only.
    pub monitor_api_key: Value<String>,
    /// Whether unconfirmed downtime counts as down.
    pub unconfirmed_is_down: Value<bool>,
}

/// Webhook pushed by the user's own tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookWatchdogService {
    /// Key embedded in the webhook URL, generated by Hund.
    pub webhook_key: Value<String>,
    /// Whether missing reports count as down.
    pub deadman: Value<bool>,
    /// Consecutive missed checks before reporting.
    pub consecutive_checks: Value<i64>,
    /// Expected reporting interval in seconds.
    pub reporting_interval: Value<i64>,
}

/// The service a watchdog monitors.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchdogService {
    /// Manually driven state.
    Manual(ManualService),
    /// updown.io.
    Updown(UpdownService),
    /// Pingdom.
    Pingdom(PingdomWatchdogService),
    /// UptimeRobot.
    Uptimerobot(UptimerobotWatchdogService),
    /// Webhook.
    Webhook(WebhookWatchdogService),
    /// Native check, itself selected by method.
    Native(NativeService),
}

impl WatchdogService {
    /// Copies write-only secrets from the planned service into this one.
    ///
    /// Hund never echoes secrets back, so a service decoded from a response
    /// would otherwise always differ from the plan.
    pub fn replace_sensitive(&mut self, planned: &Self) {
        match (self, planned) {
            (Self::Pingdom(current), Self::Pingdom(planned)) => {
                current.api_token = planned.api_token.clone();
            }
            (Self::Updown(current), Self::Updown(planned)) => {
                current.monitor_api_key = planned.monitor_api_key.clone();
            }
            (Self::Uptimerobot(current), Self::Uptimerobot(planned)) => {
                current.monitor_api_key = planned.monitor_api_key.clone();
            }
            (Self::Native(current), Self::Native(planned)) => current.replace_sensitive(planned),
            _ => {}
        }
    }
}

impl Variant for WatchdogService {
    const UNION: &'static str = "Service";

    fn slot_name(&self) -> &'static str {
        match self {
            Self::Manual(_) => "manual",
            Self::Updown(_) => "updown",
            Self::Pingdom(_) => "pingdom",
            Self::Uptimerobot(_) => "uptimerobot",
            Self::Webhook(_) => "webhook",
            Self::Native(native) => native.method(),
        }
    }

    fn decode(wire: &Json) -> Result<Self, VariantError> {
        let union = Self::UNION;
        let tag = variant::discriminator(union, "type", wire)?;

        match tag {
            "manual" => variant::decode_payload(union, tag, wire).map(Self::Manual),
            "updown" => variant::decode_payload(union, tag, wire).map(Self::Updown),
            "pingdom" => variant::decode_payload(union, tag, wire).map(Self::Pingdom),
            "uptimerobot" => variant::decode_payload(union, tag, wire).map(Self::Uptimerobot),
            "webhook" => variant::decode_payload(union, tag, wire).map(Self::Webhook),
            NATIVE_TAG => NativeService::decode(wire).map(Self::Native),
            other => Err(VariantError::UnknownDiscriminator {
                union,
                tag: other.to_owned(),
            }),
        }
    }

    fn encode(&self) -> Result<Json, VariantError> {
        let union = Self::UNION;
        let tag = [("type", self.slot_name())];
        match self {
            Self::Manual(s) => variant::tagged(union, &tag, s),
            Self::Updown(s) => variant::tagged(union, &tag, s),
            Self::Pingdom(s) => variant::tagged(union, &tag, s),
            Self::Uptimerobot(s) => variant::tagged(union, &tag, s),
            Self::Webhook(s) => variant::tagged(union, &tag, s),
            Self::Native(native) => native.encode(),
        }
    }
}

/// Document form of [`WatchdogService`]: one optional slot per variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogServiceSlots {
    /// Manual slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual: Option<ManualService>,
    /// updown.io slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updown: Option<UpdownService>,
    /// Pingdom slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pingdom: Option<PingdomWatchdogService>,
    /// UptimeRobot slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptimerobot: Option<UptimerobotWatchdogService>,
    /// Webhook slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookWatchdogService>,
    /// Native ICMP slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp: Option<IcmpCheck>,
    /// Native HTTP slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpCheck>,
    /// Native DNS slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsCheck>,
    /// Native TCP slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp: Option<TcpCheck>,
    /// Native UDP slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp: Option<UdpCheck>,
}

impl SlotSet for WatchdogServiceSlots {
    const UNION: &'static str = WatchdogService::UNION;
    type Selected = WatchdogService;

    fn slots(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("manual", self.manual.is_some()),
            ("updown", self.updown.is_some()),
            ("pingdom", self.pingdom.is_some()),
            ("uptimerobot", self.uptimerobot.is_some()),
            ("webhook", self.webhook.is_some()),
            ("icmp", self.icmp.is_some()),
            ("http", self.http.is_some()),
            ("dns", self.dns.is_some()),
            ("tcp", self.tcp.is_some()),
            ("udp", self.udp.is_some()),
        ]
    }

    fn select(&self) -> Result<WatchdogService, VariantError> {
        variant::require_single(WatchdogService::UNION, &self.slots())?;

        let selected = if let Some(s) = &self.manual {
            WatchdogService::Manual(s.clone())
        } else if let Some(s) = &self.updown {
            WatchdogService::Updown(s.clone())
        } else if let Some(s) = &self.pingdom {
            WatchdogService::Pingdom(s.clone())
        } else if let Some(s) = &self.uptimerobot {
            WatchdogService::Uptimerobot(s.clone())
        } else if let Some(s) = &self.webhook {
            WatchdogService::Webhook(s.clone())
        } else if let Some(c) = &self.icmp {
            WatchdogService::Native(NativeService::Icmp(c.clone()))
        } else if let Some(c) = &self.http {
            WatchdogService::Native(NativeService::Http(c.clone()))
        } else if let Some(c) = &self.dns {
            WatchdogService::Native(NativeService::Dns(c.clone()))
        } else if let Some(c) = &self.tcp {
            WatchdogService::Native(NativeService::Tcp(c.clone()))
        } else if let Some(c) = &self.udp {
            WatchdogService::Native(NativeService::Udp(c.clone()))
        } else {
            return Err(VariantError::NoSlotSelected {
                union: WatchdogService::UNION,
            });
        };

        Ok(selected)
    }
}

impl From<WatchdogService> for WatchdogServiceSlots {
    fn from(service: WatchdogService) -> Self {
        let mut slots = Self::default();
        match service {
            WatchdogService::Manual(s) => slots.manual = Some(s),
            WatchdogService::Updown(s) => slots.updown = Some(s),
            WatchdogService::Pingdom(s) => slots.pingdom = Some(s),
            WatchdogService::Uptimerobot(s) => slots.uptimerobot = Some(s),
            WatchdogService::Webhook(s) => slots.webhook = Some(s),
            WatchdogService::Native(NativeService::Icmp(c)) => slots.icmp = Some(c),
            WatchdogService::Native(NativeService::Http(c)) => slots.http = Some(c),
            WatchdogService::Native(NativeService::Dns(c)) => slots.dns = Some(c),
            WatchdogService::Native(NativeService::Tcp(c)) => slots.tcp = Some(c),
            WatchdogService::Native(NativeService::Udp(c)) => slots.udp = Some(c),
        }
        slots
    }
}

/// A component's watchdog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogModel {
    /// Server id.
    pub id: Value<String>,
    /// Whether the service is polled at high frequency.
    pub high_frequency: Value<bool>,
    /// Latest reported status.
    pub latest_status: Value<String>,
    /// Monitored service.
    pub service: WatchdogServiceSlots,
}

/// Wire form of a watchdog.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchdogResponse {
    /// Server id.
    pub id: String,
    /// Whether the service is polled at high frequency.
    #[serde(default)]
    pub high_frequency: bool,
    /// Latest reported status.
    #[serde(default)]
    pub latest_status: Option<String>,
    /// Monitored service, still tagged.
    pub service: Json,
}

impl WatchdogModel {
    /// Builds the plan model from a server response.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be decoded.
    pub fn from_response(response: &WatchdogResponse) -> Result<Self, VariantError> {
        let service = WatchdogService::decode(&response.service)?;
        Ok(Self {
            id: Value::Known(response.id.clone()),
            high_frequency: Value::Known(response.high_frequency),
            latest_status: response.latest_status.clone().into(),
            service: service.into(),
        })
    }
}
