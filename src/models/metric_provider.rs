//! Metric providers and their services.
//!
//! A metric provider feeds graphs attached to a watchdog. Its service uses
//! the same tagging as a watchdog service but a slightly different set of
//! variants, and unlike a watchdog it has no endpoint for switching
//! service type in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::api::i18n::{self, I18nString};
use crate::error::{HundError, VariantError};
use crate::models::{put_i18n, put_known};
use crate::value::{TranslationMap, Value};
use crate::variant::{self, SlotSet, Variant};

use super::native::{DnsCheck, HttpCheck, IcmpCheck, NativeService, NATIVE_TAG, TcpCheck, UdpCheck};
use super::watchdog::UpdownService;

/// Built-in uptime metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinService {}

/// Pingdom check feeding metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingdomMetricService {
    /// API token, write-only.
    pub api_token: Value<String>,
    /// Pingdom check id.
    pub check_id: Value<String>,
    /// Pingdom check type.
    pub check_type: Value<String>,
}

/// UptimeRobot monitor feeding metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UptimerobotMetricService {
    /// API key, write-only.
    pub monitor_api_key: Value<String>,
}

/// Webhook feeding metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookMetricService {
    /// Key embedded in the webhook URL, generated by Hund.
    pub webhook_key: Value<String>,
}

/// The service a metric provider reads from.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricProviderService {
    /// Built-in metrics.
    Builtin(BuiltinService),
    /// updown.io.
    Updown(UpdownService),
    /// Pingdom.
    Pingdom(PingdomMetricService),
    /// UptimeRobot.
    Uptimerobot(UptimerobotMetricService),
    /// Webhook.
    Webhook(WebhookMetricService),
    /// Native check.
    Native(NativeService),
}

impl MetricProviderService {
    /// Metric definition slugs provided by default for this service.
    #[must_use]
    pub fn default_instances(&self) -> &'static [&'static str] {
        default_instances(self.slot_name()).unwrap_or(&[])
    }

    /// Copies write-only secrets from the planned service into this one.
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

/// Default metric definition slugs for a service slot, or `None` for an
/// unrecognised slot.
#[must_use]
pub fn default_instances(slot: &str) -> Option<&'static [&'static str]> {
    let instances: &'static [&'static str] = match slot {
        "builtin" => &["percent_uptime", "incidents_reported"],
        "updown" => &["apdex"],
        "pingdom" | "uptimerobot" => &["res"],
        "webhook" | "dns" => &[],
        "icmp" => &["res", "icmp.total_addresses", "icmp.passed_addresses"],
        "http" => &[
            "http.redirect_time",
            "http.name_lookup_time",
            "http.tcp_connection_time",
            "http.tls_handshake_time",
            "http.content_generation_time",
            "http.content_transfer_time",
            "http.total_time",
            "http.time_to_first_byte",
        ],
        "tcp" => &[
            "res",
            "tcp.connection_time",
            "tcp.initial_response_time",
            "tcp.initial_response_transfer_time",
            "tcp.data_send_transfer_time",
            "tcp.data_send_response_time",
            "tcp.data_send_response_transfer_time",
            "tcp.disconnection_time",
            "tcp.total_time",
        ],
        "udp" => &["udp.response_time", "udp.response_transfer_time", "udp.total_time"],
        _ => return None,
    };
    Some(instances)
}

impl Variant for MetricProviderService {
    const UNION: &'static str = "MetricProvider Service";

    fn slot_name(&self) -> &'static str {
        match self {
            Self::Builtin(_) => "builtin",
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
            "builtin" => Ok(Self::Builtin(BuiltinService {})),
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
            Self::Builtin(s) => variant::tagged(union, &tag, s),
            Self::Updown(s) => variant::tagged(union, &tag, s),
            Self::Pingdom(s) => variant::tagged(union, &tag, s),
            Self::Uptimerobot(s) => variant::tagged(union, &tag, s),
            Self::Webhook(s) => variant::tagged(union, &tag, s),
            Self::Native(native) => native.encode(),
        }
    }
}

/// Document form of [`MetricProviderService`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricProviderServiceSlots {
    /// Built-in slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builtin: Option<BuiltinService>,
    /// updown.io slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updown: Option<UpdownService>,
    /// Pingdom slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pingdom: Option<PingdomMetricService>,
    /// UptimeRobot slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptimerobot: Option<UptimerobotMetricService>,
    /// Webhook slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookMetricService>,
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

impl SlotSet for MetricProviderServiceSlots {
    const UNION: &'static str = MetricProviderService::UNION;
    type Selected = MetricProviderService;

    fn slots(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("builtin", self.builtin.is_some()),
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

    fn select(&self) -> Result<MetricProviderService, VariantError> {
        use MetricProviderService as S;

        variant::require_single(S::UNION, &self.slots())?;

        let selected = match self {
            Self { builtin: Some(s), .. } => S::Builtin(s.clone()),
            Self { updown: Some(s), .. } => S::Updown(s.clone()),
            Self { pingdom: Some(s), .. } => S::Pingdom(s.clone()),
            Self { uptimerobot: Some(s), .. } => S::Uptimerobot(s.clone()),
            Self { webhook: Some(s), .. } => S::Webhook(s.clone()),
            Self { icmp: Some(c), .. } => S::Native(NativeService::Icmp(c.clone())),
            Self { http: Some(c), .. } => S::Native(NativeService::Http(c.clone())),
            Self { dns: Some(c), .. } => S::Native(NativeService::Dns(c.clone())),
            Self { tcp: Some(c), .. } => S::Native(NativeService::Tcp(c.clone())),
            Self { udp: Some(c), .. } => S::Native(NativeService::Udp(c.clone())),
            _ => return Err(VariantError::NoSlotSelected { union: S::UNION }),
        };

        Ok(selected)
    }
}

impl From<MetricProviderService> for MetricProviderServiceSlots {
    fn from(service: MetricProviderService) -> Self {
        let mut slots = Self::default();
        match service {
            MetricProviderService::Builtin(s) => slots.builtin = Some(s),
            MetricProviderService::Updown(s) => slots.updown = Some(s),
            MetricProviderService::Pingdom(s) => slots.pingdom = Some(s),
            MetricProviderService::Uptimerobot(s) => slots.uptimerobot = Some(s),
            MetricProviderService::Webhook(s) => slots.webhook = Some(s),
            MetricProviderService::Native(NativeService::Icmp(c)) => slots.icmp = Some(c),
            MetricProviderService::Native(NativeService::Http(c)) => slots.http = Some(c),
            MetricProviderService::Native(NativeService::Dns(c)) => slots.dns = Some(c),
            MetricProviderService::Native(NativeService::Tcp(c)) => slots.tcp = Some(c),
            MetricProviderService::Native(NativeService::Udp(c)) => slots.udp = Some(c),
        }
        slots
    }
}

/// One metric provided by a metric provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricInstanceModel {
    /// Server id.
    pub id: Value<String>,
    /// Instance slug.
    pub slug: Value<String>,
    /// Metric definition the instance derives from.
    pub definition_slug: Value<String>,
    /// Whether the metric is shown.
    pub enabled: Value<bool>,
    /// Whether the metric is shown on the component's top level.
    pub top_level_enabled: Value<bool>,
    /// Graph title.
    pub title: Value<String>,
    /// Graph title translations.
    pub title_translations: Value<TranslationMap>,
    /// X axis title.
    pub x_title: Value<String>,
    /// Y axis title.
    pub y_title: Value<String>,
    /// Y axis upper bound.
    pub y_supremum: Value<f64>,
    /// Plot type.
    pub plot_type: Value<String>,
    /// Aggregation method.
    pub aggregation: Value<String>,
}

impl MetricInstanceModel {
    /// An instance whose every field is left to the server.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            id: Value::Unknown,
            slug: Value::Unknown,
            definition_slug: Value::Unknown,
            enabled: Value::Unknown,
            top_level_enabled: Value::Unknown,
            title: Value::Unknown,
            title_translations: Value::Unknown,
            x_title: Value::Unknown,
            y_title: Value::Unknown,
            y_supremum: Value::Unknown,
            plot_type: Value::Unknown,
            aggregation: Value::Unknown,
        }
    }
}

/// A metric provider resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricProviderModel {
    /// Server id.
    pub id: Value<String>,
    /// Owning watchdog id.
    pub watchdog: Value<String>,
    /// Whether this is the watchdog's default metric provider.
    pub default: Value<bool>,
    /// Provided metrics keyed by slug.
    pub instances: Value<BTreeMap<String, MetricInstanceModel>>,
    /// Metric source.
    pub service: MetricProviderServiceSlots,
}

impl MetricInstanceModel {
    /// Builds the embedded instance form for a metric provider update.
    ///
    /// Instances without a server id are created, the rest updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the title translations are malformed.
    pub fn to_form(&self, definition_slug: &str) -> Result<Json, HundError> {
        let mut form = Map::new();
        put_known(&mut form, "id", &self.id)?;
        form.insert(
            String::from("definition_slug"),
            Json::String(definition_slug.to_owned()),
        );
        put_known(&mut form, "enabled", &self.enabled)?;
        put_known(&mut form, "top_level_enabled", &self.top_level_enabled)?;
        put_i18n(&mut form, "title", &self.title, &self.title_translations, false)?;
        put_known(&mut form, "x_title", &self.x_title)?;
        put_known(&mut form, "y_title", &self.y_title)?;
        put_known(&mut form, "y_supremum", &self.y_supremum)?;
        put_known(&mut form, "plot_type", &self.plot_type)?;
        put_known(&mut form, "aggregation", &self.aggregation)?;
        Ok(Json::Object(form))
    }

    /// Builds the form deleting the instance of `definition_slug`.
    #[must_use]
    pub fn deletion_form(definition_slug: &str) -> Json {
        serde_json::json!({"definition_slug": definition_slug, "deleted": true})
    }

    fn from_response(response: &MetricInstanceResponse) -> Result<Self, HundError> {
        let (title, title_translations) = i18n::values_from_wire(response.title.as_ref())?;
        let (x_title, _) = i18n::values_from_wire(response.x_title.as_ref())?;
        let (y_title, _) = i18n::values_from_wire(response.y_title.as_ref())?;

        Ok(Self {
            id: Value::Known(response.id.clone()),
            slug: Value::Known(response.slug.clone()),
            definition_slug: Value::Known(response.definition_slug.clone()),
            enabled: Value::Known(response.enabled),
            top_level_enabled: Value::Known(response.top_level_enabled),
            title,
            title_translations,
            x_title,
            y_title,
            y_supremum: response.y_supremum.into(),
            plot_type: response.plot_type.clone().into(),
            aggregation: response.aggregation.clone().into(),
        })
    }
}

/// Wire form of a metric instance.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricInstanceResponse {
    /// Server id.
    pub id: String,
    /// Instance slug.
    pub slug: String,
    /// Metric definition slug.
    pub definition_slug: String,
    /// Whether the metric is shown.
    #[serde(default)]
    pub enabled: bool,
    /// Whether the metric is shown on the component's top level.
    #[serde(default)]
    pub top_level_enabled: bool,
    /// Graph title.
    #[serde(default)]
    pub title: Option<I18nString>,
    /// X axis title.
    #[serde(default)]
    pub x_title: Option<I18nString>,
    /// Y axis title.
    #[serde(default)]
    pub y_title: Option<I18nString>,
    /// Y axis upper bound.
    #[serde(default)]
    pub y_supremum: Option<f64>,
    /// Plot type.
    #[serde(default)]
    pub plot_type: Option<String>,
    /// Aggregation method.
    #[serde(default)]
    pub aggregation: Option<String>,
}

/// Wire form of a metric provider.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricProviderResponse {
    /// Server id.
    pub id: String,
    /// Owning watchdog id.
    pub watchdog: String,
    /// Whether this is the watchdog's default metric provider.
    #[serde(default)]
    pub default: bool,
    /// Provided metrics.
    #[serde(default)]
    pub instances: Vec<MetricInstanceResponse>,
    /// Metric source, still tagged.
    pub service: Json,
}

impl MetricProviderModel {
    /// Builds the state model from a server response.
    ///
    /// # Errors
    ///
    /// Returns an error if the service or an instance cannot be decoded.
    pub fn from_response(response: &MetricProviderResponse) -> Result<Self, HundError> {
        let service = MetricProviderService::decode(&response.service)?;

        let mut instances = BTreeMap::new();
        for instance in &response.instances {
            instances.insert(
                instance.definition_slug.clone(),
                MetricInstanceModel::from_response(instance)?,
            );
        }

        Ok(Self {
            id: Value::Known(response.id.clone()),
            watchdog: Value::Known(response.watchdog.clone()),
            default: Value::Known(response.default),
            instances: Value::Known(instances),
            service: service.into(),
        })
    }

    /// Builds the instance list of an update form.
    ///
    /// Instances named by the plan are created or updated; instances only
    /// present in `prior` are deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if an instance form cannot be built.
    pub fn instance_forms(&self, prior: &Self) -> Result<Vec<Json>, HundError> {
        let planned = self.instances.as_known();
        let mut forms = Vec::new();

        if let Some(planned) = planned {
            for (slug, instance) in planned {
                forms.push(instance.to_form(slug)?);
            }
        }

        if let Some(existing) = prior.instances.as_known() {
            for slug in existing.keys() {
                if !planned.is_some_and(|p| p.contains_key(slug)) {
                    forms.push(MetricInstanceModel::deletion_form(slug));
                }
            }
        }

        Ok(forms)
    }
}
