//! Derivation of a watchdog's `high_frequency` flag.

use crate::diagnostics::{AttrPath, Diagnostics};
use crate::models::native::DEFAULT_FREQUENCY_MS;
use crate::models::watchdog::WatchdogModel;
use crate::models::WatchdogService;
use crate::value::Value;
use crate::variant::SlotSet;

/// Forces or derives `high_frequency` from the planned service.
///
/// UptimeRobot never polls at high frequency. Native checks poll at high
/// frequency when their interval is below a minute, so the flag cannot be
/// configured directly.
#[must_use]
pub fn plan_high_frequency(
    path: &AttrPath,
    config: &WatchdogModel,
    plan: &mut WatchdogModel,
) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let flag_path = path.at_name("high_frequency");

    match plan.service.select() {
        Ok(WatchdogService::Uptimerobot(_)) => {
            if config.high_frequency == Value::Known(true) {
                diags.add_attribute_error(
                    flag_path,
                    "Cannot set Watchdog High-frequency when using UptimeRobot Service Type",
                    "UptimeRobot service does not support high-frequency polling. Either set \
                     high_frequency to false, or remove the attribute.",
                );
            }
            plan.high_frequency = Value::Known(false);
        }
        Ok(WatchdogService::Native(native)) => {
            if !config.high_frequency.is_null() {
                diags.add_attribute_error(
                    flag_path,
                    "Cannot set Watchdog High-frequency when using Native Service Types",
                    "The value for high_frequency is derived from the frequency attribute of \
                     your chosen Native service. Please set the frequency instead.",
                );
            }
            plan.high_frequency = match native.frequency() {
                Some(ms) => Value::Known(ms < DEFAULT_FREQUENCY_MS),
                None => Value::Unknown,
            };
        }
        _ => {}
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::native::{HttpCheck, NativeCommon, NativeService};
    use crate::models::watchdog::UptimerobotWatchdogService;

    fn native(frequency: Value<i64>) -> WatchdogModel {
        WatchdogModel {
            service: WatchdogService::Native(NativeService::Http(HttpCheck {
                common: NativeCommon {
                    frequency,
                    ..NativeCommon::default()
                },
                ..HttpCheck::default()
            }))
            .into(),
            ..WatchdogModel::default()
        }
    }

    #[test]
    fn test_native_frequency_derives_flag() {
        let path = AttrPath::root("watchdog");

        let config = native(Value::Known(30_000));
        let mut plan = config.clone();
        assert!(plan_high_frequency(&path, &config, &mut plan).is_empty());
        assert_eq!(plan.high_frequency, Value::Known(true));

        let config = native(Value::Null);
        let mut plan = config.clone();
        let _ = plan_high_frequency(&path, &config, &mut plan);
        assert_eq!(plan.high_frequency, Value::Known(false));

        let config = native(Value::Unknown);
        let mut plan = config.clone();
        let _ = plan_high_frequency(&path, &config, &mut plan);
        assert!(plan.high_frequency.is_unknown());
    }

    #[test]
    fn test_native_rejects_configured_flag() {
        let mut config = native(Value::Known(120_000));
        config.high_frequency = Value::Known(false);
        let mut plan = config.clone();

        let diags = plan_high_frequency(&AttrPath::root("watchdog"), &config, &mut plan);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.path, Some(AttrPath::root("watchdog").at_name("high_frequency")));
    }

    #[test]
    fn test_uptimerobot_forces_false() {
        let config = WatchdogModel {
            high_frequency: Value::Known(true),
            service: WatchdogService::Uptimerobot(UptimerobotWatchdogService::default()).into(),
            ..WatchdogModel::default()
        };
        let mut plan = config.clone();

        let diags = plan_high_frequency(&AttrPath::root("watchdog"), &config, &mut plan);
        assert!(diags.has_error());
        assert_eq!(plan.high_frequency, Value::Known(false));
    }
}
