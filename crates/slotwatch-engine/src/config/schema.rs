use crate::navigator::{Selectors, WaitConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotwatchConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub selectors: Selectors,
    #[serde(default)]
    pub waits: WaitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// The reservation page the session opens; also the base for
    /// synthesized booking links.
    #[serde(default = "default_reservation_url")]
    pub reservation_url: String,
    /// Element that only renders for an authenticated session.
    #[serde(default = "default_logged_in_marker")]
    pub logged_in_marker: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            reservation_url: default_reservation_url(),
            logged_in_marker: default_logged_in_marker(),
        }
    }
}

fn default_reservation_url() -> String {
    "https://bookings.example.com/en?id=demo".into()
}

fn default_logged_in_marker() -> String {
    "[data-testid=\"choose-my-date\"]".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Tick cadence and per-job poll interval, in minutes. Minimum 1.
    #[serde(default = "default_check_interval_min")]
    pub check_interval_min: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_min: default_check_interval_min(),
        }
    }
}

fn default_check_interval_min() -> u64 {
    5
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_min.max(1) * 60)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: SlotwatchConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.scheduler.check_interval_min, 5);
        assert!(config.notify.webhook_url.is_none());
        assert_eq!(config.selectors.option_button, ".radio-as-button");
        assert_eq!(config.waits.slot_panel_timeout_ms, 15_000);
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let yaml = r#"
scheduler:
  check_interval_min: 2
notify:
  webhook_url: "https://discord.com/api/webhooks/x/y"
selectors:
  confirm_date: ".confirm"
"#;
        let config: SlotwatchConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.scheduler.poll_interval(), Duration::from_secs(120));
        assert_eq!(
            config.notify.webhook_url.as_deref(),
            Some("https://discord.com/api/webhooks/x/y")
        );
        assert_eq!(config.selectors.confirm_date, ".confirm");
        assert_eq!(config.selectors.option_button, ".radio-as-button");
    }

    #[test]
    fn poll_interval_floors_at_one_minute() {
        let config = SchedulerConfig {
            check_interval_min: 0,
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
    }
}
