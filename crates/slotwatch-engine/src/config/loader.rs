use super::schema::SlotwatchConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./slotwatch.yaml
    /// 2. ~/.slotwatch/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<SlotwatchConfig, ConfigError> {
        let local_config = PathBuf::from("./slotwatch.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".slotwatch").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(SlotwatchConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<SlotwatchConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: SlotwatchConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Environment overrides, applied after file loading.
pub fn apply_env_overrides(config: &mut SlotwatchConfig) {
    if let Ok(url) = std::env::var("SLOTWATCH_WEBHOOK_URL")
        && !url.is_empty()
    {
        config.notify.webhook_url = Some(url);
    }
    if let Ok(raw) = std::env::var("SLOTWATCH_CHECK_INTERVAL_MIN")
        && let Ok(minutes) = raw.parse()
    {
        config.scheduler.check_interval_min = minutes;
    }
}
