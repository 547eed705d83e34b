mod loader;
mod schema;

pub use loader::{apply_env_overrides, ConfigError, ConfigLoader};
pub use schema::{NotifyConfig, SchedulerConfig, SiteConfig, SlotwatchConfig};
