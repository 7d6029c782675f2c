use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Fixed wake-up period of the scheduler loop, in seconds. The tick never
/// adapts to the configured cron expression; only the match decision varies.
pub const DEFAULT_TICK_SECS: u64 = 60;

/// Top-level config (beacon.toml + BEACON_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// Root directory for persisted state (task store, settings blob).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Scheduler subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Tick period in seconds. Lowering this below 60 only makes the loop
    /// re-evaluate the same minute more often; it does not tighten matching.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: DEFAULT_TICK_SECS,
        }
    }
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

fn default_tick_secs() -> u64 {
    DEFAULT_TICK_SECS
}

fn default_data_dir() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.beacon", home)
}

impl BeaconConfig {
    /// Load config from a TOML file with BEACON_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.beacon/beacon.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: BeaconConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("BEACON_").split("_"))
            .extract()
            .map_err(|e| crate::error::BeaconError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.beacon/beacon.toml", home)
}
