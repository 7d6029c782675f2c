//! Persistence and patching of the auto-publish [`RuntimeConfig`].
//!
//! The config lives inside the admin settings blob
//! (`<data_dir>/scheduler/settings.json`) under a `scheduler` key; other
//! keys in the blob are preserved across read-modify-write cycles.
//!
//! Transport adapters hand over string-typed key-value arguments.
//! [`RuntimeConfigPatch::from_args`] is the boundary where those strings are
//! parsed into typed fields — unknown or malformed fields are rejected there,
//! before anything reaches the engine.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cron;
use crate::error::{Result, SchedulerError};
use crate::types::RuntimeConfig;

/// Admin settings blob. Only the `scheduler` section is ours; everything
/// else round-trips untouched via the flattened map.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AdminSettings {
    #[serde(default)]
    scheduler: RuntimeConfig,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("scheduler").join("settings.json"),
        }
    }

    /// Load the persisted runtime config; absent or corrupt blobs yield
    /// the defaults (scheduler disabled).
    pub fn load(&self) -> RuntimeConfig {
        self.load_blob().scheduler
    }

    /// Persist `config`, preserving unrelated keys in the settings blob.
    pub fn save(&self, config: &RuntimeConfig) -> Result<()> {
        let mut blob = self.load_blob();
        blob.scheduler = config.clone();
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let raw = serde_json::to_string_pretty(&blob)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load_blob(&self) -> AdminSettings {
        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(blob) => blob,
                Err(e) => {
                    warn!(path = %self.path.display(), "corrupt settings blob, using defaults: {e}");
                    AdminSettings::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AdminSettings::default(),
            Err(e) => {
                warn!(path = %self.path.display(), "could not read settings blob, using defaults: {e}");
                AdminSettings::default()
            }
        }
    }
}

/// Typed partial update of [`RuntimeConfig`] — the shallow-merge input of
/// `update_config`. Absent fields leave the existing value untouched.
#[derive(Debug, Default, Clone)]
pub struct RuntimeConfigPatch {
    pub enabled: Option<bool>,
    pub interval_secs: Option<u64>,
    pub ens_labels: Option<Vec<String>>,
    pub wallet_indices: Option<Vec<u32>>,
    pub enabled_chains: Option<Vec<String>>,
    pub cron_expression: Option<String>,
    pub use_random_content: Option<bool>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl RuntimeConfigPatch {
    /// Parse string-typed transport arguments into a typed patch.
    ///
    /// List fields accept either a JSON array literal (`["x","y"]`) or a
    /// comma-separated string (`a,b,c`). Unknown keys and malformed values
    /// are rejected — nothing is applied partially.
    pub fn from_args(args: &HashMap<String, String>) -> Result<Self> {
        let mut patch = Self::default();
        for (key, raw) in args {
            match key.as_str() {
                "enabled" => patch.enabled = Some(parse_bool(key, raw)?),
                "interval" => {
                    let secs: u64 = raw.parse().map_err(|_| {
                        SchedulerError::InvalidConfig(format!(
                            "interval must be a positive integer, got '{raw}'"
                        ))
                    })?;
                    if secs == 0 {
                        return Err(SchedulerError::InvalidConfig(
                            "interval must be a positive integer".to_string(),
                        ));
                    }
                    patch.interval_secs = Some(secs);
                }
                "ensLabels" => patch.ens_labels = Some(parse_string_list(key, raw)?),
                "walletIndices" => patch.wallet_indices = Some(parse_index_list(key, raw)?),
                "enabledChains" => patch.enabled_chains = Some(parse_string_list(key, raw)?),
                "cronExpression" => {
                    if !cron::is_valid_expression(raw) {
                        return Err(SchedulerError::InvalidConfig(format!(
                            "cronExpression must have 5 fields, got '{raw}'"
                        )));
                    }
                    patch.cron_expression = Some(raw.clone());
                }
                "useRandomContent" => patch.use_random_content = Some(parse_bool(key, raw)?),
                "startTime" => patch.start_time = Some(parse_timestamp(key, raw)?),
                "endTime" => patch.end_time = Some(parse_timestamp(key, raw)?),
                other => {
                    return Err(SchedulerError::InvalidConfig(format!(
                        "unknown config field '{other}'"
                    )));
                }
            }
        }
        Ok(patch)
    }

    /// Shallow-merge this patch onto `config`.
    pub fn apply(&self, config: &mut RuntimeConfig) {
        if let Some(v) = self.enabled {
            config.enabled = v;
        }
        if let Some(v) = self.interval_secs {
            config.interval_secs = v;
        }
        if let Some(ref v) = self.ens_labels {
            config.ens_labels = v.clone();
        }
        if let Some(ref v) = self.wallet_indices {
            config.wallet_indices = v.clone();
        }
        if let Some(ref v) = self.enabled_chains {
            config.enabled_chains = v.clone();
        }
        if let Some(ref v) = self.cron_expression {
            config.cron_expression = v.clone();
        }
        if let Some(v) = self.use_random_content {
            config.use_random_content = v;
        }
        if let Some(ref v) = self.start_time {
            config.start_time = Some(v.clone());
        }
        if let Some(ref v) = self.end_time {
            config.end_time = Some(v.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.interval_secs.is_none()
            && self.ens_labels.is_none()
            && self.wallet_indices.is_none()
            && self.enabled_chains.is_none()
            && self.cron_expression.is_none()
            && self.use_random_content.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(SchedulerError::InvalidConfig(format!(
            "{key} must be 'true' or 'false', got '{other}'"
        ))),
    }
}

fn parse_timestamp(key: &str, raw: &str) -> Result<String> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| {
        SchedulerError::InvalidConfig(format!("{key} must be an RFC3339 timestamp: {e}"))
    })?;
    Ok(raw.to_string())
}

/// Normalize a JSON array literal or comma-separated string to a vector.
fn parse_string_list(key: &str, raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<String>>(trimmed).map_err(|e| {
            SchedulerError::InvalidConfig(format!("{key} must be a JSON string array: {e}"))
        });
    }
    let items: Vec<String> = trimmed
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        return Err(SchedulerError::InvalidConfig(format!(
            "{key} must contain at least one entry"
        )));
    }
    Ok(items)
}

fn parse_index_list(key: &str, raw: &str) -> Result<Vec<u32>> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<u32>>(trimmed).map_err(|e| {
            SchedulerError::InvalidConfig(format!("{key} must be a JSON integer array: {e}"))
        });
    }
    trimmed
        .split(',')
        .map(|s| {
            s.trim().parse::<u32>().map_err(|_| {
                SchedulerError::InvalidConfig(format!(
                    "{key} entries must be non-negative integers, got '{s}'"
                ))
            })
        })
        .collect()
}
