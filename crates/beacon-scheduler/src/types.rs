use serde::{Deserialize, Serialize};

/// A discrete, user-defined recurring publish directive.
///
/// Field names are camelCase on the wire so existing `tasks.json` files keep
/// loading; the execution hints default when absent in older files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTask {
    /// `task_<millis>_<hex>` — generated at creation, immutable.
    pub id: String,
    /// Daily trigger point, wall-clock "HH:MM" (24h). Validated before
    /// persistence, so stored tasks always parse.
    pub time: String,
    /// Target community feed identifier.
    pub community: String,
    /// Number of posts to publish per trigger.
    pub content_count: u32,
    /// Minutes to wait between successive posts within one trigger.
    /// Capped at 5 minutes at execution time.
    pub interval: u32,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Prefer publishing an existing unpublished draft over generating.
    #[serde(default)]
    pub use_cache: bool,
    /// Wallet to sign with; `None` lets the poster use its default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_index: Option<u32>,
    /// Pick a signing wallet at random for each post.
    #[serde(default)]
    pub use_random_wallet: bool,
    /// Disabled tasks are skipped by the tick scan but remain stored.
    pub enabled: bool,
    pub created_by: String,
    /// RFC3339 creation timestamp — set once, never mutated.
    pub created_at: String,
}

/// Creation input for [`ScheduleTask`] — everything except the generated
/// `id` and `created_at`. Validated by `TaskStore::add_task`.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub time: String,
    pub community: String,
    pub content_count: u32,
    pub interval: u32,
    pub content_type: Option<String>,
    pub use_cache: bool,
    pub wallet_index: Option<u32>,
    pub use_random_wallet: bool,
    pub created_by: String,
}

pub(crate) fn default_content_type() -> String {
    "default".to_string()
}

/// Outcome of one task execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failure,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Failure => "failure",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "success" => Ok(ExecutionStatus::Success),
            "failure" => Ok(ExecutionStatus::Failure),
            other => Err(format!("unknown execution status: {other}")),
        }
    }
}

/// Append-only audit entry. Outlives task deletion — `task_id` is a weak
/// reference, so history for removed tasks stays retrievable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub task_id: String,
    /// RFC3339 timestamp of when the execution was recorded.
    pub execution_date: String,
    pub status: ExecutionStatus,
    /// Per-post outcome lines joined with "; ".
    pub details: String,
}

/// Result of one multi-post execution, one outcome line per attempted post.
///
/// `success` is true only if every individual post succeeded; partial
/// successes still count as a failure for audit purposes.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub success: bool,
    pub outcomes: Vec<String>,
}

/// The single always-on auto-publish configuration — a separate, simpler
/// subsystem from the discrete task list. Persisted in the admin settings
/// blob and read back at startup to decide the initial running state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Seconds between publishes — advisory companion to the cron
    /// expression, surfaced in status displays.
    #[serde(default = "default_interval_secs", rename = "interval")]
    pub interval_secs: u64,
    /// Target community feeds.
    #[serde(default)]
    pub ens_labels: Vec<String>,
    /// Wallets to publish from; empty means the poster's default wallet.
    #[serde(default)]
    pub wallet_indices: Vec<u32>,
    /// Chains to publish on; empty falls back to the chain registry's
    /// enabled set.
    #[serde(default)]
    pub enabled_chains: Vec<String>,
    #[serde(default = "default_cron_expression")]
    pub cron_expression: String,
    /// Publish a randomly chosen existing draft when one exists instead of
    /// always generating fresh content.
    #[serde(default)]
    pub use_random_content: bool,
    /// RFC3339 — ticks before this instant are skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// RFC3339 — the first tick past this instant stops the scheduler and
    /// persists `enabled = false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
            ens_labels: Vec::new(),
            wallet_indices: Vec::new(),
            enabled_chains: Vec::new(),
            cron_expression: default_cron_expression(),
            use_random_content: false,
            start_time: None,
            end_time: None,
        }
    }
}

fn default_interval_secs() -> u64 {
    3600
}

fn default_cron_expression() -> String {
    "0 * * * *".to_string()
}

/// Derived status snapshot — never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub is_running: bool,
    /// Best-effort "next whole minute" estimate. Not derived from the cron
    /// expression — a coarse hint for displays, nothing more.
    pub next_run_time: Option<String>,
    pub last_run_time: Option<String>,
    pub last_run_result: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_json_uses_camel_case() {
        let task = ScheduleTask {
            id: "task_1_abc".into(),
            time: "08:30".into(),
            community: "demo".into(),
            content_count: 2,
            interval: 10,
            content_type: "default".into(),
            use_cache: false,
            wallet_index: None,
            use_random_wallet: false,
            enabled: true,
            created_by: "admin".into(),
            created_at: "2026-01-01T00:00:00+00:00".into(),
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"contentCount\":2"));
        assert!(json.contains("\"createdBy\""));
        assert!(!json.contains("walletIndex")); // None is omitted
    }

    #[test]
    fn older_task_files_without_hints_still_load() {
        let json = r#"{
            "id": "task_1_abc",
            "time": "09:00",
            "community": "demo",
            "contentCount": 1,
            "interval": 5,
            "enabled": true,
            "createdBy": "admin",
            "createdAt": "2026-01-01T00:00:00+00:00"
        }"#;
        let task: ScheduleTask = serde_json::from_str(json).unwrap();
        assert_eq!(task.content_type, "default");
        assert!(!task.use_cache);
        assert!(task.wallet_index.is_none());
    }

    #[test]
    fn runtime_config_interval_wire_name() {
        let cfg: RuntimeConfig = serde_json::from_str(r#"{"interval": 120}"#).unwrap();
        assert_eq!(cfg.interval_secs, 120);
        assert_eq!(cfg.cron_expression, "0 * * * *");
        assert!(!cfg.enabled);
    }

    #[test]
    fn execution_status_round_trips_as_string() {
        assert_eq!(ExecutionStatus::Success.to_string(), "success");
        assert_eq!(
            "failure".parse::<ExecutionStatus>().unwrap(),
            ExecutionStatus::Failure
        );
        assert!("done".parse::<ExecutionStatus>().is_err());
    }
}
