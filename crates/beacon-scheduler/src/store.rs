//! JSON-file-backed task and execution-history store.
//!
//! Two documents under `<data_dir>/scheduler/`: `tasks.json` holding
//! `{"tasks": [...]}` and `executions.json` holding `{"executions": [...]}`.
//! Every mutation is a full-file read-modify-write — the store assumes a
//! single scheduler process and carries no cross-process locking.
//!
//! Read failures (missing file, corrupt JSON, disk errors) degrade to an
//! empty collection with a warning rather than crashing; write failures are
//! returned to the caller, leaving the in-memory view ahead of disk until
//! the next successful write.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, SchedulerError};
use crate::types::{default_content_type, ExecutionRecord, ExecutionStatus, NewTask, ScheduleTask};

/// Execution history is capped at this many records; the oldest (by
/// insertion order, not date) are evicted first.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Default, Serialize, Deserialize)]
struct TasksFile {
    #[serde(default)]
    tasks: Vec<ScheduleTask>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    executions: Vec<ExecutionRecord>,
}

pub struct TaskStore {
    dir: PathBuf,
}

impl TaskStore {
    /// Store rooted at `<data_dir>/scheduler/`. Nothing is created until
    /// the first load or write.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("scheduler"),
        }
    }

    fn tasks_path(&self) -> PathBuf {
        self.dir.join("tasks.json")
    }

    fn history_path(&self) -> PathBuf {
        self.dir.join("executions.json")
    }

    /// All stored tasks. A missing file is created with an empty list;
    /// unreadable or corrupt files degrade to empty.
    pub fn load_tasks(&self) -> Vec<ScheduleTask> {
        self.load_or_init::<TasksFile>(&self.tasks_path()).tasks
    }

    /// Full-file overwrite of the task list.
    pub fn save_tasks(&self, tasks: &[ScheduleTask]) -> Result<()> {
        self.write_json(
            &self.tasks_path(),
            &TasksFile {
                tasks: tasks.to_vec(),
            },
        )
    }

    /// Validate, assign an id, append and persist a new task.
    pub fn add_task(&self, new: NewTask) -> Result<ScheduleTask> {
        if parse_task_time(&new.time).is_none() {
            return Err(SchedulerError::Validation(format!(
                "invalid time '{}' — expected HH:MM (24h)",
                new.time
            )));
        }
        if new.community.trim().is_empty() {
            return Err(SchedulerError::Validation(
                "community must not be empty".to_string(),
            ));
        }
        if new.content_count == 0 {
            return Err(SchedulerError::Validation(
                "contentCount must be a positive integer".to_string(),
            ));
        }
        if new.interval == 0 {
            return Err(SchedulerError::Validation(
                "interval must be a positive number of minutes".to_string(),
            ));
        }

        let task = ScheduleTask {
            id: generate_task_id(),
            time: new.time,
            community: new.community,
            content_count: new.content_count,
            interval: new.interval,
            content_type: new.content_type.unwrap_or_else(default_content_type),
            use_cache: new.use_cache,
            wallet_index: new.wallet_index,
            use_random_wallet: new.use_random_wallet,
            enabled: true,
            created_by: new.created_by,
            created_at: Utc::now().to_rfc3339(),
        };

        let mut tasks = self.load_tasks();
        tasks.push(task.clone());
        self.save_tasks(&tasks)?;
        info!(task_id = %task.id, community = %task.community, time = %task.time, "task added");
        Ok(task)
    }

    pub fn get_task(&self, id: &str) -> Option<ScheduleTask> {
        self.load_tasks().into_iter().find(|t| t.id == id)
    }

    /// Delete by id. The task's execution history is kept.
    pub fn delete_task(&self, id: &str) -> Result<()> {
        let mut tasks = self.load_tasks();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(SchedulerError::TaskNotFound { id: id.to_string() });
        }
        self.save_tasks(&tasks)?;
        info!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Flip the enabled flag. Returns the updated task.
    pub fn set_task_enabled(&self, id: &str, enabled: bool) -> Result<ScheduleTask> {
        let mut tasks = self.load_tasks();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| SchedulerError::TaskNotFound { id: id.to_string() })?;
        task.enabled = enabled;
        let updated = task.clone();
        self.save_tasks(&tasks)?;
        info!(task_id = %id, enabled, "task enabled flag changed");
        Ok(updated)
    }

    /// Full execution history, oldest first.
    pub fn load_history(&self) -> Vec<ExecutionRecord> {
        self.load_or_init::<HistoryFile>(&self.history_path())
            .executions
    }

    /// History entries for one task id, oldest first.
    pub fn history_for(&self, task_id: &str) -> Vec<ExecutionRecord> {
        self.load_history()
            .into_iter()
            .filter(|r| r.task_id == task_id)
            .collect()
    }

    /// The de-duplication gate: true iff an execution was recorded for this
    /// task on the same UTC calendar day as `now`. This is what keeps the
    /// ±5-minute trigger window from firing a task twice in one day.
    pub fn was_executed_today(&self, task_id: &str, now: DateTime<Utc>) -> bool {
        let today = now.format("%Y-%m-%d").to_string();
        self.load_history()
            .iter()
            .any(|r| r.task_id == task_id && r.execution_date.starts_with(&today))
    }

    /// Append an execution record stamped with `recorded_at`, evicting the
    /// oldest entries beyond [`HISTORY_LIMIT`], then persist. The stamp is
    /// the fire time of the run, so the daily gate always compares against
    /// the tick that triggered it.
    pub fn record_execution(
        &self,
        task_id: &str,
        status: ExecutionStatus,
        details: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut history = self.load_history();
        history.push(ExecutionRecord {
            task_id: task_id.to_string(),
            execution_date: recorded_at.to_rfc3339(),
            status,
            details: details.to_string(),
        });
        if history.len() > HISTORY_LIMIT {
            let excess = history.len() - HISTORY_LIMIT;
            history.drain(..excess);
        }
        self.write_json(
            &self.history_path(),
            &HistoryFile {
                executions: history,
            },
        )?;
        debug!(task_id, "execution recorded");
        Ok(())
    }

    fn load_or_init<T: Default + Serialize + DeserializeOwned>(&self, path: &Path) -> T {
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!(path = %path.display(), "corrupt store file, treating as empty: {e}");
                    T::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = T::default();
                if let Err(e) = self.write_json(path, &empty) {
                    warn!(path = %path.display(), "could not initialise store file: {e}");
                }
                empty
            }
            Err(e) => {
                warn!(path = %path.display(), "could not read store file, treating as empty: {e}");
                T::default()
            }
        }
    }

    /// Write via a temp file + rename so readers never observe a torn file.
    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let raw = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Parse "HH:MM" (24h) into hour and minute. Strict: two digits each,
/// single colon, hour 0-23, minute 0-59.
pub fn parse_task_time(s: &str) -> Option<(u32, u32)> {
    let (h, m) = s.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }
    if !h.bytes().all(|b| b.is_ascii_digit()) || !m.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

fn generate_task_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("task_{}_{}", millis, &suffix[..8])
}
