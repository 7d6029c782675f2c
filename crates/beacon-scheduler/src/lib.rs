//! `beacon-scheduler` — recurring-publish engine with JSON-file persistence.
//!
//! # Overview
//!
//! The [`engine::SchedulerEngine`] wakes on a fixed 60-second tick and decides
//! which publish work is due. Two independent paths are evaluated each tick:
//!
//! | Path | Source | Match rule |
//! |------|--------|------------|
//! | auto-publish | persisted [`types::RuntimeConfig`] | 5-field cron expression |
//! | task list | stored [`types::ScheduleTask`]s | daily HH:MM, ±5 min window |
//!
//! Matched work is handed to a single background worker over an unbounded
//! queue, so a long multi-post run never blocks the tick from firing for
//! other tasks. A task fires at most once per UTC calendar day: the loose
//! trigger window is guarded by the recorded execution history
//! ([`store::TaskStore::was_executed_today`]).
//!
//! Task definitions live in `tasks.json`, the capped execution history in
//! `executions.json`, and the auto-publish config in the admin settings
//! blob — all under `<data_dir>/scheduler/`. The store assumes a single
//! scheduler process; there is no cross-process locking.

pub mod commands;
pub mod cron;
pub mod engine;
pub mod error;
pub mod executor;
pub mod settings;
pub mod store;
pub mod types;

pub use engine::SchedulerEngine;
pub use error::{Result, SchedulerError};
pub use executor::TaskExecutor;
pub use settings::{RuntimeConfigPatch, SettingsStore};
pub use store::TaskStore;
pub use types::{
    ExecutionRecord, ExecutionResult, ExecutionStatus, NewTask, RuntimeConfig, ScheduleTask,
    SchedulerStatus,
};
