//! Operation surface consumed by the thin transport adapters.
//!
//! Every operation takes a plain key-value argument map and returns a
//! [`CommandResponse`]. Validation and not-found failures come back as
//! `{success: false, message}` with no side effect; nothing here panics or
//! leaks a `SchedulerError` to the transport layer.

use std::collections::HashMap;

use beacon_core::CommandResponse;
use tracing::debug;

use crate::cron::describe_cron;
use crate::engine::SchedulerEngine;
use crate::error::{Result, SchedulerError};
use crate::settings::RuntimeConfigPatch;
use crate::types::NewTask;

/// Dispatch one named operation. Unknown names are reported in-band.
pub fn handle_command(
    engine: &SchedulerEngine,
    op: &str,
    args: &HashMap<String, String>,
) -> CommandResponse {
    debug!(op, "scheduler command received");
    let result = match op {
        "add_task" => add_task(engine, args),
        "list_tasks" => list_tasks(engine),
        "delete_task" => delete_task(engine, args),
        "enable_task" => set_enabled(engine, args, true),
        "disable_task" => set_enabled(engine, args, false),
        "execute_task" => execute_task(engine, args),
        "task_history" => task_history(engine, args),
        "start" => start(engine, args),
        "stop" => stop(engine),
        "status" => status(engine),
        "get_config" => get_config(engine),
        "update_config" => update_config(engine, args),
        other => return CommandResponse::error(format!("Unknown operation '{other}'")),
    };
    result.unwrap_or_else(|e| CommandResponse::error(e.to_string()))
}

fn add_task(engine: &SchedulerEngine, args: &HashMap<String, String>) -> Result<CommandResponse> {
    let new = NewTask {
        time: required(args, "time")?,
        community: required(args, "community")?,
        content_count: optional_u32(args, "contentCount")?.unwrap_or(1),
        interval: optional_u32(args, "interval")?.unwrap_or(60),
        content_type: args.get("contentType").cloned(),
        use_cache: optional_bool(args, "useCache")?.unwrap_or(false),
        wallet_index: optional_u32(args, "walletIndex")?,
        use_random_wallet: optional_bool(args, "useRandomWallet")?.unwrap_or(false),
        created_by: args
            .get("createdBy")
            .cloned()
            .unwrap_or_else(|| "admin".to_string()),
    };
    let task = engine.add_task(new)?;
    Ok(CommandResponse::ok_with(
        format!(
            "Task {} scheduled daily at {} for '{}'",
            task.id, task.time, task.community
        ),
        serde_json::to_value(&task)?,
    ))
}

fn list_tasks(engine: &SchedulerEngine) -> Result<CommandResponse> {
    let tasks = engine.list_tasks();
    let enabled = tasks.iter().filter(|t| t.enabled).count();
    Ok(CommandResponse::ok_with(
        format!("{} task(s), {} enabled", tasks.len(), enabled),
        serde_json::to_value(&tasks)?,
    ))
}

fn delete_task(
    engine: &SchedulerEngine,
    args: &HashMap<String, String>,
) -> Result<CommandResponse> {
    let id = required(args, "id")?;
    engine.delete_task(&id)?;
    Ok(CommandResponse::ok(format!("Task {id} deleted")))
}

fn set_enabled(
    engine: &SchedulerEngine,
    args: &HashMap<String, String>,
    enabled: bool,
) -> Result<CommandResponse> {
    let id = required(args, "id")?;
    let task = engine.set_task_enabled(&id, enabled)?;
    let verb = if enabled { "enabled" } else { "disabled" };
    Ok(CommandResponse::ok_with(
        format!("Task {id} {verb}"),
        serde_json::to_value(&task)?,
    ))
}

fn execute_task(
    engine: &SchedulerEngine,
    args: &HashMap<String, String>,
) -> Result<CommandResponse> {
    let id = required(args, "id")?;
    let task = engine.execute_task_now(&id)?;
    // The sequence runs in the background; this is an acknowledgement only.
    Ok(CommandResponse::ok(format!(
        "Execution of task {} started ({} post(s) to '{}')",
        task.id, task.content_count, task.community
    )))
}

fn task_history(
    engine: &SchedulerEngine,
    args: &HashMap<String, String>,
) -> Result<CommandResponse> {
    let id = required(args, "id")?;
    let history = engine.task_history(&id);
    Ok(CommandResponse::ok_with(
        format!("{} execution(s) recorded for {id}", history.len()),
        serde_json::to_value(&history)?,
    ))
}

fn start(engine: &SchedulerEngine, args: &HashMap<String, String>) -> Result<CommandResponse> {
    let patch = RuntimeConfigPatch::from_args(args)?;
    let config = engine.start(Some(patch))?;
    Ok(CommandResponse::ok(format!(
        "Scheduler started — {} ({})",
        config.cron_expression,
        describe_cron(&config.cron_expression)
    )))
}

fn stop(engine: &SchedulerEngine) -> Result<CommandResponse> {
    engine.stop()?;
    Ok(CommandResponse::ok("Scheduler stopped"))
}

fn status(engine: &SchedulerEngine) -> Result<CommandResponse> {
    let status = engine.status();
    let message = if status.is_running {
        match &status.next_run_time {
            Some(next) => format!("Scheduler is running — next check around {next}"),
            None => "Scheduler is running".to_string(),
        }
    } else {
        "Scheduler is stopped".to_string()
    };
    Ok(CommandResponse::ok_with(
        message,
        serde_json::to_value(&status)?,
    ))
}

fn get_config(engine: &SchedulerEngine) -> Result<CommandResponse> {
    let config = engine.get_config();
    Ok(CommandResponse::ok_with(
        format!(
            "Auto-publish {} — {}",
            if config.enabled { "enabled" } else { "disabled" },
            describe_cron(&config.cron_expression)
        ),
        serde_json::to_value(&config)?,
    ))
}

fn update_config(
    engine: &SchedulerEngine,
    args: &HashMap<String, String>,
) -> Result<CommandResponse> {
    let patch = RuntimeConfigPatch::from_args(args)?;
    if patch.is_empty() {
        return Err(SchedulerError::InvalidConfig(
            "no recognized config fields provided".to_string(),
        ));
    }
    let config = engine.update_config(patch)?;
    Ok(CommandResponse::ok_with(
        "Configuration updated".to_string(),
        serde_json::to_value(&config)?,
    ))
}

fn required(args: &HashMap<String, String>, key: &str) -> Result<String> {
    match args.get(key) {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(SchedulerError::Validation(format!(
            "missing required argument '{key}'"
        ))),
    }
}

fn optional_u32(args: &HashMap<String, String>, key: &str) -> Result<Option<u32>> {
    match args.get(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<u32>().map(Some).map_err(|_| {
            SchedulerError::Validation(format!(
                "argument '{key}' must be a non-negative integer, got '{raw}'"
            ))
        }),
    }
}

fn optional_bool(args: &HashMap<String, String>, key: &str) -> Result<Option<bool>> {
    match args.get(key).map(|v| v.trim()) {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(other) => Err(SchedulerError::Validation(format!(
            "argument '{key}' must be 'true' or 'false', got '{other}'"
        ))),
    }
}
