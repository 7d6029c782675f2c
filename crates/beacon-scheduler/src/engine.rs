//! The scheduler engine: fixed-period tick loop, background worker, and the
//! start/stop/update lifecycle of the auto-publish runtime config.
//!
//! The tick handler never executes publish work inline. Matches are pushed
//! onto an unbounded queue consumed by a single worker task, so a
//! long-running multi-post execution (with its inter-post waits) cannot
//! stop the next tick from firing for other tasks. Tick-level errors are
//! logged and swallowed — one bad tick never stops future ticks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use beacon_core::BeaconConfig;
use beacon_publish::{ChainRegistry, ContentStore, PostReceipt, Poster};
use chrono::{DateTime, Timelike, Utc};
use dashmap::DashSet;
use rand::Rng;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::cron::is_time_matching;
use crate::error::{Result, SchedulerError};
use crate::executor::TaskExecutor;
use crate::settings::{RuntimeConfigPatch, SettingsStore};
use crate::store::{parse_task_time, TaskStore};
use crate::types::{
    ExecutionStatus, NewTask, RuntimeConfig, ScheduleTask, SchedulerStatus,
};

/// Tolerance band around a task's configured minute. A tick drifting a few
/// minutes late still triggers the task; the execution-history gate keeps
/// the widened window from double-firing.
const TRIGGER_WINDOW_MINUTES: i64 = 5;

/// A unit of publish work handed from the tick handler to the worker.
enum WorkItem {
    /// One discrete task's full multi-post sequence, stamped with the time
    /// of the tick (or manual request) that fired it.
    Task {
        task: ScheduleTask,
        fired_at: DateTime<Utc>,
    },
    /// One label × chain × wallet combination of the auto-publish path.
    AutoPublish {
        label: String,
        chain: String,
        wallet_index: Option<u32>,
        use_random_content: bool,
    },
}

#[derive(Default)]
struct RunState {
    running: bool,
    shutdown_tx: Option<watch::Sender<bool>>,
    last_run_time: Option<String>,
    last_run_result: Option<String>,
}

/// Process-wide scheduler. Construct once, share via clone (cheap — all
/// state lives behind an `Arc`). Requires a running tokio runtime.
#[derive(Clone)]
pub struct SchedulerEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    store: TaskStore,
    settings: SettingsStore,
    executor: TaskExecutor,
    poster: Arc<dyn Poster>,
    content: Arc<dyn ContentStore>,
    chains: Arc<dyn ChainRegistry>,
    tick_period: Duration,
    work_tx: mpsc::UnboundedSender<WorkItem>,
    /// Task ids currently queued or executing. Guards against re-enqueueing
    /// a task whose run outlives the trigger window; the durable
    /// `was_executed_today` gate takes over once the run is recorded.
    in_flight: DashSet<String>,
    state: Mutex<RunState>,
}

impl SchedulerEngine {
    /// Create the engine and spawn its worker loop. The tick loop is armed
    /// separately via [`SchedulerEngine::start`] (or [`autostart`]).
    ///
    /// [`autostart`]: SchedulerEngine::autostart
    pub fn new(
        config: &BeaconConfig,
        poster: Arc<dyn Poster>,
        content: Arc<dyn ContentStore>,
        chains: Arc<dyn ChainRegistry>,
    ) -> Self {
        let (work_tx, work_rx) = mpsc::unbounded_channel();
        let inner = Arc::new(EngineInner {
            store: TaskStore::new(&config.data_dir),
            settings: SettingsStore::new(&config.data_dir),
            executor: TaskExecutor::new(Arc::clone(&poster), Arc::clone(&content)),
            poster,
            content,
            chains,
            tick_period: Duration::from_secs(config.scheduler.tick_secs),
            work_tx,
            in_flight: DashSet::new(),
            state: Mutex::new(RunState::default()),
        });
        tokio::spawn(worker_loop(Arc::clone(&inner), work_rx));
        Self { inner }
    }

    /// Arm the tick loop at process startup when the persisted config says
    /// the scheduler was left enabled.
    pub fn autostart(&self) {
        if self.inner.settings.load().enabled {
            info!("persisted config has scheduler enabled — starting");
            self.inner.arm();
        }
    }

    /// Start the scheduler, optionally merging a config patch first.
    /// Persists `enabled = true` and (re-)arms the tick loop.
    pub fn start(&self, patch: Option<RuntimeConfigPatch>) -> Result<RuntimeConfig> {
        let mut config = self.inner.settings.load();
        if let Some(patch) = patch {
            patch.apply(&mut config);
        }
        config.enabled = true;
        self.inner.settings.save(&config)?;
        self.inner.arm();
        Ok(config)
    }

    /// Stop the scheduler and persist `enabled = false`.
    pub fn stop(&self) -> Result<()> {
        self.inner.disarm()?;
        Ok(())
    }

    /// Shallow-merge a validated patch onto the persisted config. Re-arms
    /// (or disarms) the tick loop when `enabled` toggled or the cron
    /// expression changed.
    pub fn update_config(&self, patch: RuntimeConfigPatch) -> Result<RuntimeConfig> {
        let before = self.inner.settings.load();
        let mut config = before.clone();
        patch.apply(&mut config);
        self.inner.settings.save(&config)?;

        let toggled = config.enabled != before.enabled;
        let rescheduled = config.cron_expression != before.cron_expression;
        if toggled || rescheduled {
            if config.enabled {
                self.inner.arm();
            } else {
                self.inner.disarm()?;
            }
        }
        Ok(config)
    }

    pub fn get_config(&self) -> RuntimeConfig {
        self.inner.settings.load()
    }

    pub fn status(&self) -> SchedulerStatus {
        let state = self.inner.state.lock().unwrap();
        SchedulerStatus {
            is_running: state.running,
            next_run_time: state
                .running
                .then(|| next_whole_minute(Utc::now()).to_rfc3339()),
            last_run_time: state.last_run_time.clone(),
            last_run_result: state.last_run_result.clone(),
        }
    }

    // --- task management (delegated to the store) --------------------------

    pub fn add_task(&self, new: NewTask) -> Result<ScheduleTask> {
        self.inner.store.add_task(new)
    }

    pub fn list_tasks(&self) -> Vec<ScheduleTask> {
        self.inner.store.load_tasks()
    }

    pub fn delete_task(&self, id: &str) -> Result<()> {
        self.inner.store.delete_task(id)
    }

    pub fn set_task_enabled(&self, id: &str, enabled: bool) -> Result<ScheduleTask> {
        self.inner.store.set_task_enabled(id, enabled)
    }

    pub fn task_history(&self, id: &str) -> Vec<crate::types::ExecutionRecord> {
        self.inner.store.history_for(id)
    }

    /// Manual trigger: enqueue the task's sequence and return immediately.
    /// The caller gets an acknowledgement, not the multi-post outcome.
    /// Works for disabled tasks too — the flag only gates the tick scan.
    pub fn execute_task_now(&self, id: &str) -> Result<ScheduleTask> {
        let task = self
            .inner
            .store
            .get_task(id)
            .ok_or_else(|| SchedulerError::TaskNotFound { id: id.to_string() })?;
        if !self.inner.in_flight.insert(task.id.clone()) {
            return Err(SchedulerError::Validation(format!(
                "task {id} is already executing"
            )));
        }
        info!(task_id = %id, "manual execution requested");
        self.inner.enqueue(WorkItem::Task {
            task: task.clone(),
            fired_at: Utc::now(),
        });
        Ok(task)
    }

    /// One tick of the scheduler, evaluated at `now`. Exposed for tests;
    /// the armed tick loop calls this every period.
    pub fn tick_once(&self, now: DateTime<Utc>) {
        self.inner.tick_once(now);
    }
}

impl EngineInner {
    /// (Re-)arm the tick loop. Any previous loop is shut down first so at
    /// most one tick task exists.
    fn arm(self: &Arc<Self>) {
        let mut state = self.state.lock().unwrap();
        if let Some(tx) = state.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        let (tx, mut rx) = watch::channel(false);
        state.shutdown_tx = Some(tx);
        state.running = true;
        drop(state);

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            info!(period_secs = inner.tick_period.as_secs(), "scheduler tick loop started");
            let mut ticker = tokio::time::interval(inner.tick_period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        inner.tick_once(Utc::now());
                    }
                    _ = rx.changed() => {
                        if *rx.borrow() {
                            info!("scheduler tick loop stopped");
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Stop the tick loop and persist `enabled = false`.
    fn disarm(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(tx) = state.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        state.running = false;
        drop(state);

        let mut config = self.settings.load();
        if config.enabled {
            config.enabled = false;
            self.settings.save(&config)?;
        }
        info!("scheduler stopped");
        Ok(())
    }

    fn enqueue(&self, item: WorkItem) {
        // The worker holds the receiver for the engine's lifetime, so a send
        // failure means the process is already shutting down.
        if self.work_tx.send(item).is_err() {
            warn!("worker queue closed — work item dropped");
        }
    }

    fn tick_once(&self, now: DateTime<Utc>) {
        if let Err(e) = self.tick_auto_publish(now) {
            error!("auto-publish tick failed: {e}");
        }
        self.tick_tasks(now);
    }

    /// Runtime-config path: time window, cron match, then the cross-product
    /// of labels × chains × wallets — each combination independent.
    fn tick_auto_publish(&self, now: DateTime<Utc>) -> Result<()> {
        let config = self.settings.load();
        if !config.enabled {
            return Ok(());
        }

        if let Some(start) = parse_window_bound(config.start_time.as_deref()) {
            if now < start {
                debug!("before configured start time — skipping auto-publish");
                return Ok(());
            }
        }
        if let Some(end) = parse_window_bound(config.end_time.as_deref()) {
            if now > end {
                info!("configured end time reached — stopping scheduler");
                return self.disarm();
            }
        }

        if !is_time_matching(&config.cron_expression, now) {
            return Ok(());
        }

        if config.ens_labels.is_empty() {
            debug!("auto-publish matched but no target labels configured");
            return Ok(());
        }

        {
            let mut state = self.state.lock().unwrap();
            state.last_run_time = Some(now.to_rfc3339());
        }

        let chains = if config.enabled_chains.is_empty() {
            self.chains.enabled_chains()
        } else {
            config.enabled_chains.clone()
        };
        let wallets: Vec<Option<u32>> = if config.wallet_indices.is_empty() {
            vec![None]
        } else {
            config.wallet_indices.iter().copied().map(Some).collect()
        };

        let mut queued = 0usize;
        for label in &config.ens_labels {
            for chain in &chains {
                for wallet in &wallets {
                    self.enqueue(WorkItem::AutoPublish {
                        label: label.clone(),
                        chain: chain.clone(),
                        wallet_index: *wallet,
                        use_random_content: config.use_random_content,
                    });
                    queued += 1;
                }
            }
        }
        info!(queued, cron = %config.cron_expression, "auto-publish combinations queued");
        Ok(())
    }

    /// Task-list path: enabled tasks whose HH:MM falls within the trigger
    /// window of `now`, gated by the daily execution history.
    fn tick_tasks(&self, now: DateTime<Utc>) {
        for task in self.store.load_tasks() {
            if !task.enabled {
                continue;
            }
            let Some((hour, minute)) = parse_task_time(&task.time) else {
                // Stored tasks are validated, so this means hand-edited data.
                warn!(task_id = %task.id, time = %task.time, "stored task has unparseable time");
                continue;
            };
            if hour != now.hour() {
                continue;
            }
            let drift = (i64::from(minute) - i64::from(now.minute())).abs();
            if drift > TRIGGER_WINDOW_MINUTES {
                continue;
            }
            if self.in_flight.contains(&task.id) {
                debug!(task_id = %task.id, "task already in flight — skipping");
                continue;
            }
            if self.was_executed_today_logged(&task.id, now) {
                continue;
            }
            info!(task_id = %task.id, community = %task.community, time = %task.time, "task due — queued");
            self.in_flight.insert(task.id.clone());
            self.enqueue(WorkItem::Task {
                task,
                fired_at: now,
            });
        }
    }

    fn was_executed_today_logged(&self, task_id: &str, now: DateTime<Utc>) -> bool {
        let hit = self.store.was_executed_today(task_id, now);
        if hit {
            debug!(task_id, "already executed today — skipping");
        }
        hit
    }

    /// Worker side of a discrete task: run the sequence, record the
    /// aggregate outcome, release the in-flight mark.
    async fn run_task(&self, task: ScheduleTask, fired_at: DateTime<Utc>) {
        info!(task_id = %task.id, posts = task.content_count, "task execution started");
        let result = self.executor.execute(&task).await;
        let status = if result.success {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failure
        };
        let details = result.outcomes.join("; ");
        if let Err(e) = self
            .store
            .record_execution(&task.id, status.clone(), &details, fired_at)
        {
            error!(task_id = %task.id, "failed to record execution: {e}");
        }
        self.in_flight.remove(&task.id);
        info!(task_id = %task.id, status = %status, "task execution finished");
    }

    /// Worker side of one auto-publish combination.
    async fn run_auto_publish(
        &self,
        label: String,
        chain: String,
        wallet_index: Option<u32>,
        use_random_content: bool,
    ) {
        let outcome = self
            .publish_combination(&label, &chain, wallet_index, use_random_content)
            .await;
        let summary = match &outcome {
            Ok(receipt) => {
                info!(%label, %chain, tx = %receipt.tx_hash, "auto-publish succeeded");
                format!("{label}@{chain}: ok (tx {})", receipt.tx_hash)
            }
            Err(e) => {
                warn!(%label, %chain, "auto-publish failed: {e}");
                format!("{label}@{chain}: failed: {e}")
            }
        };
        let mut state = self.state.lock().unwrap();
        state.last_run_result = Some(summary);
    }

    async fn publish_combination(
        &self,
        label: &str,
        chain: &str,
        wallet_index: Option<u32>,
        use_random_content: bool,
    ) -> beacon_publish::Result<PostReceipt> {
        self.chains.set_current_chain(chain).await?;

        if use_random_content {
            let mut drafts = self.content.list_draft_content(label).await?;
            drafts.retain(|d| !d.published);
            if !drafts.is_empty() {
                let pick = rand::rng().random_range(0..drafts.len());
                return self
                    .poster
                    .publish(label, &drafts[pick].id, wallet_index)
                    .await;
            }
        }
        self.poster
            .generate_and_publish(label, None, wallet_index)
            .await
    }
}

/// Single consumer of the work queue. Items run one after another; the tick
/// loop stays responsive regardless of how long an item takes.
async fn worker_loop(inner: Arc<EngineInner>, mut rx: mpsc::UnboundedReceiver<WorkItem>) {
    while let Some(item) = rx.recv().await {
        match item {
            WorkItem::Task { task, fired_at } => inner.run_task(task, fired_at).await,
            WorkItem::AutoPublish {
                label,
                chain,
                wallet_index,
                use_random_content,
            } => {
                inner
                    .run_auto_publish(label, chain, wallet_index, use_random_content)
                    .await
            }
        }
    }
    debug!("worker loop finished");
}

fn parse_window_bound(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            warn!(raw, "unparseable window bound ignored: {e}");
            None
        }
    }
}

/// Truncate to the minute and advance by one — the coarse `next_run_time`
/// hint. Deliberately not derived from the cron expression.
fn next_whole_minute(now: DateTime<Utc>) -> DateTime<Utc> {
    let base = now
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    base + chrono::Duration::minutes(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use beacon_publish::{ContentItem, PublishError};
    use chrono::TimeZone;

    struct RecordingPoster {
        calls: StdMutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingPoster {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: StdMutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: StdMutex::new(Vec::new()),
                fail: true,
            })
        }

        fn count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Poster for RecordingPoster {
        async fn publish(
            &self,
            community: &str,
            content_id: &str,
            _wallet_index: Option<u32>,
        ) -> beacon_publish::Result<PostReceipt> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("publish {community}/{content_id}"));
            if self.fail {
                return Err(PublishError::Provider("down".into()));
            }
            Ok(PostReceipt {
                content_id: None,
                tx_hash: "0x1".into(),
            })
        }

        async fn generate_and_publish(
            &self,
            community: &str,
            _prompt: Option<&str>,
            _wallet_index: Option<u32>,
        ) -> beacon_publish::Result<PostReceipt> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("generate {community}"));
            if self.fail {
                return Err(PublishError::Provider("down".into()));
            }
            Ok(PostReceipt {
                content_id: Some("c1".into()),
                tx_hash: "0x2".into(),
            })
        }
    }

    struct NoDrafts;

    #[async_trait]
    impl ContentStore for NoDrafts {
        async fn list_draft_content(
            &self,
            _community: &str,
        ) -> beacon_publish::Result<Vec<ContentItem>> {
            Ok(Vec::new())
        }
    }

    struct OneChain;

    #[async_trait]
    impl ChainRegistry for OneChain {
        async fn set_current_chain(&self, _name: &str) -> beacon_publish::Result<()> {
            Ok(())
        }

        fn enabled_chains(&self) -> Vec<String> {
            vec!["mainnet".into()]
        }
    }

    fn engine_with(
        dir: &tempfile::TempDir,
        poster: Arc<RecordingPoster>,
    ) -> SchedulerEngine {
        let config = BeaconConfig {
            data_dir: dir.path().to_string_lossy().into_owned(),
            ..BeaconConfig::default()
        };
        SchedulerEngine::new(&config, poster, Arc::new(NoDrafts), Arc::new(OneChain))
    }

    fn new_task(time: &str) -> NewTask {
        NewTask {
            time: time.to_string(),
            community: "demo".to_string(),
            content_count: 1,
            interval: 1,
            content_type: None,
            use_cache: false,
            wallet_index: None,
            use_random_wallet: false,
            created_by: "tests".to_string(),
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, hour, minute, 0).unwrap()
    }

    /// Drain the worker under the paused clock; the sleeps advance virtual
    /// time past any capped inter-post delay.
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn due_task_executes_and_records_history() {
        let dir = tempfile::tempdir().unwrap();
        let poster = RecordingPoster::new();
        let engine = engine_with(&dir, poster.clone());
        let task = engine.add_task(new_task("09:30")).unwrap();

        engine.tick_once(at(9, 32));
        settle().await;

        assert_eq!(poster.count(), 1);
        let history = engine.task_history(&task.id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ExecutionStatus::Success);
        assert!(history[0].details.contains("post 1: ok"));
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_task_is_skipped_at_exact_trigger_time() {
        let dir = tempfile::tempdir().unwrap();
        let poster = RecordingPoster::new();
        let engine = engine_with(&dir, poster.clone());
        let task = engine.add_task(new_task("09:30")).unwrap();
        engine.set_task_enabled(&task.id, false).unwrap();

        engine.tick_once(at(9, 30));
        settle().await;

        assert_eq!(poster.count(), 0);
        assert!(engine.task_history(&task.id).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn second_tick_same_day_is_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let poster = RecordingPoster::new();
        let engine = engine_with(&dir, poster.clone());
        let task = engine.add_task(new_task("09:30")).unwrap();

        engine.tick_once(at(9, 30));
        settle().await;
        // 3 minutes later, still inside the trigger window.
        engine.tick_once(at(9, 33));
        settle().await;

        assert_eq!(poster.count(), 1);
        assert_eq!(engine.task_history(&task.id).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn outside_window_does_not_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let poster = RecordingPoster::new();
        let engine = engine_with(&dir, poster.clone());
        engine.add_task(new_task("09:30")).unwrap();

        engine.tick_once(at(9, 36)); // 6 minutes late
        engine.tick_once(at(10, 30)); // wrong hour
        settle().await;

        assert_eq!(poster.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_execution_still_gates_reruns() {
        let dir = tempfile::tempdir().unwrap();
        let poster = RecordingPoster::failing();
        let engine = engine_with(&dir, poster.clone());
        let task = engine.add_task(new_task("09:30")).unwrap();

        engine.tick_once(at(9, 30));
        settle().await;
        engine.tick_once(at(9, 33));
        settle().await;

        assert_eq!(poster.count(), 1);
        let history = engine.task_history(&task.id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ExecutionStatus::Failure);
    }

    /// Persist an enabled config without arming the real tick loop, so the
    /// test's synthetic `tick_once` calls are the only ticks that happen.
    fn persist_enabled(dir: &tempfile::TempDir, config: RuntimeConfig) {
        let settings = SettingsStore::new(dir.path());
        settings
            .save(&RuntimeConfig {
                enabled: true,
                ..config
            })
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn auto_publish_cross_product_is_queued() {
        let dir = tempfile::tempdir().unwrap();
        let poster = RecordingPoster::new();
        let engine = engine_with(&dir, poster.clone());
        persist_enabled(
            &dir,
            RuntimeConfig {
                ens_labels: vec!["alpha".into(), "beta".into()],
                wallet_indices: vec![0, 1],
                cron_expression: "0 * * * *".into(),
                ..RuntimeConfig::default()
            },
        );

        engine.tick_once(at(14, 0));
        settle().await;

        // 2 labels × 1 chain (registry fallback) × 2 wallets.
        assert_eq!(poster.count(), 4);
        let status = engine.status();
        assert!(status.last_run_time.is_some());
        assert!(status.last_run_result.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn end_time_auto_stops_and_persists_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let poster = RecordingPoster::new();
        let engine = engine_with(&dir, poster.clone());
        persist_enabled(
            &dir,
            RuntimeConfig {
                ens_labels: vec!["alpha".into()],
                end_time: Some("2026-03-04T12:00:00+00:00".into()),
                ..RuntimeConfig::default()
            },
        );

        engine.tick_once(at(14, 0)); // past the end time
        settle().await;

        assert_eq!(poster.count(), 0);
        assert!(!engine.get_config().enabled);
        assert!(!engine.status().is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn before_start_time_skips_auto_publish_only() {
        let dir = tempfile::tempdir().unwrap();
        let poster = RecordingPoster::new();
        let engine = engine_with(&dir, poster.clone());
        persist_enabled(
            &dir,
            RuntimeConfig {
                ens_labels: vec!["alpha".into()],
                start_time: Some("2026-03-04T16:00:00+00:00".into()),
                cron_expression: "* * * * *".into(),
                ..RuntimeConfig::default()
            },
        );

        engine.tick_once(at(14, 0));
        settle().await;
        assert_eq!(poster.count(), 0);
        // Skipping the window leaves the config enabled for later ticks.
        assert!(engine.get_config().enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_execution_ignores_enabled_flag() {
        let dir = tempfile::tempdir().unwrap();
        let poster = RecordingPoster::new();
        let engine = engine_with(&dir, poster.clone());
        let task = engine.add_task(new_task("09:30")).unwrap();
        engine.set_task_enabled(&task.id, false).unwrap();

        engine.execute_task_now(&task.id).unwrap();
        settle().await;

        assert_eq!(poster.count(), 1);
        assert_eq!(engine.task_history(&task.id).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_execution_of_unknown_task_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_with(&dir, RecordingPoster::new());
        assert!(matches!(
            engine.execute_task_now("task_nope"),
            Err(SchedulerError::TaskNotFound { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_persists_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_with(&dir, RecordingPoster::new());
        engine.start(None).unwrap();
        assert!(engine.get_config().enabled);
        engine.stop().unwrap();
        assert!(!engine.get_config().enabled);
        assert!(!engine.status().is_running);
        assert!(engine.status().next_run_time.is_none());
    }

    #[test]
    fn next_whole_minute_truncates_and_advances() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 9, 30, 42).unwrap();
        let next = next_whole_minute(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 4, 9, 31, 0).unwrap());
    }
}
