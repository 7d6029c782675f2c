//! Multi-post execution of a single task.
//!
//! Posts are strictly sequential with a capped wait between them. Each post
//! is independently caught: a failure in post #k becomes an outcome line and
//! the loop continues with post #k+1. The executor only orchestrates — the
//! publish mechanics live behind the `beacon-publish` traits.

use std::sync::Arc;
use std::time::Duration;

use beacon_publish::{ContentStore, PostReceipt, Poster};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::types::{ExecutionResult, ScheduleTask};

/// Upper bound on the wait between successive posts, minutes. Bounds the
/// worst-case runtime of one execution regardless of the configured interval.
pub const MAX_POST_GAP_MINUTES: u32 = 5;

/// Wallets 0..N are available for random signing.
const RANDOM_WALLET_POOL: u32 = 10;

pub struct TaskExecutor {
    poster: Arc<dyn Poster>,
    content: Arc<dyn ContentStore>,
}

impl TaskExecutor {
    pub fn new(poster: Arc<dyn Poster>, content: Arc<dyn ContentStore>) -> Self {
        Self { poster, content }
    }

    /// Run the task's full publish sequence and return per-post outcomes.
    ///
    /// `success` is true only if every post succeeded — a partial run is a
    /// failure for audit purposes, and still counts as today's execution
    /// for the de-duplication gate.
    pub async fn execute(&self, task: &ScheduleTask) -> ExecutionResult {
        let mut outcomes = Vec::with_capacity(task.content_count as usize);
        let mut all_ok = true;

        for n in 1..=task.content_count {
            if n > 1 {
                let gap = task.interval.min(MAX_POST_GAP_MINUTES);
                debug!(task_id = %task.id, minutes = gap, "waiting before next post");
                tokio::time::sleep(Duration::from_secs(u64::from(gap) * 60)).await;
            }

            match self.publish_one(task).await {
                Ok(receipt) => {
                    info!(task_id = %task.id, post = n, tx = %receipt.tx_hash, "post published");
                    outcomes.push(format!("post {n}: ok (tx {})", receipt.tx_hash));
                }
                Err(e) => {
                    warn!(task_id = %task.id, post = n, "post failed: {e}");
                    all_ok = false;
                    outcomes.push(format!("post {n}: failed: {e}"));
                }
            }
        }

        ExecutionResult {
            success: all_ok,
            outcomes,
        }
    }

    async fn publish_one(&self, task: &ScheduleTask) -> beacon_publish::Result<PostReceipt> {
        let wallet = if task.use_random_wallet {
            Some(rand::rng().random_range(0..RANDOM_WALLET_POOL))
        } else {
            task.wallet_index
        };

        if task.use_cache {
            let mut drafts = self.content.list_draft_content(&task.community).await?;
            drafts.retain(|d| !d.published);
            drafts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            if let Some(draft) = drafts.first() {
                debug!(task_id = %task.id, draft = %draft.id, "publishing cached draft");
                return self.poster.publish(&task.community, &draft.id, wallet).await;
            }
            debug!(task_id = %task.id, "no unpublished draft — generating fresh content");
        }

        // A non-default content type steers generation; "default" lets the
        // provider pick.
        let prompt = (task.content_type != "default").then(|| task.content_type.clone());
        self.poster
            .generate_and_publish(&task.community, prompt.as_deref(), wallet)
            .await
    }
}
