use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ContentItem, PostReceipt};

/// Publishes content to a community feed, optionally signing with a
/// specific derived wallet.
#[async_trait]
pub trait Poster: Send + Sync {
    /// Publish an existing draft by id.
    async fn publish(
        &self,
        community: &str,
        content_id: &str,
        wallet_index: Option<u32>,
    ) -> Result<PostReceipt>;

    /// Generate fresh content and publish it in one step. `prompt` is an
    /// optional steering text; `None` lets the provider pick a topic.
    async fn generate_and_publish(
        &self,
        community: &str,
        prompt: Option<&str>,
        wallet_index: Option<u32>,
    ) -> Result<PostReceipt>;
}

/// Read access to previously generated, not-yet-published drafts.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All drafts for a community, including already-published ones —
    /// callers filter on [`ContentItem::published`].
    async fn list_draft_content(&self, community: &str) -> Result<Vec<ContentItem>>;
}

/// Switches the active chain before a publish attempt in the multi-chain
/// auto-publish path.
#[async_trait]
pub trait ChainRegistry: Send + Sync {
    async fn set_current_chain(&self, name: &str) -> Result<()>;

    /// Names of all chains publishing is currently enabled for.
    fn enabled_chains(&self) -> Vec<String>;
}
