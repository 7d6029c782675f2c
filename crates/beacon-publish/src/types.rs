use serde::{Deserialize, Serialize};

/// Receipt returned by a successful publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostReceipt {
    /// Identifier of the published content, when the collaborator created one.
    pub content_id: Option<String>,
    /// Transaction hash of the on-chain publish.
    pub tx_hash: String,
}

/// A stored content draft, as listed by the content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    /// Target community feed this draft was generated for.
    pub community: String,
    /// RFC3339 creation timestamp — drafts are preferred oldest-first.
    pub created_at: String,
    /// True once the draft has been published to a feed.
    #[serde(default)]
    pub published: bool,
}
