use serde::{Deserialize, Serialize};

/// Result envelope for every operation exposed to transport adapters.
///
/// Adapters (CLI, Telegram, HTTP) render `message` verbatim and may attach
/// `data` for structured consumers. Failures are always carried in-band —
/// a handler returning `CommandResponse` never panics the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    /// Human-readable summary of the outcome.
    pub message: String,
    /// Optional structured payload (task lists, status snapshots, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn ok_with(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}
