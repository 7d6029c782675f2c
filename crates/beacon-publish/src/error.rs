use thiserror::Error;

/// Errors surfaced by the external publishing collaborators.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Content generation or the publish call itself failed.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Chain switch / chain configuration failure.
    #[error("Chain error: {0}")]
    Chain(String),

    /// Draft listing / content storage failure.
    #[error("Content store error: {0}")]
    ContentStore(String),
}

pub type Result<T> = std::result::Result<T, PublishError>;
