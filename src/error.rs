use crate::models::MatchState;

/// Failure from the underlying persistence layer, opaque to the engine.
/// Propagated unchanged so callers can retry the idempotent operations
/// (`record_like`, insert-if-absent transitions, `graceful_exit`).
#[derive(Debug, thiserror::Error)]
#[error("storage backend failure: {0}")]
pub struct StorageError(#[from] pub anyhow::Error);

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(anyhow::anyhow!(message.into()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A precondition was violated: self-target swipe, inactive actor,
    /// blocked pair, friend-zone message too short, duplicate pending
    /// request. Recoverable, never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An attempted match state change not present in the transition table.
    /// The match is left unchanged.
    #[error("illegal state transition: {from:?} -> {to:?}")]
    IllegalTransition { from: MatchState, to: MatchState },

    /// The relationship is blocked; no further transitions are possible.
    #[error("relationship is blocked")]
    BlockedRelationship,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
