//! Unified error types surfaced by the runtime API.
//!
//! Wraps cast validation failures, worker coordination failures and
//! repository errors so clients can bubble them up with consistent context.

use combat_core::{AbilityId, CombatError, ErrorSeverity, ValidationError};
use thiserror::Error;
use tokio::sync::oneshot;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("cast rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error("combat worker command channel closed")]
    CommandChannelClosed,

    #[error("combat worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("runtime requires an ability catalog before building")]
    MissingCatalog,

    #[error("runtime requires a roster or a checkpoint before building")]
    MissingState,

    #[error("persistence is not configured")]
    PersistenceDisabled,

    #[error("replay diverged at event {index}: {reason}")]
    ReplayDiverged { index: usize, reason: String },

    #[error("replay references unknown ability {0}")]
    ReplayUnknownAbility(AbilityId),

    #[error("failed to encode state digest: {0}")]
    Digest(String),
}

impl RuntimeError {
    /// Severity of the underlying failure, following [`CombatError`].
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Validation(error) => error.severity(),
            RuntimeError::MissingCatalog
            | RuntimeError::MissingState
            | RuntimeError::PersistenceDisabled => ErrorSeverity::Validation,
            RuntimeError::ReplayDiverged { .. }
            | RuntimeError::ReplayUnknownAbility(_)
            | RuntimeError::Digest(_) => ErrorSeverity::Internal,
            RuntimeError::CommandChannelClosed
            | RuntimeError::ReplyChannelClosed(_)
            | RuntimeError::WorkerJoin(_)
            | RuntimeError::Repository(_) => ErrorSeverity::Fatal,
        }
    }
}
