use crate::error::{CombatError, ErrorSeverity};
use crate::state::CombatantId;

/// Registration failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SchedulerError {
    /// The target already carries the maximum number of periodic effects.
    #[error("target {target} already has {limit} active periodic effects")]
    TargetSaturated { target: CombatantId, limit: u32 },
}

impl CombatError for SchedulerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TargetSaturated { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::TargetSaturated { .. } => "SCHEDULER_TARGET_SATURATED",
        }
    }
}
