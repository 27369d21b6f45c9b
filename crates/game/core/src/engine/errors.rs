//! Errors surfaced by the resolution pipeline.

use crate::ability::AbilityId;
use crate::error::{CombatError, ErrorSeverity};
use crate::scheduler::SchedulerError;
use crate::state::{CombatantId, Tick};
use crate::stats::Stat;

/// Reasons a cast is rejected before anything is mutated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationError {
    #[error("unknown ability {0}")]
    UnknownAbility(AbilityId),

    #[error("unknown combatant {0}")]
    UnknownCombatant(CombatantId),

    #[error("caster {0} is defeated")]
    CasterDefeated(CombatantId),

    #[error("insufficient resource: need {required}, have {available}")]
    InsufficientResource { required: u32, available: u32 },

    #[error("ability on cooldown until {ready_at}")]
    OnCooldown { ready_at: Tick },

    /// `stat` is `Stat::Level` for the level requirement.
    #[error("requirement not met: {stat} must be at least {required} (is {actual})")]
    RequirementNotMet {
        stat: Stat,
        required: i32,
        actual: i32,
    },

    #[error("unknown stat '{0}'")]
    UnknownStat(String),
}

impl CombatError for ValidationError {
    fn severity(&self) -> ErrorSeverity {
        use ValidationError::*;
        match self {
            InsufficientResource { .. } | OnCooldown { .. } => ErrorSeverity::Recoverable,
            UnknownAbility(_) | UnknownCombatant(_) | UnknownStat(_) => ErrorSeverity::Validation,
            CasterDefeated(_) | RequirementNotMet { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use ValidationError::*;
        match self {
            UnknownAbility(_) => "CAST_UNKNOWN_ABILITY",
            UnknownCombatant(_) => "CAST_UNKNOWN_COMBATANT",
            CasterDefeated(_) => "CAST_CASTER_DEFEATED",
            InsufficientResource { .. } => "CAST_INSUFFICIENT_RESOURCE",
            OnCooldown { .. } => "CAST_ON_COOLDOWN",
            RequirementNotMet { .. } => "CAST_REQUIREMENT_NOT_MET",
            UnknownStat(_) => "CAST_UNKNOWN_STAT",
        }
    }
}

/// A per-effect problem recorded in a committed cast.
///
/// Faults never roll back the cast; the remaining effects still resolve.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectFault {
    /// The chance roll failed.
    #[error("effect #{order} was resisted")]
    Resisted { order: u16 },

    /// The recipient was already at zero health when the effect came up.
    #[error("effect #{order} skipped: {recipient} is defeated")]
    TargetDefeated { order: u16, recipient: CombatantId },

    /// The scheduler refused the periodic portion.
    #[error("effect #{order} not scheduled: {error}")]
    SchedulerRejected { order: u16, error: SchedulerError },

    /// The recipient has no free attribute modifier slot.
    #[error("effect #{order} skipped: {recipient} has no free modifier slot")]
    ModifierSlotsFull { order: u16, recipient: CombatantId },
}

impl EffectFault {
    pub fn order(&self) -> u16 {
        match self {
            Self::Resisted { order }
            | Self::TargetDefeated { order, .. }
            | Self::SchedulerRejected { order, .. }
            | Self::ModifierSlotsFull { order, .. } => *order,
        }
    }
}

impl CombatError for EffectFault {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Resisted { .. } => "EFFECT_RESISTED",
            Self::TargetDefeated { .. } => "EFFECT_TARGET_DEFEATED",
            Self::SchedulerRejected { .. } => "EFFECT_SCHEDULER_REJECTED",
            Self::ModifierSlotsFull { .. } => "EFFECT_MODIFIER_SLOTS_FULL",
        }
    }
}
