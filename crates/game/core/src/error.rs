//! Shared error classification for combat-core.
//!
//! Domain errors live next to the component that raises them
//! (`ContentError` in [`crate::ability`], `ValidationError` in
//! [`crate::engine`], `SchedulerError` in [`crate::scheduler`]). Each
//! implements [`CombatError`] so callers can route failures without matching
//! on every variant.

use core::fmt;

/// How a caller should react to a failed cast, load or tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Retry once time passes or a resource refills (cooldown, mana).
    Recoverable,

    /// The request or the authored content is wrong; retrying the same input
    /// fails the same way.
    Validation,

    /// Engine bookkeeping disagrees with itself.
    Internal,

    /// Persisted or in-memory state can no longer be trusted.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every error type the engine raises.
///
/// Error codes are stable strings suitable for combat logs; severity is
/// about recoverability, not impact.
pub trait CombatError: fmt::Display + fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ValidationError;
    use crate::state::Tick;

    #[test]
    fn cooldowns_are_recoverable() {
        let error = ValidationError::OnCooldown {
            ready_at: Tick(2000),
        };
        assert!(error.severity().is_recoverable());
        assert_eq!(error.error_code(), "CAST_ON_COOLDOWN");
        assert_eq!(ErrorSeverity::Validation.to_string(), "validation");
    }
}
