//! Content validation errors.

use crate::error::{CombatError, ErrorSeverity};

/// Reasons an ability batch is rejected at catalog load time.
///
/// The first violation aborts the load; no partial catalog is ever built.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContentError {
    /// Two abilities share a name.
    #[error("duplicate ability name '{0}'")]
    DuplicateName(String),

    /// Two abilities share an id.
    #[error("duplicate ability id {0}")]
    DuplicateId(u32),

    /// An ability has no effects at all.
    #[error("ability '{0}' has no effects")]
    EmptyAbility(String),

    /// Effect orders are not exactly `1..=n`.
    #[error("ability '{ability}' has non-contiguous effect order (expected {expected}, found {found})")]
    NonContiguousOrder {
        ability: String,
        expected: u16,
        found: u16,
    },

    /// An effect carries fields its kind does not allow, or misses required ones.
    #[error("ability '{ability}' effect #{order} is malformed: {reason}")]
    MalformedEffect {
        ability: String,
        order: u16,
        reason: String,
    },

    /// A stat or attribute name that the resolver does not recognise.
    #[error("ability '{ability}' references unknown stat '{name}'")]
    UnknownStat { ability: String, name: String },

    /// Ability-level fields are out of range.
    #[error("ability '{ability}' is malformed: {reason}")]
    MalformedAbility { ability: String, reason: String },
}

impl ContentError {
    pub(crate) fn malformed(ability: &str, order: u16, reason: impl Into<String>) -> Self {
        Self::MalformedEffect {
            ability: ability.to_string(),
            order,
            reason: reason.into(),
        }
    }
}

impl CombatError for ContentError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateName(_) => "CONTENT_DUPLICATE_NAME",
            Self::DuplicateId(_) => "CONTENT_DUPLICATE_ID",
            Self::EmptyAbility(_) => "CONTENT_EMPTY_ABILITY",
            Self::NonContiguousOrder { .. } => "CONTENT_NON_CONTIGUOUS_ORDER",
            Self::MalformedEffect { .. } => "CONTENT_MALFORMED_EFFECT",
            Self::UnknownStat { .. } => "CONTENT_UNKNOWN_STAT",
            Self::MalformedAbility { .. } => "CONTENT_MALFORMED_ABILITY",
        }
    }
}
