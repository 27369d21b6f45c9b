//! Persisted record types.

use combat_core::{CooldownLedger, Roster};
use serde::{Deserialize, Serialize};

/// Combatants and cooldowns at one checkpoint.
///
/// Paired with a [`combat_core::SchedulerSnapshot`] stored under the same
/// sequence number, this is everything needed to rebuild a
/// [`combat_core::CombatState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantRecord {
    /// Cast nonce of the state this record was taken from.
    pub nonce: u64,
    pub roster: Roster,
    pub cooldowns: CooldownLedger,
}
