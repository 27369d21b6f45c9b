/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Seed mixed into every roll. Replaying a session requires the same seed.
    pub session_seed: u64,
    /// Maximum number of periodic effects that may be active on one target.
    pub max_active_per_target: u32,
    /// Game-loop step in milliseconds used by drivers that call `tick`.
    pub tick_interval_ms: u64,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Attribute modifiers a single combatant can carry at once.
    pub const MAX_MODIFIERS: usize = 16;

    /// Attribute value that yields no scaling bonus.
    pub const STAT_BASELINE: i32 = 10;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_ACTIVE_PER_TARGET: u32 = 16;
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 250;

    pub fn new() -> Self {
        Self {
            session_seed: 0,
            max_active_per_target: Self::DEFAULT_MAX_ACTIVE_PER_TARGET,
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
        }
    }

    pub fn with_seed(session_seed: u64) -> Self {
        Self {
            session_seed,
            ..Self::new()
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
