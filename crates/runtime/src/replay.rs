//! Deterministic replay of a combat event log.
//!
//! Rolls are pure functions of the session seed, the cast nonce and the
//! effect, so re-running the logged commands against the same starting
//! state reproduces every number. Replay re-executes each state-changing
//! event and checks the engine reports the same outcome the log recorded.

use combat_core::{
    AbilityCatalog, CombatConfig, CombatEnv, CombatState, PcgRng, ResolutionEngine,
    ValidationError,
};

use crate::api::{Result, RuntimeError};
use crate::events::CombatEvent;

/// Final state of a replay.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub state: CombatState,
    /// Events re-executed.
    pub applied: usize,
    /// Events with no state effect (rejected casts).
    pub skipped: usize,
    /// SHA-256 of the final state.
    pub digest: [u8; 32],
}

impl ReplayOutcome {
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// SHA-256 over the bincode encoding of `state`.
pub fn state_digest(state: &CombatState) -> Result<[u8; 32]> {
    state
        .digest()
        .map_err(|e| RuntimeError::Digest(e.to_string()))
}

/// Replays `events` on top of `initial`.
///
/// Fails with [`RuntimeError::ReplayDiverged`] as soon as a re-executed
/// event produces a different outcome from the logged one.
pub fn replay(
    initial: CombatState,
    events: &[CombatEvent],
    catalog: &AbilityCatalog,
    config: &CombatConfig,
) -> Result<ReplayOutcome> {
    let rng = PcgRng;
    let env = CombatEnv::new(catalog, &rng, config);
    let mut state = initial;
    let mut applied = 0;
    let mut skipped = 0;

    for (index, event) in events.iter().enumerate() {
        let diverged = |reason: String| RuntimeError::ReplayDiverged { index, reason };
        let mut engine = ResolutionEngine::new(&mut state);

        match event {
            CombatEvent::CastResolved(recorded) => {
                let result = engine
                    .cast(
                        env,
                        recorded.caster,
                        recorded.target,
                        recorded.ability,
                        recorded.cast_at,
                    )
                    .map_err(|error| match error {
                        ValidationError::UnknownAbility(id) => {
                            RuntimeError::ReplayUnknownAbility(id)
                        }
                        other => diverged(format!("cast rejected on replay: {}", other)),
                    })?;
                if result != *recorded {
                    return Err(diverged(format!(
                        "cast of {} at {} resolved differently",
                        recorded.ability, recorded.cast_at
                    )));
                }
            }
            CombatEvent::CastRejected { .. } => {
                skipped += 1;
                continue;
            }
            CombatEvent::TicksApplied(recorded) => {
                let report = engine.tick(recorded.now);
                if report != *recorded {
                    return Err(diverged(format!("tick at {} differs", recorded.now)));
                }
            }
            CombatEvent::EffectCancelled { effect, .. } => {
                if engine.cancel(*effect).is_none() {
                    return Err(diverged(format!("{} was not active", effect)));
                }
            }
            CombatEvent::Dispelled {
                target, cancelled, ..
            } => {
                if engine.dispel(*target) != *cancelled {
                    return Err(diverged(format!("dispel of {} differs", target)));
                }
            }
        }
        applied += 1;
    }

    let digest = state_digest(&state)?;
    tracing::info!(
        applied,
        skipped,
        digest = %hex::encode(digest),
        "replay complete"
    );
    Ok(ReplayOutcome {
        state,
        applied,
        skipped,
        digest,
    })
}
