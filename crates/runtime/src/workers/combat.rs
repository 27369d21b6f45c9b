//! Combat worker that owns the authoritative [`CombatState`].
//!
//! Receives commands from [`crate::CombatHandle`], runs them through
//! [`ResolutionEngine`], appends every outcome to the event log and
//! publishes it on the [`EventBus`].

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use combat_core::{
    AbilityCatalog, AbilityId, ActiveEffect, ActiveEffectId, CastResult, CombatConfig, CombatEnv,
    CombatState, CombatantId, PcgRng, ResolutionEngine, Tick, TickReport,
};

use crate::api::{Result, RuntimeError};
use crate::events::{CombatEvent, EventBus};
use crate::repository::{EventRepository, SnapshotService};

/// Commands that can be sent to the combat worker
pub enum Command {
    Cast {
        caster: CombatantId,
        target: CombatantId,
        ability: AbilityId,
        at: Tick,
        reply: oneshot::Sender<Result<CastResult>>,
    },
    /// Advance the scheduler. The tick driver sends these without a reply.
    Tick {
        now: Tick,
        reply: Option<oneshot::Sender<TickReport>>,
    },
    Cancel {
        effect: ActiveEffectId,
        reply: oneshot::Sender<Option<ActiveEffect>>,
    },
    Dispel {
        target: CombatantId,
        reply: oneshot::Sender<Vec<ActiveEffectId>>,
    },
    /// Query the current combat state (read-only).
    QueryState { reply: oneshot::Sender<CombatState> },
    /// Persist a checkpoint immediately.
    Checkpoint { reply: oneshot::Sender<Result<u64>> },
}

/// Event log plus snapshot storage.
pub(crate) struct Persistence {
    pub snapshots: SnapshotService,
    pub log: Box<dyn EventRepository>,
    /// Events between automatic checkpoints; zero disables them.
    pub checkpoint_interval: u64,
}

/// Background task that processes combat commands.
pub(crate) struct CombatWorker {
    state: CombatState,
    catalog: Arc<AbilityCatalog>,
    config: CombatConfig,
    rng: PcgRng,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    persistence: Option<Persistence>,
    /// Events recorded so far, including those before a resume.
    sequence: u64,
    /// Latest game time seen in a cast or tick.
    clock: Tick,
}

impl CombatWorker {
    pub(crate) fn new(
        state: CombatState,
        catalog: Arc<AbilityCatalog>,
        config: CombatConfig,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        persistence: Option<Persistence>,
        sequence: u64,
    ) -> Self {
        info!(
            combatants = state.roster.len(),
            active_effects = state.scheduler.len(),
            abilities = catalog.len(),
            sequence,
            "combat worker initialized"
        );

        Self {
            state,
            catalog,
            config,
            rng: PcgRng,
            command_rx,
            event_bus,
            persistence,
            sequence,
            clock: Tick::ZERO,
        }
    }

    /// Main worker loop. Returns once every handle has been dropped.
    pub(crate) async fn run(mut self) {
        while let Some(command) = self.command_rx.recv().await {
            self.handle_command(command);
        }

        if self.persistence.is_some()
            && let Err(e) = self.checkpoint()
        {
            error!("final checkpoint failed: {}", e);
        }
        info!(sequence = self.sequence, "combat worker stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Cast {
                caster,
                target,
                ability,
                at,
                reply,
            } => {
                let result = self.cast(caster, target, ability, at);
                if reply.send(result).is_err() {
                    debug!("Cast reply channel closed (caller dropped)");
                }
            }
            Command::Tick { now, reply } => {
                let report = self.tick(now);
                if let Some(reply) = reply
                    && reply.send(report).is_err()
                {
                    debug!("Tick reply channel closed (caller dropped)");
                }
            }
            Command::Cancel { effect, reply } => {
                let cancelled = ResolutionEngine::new(&mut self.state).cancel(effect);
                if cancelled.is_some() {
                    self.record(CombatEvent::EffectCancelled {
                        effect,
                        at: self.clock,
                    });
                }
                if reply.send(cancelled).is_err() {
                    debug!("Cancel reply channel closed (caller dropped)");
                }
            }
            Command::Dispel { target, reply } => {
                let cancelled = ResolutionEngine::new(&mut self.state).dispel(target);
                self.record(CombatEvent::Dispelled {
                    target,
                    at: self.clock,
                    cancelled: cancelled.clone(),
                });
                if reply.send(cancelled).is_err() {
                    debug!("Dispel reply channel closed (caller dropped)");
                }
            }
            Command::QueryState { reply } => {
                if reply.send(self.state.clone()).is_err() {
                    debug!("QueryState reply channel closed (caller dropped)");
                }
            }
            Command::Checkpoint { reply } => {
                if reply.send(self.checkpoint()).is_err() {
                    debug!("Checkpoint reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn cast(
        &mut self,
        caster: CombatantId,
        target: CombatantId,
        ability: AbilityId,
        at: Tick,
    ) -> Result<CastResult> {
        self.clock = self.clock.max(at);
        let env = CombatEnv::new(&self.catalog, &self.rng, &self.config);
        let outcome = ResolutionEngine::new(&mut self.state).cast(env, caster, target, ability, at);

        match outcome {
            Ok(result) => {
                self.record(CombatEvent::CastResolved(result.clone()));
                Ok(result)
            }
            Err(error) => {
                self.record(CombatEvent::CastRejected {
                    caster,
                    target,
                    ability,
                    at,
                    error: error.clone(),
                });
                Err(RuntimeError::Validation(error))
            }
        }
    }

    fn tick(&mut self, now: Tick) -> TickReport {
        self.clock = self.clock.max(now);
        let report = ResolutionEngine::new(&mut self.state).tick(now);
        if !report.is_empty() {
            self.record(CombatEvent::TicksApplied(report.clone()));
        }
        report
    }

    /// Logs, publishes and, every `checkpoint_interval` events, checkpoints.
    ///
    /// `sequence` only counts events that reached the log. When an append
    /// fails the state already holds the event, so a checkpoint is taken
    /// straight away; resuming from it never needs the missing entry.
    fn record(&mut self, event: CombatEvent) {
        let mut due = false;
        let mut logged = true;
        if let Some(persistence) = &mut self.persistence {
            match persistence.log.append(&event) {
                Ok(_) => {
                    let interval = persistence.checkpoint_interval;
                    due = interval > 0 && (self.sequence + 1) % interval == 0;
                }
                Err(e) => {
                    error!(
                        sequence = self.sequence,
                        "failed to append event, checkpointing instead: {}", e
                    );
                    logged = false;
                    due = true;
                }
            }
        }

        if logged {
            self.sequence += 1;
        }
        self.event_bus.publish(event);

        if due && let Err(e) = self.checkpoint() {
            error!(sequence = self.sequence, "automatic checkpoint failed: {}", e);
        }
    }

    fn checkpoint(&mut self) -> Result<u64> {
        let persistence = self
            .persistence
            .as_mut()
            .ok_or(RuntimeError::PersistenceDisabled)?;
        persistence.log.flush()?;
        persistence.snapshots.save(self.sequence, &self.state)?;
        Ok(self.sequence)
    }
}
