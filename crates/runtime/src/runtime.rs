//! High-level runtime orchestrator.
//!
//! The runtime owns the combat worker and an optional tick driver, wires up
//! the command channel and event bus, and exposes a builder-based API.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use combat_core::{AbilityCatalog, CombatConfig, CombatState, Roster, Tick};

use crate::api::{CombatHandle, Result, RuntimeError};
use crate::events::{CombatEvent, EventBus, Topic};
use crate::replay::replay;
use crate::repository::{EventRepository, FileEventLog, SnapshotService};
use crate::workers::{Command, CombatWorker, Persistence, TickDriver};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Events between automatic checkpoints when persistence is enabled.
    /// Zero checkpoints only on request and at shutdown.
    pub checkpoint_interval: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            checkpoint_interval: 64,
        }
    }
}

/// Main runtime that orchestrates a combat session.
///
/// [`CombatHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: CombatHandle,
    config: RuntimeConfig,
    worker: JoinHandle<()>,
    ticker: Option<TickDriver>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> CombatHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<CombatEvent> {
        self.handle.subscribe(topic)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Starts driving scheduler ticks from game time `start`, one per
    /// configured tick interval. Replaces any running driver.
    pub async fn start_ticker(&mut self, start: Tick) -> Result<()> {
        self.stop_ticker().await?;
        self.ticker = Some(TickDriver::spawn(
            self.handle.clone(),
            start,
            self.config.combat.tick_interval_ms,
        ));
        Ok(())
    }

    /// Stops the tick driver, returning the last game time it reached.
    pub async fn stop_ticker(&mut self) -> Result<Option<Tick>> {
        match self.ticker.take() {
            Some(ticker) => ticker.stop().await.map(Some),
            None => Ok(None),
        }
    }

    /// Shutdown the runtime gracefully.
    ///
    /// With persistence enabled the worker writes a final checkpoint before
    /// it exits.
    pub async fn shutdown(mut self) -> Result<()> {
        self.stop_ticker().await?;
        drop(self.handle);
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

enum PersistenceSpec {
    Directory(PathBuf),
    Custom {
        snapshots: SnapshotService,
        log: Box<dyn EventRepository>,
    },
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    catalog: Option<Arc<AbilityCatalog>>,
    roster: Option<Roster>,
    state: Option<CombatState>,
    persistence: Option<PersistenceSpec>,
    resume: bool,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            catalog: None,
            roster: None,
            state: None,
            persistence: None,
            resume: false,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override only the engine configuration.
    pub fn combat_config(mut self, combat: CombatConfig) -> Self {
        self.config.combat = combat;
        self
    }

    /// Draws a fresh session seed. A resumed session must reuse the seed it
    /// was started with, so only use this for new sessions.
    pub fn random_seed(mut self) -> Self {
        self.config.combat.session_seed = rand::random();
        self
    }

    /// Set the ability catalog (required)
    pub fn catalog(mut self, catalog: impl Into<Arc<AbilityCatalog>>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Start a fresh session with these combatants.
    pub fn roster(mut self, roster: Roster) -> Self {
        self.roster = Some(roster);
        self
    }

    /// Start from an existing state instead of a fresh roster.
    pub fn initial_state(mut self, state: CombatState) -> Self {
        self.state = Some(state);
        self
    }

    /// Persist snapshots and the event log (`events.log`) under `dir`.
    pub fn persist_to(mut self, dir: impl Into<PathBuf>) -> Self {
        self.persistence = Some(PersistenceSpec::Directory(dir.into()));
        self
    }

    /// Persist through caller-provided repositories.
    pub fn persistence(
        mut self,
        snapshots: SnapshotService,
        log: impl EventRepository + 'static,
    ) -> Self {
        self.persistence = Some(PersistenceSpec::Custom {
            snapshots,
            log: Box::new(log),
        });
        self
    }

    /// Continue from the latest checkpoint, replaying the log tail after it.
    /// Falls back to the roster or initial state when nothing is stored.
    pub fn resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// Build the runtime and spawn its worker.
    pub async fn build(self) -> Result<Runtime> {
        let catalog = self.catalog.ok_or(RuntimeError::MissingCatalog)?;
        let combat = self.config.combat.clone();

        let persistence = match self.persistence {
            None => None,
            Some(PersistenceSpec::Directory(dir)) => Some(Persistence {
                snapshots: SnapshotService::file_based(&dir)?,
                log: Box::new(FileEventLog::open_or_create(&dir, "events.log")?),
                checkpoint_interval: self.config.checkpoint_interval,
            }),
            Some(PersistenceSpec::Custom { snapshots, log }) => Some(Persistence {
                snapshots,
                log,
                checkpoint_interval: self.config.checkpoint_interval,
            }),
        };

        let fresh = || -> Result<CombatState> {
            match (self.state, self.roster) {
                (Some(state), _) => Ok(state),
                (None, Some(roster)) => Ok(CombatState::new(roster, &combat)),
                (None, None) => Err(RuntimeError::MissingState),
            }
        };

        let (state, sequence) = match &persistence {
            Some(persistence) if self.resume => {
                let events = persistence.log.read_all()?;
                match persistence.snapshots.latest()? {
                    Some(checkpoint) => {
                        let tail_start = usize::try_from(checkpoint.sequence)
                            .unwrap_or(usize::MAX)
                            .min(events.len());
                        let outcome =
                            replay(checkpoint.state, &events[tail_start..], &catalog, &combat)?;
                        tracing::info!(
                            checkpoint = checkpoint.sequence,
                            replayed = outcome.applied,
                            "resumed from checkpoint"
                        );
                        (outcome.state, events.len() as u64)
                    }
                    None => {
                        let outcome = replay(fresh()?, &events, &catalog, &combat)?;
                        (outcome.state, events.len() as u64)
                    }
                }
            }
            Some(persistence) => (fresh()?, persistence.log.read_all()?.len() as u64),
            None => (fresh()?, 0),
        };

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = CombatHandle::new(command_tx, event_bus.clone());

        let worker = CombatWorker::new(
            state,
            catalog,
            combat,
            command_rx,
            event_bus,
            persistence,
            sequence,
        );
        let worker = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            config: self.config,
            worker,
            ticker: None,
        })
    }
}
