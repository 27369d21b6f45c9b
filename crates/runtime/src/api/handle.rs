//! Cloneable façade for issuing commands to the combat worker.
//!
//! [`CombatHandle`] hides channel plumbing and offers async helpers for
//! casting, ticking and streaming events from specific topics.

use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use combat_core::{
    AbilityId, ActiveEffect, ActiveEffectId, CastResult, CombatState, CombatantId, Tick,
    TickReport,
};

use super::errors::{Result, RuntimeError};
use crate::events::{CombatEvent, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to the runtime.
#[derive(Clone)]
pub struct CombatHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl CombatHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Casts `ability` from `caster` at `target` at game time `at`.
    ///
    /// A validation failure comes back as [`RuntimeError::Validation`] and
    /// leaves the combat state untouched.
    pub async fn cast(
        &self,
        caster: CombatantId,
        target: CombatantId,
        ability: AbilityId,
        at: Tick,
    ) -> Result<CastResult> {
        self.request(|reply| Command::Cast {
            caster,
            target,
            ability,
            at,
            reply,
        })
        .await?
    }

    /// Advances every periodic effect due at or before `now`.
    pub async fn tick(&self, now: Tick) -> Result<TickReport> {
        self.request(|reply| Command::Tick {
            now,
            reply: Some(reply),
        })
        .await
    }

    /// Cancels one active effect, returning it if it was still live.
    pub async fn cancel(&self, effect: ActiveEffectId) -> Result<Option<ActiveEffect>> {
        self.request(|reply| Command::Cancel { effect, reply }).await
    }

    /// Removes every periodic effect and untimed modifier from `target`.
    pub async fn dispel(&self, target: CombatantId) -> Result<Vec<ActiveEffectId>> {
        self.request(|reply| Command::Dispel { target, reply }).await
    }

    /// Query the current combat state (read-only snapshot)
    pub async fn query_state(&self) -> Result<CombatState> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Persists a checkpoint now, returning its sequence number.
    pub async fn checkpoint(&self) -> Result<u64> {
        self.request(|reply| Command::Checkpoint { reply }).await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut casts = handle.subscribe(Topic::Cast);
    /// while let Ok(event) = casts.recv().await {
    ///     // Handle cast outcomes
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<CombatEvent> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<CombatEvent>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Fire-and-forget tick used by the tick driver.
    pub(crate) async fn send_tick(&self, now: Tick) -> Result<()> {
        self.command_tx
            .send(Command::Tick { now, reply: None })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
