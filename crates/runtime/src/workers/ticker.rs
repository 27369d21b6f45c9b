//! Tick driver: the game loop that advances periodic effects.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use combat_core::Tick;

use crate::api::{CombatHandle, Result, RuntimeError};

/// Sends one scheduler tick per `step_ms` of wall time.
///
/// Game time starts at `start` and advances by exactly `step_ms` per step,
/// so a slow consumer delays ticks but never skips game time; the
/// scheduler catches up on every interval it missed.
pub struct TickDriver {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Tick>,
}

impl TickDriver {
    pub fn spawn(handle: CombatHandle, start: Tick, step_ms: u64) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let step_ms = step_ms.max(1);

        let task = tokio::spawn(async move {
            let mut timer = interval(Duration::from_millis(step_ms));
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately.
            timer.tick().await;

            let mut now = start;
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = timer.tick() => {
                        now = now.saturating_add(step_ms);
                        if handle.send_tick(now).await.is_err() {
                            warn!("combat worker gone, tick driver stopping");
                            break;
                        }
                    }
                }
            }
            debug!(%now, "tick driver stopped");
            now
        });

        Self {
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    /// Stops the driver, returning the last game time it sent.
    pub async fn stop(mut self) -> Result<Tick> {
        if let Some(shutdown) = self.shutdown.take() {
            // The task may already have exited on its own.
            let _ = shutdown.send(());
        }
        (&mut self.task).await.map_err(RuntimeError::WorkerJoin)
    }
}
