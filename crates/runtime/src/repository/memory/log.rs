//! In-memory event log implementation.

use std::sync::{Arc, RwLock};

use crate::events::CombatEvent;
use crate::repository::{EventRepository, RepositoryError, Result};

/// In-memory event log for testing and development.
///
/// Offsets are entry indices. Clones share the same storage, so a test can
/// hand one clone to the worker and inspect the other.
#[derive(Clone)]
pub struct InMemoryEventLog {
    session_id: String,
    events: Arc<RwLock<Vec<CombatEvent>>>,
}

impl InMemoryEventLog {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl EventRepository for InMemoryEventLog {
    fn append(&mut self, event: &CombatEvent) -> Result<u64> {
        let mut events = self
            .events
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        events.push(event.clone());
        Ok(events.len() as u64 - 1)
    }

    fn read_at_offset(&self, offset: u64) -> Result<Option<(CombatEvent, u64)>> {
        let events = self
            .events
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(usize::try_from(offset)
            .ok()
            .and_then(|index| events.get(index).cloned())
            .map(|event| (event, offset + 1)))
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        let events = self
            .events
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(events.len() as u64)
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn read_all(&self) -> Result<Vec<CombatEvent>> {
        let events = self
            .events
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(events.clone())
    }
}
