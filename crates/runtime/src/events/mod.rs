//! Topic-based event bus for combat events.
//!
//! Every state change the worker commits is published as a [`CombatEvent`]
//! on one of two topics, and consumers subscribe only to what they need.

mod bus;
mod types;

pub use bus::{EventBus, Topic};
pub use types::CombatEvent;
