//! Event notification for games and clocks.
//!
//! Each game or clock owns its listeners. Events are delivered
//! synchronously, in registration order, on the stack of the operation
//! that caused them. Listeners cannot reach back into the emitter: they
//! only get a shared reference to the event.

use super::action::Move;
use super::game::Outcome;
use super::types::Player;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Callback invoked for each emitted event.
pub type Listener<E> = Box<dyn FnMut(&E) + Send>;

/// Listener set owned by a single emitter.
pub struct Listeners<E> {
    listeners: Vec<Listener<E>>,
}

impl<E> Listeners<E> {
    /// Creates an empty listener set.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers a listener.
    pub fn register(&mut self, listener: Listener<E>) {
        self.listeners.push(listener);
    }

    /// Delivers an event to every listener.
    pub fn emit(&mut self, event: &E) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Checks if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

/// Something that happened to a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GameEvent {
    /// A move was accepted and applied.
    Played(Move),
    /// The game left the playing state. Fired at most once.
    #[serde(rename_all = "camelCase")]
    Ended {
        /// Winner, absent for cancellation.
        winner: Option<Player>,
        /// Terminal classification, absent for a win by connection.
        outcome: Option<Outcome>,
        /// When the game ended.
        ended_at: DateTime<Utc>,
    },
}
