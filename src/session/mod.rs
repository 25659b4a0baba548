//! Game session hosting.
//!
//! Every game lives in its own [`GameSession`] behind its own mutex; the
//! map-level mutex only guards lookup and insertion. All operations on one
//! game are therefore strictly ordered, while different games proceed
//! independently.

mod error;
mod game_session;

pub use error::SessionError;
pub use game_session::{
    GameOptions, GameSession, MoveOutcome, SessionEvent, SessionSnapshot, TimeControlSnapshot,
};

use chrono::{DateTime, Utc};
use hex_engine::{Move, Player};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Unique identifier for a player.
pub type PlayerId = String;

/// Locks a mutex, recovering the data if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Manages all game sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<SessionId, Arc<Mutex<GameSession>>>>>,
}

impl SessionManager {
    /// Creates a new session manager.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session manager");
        Self::default()
    }

    fn session(&self, id: &str) -> Result<Arc<Mutex<GameSession>>, SessionError> {
        lock(&self.sessions).get(id).cloned().ok_or_else(|| {
            debug!(session_id = id, "Session not found");
            SessionError::GameNotFound(id.to_string())
        })
    }

    fn insert(&self, session: GameSession) -> Result<(), SessionError> {
        let mut sessions = lock(&self.sessions);
        if sessions.contains_key(session.id()) {
            warn!(session_id = session.id(), "Session already exists");
            return Err(SessionError::GameAlreadyExists(session.id().to_string()));
        }
        sessions.insert(session.id().to_string(), Arc::new(Mutex::new(session)));
        Ok(())
    }

    /// Runs `f` on a game while holding its lock.
    pub fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut GameSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let session = self.session(id)?;
        let mut guard = lock(&session);
        f(&mut guard)
    }

    /// Creates a game.
    #[instrument(skip(self, options))]
    pub fn create_game(
        &self,
        id: &str,
        options: &GameOptions,
        at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if lock(&self.sessions).contains_key(id) {
            warn!(session_id = id, "Session already exists");
            return Err(SessionError::GameAlreadyExists(id.to_string()));
        }
        self.insert(GameSession::new(id.to_string(), options, at)?)
    }

    /// Seats a player. Returns `true` when newly seated.
    ///
    /// The second seat starts player 0's clock.
    #[instrument(skip(self))]
    pub fn join_game(
        &self,
        id: &str,
        player_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, SessionError> {
        self.with_session(id, |session| session.join(player_id, at))
    }

    /// Plays a move for a seated player.
    #[instrument(skip(self))]
    pub fn submit_move(
        &self,
        id: &str,
        player_id: &str,
        mv: Move,
    ) -> Result<MoveOutcome, SessionError> {
        self.with_session(id, |session| session.submit_move(player_id, mv))
    }

    /// Resigns for a seated player.
    #[instrument(skip(self))]
    pub fn resign_game(
        &self,
        id: &str,
        player_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        self.with_session(id, |session| session.resign(player_id, at))
    }

    /// Cancels a game.
    #[instrument(skip(self))]
    pub fn cancel_game(&self, id: &str, at: DateTime<Utc>) -> Result<(), SessionError> {
        self.with_session(id, |session| session.cancel(at))
    }

    /// Settles every running clock; flagged players lose by resignation.
    ///
    /// Returns the games that ended now with their flagged player.
    #[instrument(skip(self))]
    pub fn check_timeouts(&self, now: DateTime<Utc>) -> Vec<(SessionId, Player)> {
        let sessions: Vec<_> = lock(&self.sessions).values().cloned().collect();
        let mut timed_out = Vec::new();

        for session in sessions {
            let mut guard = lock(&session);
            match guard.expire(now) {
                Ok(Some(player)) => timed_out.push((guard.id().to_string(), player)),
                Ok(None) => {}
                Err(e) => warn!(session_id = guard.id(), error = %e, "Timeout check failed"),
            }
        }

        if !timed_out.is_empty() {
            info!(count = timed_out.len(), "Games ended on time");
        }
        timed_out
    }

    /// Captures a game as plain data.
    #[instrument(skip(self))]
    pub fn snapshot(&self, id: &str, at: DateTime<Utc>) -> Result<SessionSnapshot, SessionError> {
        self.with_session(id, |session| session.snapshot(at))
    }

    /// Rebuilds a game from a snapshot under a new or reused id.
    #[instrument(skip(self, snapshot))]
    pub fn restore(
        &self,
        id: &str,
        snapshot: &SessionSnapshot,
        at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if lock(&self.sessions).contains_key(id) {
            warn!(session_id = id, "Session already exists");
            return Err(SessionError::GameAlreadyExists(id.to_string()));
        }
        self.insert(GameSession::restore(id.to_string(), snapshot, at)?)
    }

    /// Takes the events a game emitted since the last drain.
    pub fn drain_events(&self, id: &str) -> Result<Vec<SessionEvent>, SessionError> {
        self.with_session(id, |session| Ok(session.drain_events()))
    }

    /// Renders a game's board.
    pub fn render(&self, id: &str) -> Result<String, SessionError> {
        self.with_session(id, |session| Ok(session.game().board().render()))
    }

    /// Removes a game.
    #[instrument(skip(self))]
    pub fn remove_game(&self, id: &str) -> Result<(), SessionError> {
        lock(&self.sessions)
            .remove(id)
            .map(|_| info!(session_id = id, "Session removed"))
            .ok_or_else(|| SessionError::GameNotFound(id.to_string()))
    }

    /// Returns the ids of all hosted games.
    pub fn list_games(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = lock(&self.sessions).keys().cloned().collect();
        ids.sort();
        ids
    }
}
