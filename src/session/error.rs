//! Session host errors.

use super::SessionId;
use chrono::{DateTime, Utc};
use hex_engine::{GameError, Player, TimeControlError};

/// Rejection of a session operation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SessionError {
    /// No game with this id.
    #[display("Game {} not found", _0)]
    GameNotFound(SessionId),

    /// The player holds no seat in the game.
    #[display("Player {} is not seated in game {}", player, game)]
    PlayerNotFound {
        /// Game id.
        game: SessionId,
        /// Unknown player id.
        player: String,
    },

    /// Both seats are taken.
    #[display("Game {} already has two players", _0)]
    GameFull(SessionId),

    /// A game with this id already exists.
    #[display("Game {} already exists", _0)]
    GameAlreadyExists(SessionId),

    /// A move was submitted before both seats were filled.
    #[display("Game {} is waiting for a second player", _0)]
    GameNotStarted(SessionId),

    /// The move is dated before the previous move or the game start.
    #[display("Move in game {} played at {} precedes {}", game, played_at, previous)]
    MoveOutOfOrder {
        /// Game id.
        game: SessionId,
        /// Timestamp carried by the rejected move.
        played_at: DateTime<Utc>,
        /// Latest instant already recorded by the game.
        previous: DateTime<Utc>,
    },

    /// The clock ran out before the operation; the flagged player lost.
    #[display("Time elapsed for {}", _0)]
    TimeElapsed(Player),

    /// Game options cannot produce a game.
    #[display("Invalid game options: {}", _0)]
    InvalidOptions(String),

    /// Rejected by the game engine.
    #[display("{}", _0)]
    Game(GameError),

    /// Rejected by the clock.
    #[display("{}", _0)]
    TimeControl(TimeControlError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Game(e) => Some(e),
            SessionError::TimeControl(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GameError> for SessionError {
    fn from(err: GameError) -> Self {
        SessionError::Game(err)
    }
}

impl From<TimeControlError> for SessionError {
    fn from(err: TimeControlError) -> Self {
        SessionError::TimeControl(err)
    }
}
