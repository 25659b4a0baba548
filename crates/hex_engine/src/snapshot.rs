//! Plain-data snapshot of a game, and restoration by replay.

use super::action::Move;
use super::error::GameError;
use super::game::{Game, GameState, Outcome};
use super::types::Player;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Serializable game snapshot.
///
/// Holds everything needed to rebuild the game: the board is not stored,
/// it is recomputed by replaying `moves_history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameData {
    /// Board side length.
    pub size: usize,
    /// Accepted moves with their timestamps, oldest first.
    pub moves_history: Vec<Move>,
    /// Whether the swap-pieces rule is enabled.
    pub allow_swap: bool,
    /// When the game started.
    pub started_at: DateTime<Utc>,
    /// When the last move was played.
    pub last_move_at: Option<DateTime<Utc>>,
    /// When the game ended or was canceled.
    pub ended_at: Option<DateTime<Utc>>,
    /// Winner, if decided.
    pub winner: Option<Player>,
    /// Terminal classification, if any.
    pub outcome: Option<Outcome>,
    /// Lifecycle state.
    pub state: GameState,
}

impl Game {
    /// Captures the game as plain data.
    pub fn to_data(&self) -> GameData {
        GameData {
            size: self.size(),
            moves_history: self.moves_history().to_vec(),
            allow_swap: self.allow_swap(),
            started_at: self.started_at(),
            last_move_at: self.last_move_at(),
            ended_at: self.ended_at(),
            winner: self.winner(),
            outcome: self.outcome(),
            state: self.state(),
        }
    }

    /// Rebuilds a game from a snapshot by replaying its moves.
    ///
    /// Resignation and cancellation are re-applied from the stored outcome.
    /// The rebuilt game must agree with the stored state, winner and
    /// timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if a move cannot be replayed or the
    /// result disagrees with the snapshot.
    #[instrument(skip(data), fields(size = data.size, moves = data.moves_history.len()))]
    pub fn from_data(data: &GameData) -> Result<Self, GameError> {
        let mut game = Game::try_new_at(data.size, data.started_at)?;
        game.set_allow_swap(data.allow_swap);

        for (index, mv) in data.moves_history.iter().enumerate() {
            let player = game.current_player();
            game.make_move(*mv, player).map_err(|e| {
                warn!(index, error = %e, "Replay failed");
                GameError::InvalidState(format!("Cannot replay move #{}: {}", index + 1, e))
            })?;
        }

        match data.outcome {
            Some(Outcome::Resign) => {
                let winner = data.winner.ok_or_else(|| {
                    GameError::InvalidState("Resigned game without winner".to_string())
                })?;
                game.resign(winner.opponent(), ended_at(data)?)
                    .map_err(|e| GameError::InvalidState(format!("Cannot re-apply resignation: {}", e)))?;
            }
            Some(Outcome::Cancel) => {
                game.cancel(ended_at(data)?)
                    .map_err(|e| GameError::InvalidState(format!("Cannot re-apply cancellation: {}", e)))?;
            }
            None => {}
        }

        verify(&game, data)?;
        debug!(state = %game.state(), "Game restored");
        Ok(game)
    }
}

fn ended_at(data: &GameData) -> Result<DateTime<Utc>, GameError> {
    data.ended_at
        .ok_or_else(|| GameError::InvalidState(format!("Game with outcome {:?} has no end time", data.outcome)))
}

fn verify(game: &Game, data: &GameData) -> Result<(), GameError> {
    let mismatch = |field: &str, restored: String, stored: String| {
        GameError::InvalidState(format!(
            "Restored {} {} does not match stored {}",
            field, restored, stored
        ))
    };

    if game.state() != data.state {
        return Err(mismatch("state", game.state().to_string(), data.state.to_string()));
    }
    if game.winner() != data.winner {
        return Err(mismatch(
            "winner",
            format!("{:?}", game.winner()),
            format!("{:?}", data.winner),
        ));
    }
    if game.last_move_at() != data.last_move_at {
        return Err(mismatch(
            "last move time",
            format!("{:?}", game.last_move_at()),
            format!("{:?}", data.last_move_at),
        ));
    }
    if game.ended_at() != data.ended_at {
        return Err(mismatch(
            "end time",
            format!("{:?}", game.ended_at()),
            format!("{:?}", data.ended_at),
        ));
    }
    Ok(())
}
