//! Hex game: turn order, legality, swap rule and outcome lifecycle.
//!
//! A game moves through `playing -> ended` (connection or resignation) or
//! `playing -> canceled`. Both terminal states absorb: every later move,
//! resignation or cancellation is rejected and the game is left untouched.

use super::action::Move;
use super::error::GameError;
use super::events::{GameEvent, Listener, Listeners};
use super::invariants::{HexInvariants, InvariantSet};
use super::rules::has_connection;
use super::types::{Board, Player};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Lifecycle state of a game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameState {
    /// Moves are accepted.
    Playing,
    /// Decided by a connection or a resignation.
    Ended,
    /// Stopped without a winner.
    Canceled,
}

/// How a game ended, when it did not end by connection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    /// A player resigned (including forced resignation on time).
    Resign,
    /// The game was canceled.
    Cancel,
}

/// What an accepted move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    /// The move was the swap-pieces move.
    pub swapped: bool,
    /// The move completed a connection for this player.
    pub winner: Option<Player>,
}

/// A game of Hex.
#[derive(Debug)]
pub struct Game {
    board: Board,
    moves_history: Vec<Move>,
    current_player: Player,
    allow_swap: bool,
    started_at: DateTime<Utc>,
    last_move_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    winner: Option<Player>,
    outcome: Option<Outcome>,
    state: GameState,
    listeners: Listeners<GameEvent>,
}

// ─────────────────────────────────────────────────────────────
//  Construction
// ─────────────────────────────────────────────────────────────

impl Game {
    /// Creates a game starting now. Player 0 moves first, swap is allowed.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or above [`MAX_BOARD_SIZE`](crate::types::MAX_BOARD_SIZE).
    pub fn new(size: usize) -> Self {
        Self::new_at(size, Utc::now())
    }

    /// Creates a game started at the given instant.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or above [`MAX_BOARD_SIZE`](crate::types::MAX_BOARD_SIZE).
    pub fn new_at(size: usize, started_at: DateTime<Utc>) -> Self {
        Self::with_board(Board::new(size), started_at)
    }

    /// Creates a game started at the given instant, rejecting unsupported
    /// board sizes with [`GameError::InvalidState`].
    pub fn try_new_at(size: usize, started_at: DateTime<Utc>) -> Result<Self, GameError> {
        Ok(Self::with_board(Board::try_new(size)?, started_at))
    }

    #[instrument(skip(board), fields(size = board.size()))]
    fn with_board(board: Board, started_at: DateTime<Utc>) -> Self {
        debug!("Creating game");
        Self {
            board,
            moves_history: Vec::new(),
            current_player: Player::First,
            allow_swap: true,
            started_at,
            last_move_at: None,
            ended_at: None,
            winner: None,
            outcome: None,
            state: GameState::Playing,
            listeners: Listeners::new(),
        }
    }

    /// Enables or disables the swap-pieces rule.
    ///
    /// Call before the first move. Changing it mid-game is not checked and
    /// makes the history ambiguous on restore.
    pub fn set_allow_swap(&mut self, allow_swap: bool) {
        self.allow_swap = allow_swap;
    }

    /// Registers a listener for `played` and `ended` events.
    pub fn on_event(&mut self, listener: Listener<GameEvent>) {
        self.listeners.register(listener);
    }
}

// ─────────────────────────────────────────────────────────────
//  Transitions
// ─────────────────────────────────────────────────────────────

impl Game {
    /// Plays a move for `player`.
    ///
    /// The move's `played_at` is recorded as given; callers keep timestamps
    /// non-decreasing across moves.
    ///
    /// # Errors
    ///
    /// Checked in order: [`GameError::GameFinished`], [`GameError::NotYourTurn`],
    /// [`GameError::OutOfBounds`], then [`GameError::CellOccupied`] unless the
    /// move is the swap-pieces move. A rejected move changes nothing.
    #[instrument(skip(self, mv), fields(notation = %mv))]
    pub fn make_move(&mut self, mv: Move, player: Player) -> Result<MoveReport, GameError> {
        let notation = mv.notation();

        if self.state != GameState::Playing {
            warn!(state = %self.state, "Move rejected, game is finished");
            return Err(GameError::GameFinished { notation });
        }
        if player != self.current_player {
            warn!(current = %self.current_player, "Move rejected, not player's turn");
            return Err(GameError::NotYourTurn { notation });
        }
        if !self.board.contains(mv.row(), mv.col()) {
            warn!(size = self.board.size(), "Move rejected, outside board");
            return Err(GameError::OutOfBounds { notation });
        }

        let swapped = self.is_swap_pieces_move(&mv, player);
        if swapped {
            let mirrored = mv.coords().mirrored();
            self.board.clear_cell(mv.row(), mv.col())?;
            self.board.set_cell(mirrored.row, mirrored.col, player)?;
            debug!(mirrored = %mirrored, "Swap pieces");
        } else {
            if !self.board.is_cell_empty(mv.row(), mv.col())? {
                warn!("Move rejected, cell occupied");
                return Err(GameError::CellOccupied { notation });
            }
            self.board.set_cell(mv.row(), mv.col(), player)?;
        }

        self.moves_history.push(mv);
        self.last_move_at = Some(mv.played_at());
        self.current_player = player.opponent();
        debug!(moves = self.moves_history.len(), "Move applied");
        self.listeners.emit(&GameEvent::Played(mv));

        let winner = if has_connection(&self.board, player) {
            self.finish(GameState::Ended, Some(player), None, mv.played_at());
            Some(player)
        } else {
            None
        };

        debug_assert!(
            HexInvariants::check_all(self).is_ok(),
            "Invariants violated after move {}",
            mv
        );

        Ok(MoveReport { swapped, winner })
    }

    /// Checks whether `mv` by `player` would be the swap-pieces move.
    ///
    /// True only if swap is allowed, exactly one move was played, `mv`
    /// targets that move's cell and `player` is player 1. Does not mutate.
    pub fn is_swap_pieces_move(&self, mv: &Move, player: Player) -> bool {
        self.allow_swap
            && player == Player::Second
            && self.moves_history.len() == 1
            && self.moves_history[0].same_cell(mv)
    }

    /// Resigns the game for `player`; the opponent wins.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalState`] if the game is not playing.
    #[instrument(skip(self))]
    pub fn resign(&mut self, player: Player, at: DateTime<Utc>) -> Result<(), GameError> {
        self.ensure_playing("resign")?;
        self.finish(
            GameState::Ended,
            Some(player.opponent()),
            Some(Outcome::Resign),
            at,
        );
        Ok(())
    }

    /// Cancels the game. Nobody wins.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalState`] if the game is not playing.
    #[instrument(skip(self))]
    pub fn cancel(&mut self, at: DateTime<Utc>) -> Result<(), GameError> {
        self.ensure_playing("cancel")?;
        self.finish(GameState::Canceled, None, Some(Outcome::Cancel), at);
        Ok(())
    }

    fn ensure_playing(&self, operation: &str) -> Result<(), GameError> {
        if self.state == GameState::Playing {
            Ok(())
        } else {
            warn!(state = %self.state, operation, "Rejected, game is not playing");
            Err(GameError::IllegalState(format!(
                "Cannot {} a game that is {}",
                operation, self.state
            )))
        }
    }

    fn finish(
        &mut self,
        state: GameState,
        winner: Option<Player>,
        outcome: Option<Outcome>,
        at: DateTime<Utc>,
    ) {
        self.state = state;
        self.winner = winner;
        self.outcome = outcome;
        self.ended_at = Some(at);
        info!(state = %state, winner = ?winner, outcome = ?outcome, "Game over");
        self.listeners.emit(&GameEvent::Ended {
            winner,
            outcome,
            ended_at: at,
        });
    }
}

// ─────────────────────────────────────────────────────────────
//  Accessors
// ─────────────────────────────────────────────────────────────

impl Game {
    /// Returns the board side length.
    pub fn size(&self) -> usize {
        self.board.size()
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the accepted moves, oldest first.
    pub fn moves_history(&self) -> &[Move] {
        &self.moves_history
    }

    /// Returns the last accepted move.
    pub fn last_move(&self) -> Option<&Move> {
        self.moves_history.last()
    }

    /// Returns the player to move.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Checks if the swap-pieces rule is enabled.
    pub fn allow_swap(&self) -> bool {
        self.allow_swap
    }

    /// Checks if the second move was the swap-pieces move.
    pub fn swapped(&self) -> bool {
        // Without swap, replaying the first cell is rejected as occupied.
        self.moves_history.len() >= 2 && self.moves_history[0].same_cell(&self.moves_history[1])
    }

    /// Returns when the game started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns when the last move was played.
    pub fn last_move_at(&self) -> Option<DateTime<Utc>> {
        self.last_move_at
    }

    /// Returns when the game ended or was canceled.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Returns the winner, if decided.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Returns the winner.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoWinner`] if the game is playing or canceled.
    pub fn strict_winner(&self) -> Result<Player, GameError> {
        self.winner.ok_or(GameError::NoWinner)
    }

    /// Returns the terminal classification, if any.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Checks if moves are accepted.
    pub fn is_playing(&self) -> bool {
        self.state == GameState::Playing
    }

    /// Checks if the game was decided.
    pub fn is_ended(&self) -> bool {
        self.state == GameState::Ended
    }

    /// Checks if the game was canceled.
    pub fn is_canceled(&self) -> bool {
        self.state == GameState::Canceled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;
    use chrono::TimeZone;

    fn at(seconds: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, seconds).unwrap()
    }

    #[test]
    fn test_new_game() {
        let game = Game::new_at(5, at(0));
        assert_eq!(game.size(), 5);
        assert_eq!(game.current_player(), Player::First);
        assert!(game.allow_swap());
        assert!(game.is_playing());
        assert_eq!(game.started_at(), at(0));
        assert_eq!(game.last_move(), None);
        assert_eq!(game.strict_winner(), Err(GameError::NoWinner));
    }

    #[test]
    fn test_rejection_order() {
        let mut game = Game::new_at(3, at(0));

        // Out of bounds and wrong turn: turn is checked first.
        let err = game.make_move(Move::at(9, 0, at(1)), Player::Second).unwrap_err();
        assert_eq!(err.to_string(), "Move a10: Not your turn");

        let err = game.make_move(Move::at(9, 0, at(1)), Player::First).unwrap_err();
        assert_eq!(err.to_string(), "Move a10: Cell outside board");

        game.cancel(at(2)).unwrap();
        let err = game.make_move(Move::at(9, 0, at(3)), Player::Second).unwrap_err();
        assert_eq!(err.to_string(), "Move a10: Game is finished");
    }

    #[test]
    fn test_occupied_leaves_game_untouched() {
        let mut game = Game::new_at(3, at(0));
        game.set_allow_swap(false);
        game.make_move(Move::at(1, 1, at(1)), Player::First).unwrap();

        let err = game.make_move(Move::at(1, 1, at(2)), Player::Second).unwrap_err();
        assert_eq!(err.to_string(), "Move b2: This cell is already occupied");
        assert_eq!(game.current_player(), Player::Second);
        assert_eq!(game.moves_history().len(), 1);
        assert_eq!(game.last_move_at(), Some(at(1)));
        assert_eq!(game.board().cell(1, 1), Ok(Square::Occupied(Player::First)));
    }

    #[test]
    fn test_swap_mirrors_stone() {
        let mut game = Game::new_at(5, at(0));
        game.make_move(Move::at(0, 3, at(1)), Player::First).unwrap();

        let report = game.make_move(Move::at(0, 3, at(2)), Player::Second).unwrap();
        assert!(report.swapped);
        assert!(game.swapped());
        assert_eq!(game.board().cell(0, 3), Ok(Square::Empty));
        assert_eq!(game.board().cell(3, 0), Ok(Square::Occupied(Player::Second)));
        assert_eq!(game.board().occupied_count(), 1);
        assert_eq!(game.current_player(), Player::First);
    }

    #[test]
    fn test_swap_on_diagonal_keeps_cell() {
        let mut game = Game::new_at(3, at(0));
        game.make_move(Move::at(1, 1, at(1)), Player::First).unwrap();
        game.make_move(Move::at(1, 1, at(2)), Player::Second).unwrap();
        assert_eq!(game.board().cell(1, 1), Ok(Square::Occupied(Player::Second)));
    }

    #[test]
    fn test_resign_and_cancel_only_while_playing() {
        let mut game = Game::new_at(3, at(0));
        game.resign(Player::Second, at(4)).unwrap();
        assert_eq!(game.winner(), Some(Player::First));
        assert_eq!(game.outcome(), Some(Outcome::Resign));
        assert_eq!(game.ended_at(), Some(at(4)));

        assert!(matches!(game.resign(Player::First, at(5)), Err(GameError::IllegalState(_))));
        assert!(matches!(game.cancel(at(5)), Err(GameError::IllegalState(_))));
        assert_eq!(game.ended_at(), Some(at(4)));
    }

    #[test]
    fn test_single_cell_board_first_move_wins() {
        let mut game = Game::new_at(1, at(0));
        let report = game.make_move(Move::at(0, 0, at(1)), Player::First).unwrap();
        assert_eq!(report.winner, Some(Player::First));
        assert!(game.is_ended());
        assert_eq!(game.outcome(), None);
    }

    #[test]
    fn test_state_strings() {
        assert_eq!(GameState::Canceled.to_string(), "canceled");
        assert_eq!("ended".parse::<GameState>().unwrap(), GameState::Ended);
        assert_eq!(Outcome::Resign.to_string(), "resign");
        assert_eq!(serde_json::to_value(Outcome::Cancel).unwrap(), "cancel");
    }
}
