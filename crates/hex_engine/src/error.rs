//! Engine error types.

/// Rejection of a single game operation.
///
/// Every variant is recoverable: the operation that produced it had no
/// effect on the game.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GameError {
    /// The move was submitted by the player who is not on turn.
    #[display("Move {}: Not your turn", notation)]
    NotYourTurn {
        /// Notation of the rejected move.
        notation: String,
    },

    /// The move targets a cell outside the board.
    #[display("Move {}: Cell outside board", notation)]
    OutOfBounds {
        /// Notation of the rejected move.
        notation: String,
    },

    /// The move targets a cell that already holds a stone.
    #[display("Move {}: This cell is already occupied", notation)]
    CellOccupied {
        /// Notation of the rejected move.
        notation: String,
    },

    /// The game is ended or canceled.
    #[display("Move {}: Game is finished", notation)]
    GameFinished {
        /// Notation of the rejected move.
        notation: String,
    },

    /// The operation is not allowed in the current state.
    #[display("Illegal state: {}", _0)]
    IllegalState(String),

    /// A snapshot or serialized value does not describe a consistent game.
    #[display("Invalid state: {}", _0)]
    InvalidState(String),

    /// Coordinates could not be parsed from notation.
    #[display("Invalid notation: {:?}", _0)]
    InvalidNotation(String),

    /// The game has no winner (still playing, or canceled).
    #[display("Game has no winner")]
    NoWinner,
}

impl std::error::Error for GameError {}
