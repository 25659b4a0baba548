//! Hex game engine with rule enforcement and game clocks.
//!
//! The engine is pure and synchronous: it performs no I/O and never reads
//! the wall clock on its own, so every state change is reproducible from
//! its inputs.
//!
//! # Example
//!
//! ```
//! use hex_engine::{Game, Move, Player};
//!
//! let mut game = Game::new(3);
//! for (row, col, player) in [
//!     (1, 1, Player::First),
//!     (1, 2, Player::Second),
//!     (2, 1, Player::First),
//!     (2, 0, Player::Second),
//!     (0, 1, Player::First),
//! ] {
//!     game.make_move(Move::new(row, col), player)?;
//! }
//! assert_eq!(game.winner(), Some(Player::First));
//! # Ok::<(), hex_engine::GameError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod error;
mod events;
mod game;
pub mod invariants;
pub mod rules;
mod snapshot;
pub mod time_control;
mod types;

pub use action::Move;
pub use error::GameError;
pub use events::{GameEvent, Listener, Listeners};
pub use game::{Game, GameState, MoveReport, Outcome};
pub use snapshot::GameData;
pub use time_control::{
    ClockState, PeriodValues, PlayerTimeValues, TimeControl, TimeControlError, TimeControlEvent,
    TimeControlKind, TimeControlType, TimeControlValues, create_time_control,
};
pub use types::{Board, Coords, MAX_BOARD_SIZE, Player, Square};
