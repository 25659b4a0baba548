//! Game rules for Hex.
//!
//! Pure functions evaluating a board according to Hex connection rules.
//! Rules are separated from board storage so the game and the invariant
//! checks can share them.

pub mod win;

pub use win::{check_winner, has_connection, winning_path};
