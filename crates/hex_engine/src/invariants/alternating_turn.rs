//! Alternating turn invariant: player 0, player 1, player 0, ...

use super::super::{Game, Player};
use super::Invariant;

/// Invariant: the player to move is determined by the history length.
///
/// Player 0 is on turn after an even number of moves, player 1 after an
/// odd number. The swap move counts as a regular move.
pub struct AlternatingTurnInvariant;

impl Invariant<Game> for AlternatingTurnInvariant {
    fn holds(game: &Game) -> bool {
        let expected = if game.moves_history().len() % 2 == 0 {
            Player::First
        } else {
            Player::Second
        };
        game.current_player() == expected
    }

    fn description() -> &'static str {
        "Players alternate turns (0, 1, 0, ...)"
    }
}
