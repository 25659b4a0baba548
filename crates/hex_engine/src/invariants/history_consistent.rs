//! History consistency invariant: the board is what the history says.

use super::super::Game;
use super::Invariant;

/// Invariant: every accepted move left exactly one stone on the board.
///
/// The swap move replaces the first stone rather than adding one, so a
/// swapped game holds one stone fewer than its history length.
pub struct HistoryConsistentInvariant;

impl Invariant<Game> for HistoryConsistentInvariant {
    fn holds(game: &Game) -> bool {
        let moves = game.moves_history().len();
        let expected = if game.swapped() { moves - 1 } else { moves };
        if game.board().occupied_count() != expected {
            return false;
        }

        match (game.last_move(), game.last_move_at()) {
            (Some(mv), Some(at)) => mv.played_at() == at,
            (None, None) => true,
            _ => false,
        }
    }

    fn description() -> &'static str {
        "Board stones and last move time match the move history"
    }
}
