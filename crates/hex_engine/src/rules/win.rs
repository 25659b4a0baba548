//! Win detection for Hex.
//!
//! Player 0 wins by connecting row 0 to the last row, player 1 by
//! connecting column 0 to the last column. The search starts from the
//! player's stones on their starting edge and only walks through that
//! player's stones, so its cost is bounded by the stones it can reach.

use super::super::{Board, Coords, Player, Square};
use std::collections::{HashMap, VecDeque};
use tracing::instrument;

/// Cell `index` along the starting edge of `player`.
fn start_edge(player: Player, index: usize) -> Coords {
    match player {
        Player::First => Coords::new(0, index),
        Player::Second => Coords::new(index, 0),
    }
}

/// Checks whether the cell lies on the edge opposite to the player's start.
fn on_goal_edge(player: Player, coords: Coords, size: usize) -> bool {
    match player {
        Player::First => coords.row == size - 1,
        Player::Second => coords.col == size - 1,
    }
}

/// Returns one chain of the player's stones connecting their two edges.
///
/// The chain is ordered from the starting edge to the goal edge, each cell
/// adjacent to the next.
#[instrument(skip(board))]
pub fn winning_path(board: &Board, player: Player) -> Option<Vec<Coords>> {
    let size = board.size();
    // Visited stones mapped to the stone they were reached from.
    let mut parents: HashMap<Coords, Option<Coords>> = HashMap::new();
    let mut queue = VecDeque::new();

    for i in 0..size {
        let start = start_edge(player, i);
        if board.get(start) == Some(Square::Occupied(player)) {
            parents.insert(start, None);
            queue.push_back(start);
        }
    }

    while let Some(current) = queue.pop_front() {
        if on_goal_edge(player, current, size) {
            let mut path = vec![current];
            let mut cursor = current;
            while let Some(&Some(parent)) = parents.get(&cursor) {
                path.push(parent);
                cursor = parent;
            }
            path.reverse();
            return Some(path);
        }

        for next in board.neighbours(current) {
            if !parents.contains_key(&next) && board.get(next) == Some(Square::Occupied(player)) {
                parents.insert(next, Some(current));
                queue.push_back(next);
            }
        }
    }

    None
}

/// Checks if the player connects their two edges.
pub fn has_connection(board: &Board, player: Player) -> bool {
    winning_path(board, player).is_some()
}

/// Checks if there is a winner on the board.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Player> {
    Player::BOTH
        .into_iter()
        .find(|player| has_connection(board, *player))
}
