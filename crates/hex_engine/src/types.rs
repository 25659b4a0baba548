//! Core domain types for Hex.

use super::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Player in the game, serialized as its index (0 or 1).
///
/// Player 0 moves first and connects the top edge to the bottom edge.
/// Player 1 connects the left edge to the right edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Player {
    /// Player 0.
    First,
    /// Player 1.
    Second,
}

impl Player {
    /// Both players, in turn order.
    pub const BOTH: [Player; 2] = [Player::First, Player::Second];

    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }

    /// Returns the player index (0 or 1).
    pub fn index(self) -> usize {
        match self {
            Player::First => 0,
            Player::Second => 1,
        }
    }

    /// Returns the player for an index, if valid.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Player::First),
            1 => Some(Player::Second),
            _ => None,
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        player.index() as u8
    }
}

impl TryFrom<u8> for Player {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Player::from_index(value as usize)
            .ok_or_else(|| GameError::InvalidState(format!("Unknown player index {}", value)))
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.index())
    }
}

/// A cell on the Hex board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Square {
    /// Empty cell.
    Empty,
    /// Cell holding a player's stone.
    Occupied(Player),
}

impl Square {
    /// Returns the stone owner, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Square::Empty => None,
            Square::Occupied(player) => Some(player),
        }
    }
}

/// Zero-indexed cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coords {
    /// Row, 0 at the top edge.
    pub row: usize,
    /// Column, 0 at the left edge.
    pub col: usize,
}

impl Coords {
    /// Creates coordinates.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Coordinates mirrored across the short diagonal.
    pub fn mirrored(self) -> Self {
        Self::new(self.col, self.row)
    }

    /// Algebraic notation: column letters then 1-indexed row (`b2`).
    ///
    /// Columns past `z` continue as `aa`, `ab`, ...
    pub fn notation(self) -> String {
        let mut letters = Vec::new();
        let mut col = self.col;
        loop {
            letters.push(char::from(b'a' + (col % 26) as u8));
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        letters.reverse();

        let mut notation: String = letters.into_iter().collect();
        notation.push_str(&(self.row + 1).to_string());
        notation
    }

    /// Parses algebraic notation (`b2`, `aa10`), case-insensitive.
    #[instrument]
    pub fn from_notation(notation: &str) -> Result<Self, GameError> {
        let invalid = || GameError::InvalidNotation(notation.to_string());
        let trimmed = notation.trim().to_ascii_lowercase();
        let split = trimmed
            .find(|c: char| !c.is_ascii_lowercase())
            .ok_or_else(invalid)?;
        let (letters, digits) = trimmed.split_at(split);
        if letters.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut col = 0usize;
        for c in letters.chars() {
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add((c as u8 - b'a') as usize + 1))
                .ok_or_else(invalid)?;
        }

        let row: usize = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }

        Ok(Self::new(row - 1, col - 1))
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
    }
}

/// Offsets of the six neighbours of a cell on the rhombic grid.
const NEIGHBOUR_OFFSETS: [(isize, isize); 6] = [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0)];

/// Largest supported board side length.
pub const MAX_BOARD_SIZE: usize = 256;

/// Square Hex board of `size` x `size` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    /// Cells in row-major order.
    cells: Vec<Square>,
}

impl Board {
    /// Creates an empty board.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or above [`MAX_BOARD_SIZE`].
    pub fn new(size: usize) -> Self {
        assert!(
            (1..=MAX_BOARD_SIZE).contains(&size),
            "Board size must be between 1 and {}",
            MAX_BOARD_SIZE
        );
        Self {
            size,
            cells: vec![Square::Empty; size * size],
        }
    }

    /// Creates an empty board, rejecting sizes outside `1..=MAX_BOARD_SIZE`.
    pub fn try_new(size: usize) -> Result<Self, GameError> {
        if !(1..=MAX_BOARD_SIZE).contains(&size) {
            return Err(GameError::InvalidState(format!(
                "Board size must be between 1 and {}, got {}",
                MAX_BOARD_SIZE, size
            )));
        }
        Ok(Self::new(size))
    }

    /// Returns the board side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Checks whether the coordinates are on the board.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    /// Gets the cell at the given coordinates, `None` if outside the board.
    pub fn get(&self, coords: Coords) -> Option<Square> {
        if self.contains(coords.row, coords.col) {
            self.cells.get(coords.row * self.size + coords.col).copied()
        } else {
            None
        }
    }

    /// Gets the cell at the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfBounds`] if the coordinates are outside the board.
    pub fn cell(&self, row: usize, col: usize) -> Result<Square, GameError> {
        let coords = Coords::new(row, col);
        self.get(coords).ok_or_else(|| GameError::OutOfBounds {
            notation: coords.notation(),
        })
    }

    /// Checks if a cell is empty.
    pub fn is_cell_empty(&self, row: usize, col: usize) -> Result<bool, GameError> {
        Ok(self.cell(row, col)? == Square::Empty)
    }

    /// Places a stone on an empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalState`] if the cell is occupied or outside the board.
    pub fn set_cell(&mut self, row: usize, col: usize, player: Player) -> Result<(), GameError> {
        let coords = Coords::new(row, col);
        match self.get(coords) {
            None => Err(GameError::IllegalState(format!(
                "Cannot place a stone on {}, cell outside board",
                coords
            ))),
            Some(Square::Occupied(owner)) => Err(GameError::IllegalState(format!(
                "Cannot place a stone on {}, cell already holds a stone of {}",
                coords, owner
            ))),
            Some(Square::Empty) => {
                self.cells[row * self.size + col] = Square::Occupied(player);
                Ok(())
            }
        }
    }

    /// Removes the stone from a cell. Only the swap move does this.
    pub(crate) fn clear_cell(&mut self, row: usize, col: usize) -> Result<(), GameError> {
        if !self.contains(row, col) {
            return Err(GameError::IllegalState(format!(
                "Cannot clear {}, cell outside board",
                Coords::new(row, col)
            )));
        }
        self.cells[row * self.size + col] = Square::Empty;
        Ok(())
    }

    /// Iterates over the on-board neighbours of a cell.
    pub fn neighbours(&self, coords: Coords) -> impl Iterator<Item = Coords> + '_ {
        NEIGHBOUR_OFFSETS.iter().filter_map(move |&(dr, dc)| {
            let row = coords.row.checked_add_signed(dr)?;
            let col = coords.col.checked_add_signed(dc)?;
            self.contains(row, col).then_some(Coords::new(row, col))
        })
    }

    /// Returns the number of stones on the board.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|s| **s != Square::Empty).count()
    }

    /// Formats the board as a human-readable rhombus.
    pub fn render(&self) -> String {
        let mut result = String::new();
        for row in 0..self.size {
            result.push_str(&" ".repeat(row));
            for col in 0..self.size {
                let symbol = match self.cells[row * self.size + col] {
                    Square::Empty => '.',
                    Square::Occupied(Player::First) => '0',
                    Square::Occupied(Player::Second) => '1',
                };
                result.push(symbol);
                if col + 1 < self.size {
                    result.push(' ');
                }
            }
            if row + 1 < self.size {
                result.push('\n');
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notation() {
        assert_eq!(Coords::new(0, 0).notation(), "a1");
        assert_eq!(Coords::new(1, 1).notation(), "b2");
        assert_eq!(Coords::new(9, 0).notation(), "a10");
        assert_eq!(Coords::new(0, 25).notation(), "z1");
        assert_eq!(Coords::new(0, 26).notation(), "aa1");
        assert_eq!(Coords::new(2, 52).notation(), "ba3");
    }

    #[test]
    fn test_notation_parse() {
        assert_eq!(Coords::from_notation("b2"), Ok(Coords::new(1, 1)));
        assert_eq!(Coords::from_notation(" C11 "), Ok(Coords::new(10, 2)));
        assert_eq!(Coords::from_notation("aa1"), Ok(Coords::new(0, 26)));
        assert!(Coords::from_notation("b0").is_err());
        assert!(Coords::from_notation("12").is_err());
        assert!(Coords::from_notation("b").is_err());
        assert!(Coords::from_notation("b2x").is_err());
    }

    #[test]
    fn test_player_index_round_trip() {
        for player in Player::BOTH {
            assert_eq!(Player::try_from(u8::from(player)), Ok(player));
        }
        assert!(Player::try_from(2).is_err());
        assert_eq!(Player::First.opponent(), Player::Second);
    }

    #[test]
    fn test_player_serializes_as_index() {
        assert_eq!(serde_json::to_string(&Player::Second).unwrap(), "1");
        assert_eq!(serde_json::from_str::<Player>("0").unwrap(), Player::First);
        assert!(serde_json::from_str::<Player>("3").is_err());
    }

    #[test]
    fn test_set_and_get_cell() {
        let mut board = Board::new(3);
        assert_eq!(board.cell(1, 2), Ok(Square::Empty));

        board.set_cell(1, 2, Player::First).unwrap();
        assert_eq!(board.cell(1, 2), Ok(Square::Occupied(Player::First)));
        assert_eq!(board.is_cell_empty(1, 2), Ok(false));
        assert_eq!(board.occupied_count(), 1);
    }

    #[test]
    fn test_set_cell_rejects_occupied_and_outside() {
        let mut board = Board::new(3);
        board.set_cell(0, 0, Player::First).unwrap();

        assert!(matches!(
            board.set_cell(0, 0, Player::Second),
            Err(GameError::IllegalState(_))
        ));
        assert!(matches!(
            board.set_cell(3, 0, Player::Second),
            Err(GameError::IllegalState(_))
        ));
        assert_eq!(board.cell(0, 0), Ok(Square::Occupied(Player::First)));
    }

    #[test]
    fn test_cell_out_of_bounds_carries_notation() {
        let board = Board::new(3);
        assert_eq!(
            board.cell(9, 0),
            Err(GameError::OutOfBounds {
                notation: "a10".to_string()
            })
        );
    }

    #[test]
    fn test_neighbours() {
        let board = Board::new(3);

        let mut center: Vec<_> = board.neighbours(Coords::new(1, 1)).collect();
        center.sort_by_key(|c| (c.row, c.col));
        assert_eq!(
            center,
            vec![
                Coords::new(0, 1),
                Coords::new(0, 2),
                Coords::new(1, 0),
                Coords::new(1, 2),
                Coords::new(2, 0),
                Coords::new(2, 1),
            ]
        );

        assert_eq!(board.neighbours(Coords::new(0, 0)).count(), 2);
        assert_eq!(board.neighbours(Coords::new(0, 2)).count(), 3);
    }

    #[test]
    fn test_render() {
        let mut board = Board::new(2);
        board.set_cell(0, 1, Player::First).unwrap();
        board.set_cell(1, 0, Player::Second).unwrap();
        assert_eq!(board.render(), ". 0\n 1 .");
    }

    #[test]
    #[should_panic(expected = "Board size must be at least 1")]
    fn test_zero_size_board() {
        Board::new(0);
    }
}
