//! First-class move type for Hex.
//!
//! A move is an immutable value: coordinates plus the instant it was
//! played. It says nothing about who plays it; the game decides that.

use super::error::GameError;
use super::types::Coords;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// A stone placement at `(row, col)`, timestamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    row: usize,
    col: usize,
    played_at: DateTime<Utc>,
}

impl Move {
    /// Creates a move played now.
    #[instrument]
    pub fn new(row: usize, col: usize) -> Self {
        Self::at(row, col, Utc::now())
    }

    /// Creates a move played at the given instant.
    pub fn at(row: usize, col: usize, played_at: DateTime<Utc>) -> Self {
        Self {
            row,
            col,
            played_at,
        }
    }

    /// Parses a move from notation (`b2`).
    #[instrument]
    pub fn from_notation(notation: &str, played_at: DateTime<Utc>) -> Result<Self, GameError> {
        let coords = Coords::from_notation(notation)?;
        Ok(Self::at(coords.row, coords.col, played_at))
    }

    /// Returns the row (0-indexed).
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the column (0-indexed).
    pub fn col(&self) -> usize {
        self.col
    }

    /// Returns the target coordinates.
    pub fn coords(&self) -> Coords {
        Coords::new(self.row, self.col)
    }

    /// Returns when the move was played.
    pub fn played_at(&self) -> DateTime<Utc> {
        self.played_at
    }

    /// Returns the algebraic notation (`b2`).
    pub fn notation(&self) -> String {
        self.coords().notation()
    }

    /// Checks if both moves target the same cell, ignoring time.
    pub fn same_cell(&self, other: &Move) -> bool {
        self.row == other.row && self.col == other.col
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
    }
}
