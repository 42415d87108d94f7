use std::ops::{Deref, DerefMut, Neg};

use serde::{Deserialize, Serialize};

use crate::error::MoveError;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// A cell value. Pieces are arithmetic: Red is +1, Yellow is -1, Empty is 0,
/// so line sums and scores can be computed without matching on colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Piece {
    Empty,
    Red,
    Yellow,
}

impl Piece {
    /// Signed field value of the piece
    pub fn value(self) -> i32 {
        match self {
            Piece::Red => 1,
            Piece::Yellow => -1,
            Piece::Empty => 0,
        }
    }

    pub fn from_value(value: i32) -> Piece {
        match value.signum() {
            1 => Piece::Red,
            -1 => Piece::Yellow,
            _ => Piece::Empty,
        }
    }

    /// Get the other player's piece
    pub fn opponent(self) -> Piece {
        -self
    }

    /// Get piece name for display
    pub fn name(self) -> &'static str {
        match self {
            Piece::Red => "Red",
            Piece::Yellow => "Yellow",
            Piece::Empty => "Empty",
        }
    }
}

impl Neg for Piece {
    type Output = Piece;

    fn neg(self) -> Piece {
        match self {
            Piece::Red => Piece::Yellow,
            Piece::Yellow => Piece::Red,
            Piece::Empty => Piece::Empty,
        }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The playing grid with per-column fill counters.
///
/// Row 0 is the bottom row; pieces stack upward. Cells above a column's fill
/// count are always empty and the total equals the sum of the fill counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cols: usize,
    rows: usize,
    cells: Vec<Piece>,
    fill: Vec<usize>,
    total: usize,
}

impl Board {
    /// Create a new empty board
    pub fn new(cols: usize, rows: usize) -> Self {
        assert!(cols > 0 && rows > 0, "board must have at least one cell");
        Board {
            cols,
            rows,
            cells: vec![Piece::Empty; cols * rows],
            fill: vec![0; cols],
            total: 0,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn capacity(&self) -> usize {
        self.cols * self.rows
    }

    /// Get the piece at a specific position
    pub fn piece_at(&self, col: usize, row: usize) -> Piece {
        self.cells[col * self.rows + row]
    }

    pub(crate) fn value_at(&self, col: usize, row: usize) -> i32 {
        self.piece_at(col, row).value()
    }

    pub fn column_fill(&self, col: usize) -> usize {
        self.fill[col]
    }

    /// Check if a column is full (out-of-range columns count as full)
    pub fn is_column_full(&self, col: usize) -> bool {
        col >= self.cols || self.fill[col] == self.rows
    }

    pub fn total_pieces(&self) -> usize {
        self.total
    }

    /// Plies left until the board is full
    pub fn remaining(&self) -> usize {
        self.capacity() - self.total
    }

    pub fn is_full(&self) -> bool {
        self.total == self.capacity()
    }

    pub fn full_columns(&self) -> usize {
        self.fill.iter().filter(|&&n| n == self.rows).count()
    }

    /// Columns that can still take a piece, left to right
    pub fn legal_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.cols).filter(move |&col| !self.is_column_full(col))
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn put(&mut self, col: usize, piece: Piece) -> Result<usize, MoveError> {
        assert!(piece != Piece::Empty, "cannot put an empty piece");
        if col >= self.cols {
            return Err(MoveError::InvalidColumn(col));
        }
        let row = self.fill[col];
        if row == self.rows {
            return Err(MoveError::ColumnFull(col));
        }

        self.cells[col * self.rows + row] = piece;
        self.fill[col] += 1;
        self.total += 1;
        Ok(row)
    }

    /// Take the top piece off a column, returns the row it occupied and the piece.
    ///
    /// Panics when the column is empty: every remove must pair with an earlier put.
    pub fn remove(&mut self, col: usize) -> (usize, Piece) {
        assert!(
            col < self.cols && self.fill[col] > 0,
            "remove from empty column {col}"
        );
        self.fill[col] -= 1;
        let row = self.fill[col];
        let idx = col * self.rows + row;
        let piece = self.cells[idx];
        self.cells[idx] = Piece::Empty;
        self.total -= 1;
        (row, piece)
    }

    /// Put a piece that is taken back when the returned guard drops.
    pub fn place(&mut self, col: usize, piece: Piece) -> Result<Placed<'_>, MoveError> {
        let row = self.put(col, piece)?;
        Ok(Placed {
            board: self,
            column: col,
            row,
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(COLS, ROWS)
    }
}

/// A temporary move. Derefs to the board and removes the piece on drop.
pub struct Placed<'a> {
    board: &'a mut Board,
    column: usize,
    row: usize,
}

impl Placed<'_> {
    pub fn row(&self) -> usize {
        self.row
    }
}

impl Deref for Placed<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Placed<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Placed<'_> {
    fn drop(&mut self) {
        self.board.remove(self.column);
    }
}
