//! Four-cell winning lines and the working set of lines that can still be
//! completed.

use super::board::Board;

/// Number of cells in a winning line
pub const LINE_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Same column, rising rows
    Vertical,
    /// Same row, rising columns
    Horizontal,
    /// Rising columns and rows
    Diagonal,
    /// Falling columns, rising rows
    AntiDiagonal,
}

impl Direction {
    fn step(self) -> (isize, isize) {
        match self {
            Direction::Vertical => (0, 1),
            Direction::Horizontal => (1, 0),
            Direction::Diagonal => (1, 1),
            Direction::AntiDiagonal => (-1, 1),
        }
    }
}

/// Four board coordinates `(col, row)` in one direction. Only geometry is
/// stored; the value is read from a board on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    cells: [(usize, usize); LINE_LEN],
    direction: Direction,
}

impl Line {
    /// Line starting at `(col, row)`, or `None` if it leaves a `cols` x `rows` grid.
    fn starting_at(
        col: usize,
        row: usize,
        direction: Direction,
        cols: usize,
        rows: usize,
    ) -> Option<Line> {
        let (dc, dr) = direction.step();
        let mut cells = [(0, 0); LINE_LEN];
        for (i, cell) in cells.iter_mut().enumerate() {
            let c = col as isize + dc * i as isize;
            let r = row as isize + dr * i as isize;
            if c < 0 || r < 0 || c >= cols as isize || r >= rows as isize {
                return None;
            }
            *cell = (c as usize, r as usize);
        }
        Some(Line { cells, direction })
    }

    pub fn cells(&self) -> &[(usize, usize); LINE_LEN] {
        &self.cells
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Sum of the four cell values, or 0 as soon as both colors show up.
    pub fn value(&self, board: &Board) -> i32 {
        let mut sum = 0;
        for &(col, row) in &self.cells {
            let v = board.value_at(col, row);
            if sum * v < 0 {
                return 0;
            }
            sum += v;
        }
        sum
    }

    pub fn non_empty_count(&self, board: &Board) -> usize {
        self.cells
            .iter()
            .filter(|&&(col, row)| board.value_at(col, row) != 0)
            .count()
    }

    /// Holds both colors and can never be completed
    pub fn is_dead(&self, board: &Board) -> bool {
        self.non_empty_count(board) != 0 && self.value(board) == 0
    }

    pub fn is_complete(&self, board: &Board) -> bool {
        self.value(board).unsigned_abs() as usize == LINE_LEN
    }

    pub fn contains(&self, col: usize, row: usize) -> bool {
        self.cells.contains(&(col, row))
    }
}

/// Every line that fits the board, plus the subset still worth scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRegistry {
    all: Vec<Line>,
    active: Vec<usize>,
}

impl LineRegistry {
    /// Enumerate the lines of an empty `cols` x `rows` board.
    pub fn new(cols: usize, rows: usize) -> Self {
        let mut all = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                for direction in [
                    Direction::Vertical,
                    Direction::Horizontal,
                    Direction::Diagonal,
                    Direction::AntiDiagonal,
                ] {
                    if let Some(line) = Line::starting_at(col, row, direction, cols, rows) {
                        all.push(line);
                    }
                }
            }
        }
        let active = (0..all.len()).collect();
        LineRegistry { all, active }
    }

    pub fn for_board(board: &Board) -> Self {
        let mut registry = Self::new(board.cols(), board.rows());
        registry.refresh_after_undo(board);
        registry
    }

    pub fn all_lines(&self) -> &[Line] {
        &self.all
    }

    /// Lines that can still be completed, in enumeration order.
    pub fn active_lines(&self) -> impl Iterator<Item = &Line> + '_ {
        self.active.iter().map(move |&i| &self.all[i])
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Drop lines that died with the last move. Dead lines stay dead while
    /// pieces are only added, so filtering the current set is enough.
    pub fn refresh_after_move(&mut self, board: &Board) {
        let all = &self.all;
        self.active.retain(|&i| !all[i].is_dead(board));
    }

    /// Rebuild the working set from scratch; removing a piece can revive lines.
    pub fn refresh_after_undo(&mut self, board: &Board) {
        self.active = (0..self.all.len())
            .filter(|&i| !self.all[i].is_dead(board))
            .collect();
    }
}
