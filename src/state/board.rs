//! Board model.
//!
//! Fixed 6x7 Connect Four grid. Row 0 is the top, row 5 the bottom; pieces
//! stack from the bottom, so a cell is only non-empty when every cell below
//! it in the same column is non-empty. The only mutation path goes through
//! the engine's drop, which derives the landing row from gravity.

/// Board height.
pub const ROWS: usize = 6;

/// Board width.
pub const COLS: usize = 7;

/// Total cells; a board with this many pieces is full.
pub const CELL_COUNT: u8 = (ROWS * COLS) as u8;

/// Pieces needed in a line to win.
pub const CONNECT: usize = 4;

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    /// No piece
    #[default]
    Empty,
    /// Player 1's piece
    P1,
    /// Player 2's piece
    P2,
}

impl Cell {
    /// Numeric form used by clients (0 = empty, 1 = P1, 2 = P2).
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::P1 => 1,
            Self::P2 => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// One of the two sides in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    P1,
    P2,
}

impl Default for Side {
    /// Player 1 always moves first.
    fn default() -> Self {
        Self::P1
    }
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Self::P1 => Self::P2,
            Self::P2 => Self::P1,
        }
    }

    /// The cell value this side's pieces occupy.
    pub fn cell(&self) -> Cell {
        match self {
            Self::P1 => Cell::P1,
            Self::P2 => Cell::P2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
        }
    }
}

/// The four win axes: horizontal, vertical and both diagonals.
const AXES: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// 6x7 Connect Four board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cell at (row, col), or `None` out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < ROWS && col < COLS {
            Some(self.cells[row][col])
        } else {
            None
        }
    }

    /// Lowest empty row in a column (gravity: scan from the bottom up).
    /// `None` when the column is full or out of range.
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[row][col].is_empty())
    }

    /// Check if a column has no empty cell left.
    pub fn is_column_full(&self, col: usize) -> bool {
        col < COLS && !self.cells[0][col].is_empty()
    }

    /// Check if every cell is occupied.
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    /// Place a piece. The engine derives (row, col) via [`Board::landing_row`],
    /// which keeps the gravity invariant.
    pub(crate) fn place(&mut self, row: usize, col: usize, side: Side) {
        self.cells[row][col] = side.cell();
    }

    /// Anchored win check: does the piece at (row, col) complete four in a
    /// row for `side`?
    ///
    /// Each axis gets one counter, initialized to 1 for the anchor, extended
    /// in both directions until a non-matching or out-of-bounds cell. Any
    /// four in a row must pass through the most recently placed cell, so
    /// checking around the anchor is sufficient; the whole board is never
    /// rescanned.
    pub fn connects_four(&self, row: usize, col: usize, side: Side) -> bool {
        let target = side.cell();

        for (dr, dc) in AXES {
            let mut count = 1;

            for sign in [1i32, -1] {
                for step in 1..CONNECT as i32 {
                    let r = row as i32 + dr * step * sign;
                    let c = col as i32 + dc * step * sign;
                    if r < 0 || r >= ROWS as i32 || c < 0 || c >= COLS as i32 {
                        break;
                    }
                    if self.cells[r as usize][c as usize] != target {
                        break;
                    }
                    count += 1;
                }
            }

            if count >= CONNECT {
                return true;
            }
        }

        false
    }

    /// Convert to JSON: six rows of seven 0/1/2 values, top row first.
    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = self
            .cells
            .iter()
            .map(|row| {
                let cells: Vec<serde_json::Value> =
                    row.iter().map(|c| serde_json::json!(c.as_u8())).collect();
                serde_json::Value::Array(cells)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}
