//! The token matrix and the row/column geometry the puzzle is played on.

use crate::{BreachError, Token};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell position on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Direction of a move between two picks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Move within the same column
    Column,
    /// Move within the same row
    Row,
}

impl Axis {
    pub fn flip(self) -> Self {
        match self {
            Axis::Column => Axis::Row,
            Axis::Row => Axis::Column,
        }
    }
}

/// An immutable R×C matrix of tokens, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Token>>", into = "Vec<Vec<Token>>")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Token>,
}

impl Grid {
    /// Fill a grid with independently drawn random tokens.
    ///
    /// Duplicates are expected; decoys depend on them. Zero dimensions are
    /// clamped to one so every generated grid is playable.
    pub fn generate<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let cells = (0..rows * cols).map(|_| Token::random(rng)).collect();
        Self { rows, cols, cells }
    }

    /// Build a grid from rows of token strings
    pub fn from_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Self, BreachError> {
        let parsed = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|s| s.as_ref().parse::<Token>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_from(parsed)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the position lies on the grid
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Token at a position, `None` when off the grid
    pub fn get(&self, pos: Position) -> Option<Token> {
        if self.contains(pos) {
            Some(self.cells[pos.row * self.cols + pos.col])
        } else {
            None
        }
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    /// Every cell of the row or column through `through`
    pub fn line(&self, axis: Axis, through: Position) -> Vec<Position> {
        match axis {
            Axis::Column => (0..self.rows)
                .map(|row| Position::new(row, through.col))
                .collect(),
            Axis::Row => (0..self.cols)
                .map(|col| Position::new(through.row, col))
                .collect(),
        }
    }

    /// Whether the row or column through `through` holds `token`
    pub fn line_has_token(&self, axis: Axis, through: Position, token: Token) -> bool {
        self.line(axis, through)
            .into_iter()
            .any(|pos| self.get(pos) == Some(token))
    }

    /// Positions holding `token`, in row-major order
    pub fn positions_of(&self, token: Token) -> Vec<Position> {
        self.positions()
            .filter(|&pos| self.get(pos) == Some(token))
            .collect()
    }

    pub fn contains_token(&self, token: Token) -> bool {
        self.cells.contains(&token)
    }

    /// Tokens as nested rows
    pub fn to_rows(&self) -> Vec<Vec<Token>> {
        self.cells.chunks(self.cols).map(<[Token]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<Token>>> for Grid {
    type Error = BreachError;

    fn try_from(rows: Vec<Vec<Token>>) -> Result<Self, Self::Error> {
        let cols = rows.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(BreachError::EmptyGrid);
        }
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != cols)
        {
            return Err(BreachError::RaggedGrid {
                row,
                expected: cols,
                found,
            });
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }
}

impl From<Grid> for Vec<Vec<Token>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: Vec<String> = row.iter().map(Token::to_string).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
