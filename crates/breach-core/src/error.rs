use thiserror::Error;

/// Errors raised when a puzzle is assembled from invalid parts or the engine
/// is driven out of order. Player input never produces one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreachError {
    #[error("invalid token {0:?}: expected A C E F X 8 or a digit, then a digit 1-9")]
    InvalidToken(String),

    #[error("grid must have at least one row and one column")]
    EmptyGrid,

    #[error("grid row {row} has {found} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("objective line must contain at least one token")]
    EmptyLine,

    #[error("puzzle needs at least one objective line")]
    NoLines,

    #[error("puzzle has {lines} objective lines but {reports} layout reports")]
    ReportCount { lines: usize, reports: usize },

    #[error("invalid puzzle configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("no difficulty has been selected")]
    NoDifficulty,

    #[error("no puzzle is displayed")]
    NoPuzzle,
}
