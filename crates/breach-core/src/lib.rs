//! Engine for a row/column hacking puzzle.
//!
//! A [`Grid`] of two-character tokens hides a handful of [`ObjectiveLine`]s.
//! Players trace the lines by picking cells, alternating between the column
//! and the row of their previous pick. The [`Generator`] builds lines that are
//! always traceable but seeded with decoys; the [`GameSession`] validates
//! picks, tracks progress on every line at once and decides win or failure.

mod difficulty;
mod engine;
mod error;
mod generator;
mod grid;
pub mod objective;
mod session;
pub mod timer;
mod token;

pub use difficulty::{Difficulty, LengthSpec, PuzzleConfig};
pub use engine::Engine;
pub use error::BreachError;
pub use generator::{Generator, Puzzle};
pub use grid::{Axis, Grid, Position};
pub use objective::{LineBuild, LineBuilder, LineReport, ObjectiveLine};
pub use session::{
    Constraint, FailReason, GameSession, GameState, LastPick, PickOutcome, SessionStatus,
    FAULTS_MAX, TIMER_SECONDS,
};
pub use timer::{format_time, TickSource};
pub use token::Token;
