//! Objective lines and the builder that threads them through a grid.
//!
//! Every line is an alternating walk: the move into token `i + 1` runs along
//! the axis perpendicular to the move into token `i`. The builder also tries to
//! plant decoys, cells that repeat a line token but dead-end because the line
//! token after them is missing from their next row or column.

use crate::{Axis, BreachError, Grid, LengthSpec, Position, Token};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Attempts at a decoy-rich line before falling back to a plain walk
pub const MAX_TRICKY_ATTEMPTS: usize = 500;
/// Chance of preferring a cell that repeats the token just placed
pub const DUPLICATE_BIAS: f64 = 0.4;

/// An ordered token sequence to be matched through legal picks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Token>", into = "Vec<Token>")]
pub struct ObjectiveLine {
    tokens: Vec<Token>,
}

impl ObjectiveLine {
    pub fn new(tokens: Vec<Token>) -> Result<Self, BreachError> {
        if tokens.is_empty() {
            return Err(BreachError::EmptyLine);
        }
        Ok(Self { tokens })
    }

    /// Parse a line from token strings
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, BreachError> {
        let tokens = tokens
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tokens)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false; lines are non-empty by construction
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `index`, `None` past the end
    pub fn get(&self, index: usize) -> Option<Token> {
        self.tokens.get(index).copied()
    }

    /// Whether the line can be walked from `start`, first moving along `heading`
    pub fn is_traceable_from(&self, grid: &Grid, start: Position, heading: Axis) -> bool {
        trace_path(grid, &self.tokens, start, heading).is_some()
    }
}

impl TryFrom<Vec<Token>> for ObjectiveLine {
    type Error = BreachError;

    fn try_from(tokens: Vec<Token>) -> Result<Self, Self::Error> {
        Self::new(tokens)
    }
}

impl From<ObjectiveLine> for Vec<Token> {
    fn from(line: ObjectiveLine) -> Self {
        line.tokens
    }
}

impl fmt::Display for ObjectiveLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self.tokens.iter().map(Token::to_string).collect();
        write!(f, "{}", tokens.join(" "))
    }
}

/// How a generated line was laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReport {
    /// Cell holding the first token
    pub start: Position,
    /// Axis of the first move
    pub heading: Axis,
    /// Steps where at least one decoy was available
    pub decoy_steps: usize,
    /// Whether the builder gave up on decoys and used a plain walk
    pub fallback: bool,
}

/// A generated line together with its layout report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuild {
    pub line: ObjectiveLine,
    pub report: LineReport,
}

/// Decoy steps a line of `len` tokens needs to count as tricky
pub fn decoy_target(len: usize) -> usize {
    len.div_ceil(2)
}

/// Find a concrete alternating walk spelling `tokens`, starting on `start`.
///
/// Returns the visited cells, or `None` when no walk exists.
pub fn trace_path(
    grid: &Grid,
    tokens: &[Token],
    start: Position,
    heading: Axis,
) -> Option<Vec<Position>> {
    let first = *tokens.first()?;
    if grid.get(start) != Some(first) {
        return None;
    }

    // Each layer keeps (cell, index of its parent in the previous layer)
    let mut layers: Vec<Vec<(Position, usize)>> = vec![vec![(start, 0)]];
    let mut axis = heading;
    for &token in &tokens[1..] {
        let previous = layers.last()?;
        let mut seen = BTreeSet::new();
        let mut layer = Vec::new();
        for (parent, &(from, _)) in previous.iter().enumerate() {
            for to in grid.line(axis, from) {
                if grid.get(to) == Some(token) && seen.insert(to) {
                    layer.push((to, parent));
                }
            }
        }
        if layer.is_empty() {
            return None;
        }
        layers.push(layer);
        axis = axis.flip();
    }

    let mut path = Vec::with_capacity(layers.len());
    let mut index = 0;
    for layer in layers.iter().rev() {
        let (pos, parent) = layer[index];
        path.push(pos);
        index = parent;
    }
    path.reverse();
    Some(path)
}

/// Builds objective lines over a fixed grid
pub struct LineBuilder<'g> {
    grid: &'g Grid,
    max_attempts: usize,
}

impl<'g> LineBuilder<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            max_attempts: MAX_TRICKY_ATTEMPTS,
        }
    }

    /// Override the attempt budget for decoy-rich lines
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Build `count` lines.
    ///
    /// The first line starts on row 0 heading down its column, so it is always
    /// reachable from the entry constraint. Later lines start anywhere.
    pub fn build_lines<R: Rng + ?Sized>(
        &self,
        length: LengthSpec,
        count: usize,
        rng: &mut R,
    ) -> Vec<LineBuild> {
        (0..count)
            .map(|index| {
                let len = length.sample(rng).max(1);
                let (start, heading) = if index == 0 {
                    (
                        Position::new(0, rng.gen_range(0..self.grid.cols())),
                        Axis::Column,
                    )
                } else {
                    let start = Position::new(
                        rng.gen_range(0..self.grid.rows()),
                        rng.gen_range(0..self.grid.cols()),
                    );
                    let heading = if rng.gen_bool(0.5) {
                        Axis::Column
                    } else {
                        Axis::Row
                    };
                    (start, heading)
                };
                self.build_tricky_line(start, len, heading, rng)
            })
            .collect()
    }

    /// Build one line with at least `decoy_target(len)` decoy steps, falling
    /// back to a plain connected walk when the attempt budget runs out.
    pub fn build_tricky_line<R: Rng + ?Sized>(
        &self,
        start: Position,
        len: usize,
        heading: Axis,
        rng: &mut R,
    ) -> LineBuild {
        let target = decoy_target(len);

        for attempt in 0..self.max_attempts {
            let (path, decoy_steps) = self.walk(start, len, heading, true, rng);
            if decoy_steps >= target {
                tracing::trace!(attempt, decoy_steps, len, "tricky line accepted");
                return self.finish(&path, start, heading, decoy_steps, false);
            }
        }

        tracing::debug!(
            %start,
            len,
            attempts = self.max_attempts,
            "no decoy-rich line found, using plain walk"
        );
        self.build_simple_line(start, len, heading, rng)
    }

    /// A plain connected walk with no decoy guarantee; reported as a fallback
    pub fn build_simple_line<R: Rng + ?Sized>(
        &self,
        start: Position,
        len: usize,
        heading: Axis,
        rng: &mut R,
    ) -> LineBuild {
        let (path, decoy_steps) = self.walk(start, len, heading, false, rng);
        self.finish(&path, start, heading, decoy_steps, true)
    }

    /// Walk `len` cells from `start`, flipping axis after every move.
    ///
    /// Step `i` is the arrival at `path[i]`. It has a decoy when another cell
    /// on the arrival line repeats `path[i]`'s token but its line along the
    /// next axis lacks `path[i + 1]`'s token. `path[0]` arrives along the axis
    /// perpendicular to `heading`, which is the entry row for the first line.
    fn walk<R: Rng + ?Sized>(
        &self,
        start: Position,
        len: usize,
        heading: Axis,
        biased: bool,
        rng: &mut R,
    ) -> (Vec<Position>, usize) {
        let grid = self.grid;
        let mut path = Vec::with_capacity(len);
        path.push(start);

        let mut axis = heading;
        let mut arrival = grid.line(heading.flip(), start);
        let mut decoy_steps = 0;

        while path.len() < len {
            let here = path[path.len() - 1];
            let Some(placed) = grid.get(here) else { break };
            let next_line = grid.line(axis, here);

            let mut next = next_line[rng.gen_range(0..next_line.len())];
            if biased && rng.gen_bool(DUPLICATE_BIAS) {
                let dupes: Vec<Position> = next_line
                    .iter()
                    .copied()
                    .filter(|&pos| grid.get(pos) == Some(placed))
                    .collect();
                if !dupes.is_empty() {
                    next = dupes[rng.gen_range(0..dupes.len())];
                }
            }

            if let Some(ahead) = grid.get(next) {
                let has_decoy = arrival.iter().any(|&cell| {
                    cell != here
                        && grid.get(cell) == Some(placed)
                        && !grid.line_has_token(axis, cell, ahead)
                });
                if has_decoy {
                    decoy_steps += 1;
                }
            }

            arrival = next_line;
            path.push(next);
            axis = axis.flip();
        }

        (path, decoy_steps)
    }

    fn finish(
        &self,
        path: &[Position],
        start: Position,
        heading: Axis,
        decoy_steps: usize,
        fallback: bool,
    ) -> LineBuild {
        let tokens: Vec<Token> = path.iter().filter_map(|&pos| self.grid.get(pos)).collect();
        LineBuild {
            line: ObjectiveLine { tokens },
            report: LineReport {
                start,
                heading,
                decoy_steps,
                fallback,
            },
        }
    }
}
