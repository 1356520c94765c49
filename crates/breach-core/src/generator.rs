use crate::objective::{LineBuilder, LineReport, MAX_TRICKY_ATTEMPTS};
use crate::{BreachError, Difficulty, Grid, ObjectiveLine, PuzzleConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// A grid and its objective lines, created together and never mutated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PuzzleData")]
pub struct Puzzle {
    difficulty: Option<Difficulty>,
    grid: Grid,
    lines: Vec<ObjectiveLine>,
    /// Layout reports, one per line, when the puzzle was generated
    reports: Vec<LineReport>,
}

/// Unchecked wire form of a [`Puzzle`]
#[derive(Deserialize)]
struct PuzzleData {
    difficulty: Option<Difficulty>,
    grid: Grid,
    lines: Vec<ObjectiveLine>,
    #[serde(default)]
    reports: Vec<LineReport>,
}

impl TryFrom<PuzzleData> for Puzzle {
    type Error = BreachError;

    fn try_from(data: PuzzleData) -> Result<Self, Self::Error> {
        let mut puzzle = Puzzle::new(data.grid, data.lines)?;
        if !data.reports.is_empty() && data.reports.len() != puzzle.lines.len() {
            return Err(BreachError::ReportCount {
                lines: puzzle.lines.len(),
                reports: data.reports.len(),
            });
        }
        puzzle.difficulty = data.difficulty;
        puzzle.reports = data.reports;
        Ok(puzzle)
    }
}

impl Puzzle {
    /// Assemble a puzzle from explicit parts
    pub fn new(grid: Grid, lines: Vec<ObjectiveLine>) -> Result<Self, BreachError> {
        if lines.is_empty() {
            return Err(BreachError::NoLines);
        }
        Ok(Self {
            difficulty: None,
            grid,
            lines,
            reports: Vec::new(),
        })
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn lines(&self) -> &[ObjectiveLine] {
        &self.lines
    }

    /// Generation reports; empty for hand-assembled puzzles
    pub fn reports(&self) -> &[LineReport] {
        &self.reports
    }
}

/// Puzzle generator
pub struct Generator {
    rng: StdRng,
    max_attempts: usize,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Create a generator seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            max_attempts: MAX_TRICKY_ATTEMPTS,
        }
    }

    /// Create a generator with a specific seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_attempts: MAX_TRICKY_ATTEMPTS,
        }
    }

    /// Attempts per line before the builder falls back to a plain walk
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Generate a puzzle for a difficulty preset
    pub fn generate(&mut self, difficulty: Difficulty) -> Puzzle {
        let config = difficulty.config();
        let mut puzzle = self.build(&config);
        puzzle.difficulty = Some(difficulty);
        puzzle
    }

    /// Generate a puzzle for a custom configuration
    pub fn generate_with_config(&mut self, config: &PuzzleConfig) -> Result<Puzzle, BreachError> {
        config.validate()?;
        Ok(self.build(config))
    }

    fn build(&mut self, config: &PuzzleConfig) -> Puzzle {
        let grid = Grid::generate(config.rows, config.cols, &mut self.rng);
        let builds = LineBuilder::new(&grid)
            .with_max_attempts(self.max_attempts)
            .build_lines(config.length, config.line_count, &mut self.rng);

        let fallbacks = builds.iter().filter(|b| b.report.fallback).count();
        tracing::debug!(
            rows = config.rows,
            cols = config.cols,
            lines = builds.len(),
            fallbacks,
            "generated puzzle"
        );

        let (lines, reports) = builds.into_iter().map(|b| (b.line, b.report)).unzip();
        Puzzle {
            difficulty: None,
            grid,
            lines,
            reports,
        }
    }
}
