//! The surface a front-end drives: pick a difficulty, look at the puzzle,
//! start, pick cells, let the clock run.

use crate::{
    BreachError, Difficulty, GameSession, GameState, Generator, PickOutcome, Position, Puzzle,
    Token,
};

/// Owns the displayed puzzle and the current run, if any
pub struct Engine {
    generator: Generator,
    difficulty: Option<Difficulty>,
    puzzle: Option<Puzzle>,
    session: Option<GameSession>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_generator(Generator::new())
    }

    /// Engine with a seeded generator for reproducible puzzles
    pub fn with_seed(seed: u64) -> Self {
        Self::with_generator(Generator::with_seed(seed))
    }

    pub fn with_generator(generator: Generator) -> Self {
        Self {
            generator,
            difficulty: None,
            puzzle: None,
            session: None,
        }
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn state(&self) -> Option<&GameState> {
        self.session.as_ref().map(GameSession::state)
    }

    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(GameSession::is_running)
    }

    /// Generate a fresh puzzle for `difficulty`, at rest
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> &Puzzle {
        tracing::info!(%difficulty, "difficulty selected");
        self.difficulty = Some(difficulty);
        self.session = None;
        self.puzzle.insert(self.generator.generate(difficulty))
    }

    /// Regenerate the puzzle for the current difficulty without starting
    pub fn new_setup(&mut self) -> Result<&Puzzle, BreachError> {
        let difficulty = self.difficulty.ok_or(BreachError::NoDifficulty)?;
        self.session = None;
        Ok(self.puzzle.insert(self.generator.generate(difficulty)))
    }

    /// Display a hand-assembled puzzle in place of a generated one
    pub fn show_puzzle(&mut self, puzzle: Puzzle) -> &Puzzle {
        self.difficulty = puzzle.difficulty().or(self.difficulty);
        self.session = None;
        self.puzzle.insert(puzzle)
    }

    /// Back to difficulty selection, discarding puzzle and run
    pub fn clear_difficulty(&mut self) {
        self.difficulty = None;
        self.puzzle = None;
        self.session = None;
    }

    /// Start a fresh run over the displayed puzzle. Never regenerates.
    pub fn start(&mut self) -> Result<&GameState, BreachError> {
        let puzzle = self.puzzle.as_ref().ok_or(BreachError::NoPuzzle)?;
        tracing::info!(lines = puzzle.lines().len(), "run started");
        let session = self.session.insert(GameSession::new(puzzle));
        Ok(session.state())
    }

    /// Pick a cell; inert unless a run is in progress
    pub fn pick(&mut self, row: usize, col: usize) -> PickOutcome {
        match self.session.as_mut() {
            Some(session) => session.pick(Position::new(row, col)),
            None => PickOutcome::Inactive,
        }
    }

    /// Halt the run, keeping its state
    pub fn stop(&mut self) -> Option<&GameState> {
        let session = self.session.as_mut()?;
        session.stop();
        Some(session.state())
    }

    /// Deliver one timer second
    pub fn tick(&mut self) -> Option<&GameState> {
        let session = self.session.as_mut()?;
        session.tick();
        Some(session.state())
    }

    /// Hover query: the cell's token if picking it now would advance a line
    pub fn next_needed_token(&self, row: usize, col: usize) -> Option<Token> {
        self.session
            .as_ref()?
            .next_needed_token(Position::new(row, col))
    }
}
