use breach_core::{
    format_time, Difficulty, Engine, FailReason, GameSession, PickOutcome, Position, Puzzle,
    SessionStatus, Token,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

uniffi::setup_scaffolding!();

/// Difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum GameDifficulty {
    Easy,
    Medium,
    Hard,
}

impl From<GameDifficulty> for Difficulty {
    fn from(d: GameDifficulty) -> Self {
        match d {
            GameDifficulty::Easy => Difficulty::Easy,
            GameDifficulty::Medium => Difficulty::Medium,
            GameDifficulty::Hard => Difficulty::Hard,
        }
    }
}

impl From<Difficulty> for GameDifficulty {
    fn from(d: Difficulty) -> Self {
        match d {
            Difficulty::Easy => GameDifficulty::Easy,
            Difficulty::Medium => GameDifficulty::Medium,
            Difficulty::Hard => GameDifficulty::Hard,
        }
    }
}

/// Run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum GameStatus {
    Running,
    Stopped,
    Won,
    FailedTimeout,
    FailedFaultLimit,
}

impl From<SessionStatus> for GameStatus {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Running => GameStatus::Running,
            SessionStatus::Stopped => GameStatus::Stopped,
            SessionStatus::Won => GameStatus::Won,
            SessionStatus::Failed(FailReason::Timeout) => GameStatus::FailedTimeout,
            SessionStatus::Failed(FailReason::FaultLimit) => GameStatus::FailedFaultLimit,
        }
    }
}

/// Result of picking a cell
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum MoveResult {
    /// No run in progress
    Inactive,
    /// Off the grid or outside the row/column constraint
    LockedOut,
    /// One or more lines advanced
    Advanced {
        lines: Vec<u32>,
        diverged: Option<u32>,
        nullified: Vec<u32>,
        won: bool,
    },
    /// Nothing advanced
    Fault {
        faults: u32,
        reset: Option<u32>,
        failed: bool,
    },
}

fn index(i: usize) -> u32 {
    i as u32
}

impl From<PickOutcome> for MoveResult {
    fn from(outcome: PickOutcome) -> Self {
        match outcome {
            PickOutcome::Inactive => MoveResult::Inactive,
            PickOutcome::LockedOut => MoveResult::LockedOut,
            PickOutcome::Advanced {
                lines,
                diverged,
                nullified,
                won,
            } => MoveResult::Advanced {
                lines: lines.into_iter().map(index).collect(),
                diverged: diverged.map(index),
                nullified: nullified.into_iter().map(index).collect(),
                won,
            },
            PickOutcome::Fault {
                faults,
                reset,
                failed,
            } => MoveResult::Fault {
                faults,
                reset: reset.map(index),
                failed,
            },
        }
    }
}

/// A grid coordinate
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

/// The displayed puzzle
#[derive(Debug, Clone, uniffi::Record)]
pub struct PuzzleView {
    pub difficulty: Option<GameDifficulty>,
    pub rows: u32,
    pub cols: u32,
    /// Tokens row by row
    pub grid: Vec<Vec<String>>,
    pub lines: Vec<Vec<String>>,
}

impl From<&Puzzle> for PuzzleView {
    fn from(puzzle: &Puzzle) -> Self {
        let grid = puzzle.grid();
        Self {
            difficulty: puzzle.difficulty().map(GameDifficulty::from),
            rows: grid.rows() as u32,
            cols: grid.cols() as u32,
            grid: grid
                .to_rows()
                .into_iter()
                .map(|row| row.into_iter().map(String::from).collect())
                .collect(),
            lines: puzzle
                .lines()
                .iter()
                .map(|line| line.tokens().iter().map(Token::to_string).collect())
                .collect(),
        }
    }
}

/// Snapshot of a run
#[derive(Debug, Clone, uniffi::Record)]
pub struct StateView {
    /// "top-row", "column" or "row"
    pub constraint: String,
    pub last_pick: Option<CellRef>,
    pub last_pick_correct: Option<bool>,
    pub line_progress: Vec<u32>,
    pub active_line: Option<u32>,
    pub lines_done: u32,
    pub faults: u32,
    pub time_left: u32,
    /// Remaining time as M:SS
    pub time_text: String,
    pub status: GameStatus,
}

impl From<&GameSession> for StateView {
    fn from(session: &GameSession) -> Self {
        let state = session.state();
        Self {
            constraint: state.constraint.to_string(),
            last_pick: state.last_pick.map(|p| CellRef {
                row: p.position.row as u32,
                col: p.position.col as u32,
            }),
            last_pick_correct: state.last_pick.map(|p| p.correct),
            line_progress: state.line_progress.iter().map(|&p| p as u32).collect(),
            active_line: state.active_line.map(index),
            lines_done: session.lines_done() as u32,
            faults: state.faults,
            time_left: state.time_left,
            time_text: format_time(state.time_left),
            status: state.status.into(),
        }
    }
}

/// The Breach game interface for mobile platforms
#[derive(uniffi::Object)]
pub struct BreachGame {
    engine: Mutex<Engine>,
}

impl BreachGame {
    fn engine(&self) -> MutexGuard<'_, Engine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[uniffi::export]
impl BreachGame {
    /// Create a game with an OS-seeded generator
    #[uniffi::constructor]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            engine: Mutex::new(Engine::new()),
        })
    }

    /// Create a game whose puzzles are reproducible from `seed`
    #[uniffi::constructor]
    pub fn with_seed(seed: u64) -> Arc<Self> {
        Arc::new(Self {
            engine: Mutex::new(Engine::with_seed(seed)),
        })
    }

    /// Generate and display a puzzle for `difficulty`
    pub fn select_difficulty(&self, difficulty: GameDifficulty) -> PuzzleView {
        let mut engine = self.engine();
        PuzzleView::from(engine.select_difficulty(difficulty.into()))
    }

    /// Regenerate for the current difficulty; `None` before one is selected
    pub fn new_setup(&self) -> Option<PuzzleView> {
        let mut engine = self.engine();
        engine.new_setup().ok().map(PuzzleView::from)
    }

    pub fn puzzle(&self) -> Option<PuzzleView> {
        self.engine().puzzle().map(PuzzleView::from)
    }

    /// Start a run over the displayed puzzle; `None` if nothing is displayed
    pub fn start(&self) -> Option<StateView> {
        let mut engine = self.engine();
        engine.start().ok()?;
        engine.session().map(StateView::from)
    }

    pub fn pick(&self, row: u32, col: u32) -> MoveResult {
        self.engine().pick(row as usize, col as usize).into()
    }

    pub fn stop(&self) -> Option<StateView> {
        let mut engine = self.engine();
        engine.stop()?;
        engine.session().map(StateView::from)
    }

    /// Deliver one timer second
    pub fn tick(&self) -> Option<StateView> {
        let mut engine = self.engine();
        engine.tick()?;
        engine.session().map(StateView::from)
    }

    /// Hover query: the token at the cell if picking it would advance a line
    pub fn next_needed_token(&self, row: u32, col: u32) -> Option<String> {
        self.engine()
            .next_needed_token(row as usize, col as usize)
            .map(String::from)
    }

    /// Every cell holding `token`, for objective-hover highlighting
    pub fn cells_with_token(&self, token: String) -> Vec<CellRef> {
        let engine = self.engine();
        let (Ok(token), Some(puzzle)) = (token.parse::<Token>(), engine.puzzle()) else {
            return Vec::new();
        };
        puzzle
            .grid()
            .positions_of(token)
            .into_iter()
            .map(|Position { row, col }| CellRef {
                row: row as u32,
                col: col as u32,
            })
            .collect()
    }

    pub fn state(&self) -> Option<StateView> {
        self.engine().session().map(StateView::from)
    }

    /// Run state as JSON
    pub fn state_json(&self) -> Option<String> {
        let engine = self.engine();
        serde_json::to_string(engine.state()?).ok()
    }
}
