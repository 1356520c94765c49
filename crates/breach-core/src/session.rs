//! The move-validation state machine.
//!
//! A [`GameSession`] owns one [`GameState`] over a fixed puzzle. Picks and timer
//! ticks are applied synchronously; each pick reads a snapshot of the progress
//! taken before any of its writes.

use crate::{Grid, ObjectiveLine, Position, Puzzle, Token};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Seconds on the clock at start
pub const TIMER_SECONDS: u32 = 150;
/// Faults that end the run
pub const FAULTS_MAX: u32 = 5;

/// Which cells the next pick may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    /// First pick: anywhere on row 0
    EntryRow,
    /// Same column as the last pick
    SameColumn,
    /// Same row as the last pick
    SameRow,
}

impl Constraint {
    /// Whether `pos` satisfies the constraint given the last accepted pick
    pub fn allows(self, last: Option<Position>, pos: Position) -> bool {
        match (self, last) {
            (Constraint::EntryRow, _) => pos.row == 0,
            (Constraint::SameColumn, Some(last)) => pos.col == last.col,
            (Constraint::SameRow, Some(last)) => pos.row == last.row,
            (_, None) => false,
        }
    }

    /// Constraint after an accepted pick. Never returns to `EntryRow`.
    pub fn toggled(self) -> Self {
        match self {
            Constraint::EntryRow | Constraint::SameRow => Constraint::SameColumn,
            Constraint::SameColumn => Constraint::SameRow,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Constraint::EntryRow => "top-row",
            Constraint::SameColumn => "column",
            Constraint::SameRow => "row",
        };
        write!(f, "{}", label)
    }
}

/// Why a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailReason {
    Timeout,
    FaultLimit,
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::Timeout => write!(f, "Time's up."),
            FailReason::FaultLimit => write!(f, "Too many faults."),
        }
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Running,
    /// Halted by the player; state is kept but nothing advances
    Stopped,
    Won,
    Failed(FailReason),
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Won | SessionStatus::Failed(_))
    }
}

/// The most recent accepted pick, for highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPick {
    pub position: Position,
    pub token: Token,
    pub correct: bool,
}

/// Mutable state of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub constraint: Constraint,
    pub last_position: Option<Position>,
    /// Tokens matched so far, per line
    pub line_progress: Vec<usize>,
    /// The line most recently advanced
    pub active_line: Option<usize>,
    /// Lines that advanced together on the previous pick
    pub cohort: Option<BTreeSet<usize>>,
    pub faults: u32,
    pub time_left: u32,
    pub status: SessionStatus,
    pub last_pick: Option<LastPick>,
}

impl GameState {
    fn fresh(line_count: usize) -> Self {
        Self {
            constraint: Constraint::EntryRow,
            last_position: None,
            line_progress: vec![0; line_count],
            active_line: None,
            cohort: None,
            faults: 0,
            time_left: TIMER_SECONDS,
            status: SessionStatus::Running,
            last_pick: None,
        }
    }
}

/// Result of a pick, for front-end feedback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickOutcome {
    /// The session is not running
    Inactive,
    /// Off the grid or outside the current constraint; nothing changed
    LockedOut,
    /// At least one line advanced
    Advanced {
        /// Every line advanced by this pick, ascending
        lines: Vec<usize>,
        /// Active line soft-reset because the pick left its route
        diverged: Option<usize>,
        /// Cohort members reset because another member continued alone
        nullified: Vec<usize>,
        won: bool,
    },
    /// The token advanced nothing
    Fault {
        faults: u32,
        /// Line reset by this pick, if any
        reset: Option<usize>,
        failed: bool,
    },
}

/// A running puzzle: the grid and lines it was started over, and its state
#[derive(Debug, Clone)]
pub struct GameSession {
    grid: Grid,
    lines: Vec<ObjectiveLine>,
    state: GameState,
}

impl GameSession {
    /// Start a fresh run over the puzzle as displayed
    pub fn new(puzzle: &Puzzle) -> Self {
        Self {
            grid: puzzle.grid().clone(),
            lines: puzzle.lines().to_vec(),
            state: GameState::fresh(puzzle.lines().len()),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn lines(&self) -> &[ObjectiveLine] {
        &self.lines
    }

    pub fn is_running(&self) -> bool {
        self.state.status == SessionStatus::Running
    }

    /// Whether `pos` is on the grid and inside the current constraint
    pub fn allowed(&self, pos: Position) -> bool {
        self.grid.contains(pos) && self.state.constraint.allows(self.state.last_position, pos)
    }

    pub fn is_line_complete(&self, line: usize) -> bool {
        match (self.lines.get(line), self.state.line_progress.get(line)) {
            (Some(l), Some(&progress)) => progress >= l.len(),
            _ => false,
        }
    }

    /// Number of completed lines
    pub fn lines_done(&self) -> usize {
        (0..self.lines.len())
            .filter(|&i| self.is_line_complete(i))
            .count()
    }

    /// Token a line needs next, `None` once complete
    pub fn needed_token(&self, line: usize) -> Option<Token> {
        let progress = *self.state.line_progress.get(line)?;
        self.lines.get(line)?.get(progress)
    }

    /// The cell's token if picking it now would advance some line.
    ///
    /// Read-only; used for hover highlighting.
    pub fn next_needed_token(&self, pos: Position) -> Option<Token> {
        if !self.is_running() || !self.allowed(pos) {
            return None;
        }
        let token = self.grid.get(pos)?;
        (0..self.lines.len())
            .any(|i| self.needed_token(i) == Some(token))
            .then_some(token)
    }

    /// Halt the run without changing progress
    pub fn stop(&mut self) -> bool {
        if self.is_running() {
            self.state.status = SessionStatus::Stopped;
            true
        } else {
            false
        }
    }

    /// Apply one timer second. Ticks outside a running session are ignored.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state.time_left = self.state.time_left.saturating_sub(1);
        if self.state.time_left == 0 {
            self.state.status = SessionStatus::Failed(FailReason::Timeout);
            tracing::info!("run failed: timer expired");
        }
        true
    }

    /// Process a pick on `pos`
    pub fn pick(&mut self, pos: Position) -> PickOutcome {
        if !self.is_running() {
            return PickOutcome::Inactive;
        }
        let Some(token) = self.grid.get(pos) else {
            return PickOutcome::LockedOut;
        };
        if !self.allowed(pos) {
            return PickOutcome::LockedOut;
        }

        let progress = self.state.line_progress.clone();
        let prior_cohort = self.state.cohort.take();

        let mut diverged = None;
        if let Some(active) = self.state.active_line {
            let in_progress = progress[active] > 0 && progress[active] < self.lines[active].len();
            if in_progress && self.lines[active].get(progress[active]) != Some(token) {
                self.reset_line(active);
                self.state.active_line = None;
                diverged = Some(active);
                tracing::debug!(line = active, %token, "route abandoned, soft reset");
            }
        }

        let candidates: Vec<usize> = (0..self.lines.len())
            .filter(|&i| self.lines[i].get(progress[i]) == Some(token))
            .collect();

        self.state.last_position = Some(pos);
        self.state.constraint = self.state.constraint.toggled();
        self.state.last_pick = Some(LastPick {
            position: pos,
            token,
            correct: !candidates.is_empty(),
        });

        if candidates.is_empty() {
            return self.record_fault(diverged);
        }

        for &line in &candidates {
            self.state.line_progress[line] = progress[line] + 1;
        }

        let mut nullified = Vec::new();
        if candidates.len() > 1 {
            self.state.cohort = Some(candidates.iter().copied().collect());
        } else if let Some(cohort) = prior_cohort.filter(|c| c.contains(&candidates[0])) {
            for other in cohort.into_iter().filter(|&i| i != candidates[0]) {
                if self.reset_line(other) {
                    nullified.push(other);
                }
            }
            if !nullified.is_empty() {
                tracing::debug!(survivor = candidates[0], ?nullified, "cohort resolved");
            }
        }

        self.state.active_line = candidates.last().copied();

        let won = (0..self.lines.len()).all(|i| self.is_line_complete(i));
        if won {
            self.state.status = SessionStatus::Won;
            tracing::info!(faults = self.state.faults, time_left = self.state.time_left, "run won");
        }

        PickOutcome::Advanced {
            lines: candidates,
            diverged,
            nullified,
            won,
        }
    }

    fn record_fault(&mut self, diverged: Option<usize>) -> PickOutcome {
        self.state.faults += 1;

        let mut reset = diverged;
        if let Some(active) = self.state.active_line {
            if self.reset_line(active) {
                self.state.active_line = None;
                reset = Some(active);
            }
        }

        let failed = self.state.faults >= FAULTS_MAX;
        if failed {
            self.state.status = SessionStatus::Failed(FailReason::FaultLimit);
            tracing::info!(faults = self.state.faults, "run failed: fault limit");
        } else {
            tracing::debug!(faults = self.state.faults, ?reset, "fault");
        }

        PickOutcome::Fault {
            faults: self.state.faults,
            reset,
            failed,
        }
    }

    /// Reset a line that is strictly in progress. Completed and untouched lines
    /// are left alone.
    fn reset_line(&mut self, line: usize) -> bool {
        let len = self.lines[line].len();
        let progress = &mut self.state.line_progress[line];
        if *progress > 0 && *progress < len {
            *progress = 0;
            true
        } else {
            false
        }
    }
}
