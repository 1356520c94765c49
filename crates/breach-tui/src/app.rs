use crate::theme::Theme;
use breach_core::{
    BreachError, Difficulty, Engine, PickOutcome, Position, SessionStatus, TickSource, Token,
};
use crossterm::event::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};

/// Message lifetime in ticks
const MESSAGE_TICKS: u32 = 30;
/// The fault flash is shorter than ordinary messages
const FAULT_FLASH_TICKS: u32 = 6;

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Difficulty menu
    SelectDifficulty,
    /// Grid, objectives and HUD
    Board,
}

/// An objective token picked out for grid highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    pub line: usize,
    pub index: usize,
}

/// The main application state
pub struct App {
    pub engine: Engine,
    pub cursor: Position,
    pub screen_state: ScreenState,
    pub menu_selection: usize,
    pub theme: Theme,
    theme_index: usize,
    pub message: Option<String>,
    message_timer: u32,
    pub focus: Option<Focus>,
    clock: TickSource,
}

impl App {
    /// Create the app; a preselected difficulty skips the menu
    pub fn new(engine: Engine, difficulty: Option<Difficulty>) -> Self {
        let mut app = Self {
            engine,
            cursor: Position::new(0, 0),
            screen_state: ScreenState::SelectDifficulty,
            menu_selection: 1,
            theme: Theme::dark(),
            theme_index: 0,
            message: None,
            message_timer: 0,
            focus: None,
            clock: TickSource::seconds(Instant::now()),
        };
        if let Some(difficulty) = difficulty {
            app.choose_difficulty(difficulty);
        }
        app
    }

    /// Tick rate of the render loop
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(100)
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Age the message and forward any timer seconds due at `now`
    pub fn tick_at(&mut self, now: Instant) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }

        if !self.engine.is_running() {
            return;
        }
        for _ in 0..self.clock.due(now) {
            let Some(state) = self.engine.tick() else { break };
            if let SessionStatus::Failed(reason) = state.status {
                self.show_message(&reason.to_string());
                break;
            }
        }
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.show_message_for(msg, MESSAGE_TICKS);
    }

    fn show_message_for(&mut self, msg: &str, ticks: u32) {
        self.message = Some(msg.to_string());
        self.message_timer = ticks;
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match self.screen_state {
            ScreenState::SelectDifficulty => self.handle_menu_key(key),
            ScreenState::Board => self.handle_board_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> AppAction {
        let levels = Difficulty::all();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_selection = self.menu_selection.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_selection = (self.menu_selection + 1).min(levels.len() - 1);
            }
            KeyCode::Char(c @ '1'..='3') => {
                let index = c as usize - '1' as usize;
                self.menu_selection = index;
                self.choose_difficulty(levels[index]);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(&difficulty) = levels.get(self.menu_selection) {
                    self.choose_difficulty(difficulty);
                }
            }
            KeyCode::Char('t') => self.cycle_theme(),
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,

            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),

            KeyCode::Enter | KeyCode::Char(' ') => self.pick_at_cursor(),

            KeyCode::Char('s') => self.start_run(),
            KeyCode::Char('x') => {
                if self.engine.is_running() {
                    self.engine.stop();
                    self.show_message("Stopped");
                }
            }
            KeyCode::Char('n') => match self.engine.new_setup() {
                Ok(puzzle) => {
                    let difficulty = puzzle.difficulty();
                    self.reset_view();
                    if let Some(difficulty) = difficulty {
                        self.show_message(&format!("New {} setup", difficulty));
                    }
                }
                Err(e) => self.show_error(&e),
            },
            KeyCode::Char('d') => {
                self.engine.clear_difficulty();
                self.focus = None;
                self.screen_state = ScreenState::SelectDifficulty;
            }
            KeyCode::Char('t') => self.cycle_theme(),

            KeyCode::Tab => self.focus_next_line(),
            KeyCode::Char('.') => self.shift_focus(1),
            KeyCode::Char(',') => self.shift_focus(-1),
            KeyCode::Esc => self.focus = None,

            _ => {}
        }
        AppAction::Continue
    }

    fn choose_difficulty(&mut self, difficulty: Difficulty) {
        self.engine.select_difficulty(difficulty);
        self.reset_view();
        self.screen_state = ScreenState::Board;
        self.show_message(&format!("{} setup ready. Press s to start.", difficulty));
    }

    fn reset_view(&mut self) {
        self.cursor = Position::new(0, 0);
        self.focus = None;
    }

    fn start_run(&mut self) {
        match self.engine.start() {
            Ok(_) => {
                self.clock.reset(Instant::now());
                self.cursor = Position::new(0, self.cursor.col);
                self.show_message("Breach started");
            }
            Err(e) => self.show_error(&e),
        }
    }

    fn pick_at_cursor(&mut self) {
        let Position { row, col } = self.cursor;
        match self.engine.pick(row, col) {
            PickOutcome::Inactive => self.show_message("Not running. Press s to start."),
            // Locked cells are already drawn dimmed
            PickOutcome::LockedOut => {}
            PickOutcome::Advanced { won: true, .. } => self.show_message("All lines breached!"),
            PickOutcome::Advanced { .. } => {}
            PickOutcome::Fault { failed: true, .. } => {
                if let Some(SessionStatus::Failed(reason)) = self.engine.state().map(|s| s.status) {
                    self.show_message(&reason.to_string());
                }
            }
            PickOutcome::Fault { .. } => self.show_message_for("Wrong token.", FAULT_FLASH_TICKS),
        }
    }

    fn show_error(&mut self, error: &BreachError) {
        tracing::warn!(%error, "engine rejected request");
        self.show_message(&error.to_string());
    }

    fn cycle_theme(&mut self) {
        self.theme_index = (self.theme_index + 1) % Theme::COUNT;
        self.theme = Theme::by_index(self.theme_index);
        self.show_message(&format!("{} theme", self.theme.name));
    }

    fn move_cursor(&mut self, row_delta: i32, col_delta: i32) {
        let Some(puzzle) = self.engine.puzzle() else {
            return;
        };
        let max_row = puzzle.grid().rows() as i32 - 1;
        let max_col = puzzle.grid().cols() as i32 - 1;
        let new_row = (self.cursor.row as i32 + row_delta).clamp(0, max_row) as usize;
        let new_col = (self.cursor.col as i32 + col_delta).clamp(0, max_col) as usize;
        self.cursor = Position::new(new_row, new_col);
    }

    fn focus_next_line(&mut self) {
        let Some(count) = self.engine.puzzle().map(|p| p.lines().len()) else {
            return;
        };
        self.focus = match self.focus {
            None if count > 0 => Some(Focus { line: 0, index: 0 }),
            Some(f) if f.line + 1 < count => Some(Focus {
                line: f.line + 1,
                index: 0,
            }),
            _ => None,
        };
    }

    fn shift_focus(&mut self, delta: isize) {
        let (Some(focus), Some(puzzle)) = (self.focus, self.engine.puzzle()) else {
            return;
        };
        let Some(line) = puzzle.lines().get(focus.line) else {
            return;
        };
        let last = line.len().saturating_sub(1) as isize;
        let index = (focus.index as isize + delta).clamp(0, last) as usize;
        self.focus = Some(Focus { index, ..focus });
    }

    /// Token picked out in the objective panel
    pub fn focus_token(&self) -> Option<Token> {
        let focus = self.focus?;
        self.engine.puzzle()?.lines().get(focus.line)?.get(focus.index)
    }

    /// Whether `pos` holds the focused objective token
    pub fn is_focus_cell(&self, pos: Position) -> bool {
        match (self.focus_token(), self.engine.puzzle()) {
            (Some(token), Some(puzzle)) => puzzle.grid().get(pos) == Some(token),
            _ => false,
        }
    }

    /// Token under the cursor if picking it would advance a line
    pub fn hover_token(&self) -> Option<Token> {
        self.engine.next_needed_token(self.cursor.row, self.cursor.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breach_core::{FailReason, Grid, ObjectiveLine, Puzzle, TIMER_SECONDS};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(app: &mut App, codes: &[KeyCode]) {
        for &code in codes {
            app.handle_key(key(code));
        }
    }

    /// A1 C2
    /// E3 F4
    fn crafted(lines: &[&[&str]]) -> App {
        let grid = Grid::from_rows(&[vec!["A1", "C2"], vec!["E3", "F4"]]).unwrap();
        let lines = lines
            .iter()
            .map(|l| ObjectiveLine::parse(l).unwrap())
            .collect();
        let mut engine = Engine::with_seed(7);
        engine.show_puzzle(Puzzle::new(grid, lines).unwrap());
        let mut app = App::new(engine, None);
        app.screen_state = ScreenState::Board;
        app
    }

    #[test]
    fn test_menu_selects_difficulty() {
        let mut app = App::new(Engine::with_seed(1), None);
        assert_eq!(app.screen_state, ScreenState::SelectDifficulty);

        press(&mut app, &[KeyCode::Down, KeyCode::Enter]);
        assert_eq!(app.screen_state, ScreenState::Board);
        assert_eq!(app.engine.difficulty(), Some(Difficulty::Hard));
        assert!(!app.engine.is_running());
    }

    #[test]
    fn test_number_keys_select_directly() {
        let mut app = App::new(Engine::with_seed(1), None);
        press(&mut app, &[KeyCode::Char('1')]);
        assert_eq!(app.engine.difficulty(), Some(Difficulty::Easy));
        assert_eq!(app.engine.puzzle().unwrap().grid().rows(), 2);
    }

    #[test]
    fn test_preselected_difficulty_skips_menu() {
        let app = App::new(Engine::with_seed(1), Some(Difficulty::Medium));
        assert_eq!(app.screen_state, ScreenState::Board);
        assert!(app.engine.puzzle().is_some());
    }

    #[test]
    fn test_pick_before_start_is_inert() {
        let mut app = crafted(&[&["A1", "F4"]]);
        press(&mut app, &[KeyCode::Enter]);
        assert!(app.engine.state().is_none());
        assert!(app.message.as_deref().unwrap().contains("Press s"));
    }

    #[test]
    fn test_fault_flashes_message() {
        let mut app = crafted(&[&["A1", "F4"]]);
        press(&mut app, &[KeyCode::Char('s'), KeyCode::Enter]);
        assert_eq!(app.engine.state().unwrap().line_progress, vec![1]);

        press(&mut app, &[KeyCode::Char('j'), KeyCode::Enter]);
        let state = app.engine.state().unwrap();
        assert_eq!(state.faults, 1);
        assert_eq!(state.line_progress, vec![0]);
        assert_eq!(app.message.as_deref(), Some("Wrong token."));

        let now = Instant::now();
        for _ in 0..FAULT_FLASH_TICKS {
            app.tick_at(now);
        }
        assert!(app.message.is_none());
    }

    #[test]
    fn test_locked_cell_is_ignored() {
        let mut app = crafted(&[&["A1", "F4"]]);
        press(&mut app, &[KeyCode::Char('s'), KeyCode::Enter]);
        let before = app.engine.state().unwrap().clone();

        press(&mut app, &[KeyCode::Char('l'), KeyCode::Char('j'), KeyCode::Enter]);
        assert_eq!(app.engine.state().unwrap(), &before);
    }

    #[test]
    fn test_win_through_keys() {
        let mut app = crafted(&[&["C2", "F4"]]);
        press(
            &mut app,
            &[
                KeyCode::Char('s'),
                KeyCode::Char('l'),
                KeyCode::Enter,
                KeyCode::Char('j'),
                KeyCode::Enter,
            ],
        );
        assert_eq!(app.engine.state().unwrap().status, SessionStatus::Won);
    }

    #[test]
    fn test_clock_forwards_due_seconds() {
        let mut app = crafted(&[&["A1", "F4"]]);
        press(&mut app, &[KeyCode::Char('s')]);
        let start = Instant::now();

        app.tick_at(start + Duration::from_secs(3));
        assert_eq!(app.engine.state().unwrap().time_left, TIMER_SECONDS - 3);

        app.tick_at(start + Duration::from_secs(u64::from(TIMER_SECONDS) + 5));
        let state = app.engine.state().unwrap();
        assert_eq!(state.time_left, 0);
        assert_eq!(state.status, SessionStatus::Failed(FailReason::Timeout));
        assert_eq!(app.message.as_deref(), Some("Time's up."));
    }

    #[test]
    fn test_stop_freezes_clock() {
        let mut app = crafted(&[&["A1", "F4"]]);
        press(&mut app, &[KeyCode::Char('s'), KeyCode::Char('x')]);
        app.tick_at(Instant::now() + Duration::from_secs(10));
        let state = app.engine.state().unwrap();
        assert_eq!(state.status, SessionStatus::Stopped);
        assert_eq!(state.time_left, TIMER_SECONDS);
    }

    #[test]
    fn test_cursor_stays_on_grid() {
        let mut app = crafted(&[&["A1", "F4"]]);
        press(&mut app, &[KeyCode::Up, KeyCode::Left]);
        assert_eq!(app.cursor, Position::new(0, 0));
        press(&mut app, &[KeyCode::Down, KeyCode::Down, KeyCode::Right, KeyCode::Right]);
        assert_eq!(app.cursor, Position::new(1, 1));
    }

    #[test]
    fn test_focus_highlights_token_cells() {
        let mut app = crafted(&[&["A1", "F4"], &["E3"]]);
        press(&mut app, &[KeyCode::Tab]);
        assert!(app.is_focus_cell(Position::new(0, 0)));

        press(&mut app, &[KeyCode::Char('.')]);
        assert_eq!(app.focus_token(), Some("F4".parse().unwrap()));
        assert!(app.is_focus_cell(Position::new(1, 1)));
        assert!(!app.is_focus_cell(Position::new(0, 0)));

        press(&mut app, &[KeyCode::Tab]);
        assert_eq!(app.focus, Some(Focus { line: 1, index: 0 }));
        press(&mut app, &[KeyCode::Tab]);
        assert_eq!(app.focus, None);
    }

    #[test]
    fn test_hover_token_follows_cursor() {
        let mut app = crafted(&[&["A1", "F4"]]);
        assert_eq!(app.hover_token(), None);
        press(&mut app, &[KeyCode::Char('s')]);
        assert_eq!(app.hover_token(), Some("A1".parse().unwrap()));
        press(&mut app, &[KeyCode::Char('l')]);
        assert_eq!(app.hover_token(), None);
    }

    #[test]
    fn test_change_difficulty_and_quit() {
        let mut app = App::new(Engine::with_seed(2), Some(Difficulty::Easy));
        press(&mut app, &[KeyCode::Char('d')]);
        assert_eq!(app.screen_state, ScreenState::SelectDifficulty);
        assert!(app.engine.puzzle().is_none());
        assert!(matches!(
            app.handle_key(key(KeyCode::Char('q'))),
            AppAction::Quit
        ));
    }
}
