use crate::app::{App, ScreenState};
use breach_core::{
    format_time, Difficulty, GameSession, Position, Puzzle, SessionStatus, FAULTS_MAX,
    TIMER_SECONDS,
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io;

/// Each cell is drawn as " A1 "
const CELL_WIDTH: u16 = 4;
const TIMER_BAR_WIDTH: usize = 30;

pub fn render(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(
        stdout,
        Hide,
        SetBackgroundColor(app.theme.bg),
        Clear(ClearType::All)
    )?;

    match app.screen_state {
        ScreenState::SelectDifficulty => render_menu(stdout, app, term_width, term_height)?,
        ScreenState::Board => render_board_screen(stdout, app, term_width)?,
    }

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    execute!(stdout, Show)?;
    Ok(())
}

fn render_menu(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let levels = Difficulty::all();

    let menu_width: u16 = 36;
    let menu_height = levels.len() as u16 * 2 + 6;
    let x = term_width.saturating_sub(menu_width) / 2;
    let y = term_height.saturating_sub(menu_height) / 2;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.key),
        Print("=== BREACH ==="),
        MoveTo(x, y + 2),
        SetForegroundColor(theme.fg),
        Print("Select difficulty")
    )?;

    for (i, difficulty) in levels.iter().enumerate() {
        let config = difficulty.config();
        let selected = i == app.menu_selection;
        let (marker, bg) = if selected {
            ("> ", theme.selected_bg)
        } else {
            ("  ", theme.bg)
        };
        execute!(
            stdout,
            MoveTo(x, y + 4 + i as u16 * 2),
            SetBackgroundColor(bg),
            SetForegroundColor(theme.fg),
            Print(format!("{}{}. {:<8}", marker, i + 1, difficulty.to_string())),
            SetForegroundColor(theme.info),
            Print(format!(
                " {}x{}, {} lines of {}",
                config.rows, config.cols, config.line_count, config.length
            )),
            SetBackgroundColor(theme.bg)
        )?;
    }

    execute!(
        stdout,
        MoveTo(x, y + menu_height - 1),
        SetForegroundColor(theme.info),
        Print("j/k move  Enter select  t theme  q quit")
    )?;

    Ok(())
}

fn render_board_screen(stdout: &mut io::Stdout, app: &App, term_width: u16) -> io::Result<()> {
    let Some(puzzle) = app.engine.puzzle() else {
        return Ok(());
    };
    let session = app.engine.session();

    let grid_width = puzzle.grid().cols() as u16 * CELL_WIDTH + 1;
    let grid_height = puzzle.grid().rows() as u16 * 2 + 1;
    let total_width = grid_width + 40;
    let x = if term_width > total_width {
        (term_width - total_width) / 2
    } else {
        1
    };
    let y = 2;

    render_hud(stdout, app, puzzle, session, x, y)?;
    render_grid(stdout, app, puzzle, session, x, y + 3)?;
    render_objectives(stdout, app, puzzle, session, x + grid_width + 3, y + 3)?;

    let below = y + 3 + grid_height.max(puzzle.lines().len() as u16 + 2) + 1;
    render_banner(stdout, app, session, x, below)?;
    render_controls(stdout, app, x, below + 2)?;

    Ok(())
}

fn render_hud(
    stdout: &mut io::Stdout,
    app: &App,
    puzzle: &Puzzle,
    session: Option<&GameSession>,
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let grid = puzzle.grid();

    let level = puzzle
        .difficulty()
        .map_or_else(|| "Custom".to_string(), |d| d.to_string());
    let done = session.map_or(0, GameSession::lines_done);
    let (faults, time_left, constraint) = match session {
        Some(s) => {
            let state = s.state();
            (state.faults, state.time_left, state.constraint.to_string())
        }
        None => (0, TIMER_SECONDS, "-".to_string()),
    };
    let faults_color = if faults + 1 >= FAULTS_MAX {
        theme.error
    } else if faults > 0 {
        Color::Yellow
    } else {
        theme.info
    };

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.key),
        Print(format!("BREACH  {}", level)),
        SetForegroundColor(theme.info),
        Print(format!(
            "   Grid {}x{}   Lines {}/{}   ",
            grid.rows(),
            grid.cols(),
            done,
            puzzle.lines().len()
        )),
        SetForegroundColor(faults_color),
        Print(format!("Faults {}/{}", faults, FAULTS_MAX)),
        SetForegroundColor(theme.info),
        Print(format!(
            "   Pick: {}   Time {}",
            constraint,
            format_time(time_left)
        ))
    )?;

    // Timer bar
    let filled = TIMER_BAR_WIDTH * time_left as usize / TIMER_SECONDS as usize;
    let bar_color = if time_left <= 30 {
        theme.error
    } else {
        theme.success
    };
    execute!(
        stdout,
        MoveTo(x, y + 1),
        SetForegroundColor(bar_color),
        Print("#".repeat(filled)),
        SetForegroundColor(theme.border),
        Print("-".repeat(TIMER_BAR_WIDTH - filled))
    )?;

    Ok(())
}

fn render_grid(
    stdout: &mut io::Stdout,
    app: &App,
    puzzle: &Puzzle,
    session: Option<&GameSession>,
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let grid = puzzle.grid();
    let separator = format!("+{}", "----+".repeat(grid.cols()));

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.border),
        Print(&separator)
    )?;

    for row in 0..grid.rows() {
        let cell_y = y + 1 + row as u16 * 2;
        execute!(stdout, MoveTo(x, cell_y))?;
        for col in 0..grid.cols() {
            execute!(stdout, SetForegroundColor(theme.border), Print("|"))?;
            render_cell(stdout, app, puzzle, session, Position::new(row, col))?;
        }
        execute!(
            stdout,
            SetForegroundColor(theme.border),
            Print("|"),
            MoveTo(x, cell_y + 1),
            Print(&separator)
        )?;
    }

    Ok(())
}

fn render_cell(
    stdout: &mut io::Stdout,
    app: &App,
    puzzle: &Puzzle,
    session: Option<&GameSession>,
    pos: Position,
) -> io::Result<()> {
    let theme = &app.theme;
    let Some(token) = puzzle.grid().get(pos) else {
        return Ok(());
    };

    let running = session.is_some_and(GameSession::is_running);
    let allowed = running && session.is_some_and(|s| s.allowed(pos));
    let last_pick = session
        .and_then(|s| s.state().last_pick)
        .filter(|p| p.position == pos);

    let bg = if pos == app.cursor {
        theme.selected_bg
    } else if app.is_focus_cell(pos) {
        theme.focus_bg
    } else if allowed {
        theme.allowed_bg
    } else {
        theme.bg
    };

    let fg = match last_pick {
        Some(p) if p.correct => theme.success,
        Some(_) => theme.error,
        None if running && !allowed => theme.locked,
        None => theme.token_fg(token),
    };

    execute!(
        stdout,
        SetBackgroundColor(bg),
        SetForegroundColor(fg),
        Print(format!(" {} ", token)),
        SetBackgroundColor(theme.bg)
    )?;

    Ok(())
}

fn render_objectives(
    stdout: &mut io::Stdout,
    app: &App,
    puzzle: &Puzzle,
    session: Option<&GameSession>,
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let hover = app.hover_token();
    let active = session.and_then(|s| s.state().active_line);

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.key),
        Print("Objectives")
    )?;

    for (i, line) in puzzle.lines().iter().enumerate() {
        let line_y = y + 2 + i as u16;
        let progress = session.map_or(0, |s| s.state().line_progress[i]);
        let complete = session.is_some_and(|s| s.is_line_complete(i));
        let marker = if complete {
            "+"
        } else if active == Some(i) {
            ">"
        } else {
            " "
        };

        execute!(
            stdout,
            MoveTo(x, line_y),
            SetForegroundColor(if complete { theme.done } else { theme.info }),
            Print(format!("{} {}. ", marker, i + 1))
        )?;

        for (j, &token) in line.tokens().iter().enumerate() {
            let focused = app.focus.is_some_and(|f| f.line == i && f.index == j);
            let needed = j == progress && hover == Some(token);
            let fg = if j < progress {
                theme.done
            } else if needed {
                theme.key
            } else {
                theme.fg
            };
            let bg = if focused { theme.focus_bg } else { theme.bg };

            execute!(stdout, SetBackgroundColor(bg), SetForegroundColor(fg))?;
            if needed {
                execute!(stdout, SetAttribute(Attribute::Underlined))?;
            }
            execute!(
                stdout,
                Print(token),
                SetAttribute(Attribute::Reset),
                SetBackgroundColor(theme.bg),
                Print(" ")
            )?;
        }
    }

    Ok(())
}

fn render_banner(
    stdout: &mut io::Stdout,
    app: &App,
    session: Option<&GameSession>,
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let (text, color) = match session.map(|s| s.state().status) {
        None => ("Planning: study the lines, press s to start".to_string(), theme.info),
        Some(SessionStatus::Running) => return Ok(()),
        Some(SessionStatus::Stopped) => ("STOPPED  press s to restart".to_string(), theme.info),
        Some(SessionStatus::Won) => ("BREACH COMPLETE".to_string(), theme.success),
        Some(SessionStatus::Failed(reason)) => (format!("BREACH FAILED  {}", reason), theme.error),
    };
    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(color),
        Print(text)
    )?;
    Ok(())
}

fn render_controls(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;

    let controls = [
        ("hjkl/Arrows", "Move"),
        ("Enter", "Pick"),
        ("s", "Start"),
        ("x", "Stop"),
        ("n", "New setup"),
        ("d", "Difficulty"),
        ("Tab", "Focus line"),
        (",/.", "Focus token"),
        ("t", "Theme"),
        ("q", "Quit"),
    ];

    for (i, (key, desc)) in controls.iter().enumerate() {
        let col = i / 3;
        let row = i % 3;
        let cx = x + (col as u16) * 20;
        let cy = y + row as u16;

        execute!(
            stdout,
            MoveTo(cx, cy),
            SetForegroundColor(theme.key),
            Print(format!("{:>11}", key)),
            SetForegroundColor(theme.info),
            Print(format!(" {}", desc))
        )?;
    }

    Ok(())
}

fn render_message(
    stdout: &mut io::Stdout,
    app: &App,
    msg: &str,
    term_width: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);
    let x = term_width.saturating_sub(padded.len() as u16) / 2;

    execute!(
        stdout,
        MoveTo(x, 0),
        SetForegroundColor(theme.fg),
        SetBackgroundColor(theme.selected_bg),
        Print(&padded),
        SetBackgroundColor(theme.bg)
    )?;

    Ok(())
}
