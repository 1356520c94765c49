//! Pick-processing rules: advancement, cohorts, divergence, faults, timer.

use breach_core::{
    Constraint, FailReason, GameSession, Grid, ObjectiveLine, PickOutcome, Position, Puzzle,
    SessionStatus, Token, FAULTS_MAX, TIMER_SECONDS,
};
use std::collections::BTreeSet;

/// A1 C2 X9
/// E3 F4 55
/// 11 22 33
fn board() -> Vec<Vec<&'static str>> {
    vec![
        vec!["A1", "C2", "X9"],
        vec!["E3", "F4", "55"],
        vec!["11", "22", "33"],
    ]
}

fn session(rows: &[Vec<&str>], lines: &[&[&str]]) -> GameSession {
    let grid = Grid::from_rows(rows).unwrap();
    let lines = lines
        .iter()
        .map(|l| ObjectiveLine::parse(l).unwrap())
        .collect();
    GameSession::new(&Puzzle::new(grid, lines).unwrap())
}

fn at(row: usize, col: usize) -> Position {
    Position::new(row, col)
}

fn set(items: &[usize]) -> Option<BTreeSet<usize>> {
    Some(items.iter().copied().collect())
}

#[test]
fn easy_walkthrough() {
    let mut s = session(&[vec!["A1", "C2"], vec!["E3", "F4"]], &[&["A1", "F4"]]);
    assert_eq!(s.state().constraint, Constraint::EntryRow);

    let outcome = s.pick(at(0, 0));
    assert!(matches!(outcome, PickOutcome::Advanced { ref lines, .. } if lines == &[0]));
    assert_eq!(s.state().line_progress, vec![1]);
    assert_eq!(s.state().constraint, Constraint::SameColumn);
    assert_eq!(s.state().last_position, Some(at(0, 0)));

    // F4 sits in column 1, the constraint wants column 0
    let before = s.state().clone();
    assert_eq!(s.pick(at(1, 1)), PickOutcome::LockedOut);
    assert_eq!(s.state(), &before);

    // E3 is allowed but not F4: the line drops back to 0 and a fault is counted
    let outcome = s.pick(at(1, 0));
    assert_eq!(
        outcome,
        PickOutcome::Fault {
            faults: 1,
            reset: Some(0),
            failed: false
        }
    );
    assert_eq!(s.state().faults, 1);
    assert_eq!(s.state().line_progress, vec![0]);
    assert_eq!(s.state().constraint, Constraint::SameRow);
    assert_eq!(s.state().last_position, Some(at(1, 0)));
    assert_eq!(s.state().active_line, None);
}

#[test]
fn entry_row_only_on_first_pick() {
    let mut s = session(&board(), &[&["E3", "F4"]]);
    assert_eq!(s.pick(at(1, 0)), PickOutcome::LockedOut);
    assert!(s.allowed(at(0, 2)));
    assert!(!s.allowed(at(2, 2)));
}

#[test]
fn shared_token_advances_every_matching_line() {
    let mut s = session(&board(), &[&["A1", "E3"], &["A1", "11"], &["C2"]]);
    let outcome = s.pick(at(0, 0));
    assert_eq!(
        outcome,
        PickOutcome::Advanced {
            lines: vec![0, 1],
            diverged: None,
            nullified: Vec::new(),
            won: false
        }
    );
    assert_eq!(s.state().line_progress, vec![1, 1, 0]);
    assert_eq!(s.state().cohort, set(&[0, 1]));
    assert_eq!(s.state().active_line, Some(1));
}

#[test]
fn lone_survivor_nullifies_rest_of_cohort() {
    let mut s = session(&board(), &[&["A1", "E3"], &["A1", "11"]]);
    s.pick(at(0, 0));

    // 11 continues line 1 (the active line) only; line 0 loses its progress
    let outcome = s.pick(at(2, 0));
    assert_eq!(
        outcome,
        PickOutcome::Advanced {
            lines: vec![1],
            diverged: None,
            nullified: vec![0],
            won: false
        }
    );
    assert_eq!(s.state().line_progress, vec![0, 2]);
    assert_eq!(s.state().cohort, None);
    assert_eq!(s.state().active_line, Some(1));
}

#[test]
fn survivor_below_active_line_diverges_the_other() {
    let mut s = session(&board(), &[&["A1", "E3", "F4"], &["A1", "11"]]);
    s.pick(at(0, 0));

    let outcome = s.pick(at(1, 0));
    assert_eq!(
        outcome,
        PickOutcome::Advanced {
            lines: vec![0],
            diverged: Some(1),
            nullified: Vec::new(),
            won: false
        }
    );
    assert_eq!(s.state().line_progress, vec![2, 0]);
    assert_eq!(s.state().cohort, None);
    assert_eq!(s.state().faults, 0);
}

#[test]
fn divergence_is_not_a_fault() {
    let mut s = session(&board(), &[&["A1", "11"], &["E3", "F4"]]);
    s.pick(at(0, 0));
    assert_eq!(s.state().active_line, Some(0));

    // E3 is not what line 0 needs but starts line 1
    let outcome = s.pick(at(1, 0));
    assert_eq!(
        outcome,
        PickOutcome::Advanced {
            lines: vec![1],
            diverged: Some(0),
            nullified: Vec::new(),
            won: false
        }
    );
    assert_eq!(s.state().faults, 0);
    assert_eq!(s.state().line_progress, vec![0, 1]);
    assert_eq!(s.state().active_line, Some(1));
}

#[test]
fn fault_only_touches_the_active_line() {
    let mut s = session(&board(), &[&["A1", "11"], &["A1", "E3"]]);
    s.pick(at(0, 0));
    assert_eq!(s.state().active_line, Some(1));

    // Back on A1: neither line needs it now
    let outcome = s.pick(at(0, 0));
    assert_eq!(
        outcome,
        PickOutcome::Fault {
            faults: 1,
            reset: Some(1),
            failed: false
        }
    );
    assert_eq!(s.state().line_progress, vec![1, 0]);
    assert_eq!(s.state().cohort, None);
}

#[test]
fn completed_lines_survive_faults() {
    let mut s = session(&board(), &[&["A1", "E3"], &["C2", "F4"]]);
    s.pick(at(0, 0));
    s.pick(at(1, 0));
    assert!(s.is_line_complete(0));

    let outcome = s.pick(at(1, 2));
    assert_eq!(
        outcome,
        PickOutcome::Fault {
            faults: 1,
            reset: None,
            failed: false
        }
    );
    assert_eq!(s.state().line_progress, vec![2, 0]);
}

#[test]
fn completed_cohort_member_is_not_nullified() {
    let mut s = session(&board(), &[&["A1"], &["A1", "E3"]]);
    s.pick(at(0, 0));
    assert_eq!(s.state().cohort, set(&[0, 1]));
    assert!(s.is_line_complete(0));

    let outcome = s.pick(at(1, 0));
    assert_eq!(
        outcome,
        PickOutcome::Advanced {
            lines: vec![1],
            diverged: None,
            nullified: Vec::new(),
            won: true
        }
    );
    assert_eq!(s.state().line_progress, vec![1, 2]);
    assert_eq!(s.state().status, SessionStatus::Won);
}

#[test]
fn completed_active_line_does_not_diverge() {
    let mut s = session(&board(), &[&["A1", "E3"], &["F4", "22"]]);
    s.pick(at(0, 0));
    s.pick(at(1, 0));
    assert!(s.is_line_complete(0));
    assert_eq!(s.state().active_line, Some(0));

    // F4 does not continue line 0, but a finished line has nothing to lose
    let outcome = s.pick(at(1, 1));
    assert_eq!(
        outcome,
        PickOutcome::Advanced {
            lines: vec![1],
            diverged: None,
            nullified: Vec::new(),
            won: false
        }
    );
    assert_eq!(s.state().line_progress, vec![2, 1]);
    assert_eq!(s.state().active_line, Some(1));
}

#[test]
fn cohort_is_recomputed_each_pick() {
    let mut s = session(&board(), &[&["A1", "E3"], &["A1", "11"], &["E3"]]);
    s.pick(at(0, 0));
    assert_eq!(s.state().cohort, set(&[0, 1]));

    // E3 continues line 0 and starts line 2; line 1 was active and diverges
    let outcome = s.pick(at(1, 0));
    assert_eq!(
        outcome,
        PickOutcome::Advanced {
            lines: vec![0, 2],
            diverged: Some(1),
            nullified: Vec::new(),
            won: false
        }
    );
    assert_eq!(s.state().cohort, set(&[0, 2]));
    assert_eq!(s.state().line_progress, vec![2, 0, 1]);
}

#[test]
fn unrelated_single_advance_clears_cohort() {
    let mut s = session(&board(), &[&["A1", "11"], &["A1", "11"], &["E3", "F4"]]);
    s.pick(at(0, 0));
    assert_eq!(s.state().cohort, set(&[0, 1]));

    let outcome = s.pick(at(1, 0));
    assert!(matches!(outcome, PickOutcome::Advanced { ref lines, .. } if lines == &[2]));
    assert_eq!(s.state().cohort, None);
}

#[test]
fn same_cell_repeat_counts() {
    let mut s = session(&board(), &[&["A1", "A1", "C2"]]);
    s.pick(at(0, 0));
    let outcome = s.pick(at(0, 0));
    assert!(matches!(outcome, PickOutcome::Advanced { .. }));
    assert_eq!(s.state().constraint, Constraint::SameRow);
    let outcome = s.pick(at(0, 1));
    assert!(matches!(outcome, PickOutcome::Advanced { won: true, .. }));
}

#[test]
fn fault_limit_ends_run() {
    let mut s = session(&board(), &[&["A1", "E3"]]);
    let walk = [at(0, 2), at(1, 2), at(1, 1), at(2, 1)];
    for (i, &pos) in walk.iter().enumerate() {
        let outcome = s.pick(pos);
        assert!(
            matches!(outcome, PickOutcome::Fault { failed: false, .. }),
            "pick {i} should be a plain fault"
        );
    }
    assert_eq!(s.state().faults, FAULTS_MAX - 1);

    let outcome = s.pick(at(2, 2));
    assert_eq!(
        outcome,
        PickOutcome::Fault {
            faults: FAULTS_MAX,
            reset: None,
            failed: true
        }
    );
    assert_eq!(s.state().status, SessionStatus::Failed(FailReason::FaultLimit));

    let frozen = s.state().clone();
    assert_eq!(s.pick(at(2, 0)), PickOutcome::Inactive);
    assert!(!s.tick());
    assert_eq!(s.state(), &frozen);
}

#[test]
fn timer_runs_out() {
    let mut s = session(&board(), &[&["A1", "E3"]]);
    for _ in 0..TIMER_SECONDS - 1 {
        assert!(s.tick());
    }
    assert_eq!(s.state().time_left, 1);
    assert_eq!(s.state().status, SessionStatus::Running);

    s.tick();
    assert_eq!(s.state().time_left, 0);
    assert_eq!(s.state().status, SessionStatus::Failed(FailReason::Timeout));

    // Late ticks and picks are ignored
    assert!(!s.tick());
    assert_eq!(s.pick(at(0, 0)), PickOutcome::Inactive);
    assert_eq!(s.state().time_left, 0);
}

#[test]
fn hover_query_is_read_only() {
    let mut s = session(&board(), &[&["A1", "E3"], &["C2", "F4"]]);
    let a1: Token = "A1".parse().unwrap();

    let before = s.state().clone();
    for _ in 0..10 {
        assert_eq!(s.next_needed_token(at(0, 0)), Some(a1));
        assert_eq!(s.next_needed_token(at(0, 2)), None);
        assert_eq!(s.next_needed_token(at(1, 0)), None);
    }
    assert_eq!(s.state(), &before);

    s.pick(at(0, 0));
    assert_eq!(s.next_needed_token(at(1, 0)), Some("E3".parse().unwrap()));
    assert_eq!(s.next_needed_token(at(0, 1)), None);
}

#[test]
fn state_snapshot_serializes() {
    let mut s = session(&board(), &[&["A1", "E3"], &["A1", "11"]]);
    s.pick(at(0, 0));

    let json = serde_json::to_string(s.state()).unwrap();
    assert!(json.contains("\"SameColumn\""));
    assert!(json.contains("\"A1\""));
    let back: breach_core::GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, s.state());
}
