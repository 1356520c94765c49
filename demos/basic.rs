//! Basic example of using the Breach engine

use breach_core::objective::trace_path;
use breach_core::{Difficulty, Engine, Grid, ObjectiveLine, PickOutcome, Puzzle};

fn main() {
    // Generate a puzzle
    println!("Generating a Medium puzzle...\n");
    let mut engine = Engine::with_seed(2024);
    let puzzle = engine.select_difficulty(Difficulty::Medium).clone();

    println!("Grid:");
    println!("{}", puzzle.grid());

    println!("Objective lines:");
    for (i, (line, report)) in puzzle.lines().iter().zip(puzzle.reports()).enumerate() {
        println!(
            "  {}. {:<24} start {} heading {:?}, {} decoy steps{}",
            i + 1,
            line.to_string(),
            report.start,
            report.heading,
            report.decoy_steps,
            if report.fallback { " (plain walk)" } else { "" }
        );
    }

    // Replay the first line along a path the engine accepts
    let line = &puzzle.lines()[0];
    let report = &puzzle.reports()[0];
    let Some(path) = trace_path(puzzle.grid(), line.tokens(), report.start, report.heading) else {
        println!("\nFirst line is not traceable (this shouldn't happen!)");
        return;
    };

    println!("\nReplaying line 1...");
    if let Err(e) = engine.start() {
        println!("Could not start: {}", e);
        return;
    }
    for pos in path {
        let outcome = engine.pick(pos.row, pos.col);
        println!("  pick {} -> {:?}", pos, outcome);
    }
    if let Some(state) = engine.state() {
        println!("Progress: {:?}, faults: {}", state.line_progress, state.faults);
    }

    // Hand-built puzzle
    println!("\n--- A hand-built puzzle ---\n");
    let grid = Grid::from_rows(&[vec!["A1", "C2"], vec!["E3", "F4"]]).expect("valid grid");
    let line = ObjectiveLine::parse(&["C2", "F4"]).expect("valid line");
    engine.show_puzzle(Puzzle::new(grid, vec![line]).expect("one line"));
    engine.start().expect("puzzle is displayed");

    engine.pick(0, 1);
    if let PickOutcome::Advanced { won: true, .. } = engine.pick(1, 1) {
        println!("Breach complete!");
    }
}
