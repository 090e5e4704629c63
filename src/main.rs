//! Sliding Omino Puzzle Solver
//!
//! Reads a puzzle layout from a file or stdin, searches for a solution with
//! the fewest logical moves, and prints every board along the way.

use std::fs;
use std::io::Read as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, LevelFilter};

use ominoslide::render::glyph;
use ominoslide::{logical_moves, parse_layout, render, Solver};

/// Solves a sliding-block puzzle read from a layout file or stdin.
#[derive(Parser)]
#[command(name = "ominoslide")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Layout file to solve; reads stdin when omitted.
    file: Option<PathBuf>,

    /// Log each search sweep.
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Info
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", record.level(), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("failed to initialize logging")
}

fn read_layout(cli: &Cli) -> Result<String> {
    match &cli.file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("cannot read stdin")?;
            Ok(text)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let text = read_layout(&cli)?;
    let (board, goal) = parse_layout(&text)?;
    info!("solving a board with {} pieces", board.num_pieces());
    println!("{}", render(&board));

    let mut solver = Solver::new(board.clone(), goal)?;
    let mut sweeps = 1u32;
    while !solver.iterate()? {
        sweeps += 1;
        debug!("sweep {sweeps}: {} states known", solver.num_states());
    }
    let solution = solver.solution()?;
    info!(
        "searched {} states in {} sweeps",
        solver.num_states(),
        sweeps
    );

    println!(
        "\nSolution found in {} moves ({} slides).",
        logical_moves(&board, &solution),
        solution.len()
    );
    for step in &solution {
        let Some(next) = step.next_board() else {
            continue;
        };
        println!("\nslide {} {}:", glyph(step.piece_index()), step.direction());
        println!("{}", render(next));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ominoslide::MoveStatus;

    const CORNER: &str = include_str!("../layouts/corner.txt");
    const TRIVIAL: &str = include_str!("../layouts/trivial.txt");

    #[test]
    fn test_corner_layout_end_to_end() {
        let (board, goal) = parse_layout(CORNER).unwrap();
        insta::assert_snapshot!(render(&board), @r"
        .112
        .00#
        ");

        let mut solver = Solver::new(board.clone(), goal.clone()).unwrap();
        let mut solved = false;
        for _ in 0..100 {
            if solver.iterate().unwrap() {
                solved = true;
                break;
            }
        }
        assert!(solved, "search did not converge");

        let solution = solver.solution().unwrap();
        assert_eq!(solution.len(), 4);
        let last = solution.last().and_then(|step| step.next_board()).unwrap();
        assert!(goal.is_met_by(last));
        assert!((3..=4).contains(&logical_moves(&board, &solution)));
    }

    #[test]
    fn test_trivial_layout_end_to_end() {
        let (board, goal) = parse_layout(TRIVIAL).unwrap();
        let mut solver = Solver::new(board.clone(), goal).unwrap();
        assert!(solver.iterate().unwrap());
        let solution = solver.solution().unwrap();
        assert_eq!(solution.len(), 1);
        assert_eq!(solution[0].status(), MoveStatus::Winning);
        assert_eq!(logical_moves(&board, &solution), 1);
    }
}
