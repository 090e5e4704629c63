//! Sliding Omino Puzzle Solver Library
//!
//! Provides the core functionality for solving sliding-block puzzles:
//! arbitrary board layouts, arbitrarily shaped pieces, and a breadth-first
//! search for a solution with the fewest logical moves.

pub mod board;
pub mod error;
pub mod geometry;
pub mod moves;
pub mod parser;
pub mod pieces;
pub mod render;
pub mod solver;

pub use board::{Board, WinningPosition};
pub use error::Error;
pub use geometry::{Direction, Tile};
pub use moves::{Move, MoveStatus, Moves};
pub use parser::parse_layout;
pub use pieces::Omino;
pub use render::render;
pub use solver::Solver;

/// Counts the logical moves of a solution path starting from `root`:
/// consecutive slides of the same piece merge into one move.
pub fn logical_moves(root: &Board, solution: &[Move]) -> u32 {
    let mut count = 0;
    let mut last = root.last_moved();
    for step in solution {
        if last != Some(step.piece_index()) {
            count += 1;
        }
        last = Some(step.piece_index());
    }
    count
}
