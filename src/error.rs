//! Error taxonomy for puzzle setup, parsing and search.

use thiserror::Error;

/// Errors surfaced by the solver library.
///
/// Setup violations (`MissingOrigin`, `PieceIndex`) indicate a programming or
/// input error and are never retried. `Unsolvable` is the fatal proof that no
/// solution exists, distinct from "not yet solved". `NotSolved` is a caller
/// sequencing error: the solution was requested before the search finished.
#[derive(Debug, Error)]
pub enum Error {
    #[error("piece shape must contain its local origin cell (0, 0)")]
    MissingOrigin,
    #[error("piece index {0} is out of range")]
    PieceIndex(usize),
    #[error("puzzle is unsolvable: no viable moves remain from the starting position")]
    Unsolvable,
    #[error("solution requested before the search was complete")]
    NotSolved,
    #[error("layout parse error: {0}")]
    Parse(String),
}
