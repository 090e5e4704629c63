//! Board state: a fixed layout of open cells plus slidable pieces.
//!
//! A board's equality and hash define the canonical search-state key:
//! identically-shaped pieces without identity tokens are interchangeable, so
//! boards that differ only by swapping two such pieces collapse to one state.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::error::Error;
use crate::geometry::{Direction, Tile};
use crate::pieces::Omino;

/// Link from a board back to the move that produced it: the board the move
/// started from plus the piece/direction pair that identifies the move inside
/// that board's move set. Relocating the move by key instead of position
/// keeps the link valid across move-list compaction.
///
/// Excluded from board equality and hashing.
#[derive(Clone)]
pub(crate) struct Provenance {
    pub(crate) board: Board,
    pub(crate) piece: usize,
    pub(crate) direction: Direction,
}

/// A puzzle position: the immutable cell layout, the placed pieces in
/// placement order, and each piece's absolute origin position.
///
/// Copying a board for a move shares the layout and the piece values and
/// clones only the positions, the last-moved index and the provenance link;
/// a resolved board is never mutated again.
#[derive(Clone)]
pub struct Board {
    layout: Rc<FxHashSet<Tile>>,
    pieces: Vec<Rc<Omino>>,
    positions: Vec<Tile>,
    last_moved: Option<usize>,
    previous: Option<Rc<Provenance>>,
}

impl Board {
    /// Creates an empty board over the given open cells.
    pub fn new(cells: impl IntoIterator<Item = Tile>) -> Self {
        Self::with_layout(Rc::new(cells.into_iter().collect()))
    }

    pub(crate) fn with_layout(layout: Rc<FxHashSet<Tile>>) -> Self {
        Board {
            layout,
            pieces: Vec::new(),
            positions: Vec::new(),
            last_moved: None,
            previous: None,
        }
    }

    /// Places a piece with its origin at `origin`. Setup-only: never used
    /// once shifting begins.
    ///
    /// Returns false (placing nothing) unless every cell of the piece lands
    /// on an open, unoccupied layout cell.
    pub fn place(&mut self, piece: Rc<Omino>, origin: Tile) -> bool {
        if piece.cells().any(|cell| !self.is_available(cell + origin)) {
            return false;
        }
        self.pieces.push(piece);
        self.positions.push(origin);
        true
    }

    /// Attempts to slide the piece at `index` one step in `direction`.
    ///
    /// An out-of-range index is a hard error. A blocked slide returns
    /// `Ok(false)` and leaves the board untouched. On success only the
    /// piece's position and the last-moved index change.
    pub fn shift(&mut self, index: usize, direction: Direction) -> Result<bool, Error> {
        let piece = self
            .pieces
            .get(index)
            .cloned()
            .ok_or(Error::PieceIndex(index))?;
        let origin = self.positions[index];
        // the border is entirely outside the piece, so the moving piece never
        // blocks itself
        if piece
            .border(direction)
            .iter()
            .any(|&cell| !self.is_available(cell + origin))
        {
            return Ok(false);
        }
        self.positions[index] = origin + direction.offset();
        self.last_moved = Some(index);
        Ok(true)
    }

    /// True if the cell is in the layout and no piece covers it.
    fn is_available(&self, cell: Tile) -> bool {
        self.layout.contains(&cell)
            && !self
                .pieces
                .iter()
                .zip(&self.positions)
                .any(|(piece, &origin)| piece.contains_at(cell, origin))
    }

    pub fn num_pieces(&self) -> usize {
        self.pieces.len()
    }

    pub fn piece(&self, index: usize) -> Option<&Rc<Omino>> {
        self.pieces.get(index)
    }

    pub fn position(&self, index: usize) -> Option<Tile> {
        self.positions.get(index).copied()
    }

    /// Index of the piece that moved most recently; `None` on a fresh board.
    pub fn last_moved(&self) -> Option<usize> {
        self.last_moved
    }

    /// The open cells of the playable surface.
    pub fn layout(&self) -> &FxHashSet<Tile> {
        &self.layout
    }

    /// Componentwise minimum over the layout's cells.
    pub fn lower_left_bound(&self) -> Tile {
        self.layout
            .iter()
            .fold(Tile::new(i32::MAX, i32::MAX), |acc, cell| {
                Tile::new(acc.x.min(cell.x), acc.y.min(cell.y))
            })
    }

    /// Componentwise maximum over the layout's cells.
    pub fn upper_right_bound(&self) -> Tile {
        self.layout
            .iter()
            .fold(Tile::new(i32::MIN, i32::MIN), |acc, cell| {
                Tile::new(acc.x.max(cell.x), acc.y.max(cell.y))
            })
    }

    pub(crate) fn previous(&self) -> Option<&Rc<Provenance>> {
        self.previous.as_ref()
    }

    pub(crate) fn set_previous(&mut self, link: Provenance) {
        self.previous = Some(Rc::new(link));
    }

    /// Order-independent state hash, consistent with the interchangeable
    /// piece equality: swapping two interchangeable pieces' positions leaves
    /// the sum unchanged.
    fn state_hash(&self) -> u64 {
        self.pieces
            .iter()
            .zip(&self.positions)
            .fold(0u64, |acc, (piece, &origin)| {
                acc.wrapping_add(piece.layout_hash() ^ origin.cell_key())
            })
    }
}

impl PartialEq for Board {
    /// Canonical state equality: same piece count, and each piece either is
    /// the same piece at the same position, or some piece of the same shape
    /// in the other board occupies its position.
    fn eq(&self, other: &Self) -> bool {
        if self.pieces.len() != other.pieces.len() {
            return false;
        }
        for i in 0..self.pieces.len() {
            if Rc::ptr_eq(&self.pieces[i], &other.pieces[i])
                && self.positions[i] == other.positions[i]
            {
                continue;
            }
            let here = self.positions[i];
            let matched = other
                .pieces
                .iter()
                .zip(&other.positions)
                .any(|(piece, &origin)| origin == here && self.pieces[i].same_shape(piece));
            if !matched {
                return false;
            }
        }
        true
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.state_hash());
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("positions", &self.positions)
            .field("last_moved", &self.last_moved)
            .finish_non_exhaustive()
    }
}

/// A restricted board holding only the pieces whose final position matters.
/// Never a search-state key; purely the goal predicate.
#[derive(Clone, Debug)]
pub struct WinningPosition {
    goal: Board,
}

impl WinningPosition {
    pub fn new(cells: impl IntoIterator<Item = Tile>) -> Self {
        WinningPosition {
            goal: Board::new(cells),
        }
    }

    pub(crate) fn with_layout(layout: Rc<FxHashSet<Tile>>) -> Self {
        WinningPosition {
            goal: Board::with_layout(layout),
        }
    }

    /// Places a goal piece at its required position.
    pub fn place(&mut self, piece: Rc<Omino>, origin: Tile) -> bool {
        self.goal.place(piece, origin)
    }

    /// True iff every piece held here sits at its required position on
    /// `board`. Matching is by piece identity (the very same piece value),
    /// which is why goal pieces carry unique identity tokens: "this specific
    /// piece is home" holds no matter how interchangeable pieces are
    /// arranged.
    pub fn is_met_by(&self, board: &Board) -> bool {
        self.goal
            .pieces
            .iter()
            .zip(&self.goal.positions)
            .all(|(piece, &want)| {
                board
                    .pieces
                    .iter()
                    .position(|candidate| Rc::ptr_eq(candidate, piece))
                    .is_some_and(|index| board.positions[index] == want)
            })
    }
}
