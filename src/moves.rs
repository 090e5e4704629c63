//! Candidate moves and the per-board move set.

use crate::board::{Board, Provenance, WinningPosition};
use crate::error::Error;
use crate::geometry::Direction;

/// Lifecycle of a candidate move.
///
/// `Unknown` moves have not been judged against the global search yet.
/// `Blocked` and `Winning` are terminal resolution outcomes. `Generated`
/// marks a move whose successor has already been expanded into the frontier;
/// it is kept only so the move is not processed again.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveStatus {
    Unknown,
    Blocked,
    Winning,
    Generated,
}

/// A lazily resolved transition: sliding one piece a single step.
#[derive(Clone, Debug)]
pub struct Move {
    piece: usize,
    direction: Direction,
    status: MoveStatus,
    next: Option<Board>,
    /// Shortest known total move count of a full solution reachable through
    /// this move. Only meaningful while the status is `Winning`.
    depth: Option<u32>,
}

impl Move {
    fn new(piece: usize, direction: Direction) -> Self {
        Move {
            piece,
            direction,
            status: MoveStatus::Unknown,
            next: None,
            depth: None,
        }
    }

    pub fn piece_index(&self) -> usize {
        self.piece
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn status(&self) -> MoveStatus {
        self.status
    }

    pub fn depth(&self) -> Option<u32> {
        self.depth
    }

    /// The board this move leads to. `None` while unresolved, and released
    /// again once the move is blocked.
    pub fn next_board(&self) -> Option<&Board> {
        self.next.as_ref()
    }

    pub(crate) fn set_status(&mut self, status: MoveStatus) {
        if status != MoveStatus::Winning {
            self.depth = None;
        }
        if status == MoveStatus::Blocked {
            // dead branches must not retain their successor boards
            self.next = None;
        }
        self.status = status;
    }

    pub(crate) fn set_depth(&mut self, depth: u32) {
        self.depth = Some(depth);
    }

    /// Builds and classifies the successor board: `Blocked` if the slide
    /// cannot be made, `Winning` if the successor satisfies `goal`, otherwise
    /// the move stays `Unknown` until the solver judges it.
    pub(crate) fn resolve(
        &mut self,
        from: &Board,
        goal: &WinningPosition,
    ) -> Result<MoveStatus, Error> {
        if self.status != MoveStatus::Unknown || self.next.is_some() {
            return Ok(self.status);
        }
        let mut next = from.clone();
        if !next.shift(self.piece, self.direction)? {
            self.set_status(MoveStatus::Blocked);
            return Ok(self.status);
        }
        next.set_previous(Provenance {
            board: from.clone(),
            piece: self.piece,
            direction: self.direction,
        });
        if goal.is_met_by(&next) {
            self.status = MoveStatus::Winning;
        }
        self.next = Some(next);
        Ok(self.status)
    }
}

/// The full candidate set for one board at a given search depth: one move per
/// piece per direction.
#[derive(Clone, Debug)]
pub struct Moves {
    moves: Vec<Move>,
    depth: u32,
}

impl Moves {
    /// Generates all `4 x piece count` candidates, initially `Unknown`.
    /// `depth` is the number of logical moves taken to reach the board and
    /// never changes afterwards.
    pub fn new(board: &Board, depth: u32) -> Self {
        let mut moves = Vec::with_capacity(4 * board.num_pieces());
        for piece in 0..board.num_pieces() {
            for direction in Direction::ALL {
                moves.push(Move::new(piece, direction));
            }
        }
        Moves { moves, depth }
    }

    /// Resolves every candidate against the board it was generated for.
    pub fn resolve_all(&mut self, board: &Board, goal: &WinningPosition) -> Result<(), Error> {
        for mv in &mut self.moves {
            mv.resolve(board, goal)?;
        }
        Ok(())
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Move> {
        self.moves.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Move> {
        self.moves.get_mut(index)
    }

    /// Looks a move up by its stable piece/direction key.
    pub(crate) fn find_mut(&mut self, piece: usize, direction: Direction) -> Option<&mut Move> {
        self.moves
            .iter_mut()
            .find(|mv| mv.piece == piece && mv.direction == direction)
    }

    pub fn has_winner(&self) -> bool {
        self.moves.iter().any(|mv| mv.status == MoveStatus::Winning)
    }

    pub fn has_unblocked(&self) -> bool {
        self.moves.iter().any(|mv| mv.status != MoveStatus::Blocked)
    }

    /// Compacts out every blocked move. True if anything was removed.
    pub fn trim_blocked(&mut self) -> bool {
        let before = self.moves.len();
        self.moves.retain(|mv| mv.status != MoveStatus::Blocked);
        self.moves.len() != before
    }

    /// Drops every non-winning move, provided there is a winner and more than
    /// one move to choose from. True if the set was reduced.
    pub fn trim_to_winners(&mut self) -> bool {
        if !self.has_winner() || self.moves.len() <= 1 {
            return false;
        }
        self.moves.retain(|mv| mv.status == MoveStatus::Winning);
        true
    }

    /// The winning move with the smallest recorded solution depth, ties
    /// broken by generation order.
    pub fn optimal_win(&self) -> Option<&Move> {
        self.moves
            .iter()
            .enumerate()
            .filter(|(_, mv)| mv.status == MoveStatus::Winning)
            .min_by_key(|(index, mv)| (mv.depth.unwrap_or(u32::MAX), *index))
            .map(|(_, mv)| mv)
    }

    pub(crate) fn optimal_win_mut(&mut self) -> Option<&mut Move> {
        self.moves
            .iter_mut()
            .enumerate()
            .filter(|(_, mv)| mv.status == MoveStatus::Winning)
            .min_by_key(|(index, mv)| (mv.depth.unwrap_or(u32::MAX), *index))
            .map(|(_, mv)| mv)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::geometry::Tile;
    use crate::pieces::Omino;

    /// One tokened single piece at the bottom of a 1x2 corridor, goal at the
    /// top.
    fn corridor_puzzle() -> (Board, WinningPosition) {
        let layout = [Tile::new(0, 0), Tile::new(0, 1)];
        let mut piece = Omino::new([Tile::ZERO]).unwrap();
        piece.set_unique_id(0);
        let piece = Rc::new(piece);
        let mut board = Board::new(layout);
        assert!(board.place(piece.clone(), Tile::ZERO));
        let mut goal = WinningPosition::new(layout);
        assert!(goal.place(piece, Tile::new(0, 1)));
        (board, goal)
    }

    #[test]
    fn test_generates_four_moves_per_piece() {
        let (board, _) = corridor_puzzle();
        let moves = Moves::new(&board, 0);
        assert_eq!(moves.len(), 4 * board.num_pieces());
        assert!(moves
            .get(0)
            .is_some_and(|mv| mv.status() == MoveStatus::Unknown));
    }

    #[test]
    fn test_resolution_classifies_moves() {
        let (board, goal) = corridor_puzzle();
        let mut moves = Moves::new(&board, 0);
        moves.resolve_all(&board, &goal).unwrap();
        // up reaches the goal; the other three run off the layout
        assert!(moves.has_winner());
        assert!(moves.has_unblocked());
        let winner = moves.optimal_win().unwrap();
        assert_eq!(winner.direction(), Direction::Up);
        assert!(winner.next_board().is_some());
    }

    #[test]
    fn test_trim_blocked_is_idempotent() {
        let (board, goal) = corridor_puzzle();
        let mut moves = Moves::new(&board, 0);
        moves.resolve_all(&board, &goal).unwrap();
        assert!(moves.trim_blocked());
        assert_eq!(moves.len(), 1);
        assert!(!moves.trim_blocked(), "second trim must remove nothing");
    }

    #[test]
    fn test_blocking_releases_the_successor_board() {
        let (board, goal) = corridor_puzzle();
        let mut moves = Moves::new(&board, 0);
        moves.resolve_all(&board, &goal).unwrap();
        let mv = moves.find_mut(0, Direction::Up).unwrap();
        assert!(mv.next_board().is_some());
        mv.set_status(MoveStatus::Blocked);
        assert!(mv.next_board().is_none());
        assert_eq!(mv.depth(), None);
    }

    #[test]
    fn test_optimal_win_prefers_smaller_depth_then_order() {
        let (board, goal) = corridor_puzzle();
        let mut moves = Moves::new(&board, 0);
        moves.resolve_all(&board, &goal).unwrap();
        // forge a second winner with a recorded depth to compete with the
        // depthless one
        let mv = moves.find_mut(0, Direction::Down).unwrap();
        mv.set_status(MoveStatus::Winning);
        mv.set_depth(5);
        let best = moves.optimal_win().unwrap();
        assert_eq!(best.direction(), Direction::Down, "recorded depth beats unbounded");
    }
}
