//! 2D board coordinates and slide directions.

use std::fmt;
use std::ops::{Add, Sub};

/// A single cell coordinate, either relative to a piece's local origin or
/// absolute on the board.
///
/// Ordered by x first, then y, so the minimum of a cell set is the bottommost
/// cell of its leftmost column. Layout normalization relies on this.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub const ZERO: Tile = Tile::new(0, 0);
    pub const UP: Tile = Tile::new(0, 1);
    pub const DOWN: Tile = Tile::new(0, -1);
    pub const LEFT: Tile = Tile::new(-1, 0);
    pub const RIGHT: Tile = Tile::new(1, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Tile { x, y }
    }

    /// Packs the coordinate into a single value for the order-independent
    /// board and shape hashes. Distinct tiles map to distinct keys.
    pub(crate) fn cell_key(self) -> u64 {
        ((self.y as u32 as u64) << 32) | (self.x as u32 as u64)
    }
}

impl Add for Tile {
    type Output = Tile;

    fn add(self, rhs: Tile) -> Tile {
        Tile::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Tile {
    type Output = Tile;

    fn sub(self, rhs: Tile) -> Tile {
        Tile::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four orthogonal slide directions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Candidate move generation order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The unit translation one slide in this direction applies.
    pub const fn offset(self) -> Tile {
        match self {
            Direction::Up => Tile::UP,
            Direction::Down => Tile::DOWN,
            Direction::Left => Tile::LEFT,
            Direction::Right => Tile::RIGHT,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        })
    }
}
