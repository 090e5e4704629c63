//! Omino shapes: relative cell sets with precomputed slide borders.

use rustc_hash::FxHashSet;

use crate::error::Error;
use crate::geometry::{Direction, Tile};

/// A rigid piece shape, defined by the set of cells it occupies relative to
/// its local origin. Every shape contains `Tile::ZERO`; creating all pieces
/// that way keeps identically-shaped pieces recognizable as interchangeable
/// when boards are compared.
///
/// Construction caches, for each direction, the border set: the adjacent
/// cells in that direction that are not themselves part of the shape. These
/// are exactly the cells that must be free for the whole shape to slide one
/// step that way, so a shift check never has to look at the piece's interior.
#[derive(Clone, Debug)]
pub struct Omino {
    shape: FxHashSet<Tile>,
    borders: [FxHashSet<Tile>; 4],
    unique_id: Option<u32>,
}

impl Omino {
    /// Builds a shape from relative cells. Fails if the local origin cell
    /// (0, 0) is missing.
    pub fn new(cells: impl IntoIterator<Item = Tile>) -> Result<Self, Error> {
        let shape: FxHashSet<Tile> = cells.into_iter().collect();
        if !shape.contains(&Tile::ZERO) {
            return Err(Error::MissingOrigin);
        }
        let borders = Direction::ALL.map(|dir| {
            shape
                .iter()
                .map(|&cell| cell + dir.offset())
                .filter(|next| !shape.contains(next))
                .collect()
        });
        Ok(Omino {
            shape,
            borders,
            unique_id: None,
        })
    }

    /// Number of cells the shape occupies.
    pub fn num_cells(&self) -> usize {
        self.shape.len()
    }

    /// Membership test for a shape-relative cell.
    pub fn contains(&self, cell: Tile) -> bool {
        self.shape.contains(&cell)
    }

    /// Membership test for an absolute cell, assuming the shape's origin
    /// currently sits at `origin`.
    pub fn contains_at(&self, cell: Tile, origin: Tile) -> bool {
        self.contains(cell - origin)
    }

    /// Shape-relative cells, in no particular order.
    pub fn cells(&self) -> impl Iterator<Item = Tile> + '_ {
        self.shape.iter().copied()
    }

    /// The cells that must be free for this shape to slide one step in
    /// `direction`, relative to the shape's origin.
    pub fn border(&self, direction: Direction) -> &FxHashSet<Tile> {
        &self.borders[direction as usize]
    }

    /// The identity token, if this piece must be distinguished from all other
    /// same-shaped pieces.
    pub fn unique_id(&self) -> Option<u32> {
        self.unique_id
    }

    /// Marks this piece as distinguishable. Tokens must be unique per
    /// distinguishable piece or goal tests become unpredictable.
    pub fn set_unique_id(&mut self, id: u32) {
        self.unique_id = Some(id);
    }

    /// Shape comparison used when boards merge interchangeable pieces.
    ///
    /// If either piece carries an identity token the tokens alone decide;
    /// otherwise the cell sets must match exactly.
    pub fn same_shape(&self, other: &Omino) -> bool {
        if self.unique_id.is_some() || other.unique_id.is_some() {
            return self.unique_id == other.unique_id;
        }
        self.shape.len() == other.shape.len()
            && self.shape.iter().all(|cell| other.shape.contains(cell))
    }

    /// Order-independent hash contribution of this shape: the identity token
    /// (zero when absent) plus the sum of its cell keys. Two differently
    /// labeled but interchangeable shapes contribute the same value.
    pub fn layout_hash(&self) -> u64 {
        let base = self.unique_id.map_or(0, u64::from);
        self.shape
            .iter()
            .fold(base, |acc, cell| acc.wrapping_add(cell.cell_key()))
    }
}
