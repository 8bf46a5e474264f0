use core::hash::{Hash, Hasher};
use serde::Serialize;

use crate::*;

/// One square of the board.
///
/// A cell is identified by its coordinates alone: two cells compare equal and hash the same iff they sit at the
/// same `(row, col)`, whatever their play state.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct Cell {
    coords: Coord2,
    has_mine: bool,
    pub(crate) is_flagged: bool,
    pub(crate) is_opened: bool,
    mines_around: u8,
}

impl Cell {
    pub(crate) const fn new(coords: Coord2, has_mine: bool, mines_around: u8) -> Self {
        Self {
            coords,
            has_mine,
            is_flagged: false,
            is_opened: false,
            mines_around,
        }
    }

    pub const fn coords(&self) -> Coord2 {
        self.coords
    }

    pub const fn row(&self) -> Coord {
        self.coords.0
    }

    pub const fn col(&self) -> Coord {
        self.coords.1
    }

    pub const fn has_mine(&self) -> bool {
        self.has_mine
    }

    pub const fn is_flagged(&self) -> bool {
        self.is_flagged
    }

    pub const fn is_opened(&self) -> bool {
        self.is_opened
    }

    /// Number of adjacent mines, meaningless for a mine cell (always 0 there).
    pub const fn mines_around(&self) -> u8 {
        self.mines_around
    }

    /// Opened and safe, so its number is a usable clue.
    pub const fn is_clue(&self) -> bool {
        self.is_opened && !self.has_mine
    }

    pub const fn is_unopened_unflagged(&self) -> bool {
        !self.is_opened && !self.is_flagged
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.coords == other.coords
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coords.hash(state);
    }
}
