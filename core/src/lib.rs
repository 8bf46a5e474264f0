#![no_std]

extern crate alloc;

use core::ops::BitOr;
use serde::{Deserialize, Serialize};

pub use analysis::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use grid::*;
pub use solver::*;
pub use types::*;

mod analysis;
mod cell;
mod engine;
mod error;
mod generator;
mod grid;
mod solver;
mod types;

/// Board dimensions and mine count of a game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub mines: CellCount,
    pub rows: Coord,
    pub cols: Coord,
}

impl GameConfig {
    pub const BEGINNER: Self = Self::new_unchecked(10, 9, 9);
    pub const INTERMEDIATE: Self = Self::new_unchecked(40, 16, 16);
    pub const EXPERT: Self = Self::new_unchecked(99, 16, 30);

    pub const fn new_unchecked(mines: CellCount, rows: Coord, cols: Coord) -> Self {
        Self { mines, rows, cols }
    }

    pub fn new(mines: CellCount, rows: Coord, cols: Coord) -> Result<Self> {
        Self::new_unchecked(mines, rows, cols).validated()
    }

    pub fn validated(self) -> Result<Self> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::EmptyBoard);
        }
        if self.mines > self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(self)
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::BEGINNER
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Variants are ordered by severity, and `|` keeps the more severe side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    Won,
    HitMine,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub const fn ends_game(self) -> bool {
        matches!(self, Self::Won | Self::HitMine)
    }
}

impl BitOr for RevealOutcome {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.max(rhs)
    }
}
