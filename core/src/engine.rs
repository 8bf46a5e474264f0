use alloc::collections::VecDeque;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Unstarted,
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_unstarted(self) -> bool {
        matches!(self, Self::Unstarted)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::Unstarted
    }
}

#[derive(Clone, Debug)]
pub struct Game {
    grid: Grid,
    state: GameState,
    config: GameConfig,
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_generator(config, RandomMinefieldGenerator::new(seed))
    }

    pub fn with_generator(config: GameConfig, generator: impl MinefieldGenerator) -> Result<Self> {
        let config = config.validated()?;
        Ok(Self {
            grid: generator.generate(config),
            state: GameState::default(),
            config,
        })
    }

    pub fn from_grid(grid: Grid) -> Self {
        let (rows, cols) = grid.size();
        let config = GameConfig::new_unchecked(grid.mine_count(), rows, cols);
        Self {
            grid,
            state: GameState::default(),
            config,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn rows(&self) -> Coord {
        self.config.rows
    }

    pub fn cols(&self) -> Coord {
        self.config.cols
    }

    pub fn number_of_mines(&self) -> CellCount {
        self.config.mines
    }

    pub fn flag_total(&self) -> CellCount {
        self.grid.flag_count()
    }

    /// Mines not yet accounted for by a flag, negative when the board is over-flagged.
    pub fn remaining_mines(&self) -> i32 {
        i32::from(self.config.mines) - i32::from(self.flag_total())
    }

    pub fn flag(&mut self, coords: Coord2) -> bool {
        let cell = self.grid.cell_mut(coords);
        cell.is_flagged = !cell.is_flagged;
        cell.is_flagged
    }

    /// Sets the flag on a cell proven to hold a mine, leaving an existing flag alone.
    pub(crate) fn mark_mine(&mut self, coords: Coord2) -> MarkOutcome {
        let cell = self.grid.cell_mut(coords);
        if cell.is_flagged {
            MarkOutcome::NoChange
        } else {
            cell.is_flagged = true;
            MarkOutcome::Changed
        }
    }

    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        if self.state.is_unstarted() {
            self.state = GameState::InProgress;
        }
        if self.state != GameState::InProgress {
            return RevealOutcome::NoChange;
        }

        let cell = *self.grid.cell(coords);
        if cell.is_flagged() || cell.is_opened() {
            return RevealOutcome::NoChange;
        }

        self.grid.cell_mut(coords).is_opened = true;

        if cell.has_mine() {
            log::trace!("Opened mine at {:?}", coords);
            self.lose_game();
            return RevealOutcome::HitMine;
        }

        if cell.mines_around() == 0 {
            self.flood_open(coords);
        }

        if self.check_win() {
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    fn flood_open(&mut self, origin: Coord2) {
        let mut to_visit: VecDeque<Coord2> = self.grid.neighbors(origin).collect();

        while let Some(visit_coords) = to_visit.pop_front() {
            let cell = self.grid.cell_mut(visit_coords);
            if cell.is_opened || cell.is_flagged {
                continue;
            }
            cell.is_opened = true;

            if cell.mines_around() == 0 {
                to_visit.extend(
                    self.grid
                        .neighbor_cells(visit_coords)
                        .filter(|neighbor| neighbor.is_unopened_unflagged())
                        .map(Cell::coords),
                );
            }
        }
    }

    fn check_win(&mut self) -> bool {
        if self.grid.unopened_count() > self.config.mines {
            return false;
        }

        for cell in self.grid.cells_mut() {
            if !cell.is_opened {
                cell.is_flagged = true;
            }
        }
        self.state = GameState::Won;
        true
    }

    fn lose_game(&mut self) {
        for cell in self.grid.cells_mut() {
            cell.is_opened = true;
            cell.is_flagged = false;
        }
        self.state = GameState::Lost;
    }
}
