use ndarray::Array2;

use super::*;

/// Places the configured number of mines uniformly at random, without replacement, from a seed.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> Grid {
        use rand::prelude::*;

        let total_cells = usize::from(config.total_cells());
        let mut mines = usize::from(config.mines);

        if mines > total_cells {
            log::warn!(
                "Minefield already full, requested {} mines but only fits {}",
                mines,
                total_cells
            );
            mines = total_cells;
        }

        let mut mine_mask: Array2<bool> = Array2::default(config.size().to_nd_index());
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let cols = usize::from(config.cols);
        for index in rand::seq::index::sample(&mut rng, total_cells, mines) {
            mine_mask[[index / cols, index % cols]] = true;
        }

        let grid = Grid::from_mine_mask(&mine_mask);
        if grid.mine_count() != config.mines {
            log::warn!(
                "Generated minefield count mismatch, actual: {}, requested: {}",
                grid.mine_count(),
                config.mines
            );
        }
        grid
    }
}
