use crate::*;
pub use random::*;

mod random;

/// Produces a fresh grid for a validated [`GameConfig`].
pub trait MinefieldGenerator {
    fn generate(self, config: GameConfig) -> Grid;
}

/// Fixed layout, mostly useful to replay a known board.
impl MinefieldGenerator for Grid {
    fn generate(self, config: GameConfig) -> Grid {
        if self.size() != config.size() || self.mine_count() != config.mines {
            log::warn!(
                "Replayed grid {:?} with {} mines does not match config {:?}",
                self.size(),
                self.mine_count(),
                config
            );
        }
        self
    }
}
