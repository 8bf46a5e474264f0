use alloc::vec::Vec;
use serde::Serialize;

use crate::*;

pub use constraints::*;
pub use enumerate::*;
pub use exhaustive::*;

mod constraints;
mod enumerate;
mod exhaustive;

/// Distance from 0 or 1 under which a probability is treated as certain.
pub const CERTAINTY_EPSILON: f64 = 1e-6;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct CellProbability {
    pub coords: Coord2,
    pub mine: f64,
}

impl CellProbability {
    pub fn is_certainly_safe(&self) -> bool {
        self.mine <= CERTAINTY_EPSILON
    }

    pub fn is_certainly_mine(&self) -> bool {
        self.mine >= 1.0 - CERTAINTY_EPSILON
    }
}

/// Marginal mine probabilities of a set of cells, with the number of assignments they were counted over.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MineProbabilities {
    pub solution_count: u128,
    pub cells: Vec<CellProbability>,
}

impl MineProbabilities {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, coords: Coord2) -> Option<f64> {
        self.cells
            .iter()
            .find(|cell| cell.coords == coords)
            .map(|cell| cell.mine)
    }

    pub fn certainly_safe(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.cells
            .iter()
            .filter(|cell| cell.is_certainly_safe())
            .map(|cell| cell.coords)
    }

    pub fn certainly_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.cells
            .iter()
            .filter(|cell| cell.is_certainly_mine())
            .map(|cell| cell.coords)
    }

    /// Cells sharing the lowest mine probability, in their original order.
    pub fn safest(&self) -> Vec<Coord2> {
        let Some(lowest) = self
            .cells
            .iter()
            .map(|cell| cell.mine)
            .min_by(|a, b| a.total_cmp(b))
        else {
            return Vec::new();
        };

        self.cells
            .iter()
            .filter(|cell| cell.mine <= lowest + CERTAINTY_EPSILON)
            .map(|cell| cell.coords)
            .collect()
    }

    /// Folds in the result of another, independent group.
    pub fn absorb(&mut self, other: MineProbabilities) {
        self.solution_count = if self.cells.is_empty() {
            other.solution_count
        } else {
            self.solution_count.saturating_mul(other.solution_count)
        };
        self.cells.extend(other.cells);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn probs(cells: &[(Coord2, f64)]) -> MineProbabilities {
        MineProbabilities {
            solution_count: 12,
            cells: cells
                .iter()
                .map(|&(coords, mine)| CellProbability { coords, mine })
                .collect(),
        }
    }

    #[test]
    fn certainty_uses_tolerance() {
        let p = probs(&[((0, 0), 1e-9), ((0, 1), 0.999_999_9), ((0, 2), 0.5)]);

        assert_eq!(p.certainly_safe().collect::<Vec<_>>(), vec![(0, 0)]);
        assert_eq!(p.certainly_mines().collect::<Vec<_>>(), vec![(0, 1)]);
    }

    #[test]
    fn safest_keeps_all_ties_in_order() {
        let p = probs(&[((0, 0), 0.4), ((1, 0), 0.25), ((2, 0), 0.25), ((3, 0), 0.3)]);

        assert_eq!(p.safest(), vec![(1, 0), (2, 0)]);
        assert_eq!(MineProbabilities::default().safest(), vec![]);
    }

    #[test]
    fn absorb_multiplies_solution_counts() {
        let mut all = MineProbabilities::default();
        all.absorb(probs(&[((0, 0), 0.5)]));
        all.absorb(probs(&[((5, 5), 0.5)]));

        assert_eq!(all.solution_count, 144);
        assert_eq!(all.get((5, 5)), Some(0.5));
    }
}
