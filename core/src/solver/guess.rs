use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// How the last, uncertain move is picked once nothing can be inferred.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessPolicy {
    /// Fewest opened neighbors first, then lowest danger density.
    #[default]
    RiskHeuristic,
    /// Uniformly among the lowest-probability frontier cells when the constraint pass produced any.
    SafestProbability,
}

/// `(opened neighbors, percentage of neighbors that are numbered or unopened)`. Lower is preferred.
pub fn risk_score(grid: &Grid, coords: Coord2) -> (u8, u8) {
    let mut neighbors = 0u32;
    let mut constraints = 0u8;
    let mut dangerous = 0u32;

    for cell in grid.neighbor_cells(coords) {
        neighbors += 1;
        if cell.is_opened() {
            constraints += 1;
            if cell.mines_around() > 0 {
                dangerous += 1;
            }
        } else {
            dangerous += 1;
        }
    }

    let density = if neighbors == 0 {
        0
    } else {
        (dangerous * 100 / neighbors) as u8
    };
    (constraints, density)
}

fn is_on_border(grid: &Grid, (row, col): Coord2) -> bool {
    row == 0 || col == 0 || row + 1 == grid.rows() || col + 1 == grid.cols()
}

/// Picks the cell to open when no certain move exists, or `None` when nothing is left to open.
pub(crate) fn choose_guess(
    game: &Game,
    policy: GuessPolicy,
    probabilities: Option<&MineProbabilities>,
    rng: &mut SmallRng,
) -> Option<Coord2> {
    if game.state().is_unstarted() {
        return Some((game.rows() / 2, game.cols() / 2));
    }

    let grid = game.grid();
    let candidates = grid.unopened_unflagged_cells();

    let unconstrained = |&coords: &Coord2| grid.is_unconstrained(coords);
    let blind = candidates
        .iter()
        .filter(|&&coords| is_on_border(grid, coords))
        .find(|coords| unconstrained(coords))
        .or_else(|| {
            candidates
                .iter()
                .filter(|&&coords| !is_on_border(grid, coords))
                .find(|coords| unconstrained(coords))
        });
    if let Some(&coords) = blind {
        return Some(coords);
    }

    if policy == GuessPolicy::SafestProbability {
        if let Some(probabilities) = probabilities {
            let safest = probabilities.safest();
            if let Some(&coords) = safest.choose(rng) {
                log::trace!("Picked {:?} among {} safest cells", coords, safest.len());
                return Some(coords);
            }
        }
    }

    candidates
        .into_iter()
        .min_by_key(|&coords| risk_score(grid, coords))
}
