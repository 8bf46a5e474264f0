use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use super::{CellProbability, MineProbabilities};
use crate::*;

/// Largest group the brute-force enumeration accepts.
pub const MAX_EXHAUSTIVE_CELLS: usize = 20;

/// An opened cell next to the group: which group cells touch it, and how many flags and mines it allows.
#[derive(Copy, Clone, Debug)]
struct FlagLimit {
    group_mask: u32,
    flags: u8,
    mines: u8,
}

impl FlagLimit {
    fn allows(&self, hypothetical: u32) -> bool {
        let touching = self.group_mask & hypothetical;
        touching == 0 || u32::from(self.flags) + touching.count_ones() <= u32::from(self.mines)
    }
}

/// Mine probabilities of a small group by trying every subset of it as extra flags.
///
/// A subset is kept when no opened cell around a hypothetically flagged cell ends up with more flags than its
/// number. This only bounds flag counts from above, so it is looser than the equality constraints used by
/// [`mine_probabilities`].
///
/// Returns `None` for an empty group, a group above [`MAX_EXHAUSTIVE_CELLS`], or when no subset is valid.
pub fn exhaustive_probabilities(grid: &Grid, group: &[Coord2]) -> Option<MineProbabilities> {
    if group.is_empty() || group.len() > MAX_EXHAUSTIVE_CELLS {
        return None;
    }

    let mut limits: BTreeMap<Coord2, FlagLimit> = BTreeMap::new();
    for (bit, &coords) in group.iter().enumerate() {
        for neighbor in grid.neighbor_cells(coords).filter(|cell| cell.is_clue()) {
            limits
                .entry(neighbor.coords())
                .or_insert_with(|| FlagLimit {
                    group_mask: 0,
                    flags: grid.flag_count_around(neighbor.coords()),
                    mines: neighbor.mines_around(),
                })
                .group_mask |= 1 << bit;
        }
    }
    let limits: Vec<FlagLimit> = limits.into_values().collect();

    let mut valid = 0u64;
    let mut hits = vec![0u64; group.len()];

    for hypothetical in 0..(1u32 << group.len()) {
        if !limits.iter().all(|limit| limit.allows(hypothetical)) {
            continue;
        }

        valid += 1;
        for (bit, count) in hits.iter_mut().enumerate() {
            if hypothetical & (1 << bit) != 0 {
                *count += 1;
            }
        }
    }

    if valid == 0 {
        log::debug!("No valid flag placement for a group of {}", group.len());
        return None;
    }

    Some(MineProbabilities {
        solution_count: u128::from(valid),
        cells: group
            .iter()
            .zip(hits)
            .map(|(&coords, count)| CellProbability {
                coords,
                mine: count as f64 / valid as f64,
            })
            .collect(),
    })
}
