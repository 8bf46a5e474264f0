use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;

use super::{CellProbability, MineProbabilities};
use crate::*;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MineCountTally {
    pub solutions: u128,
    pub mine_hits: Vec<u128>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentTally {
    pub variable_ids: Vec<usize>,
    pub by_mines: Vec<MineCountTally>,
}

impl ComponentTally {
    pub fn total_solutions(&self) -> u128 {
        self.by_mines.iter().map(|tally| tally.solutions).sum()
    }

    fn distribution(&self) -> Vec<u128> {
        self.by_mines.iter().map(|tally| tally.solutions).collect()
    }
}

// Each clue equation tracks assigned mines and unassigned variables, and a branch is cut as soon as one
// of them can no longer be met.
struct Search {
    var_equations: Vec<SmallVec<[usize; 8]>>,
    targets: Vec<CellCount>,
    assigned_mines: Vec<CellCount>,
    unassigned: Vec<CellCount>,
    values: Vec<bool>,
    mines: usize,
    by_mines: Vec<MineCountTally>,
}

impl Search {
    fn run(&mut self, depth: usize) {
        if depth == self.values.len() {
            self.record();
            return;
        }

        for value in [false, true] {
            if self.assign(depth, value) {
                self.run(depth + 1);
            }
            self.unassign(depth, value);
        }
    }

    fn assign(&mut self, var: usize, value: bool) -> bool {
        let Self {
            var_equations,
            targets,
            assigned_mines,
            unassigned,
            ..
        } = self;

        let mut feasible = true;
        for &eq in &var_equations[var] {
            unassigned[eq] -= 1;
            if value {
                assigned_mines[eq] += 1;
            }
            feasible &= assigned_mines[eq] <= targets[eq]
                && assigned_mines[eq] + unassigned[eq] >= targets[eq];
        }

        self.values[var] = value;
        if value {
            self.mines += 1;
        }
        feasible
    }

    fn unassign(&mut self, var: usize, value: bool) {
        for &eq in &self.var_equations[var] {
            self.unassigned[eq] += 1;
            if value {
                self.assigned_mines[eq] -= 1;
            }
        }

        if value {
            self.mines -= 1;
        }
    }

    fn record(&mut self) {
        let var_count = self.values.len();
        if self.by_mines.len() <= self.mines {
            self.by_mines.resize_with(self.mines + 1, || MineCountTally {
                solutions: 0,
                mine_hits: vec![0; var_count],
            });
        }

        let tally = &mut self.by_mines[self.mines];
        tally.solutions += 1;
        for (hits, &is_mine) in tally.mine_hits.iter_mut().zip(&self.values) {
            if is_mine {
                *hits += 1;
            }
        }
    }
}

pub fn tally_component(
    problem: &ConstraintProblem,
    component: &ConstraintComponent,
) -> ComponentTally {
    let local_ids: HashMap<usize, usize> = component
        .variable_ids
        .iter()
        .enumerate()
        .map(|(local, &id)| (id, local))
        .collect();

    let var_count = component.variable_ids.len();
    let mut var_equations = vec![SmallVec::new(); var_count];
    let mut targets = Vec::new();
    let mut unassigned = Vec::new();

    for &eq_id in &component.equation_ids {
        let equation = &problem.equations[eq_id];
        if !matches!(equation.kind, EquationKind::LocalClue { .. }) {
            continue;
        }

        let local_eq = targets.len();
        targets.push(equation.target_mines);
        unassigned.push(equation.variable_ids.len() as CellCount);
        for id in &equation.variable_ids {
            var_equations[local_ids[id]].push(local_eq);
        }
    }

    let mut search = Search {
        var_equations,
        assigned_mines: vec![0; targets.len()],
        targets,
        unassigned,
        values: vec![false; var_count],
        mines: 0,
        by_mines: Vec::new(),
    };
    search.run(0);

    log::trace!(
        "Component of {} cells has {} solutions",
        var_count,
        search.by_mines.iter().map(|t| t.solutions).sum::<u128>()
    );

    ComponentTally {
        variable_ids: component.variable_ids.clone(),
        by_mines: search.by_mines,
    }
}

fn convolve(left: &[u128], right: &[u128], limit: usize) -> Vec<u128> {
    let len = (left.len() + right.len()).saturating_sub(1).min(limit + 1);
    let mut out = vec![0u128; len];
    for (i, &a) in left.iter().enumerate() {
        if a == 0 {
            continue;
        }
        for (j, &b) in right.iter().enumerate() {
            if i + j >= len {
                break;
            }
            out[i + j] = out[i + j].saturating_add(a.saturating_mul(b));
        }
    }
    out
}

/// Exact marginal mine probability of every variable of `problem`.
///
/// Returns `None` when there are no variables or no assignment satisfies every equation.
pub fn mine_probabilities(problem: &ConstraintProblem) -> Option<MineProbabilities> {
    if problem.is_empty() {
        return None;
    }

    let tallies: Vec<ComponentTally> = problem
        .components
        .iter()
        .map(|component| tally_component(problem, component))
        .collect();

    if tallies.iter().any(|tally| tally.total_solutions() == 0) {
        log::debug!("Constraint problem has no solution");
        return None;
    }

    let mut mine = vec![0.0f64; problem.variables.len()];

    let solution_count = match problem.mine_budget() {
        None => {
            for tally in &tallies {
                let total = tally.total_solutions();
                for (local, &id) in tally.variable_ids.iter().enumerate() {
                    let hits: u128 = tally.by_mines.iter().map(|t| t.mine_hits[local]).sum();
                    mine[id] = hits as f64 / total as f64;
                }
            }
            tallies
                .iter()
                .fold(1u128, |acc, tally| acc.saturating_mul(tally.total_solutions()))
        }
        Some(budget) => {
            let budget = usize::from(budget);
            let distributions: Vec<Vec<u128>> =
                tallies.iter().map(ComponentTally::distribution).collect();

            // prefix[i] covers components before i, suffix[i] those from i on
            let mut prefix = Vec::with_capacity(distributions.len() + 1);
            let mut running = vec![1u128];
            for dist in &distributions {
                let next = convolve(&running, dist, budget);
                prefix.push(core::mem::replace(&mut running, next));
            }
            prefix.push(running);
            let mut suffix = vec![vec![1u128]; distributions.len() + 1];
            for (i, dist) in distributions.iter().enumerate().rev() {
                suffix[i] = convolve(&suffix[i + 1], dist, budget);
            }

            let total: u128 = prefix[distributions.len()].iter().sum();
            if total == 0 {
                log::debug!("No assignment fits within {} remaining mines", budget);
                return None;
            }

            for (index, tally) in tallies.iter().enumerate() {
                let others = convolve(&prefix[index], &suffix[index + 1], budget);
                let at_most: Vec<u128> = others
                    .iter()
                    .scan(0u128, |acc, &ways| {
                        *acc = acc.saturating_add(ways);
                        Some(*acc)
                    })
                    .collect();
                let others_within = |limit: usize| at_most[limit.min(at_most.len() - 1)];

                for (local, &id) in tally.variable_ids.iter().enumerate() {
                    let hits = tally
                        .by_mines
                        .iter()
                        .enumerate()
                        .take(budget + 1)
                        .map(|(k, t)| t.mine_hits[local].saturating_mul(others_within(budget - k)))
                        .fold(0u128, u128::saturating_add);
                    mine[id] = hits as f64 / total as f64;
                }
            }
            total
        }
    };

    Some(MineProbabilities {
        solution_count,
        cells: problem
            .variables
            .iter()
            .map(|var| CellProbability {
                coords: var.coords,
                mine: mine[var.id],
            })
            .collect(),
    })
}
