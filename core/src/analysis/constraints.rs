use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use serde::Serialize;
use smallvec::SmallVec;

use crate::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConstraintVariable {
    pub id: usize,
    pub coords: Coord2,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum EquationKind {
    LocalClue { clue: Coord2 },
    MineBudget,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConstraintEquation {
    pub id: usize,
    pub kind: EquationKind,
    pub variable_ids: Vec<usize>,
    pub target_mines: CellCount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConstraintComponent {
    pub variable_ids: Vec<usize>,
    pub equation_ids: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConstraintProblem {
    pub variables: Vec<ConstraintVariable>,
    pub equations: Vec<ConstraintEquation>,
    pub components: Vec<ConstraintComponent>,
}

impl ConstraintProblem {
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn mine_budget(&self) -> Option<CellCount> {
        self.equations
            .iter()
            .find(|eq| matches!(eq.kind, EquationKind::MineBudget))
            .map(|eq| eq.target_mines)
    }

    pub fn max_component_variables(&self) -> usize {
        self.components
            .iter()
            .map(|component| component.variable_ids.len())
            .max()
            .unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Contradiction {
    LocalClueImpossible {
        clue: Coord2,
        target_mines: i16,
        available_variables: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConstraintBuildOutput {
    pub problem: ConstraintProblem,
    pub contradictions: Vec<Contradiction>,
}

/// Builds one boolean variable per cell and one equation per opened cell touching them.
pub fn build_constraints(
    grid: &Grid,
    cells: &[Coord2],
    mine_budget: Option<CellCount>,
) -> ConstraintBuildOutput {
    let mut variables = Vec::new();
    let mut variable_ids: HashMap<Coord2, usize> = HashMap::with_capacity(cells.len());

    for &coords in cells {
        variable_ids.entry(coords).or_insert_with(|| {
            let id = variables.len();
            variables.push(ConstraintVariable { id, coords });
            id
        });
    }

    // row-major, so equation order does not depend on the order of `cells`
    let clues: BTreeSet<Coord2> = variables
        .iter()
        .flat_map(|var| grid.neighbor_cells(var.coords))
        .filter(|cell| cell.is_clue())
        .map(Cell::coords)
        .collect();

    let mut equations = Vec::new();
    let mut contradictions = Vec::new();

    for clue in clues {
        let target_mines =
            i16::from(grid[clue].mines_around()) - i16::from(grid.flag_count_around(clue));

        let equation_vars: Vec<usize> = grid
            .neighbor_cells(clue)
            .filter(|cell| cell.is_unopened_unflagged())
            .filter_map(|cell| variable_ids.get(&cell.coords()).copied())
            .collect();

        if equation_vars.is_empty() {
            continue;
        }

        if target_mines < 0 || (target_mines as usize) > equation_vars.len() {
            log::debug!(
                "Clue at {:?} needs {} mines among {} cells",
                clue,
                target_mines,
                equation_vars.len()
            );
            contradictions.push(Contradiction::LocalClueImpossible {
                clue,
                target_mines,
                available_variables: equation_vars.len(),
            });
            continue;
        }

        equations.push(ConstraintEquation {
            id: equations.len(),
            kind: EquationKind::LocalClue { clue },
            variable_ids: equation_vars,
            target_mines: target_mines as CellCount,
        });
    }

    if let Some(target_mines) = mine_budget {
        equations.push(ConstraintEquation {
            id: equations.len(),
            kind: EquationKind::MineBudget,
            variable_ids: (0..variables.len()).collect(),
            target_mines,
        });
    }

    let components = build_components(variables.len(), &equations);

    ConstraintBuildOutput {
        problem: ConstraintProblem {
            variables,
            equations,
            components,
        },
        contradictions,
    }
}

pub fn perimeter_groups(grid: &Grid, frontier: &[Coord2]) -> Vec<Vec<Coord2>> {
    let problem = build_constraints(grid, frontier, None).problem;

    problem
        .components
        .iter()
        .map(|component| {
            component
                .variable_ids
                .iter()
                .map(|&id| problem.variables[id].coords)
                .collect()
        })
        .collect()
}

// The budget equation spans every variable and is left out of the adjacency.
fn build_components(
    variable_count: usize,
    equations: &[ConstraintEquation],
) -> Vec<ConstraintComponent> {
    let mut var_equations: Vec<SmallVec<[usize; 8]>> = vec![SmallVec::new(); variable_count];
    for equation in equations {
        if !matches!(equation.kind, EquationKind::LocalClue { .. }) {
            continue;
        }
        for &var in &equation.variable_ids {
            var_equations[var].push(equation.id);
        }
    }

    let mut visited = vec![false; variable_count];
    let mut components = Vec::new();

    for start in 0..variable_count {
        if visited[start] {
            continue;
        }
        visited[start] = true;

        let mut component = ConstraintComponent {
            variable_ids: Vec::new(),
            equation_ids: Vec::new(),
        };
        let mut queue = VecDeque::from([start]);

        while let Some(var) = queue.pop_front() {
            component.variable_ids.push(var);

            for &eq_id in &var_equations[var] {
                component.equation_ids.push(eq_id);
                for &linked in &equations[eq_id].variable_ids {
                    if !visited[linked] {
                        visited[linked] = true;
                        queue.push_back(linked);
                    }
                }
            }
        }

        component.equation_ids.sort_unstable();
        component.equation_ids.dedup();
        components.push(component);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_opened(size: Coord2, mines: &[Coord2], opened: &[Coord2]) -> Grid {
        let mut grid = Grid::from_mine_coords(size, mines).unwrap();
        for &coords in opened {
            grid.cell_mut(coords).is_opened = true;
        }
        grid
    }

    #[test]
    fn builds_local_clue_equation() {
        let grid = grid_with_opened((2, 2), &[(0, 0)], &[(1, 1)]);
        let frontier = grid.constrained_unopened_cells();

        let out = build_constraints(&grid, &frontier, None);

        let local = out
            .problem
            .equations
            .iter()
            .find(|eq| matches!(eq.kind, EquationKind::LocalClue { clue: (1, 1) }))
            .expect("local equation should exist");
        assert_eq!(local.target_mines, 1);
        assert_eq!(local.variable_ids.len(), 3);
        assert_eq!(out.problem.mine_budget(), None);
    }

    #[test]
    fn flags_reduce_the_target() {
        let mut grid = grid_with_opened((1, 3), &[(0, 0), (0, 2)], &[(0, 1)]);
        grid.cell_mut((0, 0)).is_flagged = true;
        let frontier = grid.constrained_unopened_cells();

        let out = build_constraints(&grid, &frontier, None);

        assert_eq!(frontier, vec![(0, 2)]);
        assert_eq!(out.problem.equations[0].target_mines, 1);
        assert_eq!(out.problem.equations[0].variable_ids, vec![0]);
    }

    #[test]
    fn over_flagged_clue_is_a_contradiction() {
        let mut grid = grid_with_opened((2, 3), &[(0, 0)], &[(1, 1)]);
        grid.cell_mut((0, 1)).is_flagged = true;
        grid.cell_mut((0, 2)).is_flagged = true;
        let frontier = grid.constrained_unopened_cells();

        let out = build_constraints(&grid, &frontier, None);

        assert_eq!(
            out.contradictions,
            vec![Contradiction::LocalClueImpossible {
                clue: (1, 1),
                target_mines: -1,
                available_variables: 3,
            }]
        );
        assert!(out.problem.equations.is_empty());
    }

    #[test]
    fn budget_equation_spans_every_variable() {
        let grid = grid_with_opened((1, 4), &[(0, 3)], &[(0, 0), (0, 1)]);
        let frontier = grid.constrained_unopened_cells();

        let out = build_constraints(&grid, &frontier, Some(2));

        let budget = out.problem.equations.last().unwrap();
        assert_eq!(budget.kind, EquationKind::MineBudget);
        assert_eq!(budget.variable_ids, vec![0]);
        assert_eq!(budget.target_mines, 2);
    }

    #[test]
    fn splits_independent_perimeter_groups() {
        // 1 x 7 strip: the opened cells at 1 and 5 see disjoint unopened cells
        let grid = grid_with_opened((1, 7), &[(0, 0), (0, 6)], &[(0, 1), (0, 5)]);
        let frontier = grid.constrained_unopened_cells();

        let groups = perimeter_groups(&grid, &frontier);

        assert_eq!(groups, vec![vec![(0, 0), (0, 2)], vec![(0, 4), (0, 6)]]);
    }

    #[test]
    fn shared_clue_links_cells_into_one_group() {
        let grid = grid_with_opened((2, 3), &[(1, 0)], &[(0, 0), (0, 1), (0, 2)]);
        let frontier = grid.constrained_unopened_cells();

        let groups = perimeter_groups(&grid, &frontier);

        assert_eq!(groups, vec![vec![(1, 0), (1, 1), (1, 2)]]);
    }
}
