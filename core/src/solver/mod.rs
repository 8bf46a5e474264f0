use alloc::vec::Vec;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

pub use deduction::*;
pub use guess::{GuessPolicy, risk_score};

mod deduction;
mod guess;

/// Which probability engine the constraint tier runs. The modes are exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[default]
    Global,
    PerGroup,
    Exhaustive,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    Deterministic,
    Constraint,
    Guess,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub strategy: Strategy,
    pub guess_policy: GuessPolicy,
    /// The global pass is discarded when fewer assignments than this satisfy the board.
    pub min_global_solutions: u128,
    pub max_component_size: Option<usize>,
    pub exhaustive_limit: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            guess_policy: GuessPolicy::default(),
            min_global_solutions: 10,
            max_component_size: None,
            exhaustive_limit: MAX_EXHAUSTIVE_CELLS,
        }
    }
}

enum TierOutcome {
    Applied,
    Uncertain(MineProbabilities),
    Unavailable,
}

#[derive(Clone, Debug)]
pub struct Solver {
    config: SolverConfig,
    rng: SmallRng,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(SolverConfig::default(), 0)
    }
}

impl Solver {
    pub fn new(config: SolverConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Runs the certain tiers for as long as they make progress, or makes one guess when neither applies.
    pub fn make_a_move(&mut self, game: &mut Game) -> Option<MoveKind> {
        if game.is_finished() {
            return None;
        }

        let mut last = None;
        let mut probabilities = None;

        while !game.is_finished() {
            if apply_local_deduction(game) {
                last = Some(MoveKind::Deterministic);
                continue;
            }

            match self.constraint_tier(game) {
                TierOutcome::Applied => last = Some(MoveKind::Constraint),
                TierOutcome::Uncertain(uncertain) => {
                    probabilities = Some(uncertain);
                    break;
                }
                TierOutcome::Unavailable => break,
            }
        }

        if last.is_some() {
            return last;
        }

        let target = guess::choose_guess(
            game,
            self.config.guess_policy,
            probabilities.as_ref(),
            &mut self.rng,
        )?;
        log::debug!("Guessing {:?}", target);
        game.reveal(target);
        Some(MoveKind::Guess)
    }

    fn constraint_tier(&self, game: &mut Game) -> TierOutcome {
        let probabilities = match self.config.strategy {
            Strategy::Global => self.global_probabilities(game),
            Strategy::PerGroup => self.grouped_probabilities(game.grid(), false),
            Strategy::Exhaustive => self.grouped_probabilities(game.grid(), true),
        };
        let Some(probabilities) = probabilities else {
            return TierOutcome::Unavailable;
        };

        let mines: Vec<Coord2> = probabilities.certainly_mines().collect();
        let safe: Vec<Coord2> = probabilities.certainly_safe().collect();
        if mines.is_empty() && safe.is_empty() {
            return TierOutcome::Uncertain(probabilities);
        }

        let safe_count = safe.len();
        let marked = mines
            .into_iter()
            .filter(|&coords| game.mark_mine(coords).has_update())
            .count();
        let mut outcome = RevealOutcome::NoChange;
        for coords in safe {
            outcome = outcome | game.reveal(coords);
            if outcome.ends_game() {
                break;
            }
        }

        log::debug!(
            "{:?} pass: {} mines marked, {} safe cells opened, {:?}",
            self.config.strategy,
            marked,
            safe_count,
            outcome
        );
        if marked == 0 && !outcome.has_update() {
            return TierOutcome::Unavailable;
        }
        TierOutcome::Applied
    }

    fn global_probabilities(&self, game: &Game) -> Option<MineProbabilities> {
        let grid = game.grid();
        let frontier = grid.constrained_unopened_cells();
        if frontier.is_empty() {
            return None;
        }

        let budget = CellCount::try_from(game.remaining_mines().max(0)).unwrap_or(CellCount::MAX);
        let output = build_constraints(grid, &frontier, Some(budget));
        if !output.contradictions.is_empty() {
            log::debug!("Global pass skipped: {:?}", output.contradictions);
            return None;
        }
        if !self.fits_component_cap(output.problem.max_component_variables()) {
            return None;
        }

        let probabilities = mine_probabilities(&output.problem)?;
        if probabilities.solution_count < self.config.min_global_solutions {
            log::debug!(
                "Global pass has {} solutions, fewer than {}",
                probabilities.solution_count,
                self.config.min_global_solutions
            );
            return None;
        }
        Some(probabilities)
    }

    fn grouped_probabilities(&self, grid: &Grid, exhaustive: bool) -> Option<MineProbabilities> {
        let frontier = grid.constrained_unopened_cells();
        let groups = perimeter_groups(grid, &frontier);
        let limit = self.config.exhaustive_limit.min(MAX_EXHAUSTIVE_CELLS);

        log::trace!("{} perimeter groups over {} cells", groups.len(), frontier.len());

        let mut combined = MineProbabilities::default();
        for group in &groups {
            let probabilities = if exhaustive && group.len() <= limit {
                exhaustive_probabilities(grid, group)
            } else {
                self.group_probabilities(grid, group)
            };
            if let Some(probabilities) = probabilities {
                combined.absorb(probabilities);
            }
        }

        (!combined.is_empty()).then_some(combined)
    }

    fn group_probabilities(&self, grid: &Grid, group: &[Coord2]) -> Option<MineProbabilities> {
        let output = build_constraints(grid, group, None);
        if !output.contradictions.is_empty() {
            log::debug!("Group of {} skipped: {:?}", group.len(), output.contradictions);
            return None;
        }
        if !self.fits_component_cap(output.problem.max_component_variables()) {
            return None;
        }
        mine_probabilities(&output.problem)
    }

    fn fits_component_cap(&self, size: usize) -> bool {
        match self.config.max_component_size {
            Some(cap) if size > cap => {
                log::warn!("Component of {} cells is over the cap of {}", size, cap);
                false
            }
            _ => true,
        }
    }
}

pub fn make_a_move(game: &mut Game) -> Option<MoveKind> {
    Solver::default().make_a_move(game)
}
