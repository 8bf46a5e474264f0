use alloc::vec::Vec;

use crate::*;

enum Deduction {
    Flag(Vec<Coord2>),
    Open(Vec<Coord2>),
}

/// First sure inference found from a single opened cell, scanning row-major.
///
/// A cell whose number equals its unopened neighbors has all of them as mines; failing that, a cell whose number
/// equals its flagged neighbors has every other unopened neighbor safe.
fn find_local_deduction(grid: &Grid) -> Option<(Coord2, Deduction)> {
    for cell in grid.cells().filter(|cell| cell.is_clue()) {
        let coords = cell.coords();
        let mines = cell.mines_around();

        let hidden: Vec<Coord2> = grid
            .neighbor_cells(coords)
            .filter(|neighbor| neighbor.is_unopened_unflagged())
            .map(Cell::coords)
            .collect();
        if hidden.is_empty() {
            continue;
        }

        if mines == grid.unopened_count_around(coords) {
            return Some((coords, Deduction::Flag(hidden)));
        }
        if mines == grid.flag_count_around(coords) {
            return Some((coords, Deduction::Open(hidden)));
        }
    }

    None
}

/// Applies one local deduction. Returns whether a move was made.
pub fn apply_local_deduction(game: &mut Game) -> bool {
    let Some((source, deduction)) = find_local_deduction(game.grid()) else {
        return false;
    };

    match deduction {
        Deduction::Flag(targets) => {
            log::trace!("{:?} flags {:?}", source, targets);
            for target in targets {
                game.flag(target);
            }
            true
        }
        Deduction::Open(targets) => {
            let mut outcome = RevealOutcome::NoChange;
            for &target in &targets {
                outcome = outcome | game.reveal(target);
                if outcome.ends_game() {
                    break;
                }
            }
            log::trace!("{:?} opens {:?}: {:?}", source, targets, outcome);
            outcome.has_update()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_with_opened(size: Coord2, mines: &[Coord2], opened: &[Coord2]) -> Game {
        let mut game = Game::from_grid(Grid::from_mine_coords(size, mines).unwrap());
        for &coords in opened {
            game.reveal(coords);
        }
        game
    }

    fn has_sure_inference(grid: &Grid) -> bool {
        grid.cells().filter(|cell| cell.is_clue()).any(|cell| {
            let coords = cell.coords();
            let mines = cell.mines_around();
            grid.neighbor_cells(coords).any(Cell::is_unopened_unflagged)
                && (mines == grid.unopened_count_around(coords)
                    || mines == grid.flag_count_around(coords))
        })
    }

    fn play_state(grid: &Grid) -> Vec<(bool, bool)> {
        grid.cells()
            .map(|cell| (cell.is_opened(), cell.is_flagged()))
            .collect()
    }

    #[test]
    fn acts_exactly_when_some_clue_allows_it() {
        let mut idle_boards = 0;

        for seed in 0..32 {
            let mut game = Game::new(GameConfig::BEGINNER, seed).unwrap();
            let mut solver = Solver::new(SolverConfig::default(), seed);

            while !game.is_finished() {
                let mut copy = game.clone();
                let before = play_state(copy.grid());
                let expected = has_sure_inference(copy.grid());

                assert_eq!(apply_local_deduction(&mut copy), expected, "seed {}", seed);
                if !expected {
                    if game.state() == GameState::InProgress {
                        idle_boards += 1;
                    }
                    assert_eq!(play_state(copy.grid()), before, "seed {}", seed);
                }

                if solver.make_a_move(&mut game).is_none() {
                    break;
                }
            }
        }

        assert!(idle_boards > 0);
    }

    #[test]
    fn flags_when_every_unopened_neighbor_must_be_a_mine() {
        // (1, 0) reads 1 and (0, 0) is its only unopened neighbor
        let mut game = game_with_opened((2, 3), &[(0, 0), (1, 2)], &[(0, 1), (1, 0), (1, 1)]);

        assert!(apply_local_deduction(&mut game));

        assert!(game.grid()[(0, 0)].is_flagged());
        assert_eq!(game.flag_total(), 1);
        assert_eq!(game.state(), GameState::InProgress);
    }

    #[test]
    fn opens_when_flags_account_for_every_mine() {
        let mut game = game_with_opened((2, 3), &[(0, 0)], &[(1, 1)]);
        game.flag((0, 0));

        assert!(apply_local_deduction(&mut game));

        let grid = game.grid();
        for coords in [(0, 1), (0, 2), (1, 0), (1, 2)] {
            assert!(grid[coords].is_opened(), "{:?}", coords);
        }
        assert_eq!(game.state(), GameState::Won);
    }

    #[test]
    fn makes_a_single_move_per_call() {
        // mirrored corners: (1, 0) pins (0, 0) and (1, 6) pins (0, 6)
        let mut game = game_with_opened(
            (2, 7),
            &[(0, 0), (1, 2), (0, 6), (1, 4)],
            &[(0, 1), (1, 0), (1, 1), (0, 5), (1, 5), (1, 6)],
        );

        assert!(apply_local_deduction(&mut game));
        assert_eq!(game.flag_total(), 1);
        assert!(game.grid()[(0, 0)].is_flagged());
        assert!(!game.grid()[(0, 6)].is_flagged());

        assert!(apply_local_deduction(&mut game));
        assert_eq!(game.flag_total(), 2);
        assert!(game.grid()[(0, 6)].is_flagged());

        assert!(!apply_local_deduction(&mut game));
    }

    #[test]
    fn does_nothing_without_a_sure_inference() {
        // ? 1 ? : either side could be the mine
        let mut game = game_with_opened((1, 3), &[(0, 0)], &[(0, 1)]);

        assert!(!apply_local_deduction(&mut game));
        assert_eq!(game.flag_total(), 0);
        assert_eq!(game.grid().unopened_count(), 2);
    }

    #[test]
    fn wrong_flag_leads_into_a_mine() {
        // (1, 1) reads 1 and the flag on (0, 2) is wrong, so (0, 0) gets opened
        let mut game = game_with_opened((2, 3), &[(0, 0)], &[(1, 1)]);
        game.flag((0, 2));

        assert!(apply_local_deduction(&mut game));

        assert_eq!(game.state(), GameState::Lost);
        assert_eq!(game.flag_total(), 0);
    }

    #[test]
    fn does_nothing_on_an_unstarted_board() {
        let mut game = Game::new(GameConfig::default(), 11).unwrap();

        assert!(!apply_local_deduction(&mut game));
        assert_eq!(game.state(), GameState::Unstarted);
    }
}
