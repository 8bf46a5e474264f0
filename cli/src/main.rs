use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sapper_core::*;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(version, about = "Plays batches of games with the solver and reports how they ended", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// How many games to play
    #[arg(short, long, default_value_t = 1000)]
    games: u64,

    #[arg(short, long, default_value_t = GameConfig::BEGINNER.mines)]
    mines: CellCount,

    #[arg(short, long, default_value_t = GameConfig::BEGINNER.rows)]
    rows: Coord,

    #[arg(short, long, default_value_t = GameConfig::BEGINNER.cols)]
    cols: Coord,

    /// Seed of the first game, the following games count up from it
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = StrategyArg::Global)]
    strategy: StrategyArg,

    #[arg(long, value_enum, default_value_t = GuessArg::Risk)]
    guess_policy: GuessArg,

    /// Print the statistics as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Global,
    PerGroup,
    Exhaustive,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Global => Strategy::Global,
            StrategyArg::PerGroup => Strategy::PerGroup,
            StrategyArg::Exhaustive => Strategy::Exhaustive,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum GuessArg {
    Risk,
    Safest,
}

impl From<GuessArg> for GuessPolicy {
    fn from(value: GuessArg) -> Self {
        match value {
            GuessArg::Risk => GuessPolicy::RiskHeuristic,
            GuessArg::Safest => GuessPolicy::SafestProbability,
        }
    }
}

/// Lost games keyed by the tier of the move that was played last.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
struct LossStats {
    deterministic: u64,
    constraint: u64,
    guess: u64,
}

impl LossStats {
    fn record(&mut self, kind: MoveKind) {
        match kind {
            MoveKind::Deterministic => self.deterministic += 1,
            MoveKind::Constraint => self.constraint += 1,
            MoveKind::Guess => self.guess += 1,
        }
    }

    fn total(&self) -> u64 {
        self.deterministic + self.constraint + self.guess
    }
}

#[derive(Clone, Debug, Serialize)]
struct Summary {
    game: GameConfig,
    solver: SolverConfig,
    games: u64,
    won: u64,
    win_rate: f64,
    lost: LossStats,
    /// Games the solver gave up on before they were decided.
    stalled: u64,
}

fn play_games(config: GameConfig, solver_config: SolverConfig, games: u64, seed: u64) -> Result<Summary> {
    let mut solver = Solver::new(solver_config.clone(), seed);
    let mut won = 0;
    let mut lost = LossStats::default();
    let mut stalled = 0;

    for index in 0..games {
        let game_seed = seed.wrapping_add(index);
        let mut game = Game::new(config, game_seed)
            .with_context(|| format!("Could not create game with seed {}", game_seed))?;

        let mut last_move = None;
        while !game.is_finished() {
            match solver.make_a_move(&mut game) {
                Some(kind) => last_move = Some(kind),
                None => break,
            }
        }

        match (game.state(), last_move) {
            (GameState::Won, _) => won += 1,
            (GameState::Lost, Some(kind)) => lost.record(kind),
            (state, _) => {
                log::warn!("Game {} stopped while {:?}", game_seed, state);
                stalled += 1;
                continue;
            }
        }
        log::info!("Game {} {:?} after {:?}", game_seed, game.state(), last_move);
    }

    let win_rate = if games == 0 {
        0.0
    } else {
        won as f64 / games as f64
    };

    Ok(Summary {
        game: config,
        solver: solver_config,
        games,
        won,
        win_rate,
        lost,
        stalled,
    })
}

fn print_summary(summary: &Summary) {
    println!(
        "Total games {} won {} win rate {:.4}",
        summary.games, summary.won, summary.win_rate
    );
    println!("Lost by last move:");
    println!("  deterministic: {}", summary.lost.deterministic);
    println!("  constraint: {}", summary.lost.constraint);
    println!("  guess: {}", summary.lost.guess);
    if summary.stalled > 0 {
        println!("Stalled: {}", summary.stalled);
    }
}

fn init_logger(level: log::LevelFilter) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(level)
        .try_init()
        .context("Error initializing logger")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose.log_level_filter())?;

    let config = GameConfig::new(args.mines, args.rows, args.cols).with_context(|| {
        format!(
            "Invalid board of {} mines on {}x{}",
            args.mines, args.rows, args.cols
        )
    })?;
    let solver_config = SolverConfig {
        strategy: args.strategy.into(),
        guess_policy: args.guess_policy.into(),
        ..SolverConfig::default()
    };
    log::debug!("game: {:?}, solver: {:?}, seed: {}", config, solver_config, args.seed);

    let summary = play_games(config, solver_config, args.games, args.seed)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Could not serialize statistics")?
        );
    } else {
        print_summary(&summary);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kebab_case_choices() {
        let args = Args::try_parse_from([
            "sapper-cli",
            "--games",
            "5",
            "--strategy",
            "per-group",
            "--guess-policy",
            "safest",
            "--json",
        ])
        .unwrap();

        assert_eq!(args.games, 5);
        assert_eq!(Strategy::from(args.strategy), Strategy::PerGroup);
        assert_eq!(GuessPolicy::from(args.guess_policy), GuessPolicy::SafestProbability);
        assert!(args.json);
        assert_eq!((args.mines, args.rows, args.cols), (10, 9, 9));
    }

    #[test]
    fn every_game_is_accounted_for() {
        let summary =
            play_games(GameConfig::BEGINNER, SolverConfig::default(), 25, 100).unwrap();

        assert_eq!(summary.won + summary.lost.total() + summary.stalled, 25);
        assert_eq!(summary.stalled, 0);
        assert!((0.0..=1.0).contains(&summary.win_rate));
    }

    #[test]
    fn logger_follows_verbosity() {
        let args = Args::try_parse_from(["sapper-cli", "-vv"]).unwrap();

        init_logger(args.verbose.log_level_filter()).unwrap();

        assert_eq!(log::max_level(), log::LevelFilter::Info);
        assert!(init_logger(log::LevelFilter::Trace).is_err());
    }

    #[test]
    fn invalid_board_is_an_error() {
        let config = GameConfig::new_unchecked(100, 5, 5);

        assert!(play_games(config, SolverConfig::default(), 1, 0).is_err());
    }

    #[test]
    fn summary_serializes_loss_breakdown() {
        let summary = play_games(GameConfig::BEGINNER, SolverConfig::default(), 3, 7).unwrap();

        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["games"], 3);
        assert!(json["lost"]["guess"].is_u64());
        assert_eq!(json["solver"]["strategy"], "Global");
    }
}
