//! Simulate command - automated games with a fixed policy
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: formatting utilities

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use tilemerge_core::{BoardEngine, EngineConfig};

use crate::policy::Policy;

/// Base seed when neither the command line nor the config gives one
const DEFAULT_SEED: u64 = 42;

/// Keeps the policy's random stream apart from the engine's spawn stream
const POLICY_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    pub games: usize,

    /// Board size (overrides the config file)
    #[arg(long)]
    pub size: Option<usize>,

    /// Move-choosing policy
    #[arg(long, value_enum, default_value = "greedy")]
    pub policy: Policy,

    /// Maximum moves per game
    #[arg(long, default_value = "100000")]
    pub max_moves: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug, Serialize)]
struct GameRecord {
    game_number: usize,
    seed: u64,
    score: u64,
    max_tile: u32,
    moves: u32,
    /// False when the move cap ended the game
    finished: bool,
}

/// Aggregated results
#[derive(Clone, Debug, Serialize)]
struct SimulationResults {
    policy: Policy,
    size: usize,
    total_games: usize,
    finished_games: usize,
    mean_score: f64,
    best_score: u64,
    mean_moves: f64,
    max_tile: u32,
    /// Highest tile reached -> number of games
    max_tile_counts: BTreeMap<u32, usize>,
    games: Vec<GameRecord>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: SimulateArgs, mut config: EngineConfig) -> Result<()> {
    if let Some(size) = args.size {
        config.size = size;
    }
    config.validate().context("Invalid engine configuration")?;

    tracing::info!(
        "Simulating {} games on {}x{} with {:?} policy",
        args.games,
        config.size,
        config.size,
        args.policy
    );

    let games = play_games(&config, &args)?;
    let results = compute_statistics(args.policy, config.size, games);

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in parallel; game `i` uses seed `base + i`
fn play_games(config: &EngineConfig, args: &SimulateArgs) -> Result<Vec<GameRecord>> {
    let base_seed = config.seed.unwrap_or(DEFAULT_SEED);

    let progress = if args.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(args.games as u64)
    };
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} games ({elapsed})")
            .context("Invalid progress template")?,
    );

    let games = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let seed = base_seed.wrapping_add(i as u64);
            let record =
                play_single_game(config, args.policy, args.max_moves, i + 1, seed);
            progress.inc(1);
            record
        })
        .collect::<Result<Vec<_>>>()?;

    progress.finish_and_clear();
    Ok(games)
}

fn report_results(results: &SimulationResults, args: &SimulateArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_game(
    config: &EngineConfig,
    policy: Policy,
    max_moves: u32,
    game_number: usize,
    seed: u64,
) -> Result<GameRecord> {
    let mut engine = BoardEngine::new(config.clone().with_seed(seed))?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ POLICY_SEED_SALT);
    let mut moves = 0;

    while engine.is_active() && moves < max_moves {
        let Some(direction) = policy.choose(engine.grid(), &mut rng) else {
            break;
        };
        engine.make_move(direction)?;
        engine.drain_score_events();
        moves += 1;
    }

    tracing::debug!("Game {}: score {} in {} moves", game_number, engine.score(), moves);

    Ok(GameRecord {
        game_number,
        seed,
        score: engine.score(),
        max_tile: engine.grid().max_value(),
        moves,
        finished: !engine.is_active(),
    })
}

fn compute_statistics(policy: Policy, size: usize, games: Vec<GameRecord>) -> SimulationResults {
    let total = games.len();
    let mean = |sum: f64| if total == 0 { 0.0 } else { sum / total as f64 };

    let mut max_tile_counts = BTreeMap::new();
    for game in &games {
        *max_tile_counts.entry(game.max_tile).or_insert(0) += 1;
    }

    SimulationResults {
        policy,
        size,
        total_games: total,
        finished_games: games.iter().filter(|g| g.finished).count(),
        mean_score: mean(games.iter().map(|g| g.score as f64).sum()),
        best_score: games.iter().map(|g| g.score).max().unwrap_or(0),
        mean_moves: mean(games.iter().map(|g| g.moves as f64).sum()),
        max_tile: games.iter().map(|g| g.max_tile).max().unwrap_or(0),
        max_tile_counts,
        games,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_json_results(results: &SimulationResults) {
    if let Ok(json) = serde_json::to_string_pretty(results) {
        println!("{}", json);
    }
}

fn print_text_results(results: &SimulationResults) {
    println!("\n=== Simulation Results ===");
    println!("Policy:      {:?}", results.policy);
    println!("Board:       {}x{}", results.size, results.size);
    println!("Games:       {} ({} finished)", results.total_games, results.finished_games);
    println!("Mean score:  {:.1}", results.mean_score);
    println!("Best score:  {}", results.best_score);
    println!("Mean moves:  {:.1}", results.mean_moves);
    println!("Max tile:    {}", results.max_tile);

    println!("\nHighest tile reached:");
    for (tile, count) in &results.max_tile_counts {
        let pct = *count as f64 / results.total_games.max(1) as f64 * 100.0;
        println!("  {:>6}: {:>5} ({:.1}%)", tile, count, pct);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: u64, max_tile: u32, moves: u32, finished: bool) -> GameRecord {
        GameRecord {
            game_number: 1,
            seed: 0,
            score,
            max_tile,
            moves,
            finished,
        }
    }

    #[test]
    fn test_compute_statistics_empty() {
        let results = compute_statistics(Policy::Random, 4, vec![]);
        assert_eq!(results.total_games, 0);
        assert_eq!(results.mean_score, 0.0);
        assert_eq!(results.best_score, 0);
        assert!(results.max_tile_counts.is_empty());
    }

    #[test]
    fn test_compute_statistics() {
        let games = vec![
            record(100, 64, 50, true),
            record(300, 128, 150, true),
            record(200, 64, 100, false),
        ];
        let results = compute_statistics(Policy::Greedy, 4, games);
        assert_eq!(results.mean_score, 200.0);
        assert_eq!(results.best_score, 300);
        assert_eq!(results.mean_moves, 100.0);
        assert_eq!(results.max_tile, 128);
        assert_eq!(results.finished_games, 2);
        assert_eq!(results.max_tile_counts.get(&64), Some(&2));
        assert_eq!(results.max_tile_counts.get(&128), Some(&1));
    }

    #[test]
    fn test_single_game_is_reproducible() {
        let config = EngineConfig::default();
        let a = play_single_game(&config, Policy::Random, 10_000, 1, 77).unwrap();
        let b = play_single_game(&config, Policy::Random, 10_000, 1, 77).unwrap();
        assert_eq!(a.score, b.score);
        assert_eq!(a.moves, b.moves);
        assert!(a.finished);
    }

    #[test]
    fn test_move_cap() {
        let config = EngineConfig::default();
        let record = play_single_game(&config, Policy::Greedy, 5, 1, 3).unwrap();
        assert_eq!(record.moves, 5);
        assert!(!record.finished);
    }
}
