//! Play command - one game driven by directions on stdin
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_session() - the input loop
//! - Level 3: parse_line(), apply_direction()
//! - Level 4: rendering utilities

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;

use tilemerge_core::{BoardEngine, Direction, EngineConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Board size (overrides the config file)
    #[arg(long)]
    pub size: Option<usize>,

    /// Best score carried over from earlier games
    #[arg(long, default_value = "0")]
    pub best: u64,

    /// Print a JSON snapshot per line instead of the text board
    #[arg(long)]
    pub json: bool,
}

/// One parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
enum PlayCommand {
    Move(Direction),
    NewGame,
    Quit,
    Skip,
    Unknown(String),
}

/// What happened over a session, for the closing summary
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SessionSummary {
    moves: usize,
    games_finished: usize,
    best_score: u64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: PlayArgs, mut config: EngineConfig) -> Result<()> {
    if let Some(size) = args.size {
        config.size = size;
    }

    let mut engine = BoardEngine::new(config)
        .context("Failed to start game")?
        .with_best_score(args.best);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let summary = play_session(&mut engine, stdin.lock(), &mut stdout.lock(), args.json)?;

    tracing::info!(
        "Session over: {} moves, {} games finished, best score {}",
        summary.moves,
        summary.games_finished,
        summary.best_score
    );

    Ok(())
}

// ============================================================================
// LEVEL 2 - INPUT LOOP
// ============================================================================

fn play_session<R: BufRead, W: Write>(
    engine: &mut BoardEngine,
    input: R,
    out: &mut W,
    json: bool,
) -> Result<SessionSummary> {
    let mut summary = SessionSummary::default();
    render(engine, out, json)?;

    for line in input.lines() {
        match parse_line(&line?) {
            PlayCommand::Skip => {}
            PlayCommand::Quit => break,
            PlayCommand::NewGame => {
                engine.new_game();
                render(engine, out, json)?;
            }
            PlayCommand::Unknown(text) => {
                tracing::warn!("Ignoring unknown input: {:?}", text);
            }
            PlayCommand::Move(direction) => {
                if !engine.is_active() {
                    tracing::warn!("Game is over; type `new` to start again");
                    continue;
                }
                if apply_direction(engine, direction, out, json)? {
                    summary.moves += 1;
                    if !engine.is_active() {
                        summary.games_finished += 1;
                    }
                }
            }
        }
    }

    summary.best_score = engine.best_score();
    Ok(summary)
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn parse_line(line: &str) -> PlayCommand {
    let text = line.trim();
    if text.is_empty() || text.starts_with('#') {
        return PlayCommand::Skip;
    }
    match text.to_ascii_lowercase().as_str() {
        "new" => PlayCommand::NewGame,
        "quit" | "q" | "exit" => PlayCommand::Quit,
        _ => text
            .parse()
            .map(PlayCommand::Move)
            .unwrap_or_else(|_| PlayCommand::Unknown(text.to_string())),
    }
}

/// Apply one move and print the result. Returns whether anything moved.
fn apply_direction<W: Write>(
    engine: &mut BoardEngine,
    direction: Direction,
    out: &mut W,
    json: bool,
) -> Result<bool> {
    let report = engine.make_move(direction)?;
    if !report.moved() {
        return Ok(false);
    }

    render(engine, out, json)?;

    if let Some(over) = report.game_over() {
        if !json {
            writeln!(
                out,
                "Game over! Score {} (best {}){}",
                over.score,
                over.best_score,
                if over.new_record { " - new record" } else { "" }
            )?;
        }
    }

    Ok(true)
}

// ============================================================================
// LEVEL 4 - RENDERING
// ============================================================================

/// Print the board and consume the queued score events
fn render<W: Write>(engine: &mut BoardEngine, out: &mut W, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(&engine.snapshot())?)?;
        engine.drain_score_events();
        return Ok(());
    }

    let gained: Vec<String> = engine
        .drain_score_events()
        .iter()
        .map(|e| format!("+{}", e.value))
        .collect();

    write!(out, "Score: {}  Best: {}", engine.score(), engine.best_score())?;
    if !gained.is_empty() {
        write!(out, "  ({})", gained.join(" "))?;
    }
    writeln!(out)?;
    write!(out, "{}", engine.grid())?;
    writeln!(out)?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
