//! Board engine: grid + session + spawn RNG
//!
//! A move runs in two phases so a caller can pace its animations:
//! `apply_move` slides and merges, `complete_move` spawns the next tile and
//! checks for the terminal state. `make_move` runs both back to back.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Direction, Pos};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::grid::Grid;
use crate::session::{GameOver, ScoreEvent, Session};
use crate::slide::{slide, Merge, TileMotion};
use crate::tile::Tile;

/// Result of the slide/merge phase
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub direction: Direction,
    pub moved: bool,
    pub score_delta: u64,
    pub motions: Vec<TileMotion>,
    pub merges: Vec<Merge>,
}

/// Result of the spawn/terminal-check phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCompletion {
    pub spawned: Option<(Pos, Tile)>,
    pub active: bool,
    /// Present only on the move that ended the game
    pub game_over: Option<GameOver>,
}

/// Both phases of one move
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveReport {
    pub outcome: MoveOutcome,
    /// `None` when nothing moved
    pub completion: Option<MoveCompletion>,
}

impl MoveReport {
    pub fn moved(&self) -> bool {
        self.outcome.moved
    }

    pub fn game_over(&self) -> Option<GameOver> {
        self.completion.and_then(|c| c.game_over)
    }
}

/// Serializable view of the engine for renderers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub size: usize,
    pub cells: Vec<Option<Tile>>,
    pub score: u64,
    pub best_score: u64,
    pub active: bool,
    pub score_events: Vec<ScoreEvent>,
}

#[derive(Clone, Debug)]
pub struct BoardEngine {
    config: EngineConfig,
    grid: Grid,
    session: Session,
    rng: ChaCha8Rng,
    spawn_pending: bool,
}

impl BoardEngine {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Start a game with `config.start_tiles` spawned tiles
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let mut engine = Self::empty(config)?;
        engine.spawn_start_tiles();
        tracing::info!("New {}x{} game", engine.grid.size(), engine.grid.size());
        Ok(engine)
    }

    /// Default configuration at the given size
    pub fn initialize(size: usize) -> Result<Self, EngineError> {
        Self::new(EngineConfig::default().with_size(size))
    }

    /// Start from preset row-major values (0 = empty) without spawning
    pub fn from_values(config: EngineConfig, values: &[u32]) -> Result<Self, EngineError> {
        let mut engine = Self::empty(config)?;
        engine.grid = Grid::from_values(engine.config.size, values, engine.session.ids_mut())?;
        engine.session.active = engine.grid.has_moves();
        Ok(engine)
    }

    /// Seed the best score from external storage
    pub fn with_best_score(mut self, best_score: u64) -> Self {
        self.session.best_score = best_score;
        self
    }

    fn empty(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            grid: Grid::new(config.size),
            session: Session::new(0),
            rng,
            spawn_pending: false,
            config,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn score(&self) -> u64 {
        self.session.score
    }

    pub fn best_score(&self) -> u64 {
        self.session.best_score
    }

    pub fn is_active(&self) -> bool {
        self.session.active
    }

    /// True between `apply_move` and `complete_move`
    pub fn is_spawn_pending(&self) -> bool {
        self.spawn_pending
    }

    pub fn score_events(&self) -> &[ScoreEvent] {
        self.session.score_events()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            size: self.grid.size(),
            cells: self.grid.cells().to_vec(),
            score: self.session.score,
            best_score: self.session.best_score,
            active: self.session.active,
            score_events: self.session.score_events().to_vec(),
        }
    }

    // ========================================================================
    // MOVES
    // ========================================================================

    /// Slide/merge phase.
    ///
    /// When nothing moves the grid and session are left untouched and no
    /// spawn is owed. Rejected while a previous move awaits `complete_move`.
    pub fn apply_move(&mut self, direction: Direction) -> Result<MoveOutcome, EngineError> {
        if self.spawn_pending {
            return Err(EngineError::SpawnPending);
        }

        let result = slide(&self.grid, direction);
        let mut score_delta = 0;

        if result.moved {
            score_delta = self.session.record_merges(&result.merges);
            self.grid = result.grid;
            self.spawn_pending = true;
        }

        tracing::debug!(
            "{}: moved={} merges={} delta={}",
            direction,
            result.moved,
            result.merges.len(),
            score_delta
        );

        Ok(MoveOutcome {
            direction,
            moved: result.moved,
            score_delta,
            motions: result.motions,
            merges: result.merges,
        })
    }

    /// Spawn/terminal-check phase of a move accepted by `apply_move`
    pub fn complete_move(&mut self) -> Result<MoveCompletion, EngineError> {
        if !self.spawn_pending {
            return Err(EngineError::NoMovePending);
        }

        let spawned = self.spawn_tile();
        let game_over = self.refresh_active();
        self.spawn_pending = false;

        Ok(MoveCompletion {
            spawned,
            active: self.session.active,
            game_over,
        })
    }

    /// Both phases without a pause between them
    pub fn make_move(&mut self, direction: Direction) -> Result<MoveReport, EngineError> {
        let outcome = self.apply_move(direction)?;
        let completion = if outcome.moved {
            Some(self.complete_move()?)
        } else {
            None
        };
        Ok(MoveReport { outcome, completion })
    }

    /// Place one new tile in a random empty cell; no-op on a full grid
    pub fn spawn_tile(&mut self) -> Option<(Pos, Tile)> {
        let spawned = self.grid.spawn_tile(
            &mut self.rng,
            self.config.four_probability,
            self.session.ids_mut(),
        );
        if let Some((pos, tile)) = spawned {
            tracing::debug!("Spawned {} at {} (id {})", tile.value, pos, tile.id);
        }
        spawned
    }

    /// Whether any direction can still change the grid
    pub fn check_active(&self) -> bool {
        self.grid.has_moves()
    }

    /// Acknowledge every queued score event
    pub fn drain_score_events(&mut self) -> Vec<ScoreEvent> {
        self.session.drain_score_events()
    }

    /// Acknowledge queued score events up to and including `key`
    pub fn acknowledge_score_events(&mut self, key: u64) {
        self.session.acknowledge_score_events(key);
    }

    /// Discard the board and start over; tile ids restart at 0, best score carries over
    pub fn new_game(&mut self) {
        self.grid = Grid::new(self.config.size);
        self.session.reset();
        self.spawn_pending = false;
        self.spawn_start_tiles();
        tracing::info!("New game (best score {})", self.session.best_score);
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn spawn_start_tiles(&mut self) {
        for _ in 0..self.config.start_tiles {
            self.spawn_tile();
        }
    }

    /// Update `active`; returns the game-over report on the transition only
    fn refresh_active(&mut self) -> Option<GameOver> {
        if !self.session.active || self.check_active() {
            return None;
        }
        let over = self.session.finish();
        tracing::info!(
            "Game over: score {} (best {}{})",
            over.score,
            over.best_score,
            if over.new_record { ", new record" } else { "" }
        );
        Some(over)
    }
}
