//! tilemerge core - rule engine for a sliding-tile merge puzzle
//!
//! This crate provides the game logic:
//! - Board geometry (cell positions, directions, scan order)
//! - Tiles with stable identities for animation
//! - The pure slide-and-merge pass
//! - Session bookkeeping (score, best score, score events)
//! - The two-phase move engine (slide/merge, then spawn + terminal check)

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod session;
pub mod slide;
pub mod tile;

// Re-exports for convenient access
pub use board::{traversal, Direction, Pos, DEFAULT_SIZE, MAX_SIZE};
pub use config::EngineConfig;
pub use engine::{BoardEngine, MoveCompletion, MoveOutcome, MoveReport, Snapshot};
pub use error::{EngineError, ParseDirectionError};
pub use grid::Grid;
pub use session::{GameOver, ScoreEvent, Session};
pub use slide::{can_slide, slide, Merge, SlideOutcome, TileMotion};
pub use tile::{IdAllocator, Tile, TileId, MAX_TILE_VALUE};
