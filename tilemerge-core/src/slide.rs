//! The slide-and-merge pass
//!
//! `slide` is a pure function: it reads a grid and returns the next one
//! together with the render hints for the move. Spawning and scoring are
//! left to the engine.

use serde::{Deserialize, Serialize};

use crate::board::{traversal, Direction, Pos};
use crate::grid::Grid;
use crate::tile::{Tile, TileId};

/// One tile changing cells during a move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMotion {
    pub id: TileId,
    pub from: Pos,
    pub to: Pos,
}

/// Two tiles combining; the mover's id survives and `absorbed` disappears
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merge {
    pub id: TileId,
    pub absorbed: TileId,
    pub at: Pos,
    pub value: u32,
}

/// Result of sliding a grid in one direction
#[derive(Clone, Debug)]
pub struct SlideOutcome {
    pub grid: Grid,
    pub moved: bool,
    pub motions: Vec<TileMotion>,
    pub merges: Vec<Merge>,
}

impl SlideOutcome {
    /// Points earned by this slide
    pub fn score(&self) -> u64 {
        self.merges.iter().map(|m| m.value as u64).sum()
    }
}

/// Slide every tile as far as it goes in `direction`, merging equal pairs.
///
/// Render flags from the previous move are cleared first. A tile that has
/// already absorbed another this pass (`just_merged`) cannot merge again,
/// and a pair whose sum would overflow `u32` stacks instead of merging.
pub fn slide(grid: &Grid, direction: Direction) -> SlideOutcome {
    let mut next = grid.clone();
    next.clear_flags();

    let size = next.size();
    let mut motions = Vec::new();
    let mut merges = Vec::new();

    for origin in traversal(size, direction) {
        let Some(tile) = next.get(origin).copied() else {
            continue;
        };

        let (landing, blocker) = walk(&next, origin, direction);

        if let Some((target_pos, target)) = blocker {
            let merged_value = (target.value == tile.value && !target.just_merged)
                .then(|| tile.value.checked_add(target.value))
                .flatten();
            if let Some(value) = merged_value {
                next.take(origin);
                next.set(
                    target_pos,
                    Some(Tile {
                        id: tile.id,
                        value,
                        just_spawned: false,
                        just_merged: true,
                    }),
                );
                motions.push(TileMotion { id: tile.id, from: origin, to: target_pos });
                merges.push(Merge {
                    id: tile.id,
                    absorbed: target.id,
                    at: target_pos,
                    value,
                });
                continue;
            }
        }

        if landing != origin {
            next.take(origin);
            next.set(landing, Some(tile));
            motions.push(TileMotion { id: tile.id, from: origin, to: landing });
        }
    }

    SlideOutcome {
        grid: next,
        moved: !motions.is_empty(),
        motions,
        merges,
    }
}

/// Whether sliding in `direction` would change the grid
pub fn can_slide(grid: &Grid, direction: Direction) -> bool {
    slide(grid, direction).moved
}

/// Walk from `origin` past empty cells.
///
/// Returns the last empty cell reached (or `origin` itself) and the first
/// occupied cell in the way, if any.
fn walk(grid: &Grid, origin: Pos, direction: Direction) -> (Pos, Option<(Pos, Tile)>) {
    let mut landing = origin;
    while let Some(next) = landing.step(direction, grid.size()) {
        if let Some(tile) = grid.get(next) {
            return (landing, Some((next, *tile)));
        }
        landing = next;
    }
    (landing, None)
}
