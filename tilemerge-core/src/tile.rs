//! Tiles and tile identity allocation

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Stable tile identity, used by renderers to animate one tile across moves
pub type TileId = u32;

/// A numbered tile occupying one cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub value: u32,
    /// Set on creation, cleared at the start of the next move
    pub just_spawned: bool,
    /// Set on the move this tile absorbed another, cleared at the start of the next move
    pub just_merged: bool,
}

impl Tile {
    pub fn spawned(id: TileId, value: u32) -> Self {
        Self {
            id,
            value,
            just_spawned: true,
            just_merged: false,
        }
    }

    /// A tile with no render flags set (used for preset boards)
    pub fn settled(id: TileId, value: u32) -> Result<Self, EngineError> {
        if !is_tile_value(value) {
            return Err(EngineError::InvalidTileValue(value));
        }
        Ok(Self {
            id,
            value,
            just_spawned: false,
            just_merged: false,
        })
    }

    pub fn clear_flags(&mut self) {
        self.just_spawned = false;
        self.just_merged = false;
    }
}

/// Largest value a preset tile may carry; merging two of them still fits in `u32`
pub const MAX_TILE_VALUE: u32 = 1 << 30;

/// Valid tile values are powers of two from 2 to `MAX_TILE_VALUE`
pub fn is_tile_value(value: u32) -> bool {
    (2..=MAX_TILE_VALUE).contains(&value) && value.is_power_of_two()
}

/// Hands out monotonically increasing tile ids
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next: TileId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> TileId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Id the next allocation will return
    pub fn peek(&self) -> TileId {
        self.next
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic_and_resets() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), 0);
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.peek(), 2);
        ids.reset();
        assert_eq!(ids.allocate(), 0);
    }

    #[test]
    fn test_tile_values() {
        assert!(is_tile_value(2));
        assert!(is_tile_value(2048));
        assert!(!is_tile_value(0));
        assert!(!is_tile_value(1));
        assert!(!is_tile_value(6));
        assert_eq!(Tile::settled(0, 3), Err(EngineError::InvalidTileValue(3)));
    }

    #[test]
    fn test_tile_value_cap() {
        assert!(is_tile_value(MAX_TILE_VALUE));
        assert!(!is_tile_value(1 << 31));
        assert_eq!(
            Tile::settled(0, 1 << 31),
            Err(EngineError::InvalidTileValue(1 << 31))
        );
    }
}
