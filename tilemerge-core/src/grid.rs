//! Square grid of optional tiles

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::Pos;
use crate::error::EngineError;
use crate::tile::{IdAllocator, Tile};

/// `size × size` cells in row-major order; `None` is an empty cell.
///
/// Tiles are stored by value, so a tile can only ever sit in one cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<Tile>>,
}

impl Grid {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty grid
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Build a grid from row-major values (0 = empty), allocating ids in scan order
    pub fn from_values(
        size: usize,
        values: &[u32],
        ids: &mut IdAllocator,
    ) -> Result<Self, EngineError> {
        if values.len() != size * size {
            return Err(EngineError::CellCountMismatch {
                expected: size * size,
                actual: values.len(),
            });
        }

        let cells = values
            .iter()
            .map(|&value| match value {
                0 => Ok(None),
                v => Tile::settled(ids.allocate(), v).map(Some),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { size, cells })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major cells
    pub fn cells(&self) -> &[Option<Tile>] {
        &self.cells
    }

    /// Whether `pos` lies on the board
    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.contains(pos).then(|| pos.index(self.size))
    }

    /// Tile at `pos`; `None` for an empty or off-board cell
    pub fn get(&self, pos: Pos) -> Option<&Tile> {
        self.cells[self.index(pos)?].as_ref()
    }

    /// Replace the cell at `pos`. Returns false (and changes nothing) off the board.
    pub fn set(&mut self, pos: Pos, tile: Option<Tile>) -> bool {
        match self.index(pos) {
            Some(index) => {
                self.cells[index] = tile;
                true
            }
            None => false,
        }
    }

    /// Remove and return the tile at `pos`
    pub fn take(&mut self, pos: Pos) -> Option<Tile> {
        let index = self.index(pos)?;
        self.cells[index].take()
    }

    /// Occupied cells with their tiles
    pub fn tiles(&self) -> impl Iterator<Item = (Pos, Tile)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.map(|tile| (Pos::new(i % size, i / size), tile)))
    }

    pub fn tile_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn empty_cells(&self) -> Vec<Pos> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| Pos::new(i % self.size, i / self.size))
            .collect()
    }

    /// Row-major values with 0 for empty cells
    pub fn values(&self) -> Vec<u32> {
        self.cells.iter().map(|c| c.map_or(0, |t| t.value)).collect()
    }

    pub fn rows(&self) -> Vec<Vec<u32>> {
        self.values()
            .chunks(self.size.max(1))
            .map(|row| row.to_vec())
            .collect()
    }

    pub fn max_value(&self) -> u32 {
        self.tiles().map(|(_, t)| t.value).max().unwrap_or(0)
    }

    // ========================================================================
    // RULES
    // ========================================================================

    /// Reset the per-move render flags on every tile
    pub fn clear_flags(&mut self) {
        for tile in self.cells.iter_mut().flatten() {
            tile.clear_flags();
        }
    }

    /// Whether any move can still change the grid.
    ///
    /// True if a cell is empty or some tile has an equal right or down
    /// neighbour; each adjacent pair is checked once.
    pub fn has_moves(&self) -> bool {
        for y in 0..self.size {
            for x in 0..self.size {
                let Some(tile) = self.get(Pos::new(x, y)) else {
                    return true;
                };
                let right = (x + 1 < self.size)
                    .then(|| self.get(Pos::new(x + 1, y)))
                    .flatten();
                let down = (y + 1 < self.size)
                    .then(|| self.get(Pos::new(x, y + 1)))
                    .flatten();
                if right.is_some_and(|t| t.value == tile.value)
                    || down.is_some_and(|t| t.value == tile.value)
                {
                    return true;
                }
            }
        }
        false
    }

    /// Place a fresh tile in a uniformly chosen empty cell.
    ///
    /// The value is 4 with probability `four_probability`, otherwise 2.
    /// Returns `None` without touching the grid when no cell is empty.
    pub fn spawn_tile<R: Rng>(
        &mut self,
        rng: &mut R,
        four_probability: f64,
        ids: &mut IdAllocator,
    ) -> Option<(Pos, Tile)> {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return None;
        }

        let pos = empty[rng.gen_range(0..empty.len())];
        let value = if rng.gen_bool(four_probability) { 4 } else { 2 };
        let tile = Tile::spawned(ids.allocate(), value);
        self.set(pos, Some(tile));
        Some((pos, tile))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max_value().to_string().len().max(1);
        for row in self.rows() {
            let line: Vec<String> = row
                .iter()
                .map(|&v| match v {
                    0 => format!("{:>width$}", "."),
                    v => format!("{:>width$}", v),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn grid(values: &[u32]) -> Grid {
        let size = (values.len() as f64).sqrt() as usize;
        Grid::from_values(size, values, &mut IdAllocator::new()).unwrap()
    }

    #[test]
    fn test_from_values_rejects_bad_input() {
        let mut ids = IdAllocator::new();
        assert_eq!(
            Grid::from_values(2, &[2, 2, 2], &mut ids),
            Err(EngineError::CellCountMismatch { expected: 4, actual: 3 })
        );
        assert_eq!(
            Grid::from_values(2, &[2, 0, 0, 5], &mut ids),
            Err(EngineError::InvalidTileValue(5))
        );
    }

    #[test]
    fn test_ids_assigned_in_scan_order() {
        let g = grid(&[0, 2, 4, 0]);
        assert_eq!(g.get(Pos::new(1, 0)).unwrap().id, 0);
        assert_eq!(g.get(Pos::new(0, 1)).unwrap().id, 1);
        assert_eq!(g.tile_count(), 2);
        assert_eq!(g.empty_cells(), vec![Pos::new(0, 0), Pos::new(1, 1)]);
    }

    #[test]
    fn test_has_moves_with_empty_cell() {
        assert!(grid(&[2, 4, 8, 0]).has_moves());
    }

    #[test]
    fn test_has_moves_with_equal_neighbours() {
        // Horizontal pair
        assert!(grid(&[2, 2, 4, 8]).has_moves());
        // Vertical pair
        assert!(grid(&[2, 4, 2, 8]).has_moves());
    }

    #[test]
    fn test_full_grid_without_pairs_is_stuck() {
        let g = grid(&[
            2, 4, 2, 4, //
            4, 2, 4, 2, //
            2, 4, 2, 4, //
            4, 2, 4, 2,
        ]);
        assert!(!g.has_moves());
    }

    #[test]
    fn test_diagonal_pairs_do_not_count() {
        assert!(!grid(&[2, 4, 4, 2]).has_moves());
    }

    #[test]
    fn test_spawn_fills_empty_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut ids = IdAllocator::new();
        let mut g = Grid::new(2);

        for expected_id in 0..4 {
            let (pos, tile) = g.spawn_tile(&mut rng, 0.2, &mut ids).unwrap();
            assert_eq!(tile.id, expected_id);
            assert!(tile.just_spawned);
            assert!(tile.value == 2 || tile.value == 4);
            assert_eq!(g.get(pos), Some(&tile));
        }

        let before = g.clone();
        assert!(g.spawn_tile(&mut rng, 0.2, &mut ids).is_none());
        assert_eq!(g, before);
        assert_eq!(ids.peek(), 4);
    }

    #[test]
    fn test_spawn_value_distribution() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut ids = IdAllocator::new();
        let mut fours = 0;
        for _ in 0..2000 {
            let mut g = Grid::new(4);
            let (_, tile) = g.spawn_tile(&mut rng, 0.2, &mut ids).unwrap();
            if tile.value == 4 {
                fours += 1;
            }
        }
        // 20% expected; generous bounds
        assert!(fours > 300 && fours < 500, "fours = {}", fours);
    }

    #[test]
    fn test_off_board_positions_are_rejected() {
        let mut g = grid(&[0, 0, 8, 0]);
        // (2, 0) would alias (0, 1) under plain row-major indexing
        assert!(!g.contains(Pos::new(2, 0)));
        assert_eq!(g.get(Pos::new(2, 0)), None);
        assert_eq!(g.get(Pos::new(0, 2)), None);
        assert_eq!(g.take(Pos::new(2, 0)), None);
        assert!(!g.set(Pos::new(2, 0), Some(Tile::spawned(7, 2))));

        assert_eq!(g.values(), vec![0, 0, 8, 0]);
        assert_eq!(g.get(Pos::new(0, 1)).unwrap().value, 8);
    }

    #[test]
    fn test_set_and_take_on_board() {
        let mut g = Grid::new(2);
        assert!(g.set(Pos::new(1, 1), Some(Tile::spawned(3, 4))));
        assert_eq!(g.get(Pos::new(1, 1)).unwrap().id, 3);
        assert_eq!(g.take(Pos::new(1, 1)).unwrap().value, 4);
        assert_eq!(g.tile_count(), 0);
    }

    #[test]
    fn test_display() {
        let g = grid(&[2, 0, 16, 4]);
        assert_eq!(g.to_string(), " 2  .\n16  4\n");
    }
}
