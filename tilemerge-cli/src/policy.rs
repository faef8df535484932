//! Move-choosing policies for automated play

use clap::ValueEnum;
use rand::Rng;
use serde::Serialize;

use tilemerge_core::{slide, Direction, Grid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Uniformly random among directions that move
    Random,
    /// Largest immediate merge score (ties: left, up, right, down)
    Greedy,
}

impl Policy {
    /// Pick a direction that changes the grid, or `None` when stuck
    pub fn choose<R: Rng>(self, grid: &Grid, rng: &mut R) -> Option<Direction> {
        let candidates: Vec<(Direction, u64)> = Direction::ALL
            .iter()
            .map(|&d| (d, slide(grid, d)))
            .filter(|(_, outcome)| outcome.moved)
            .map(|(d, outcome)| (d, outcome.score()))
            .collect();

        if candidates.is_empty() {
            return None;
        }

        match self {
            Policy::Random => Some(candidates[rng.gen_range(0..candidates.len())].0),
            Policy::Greedy => {
                let mut best = candidates[0];
                for &candidate in &candidates[1..] {
                    if candidate.1 > best.1 {
                        best = candidate;
                    }
                }
                Some(best.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tilemerge_core::IdAllocator;

    fn grid(values: &[u32]) -> Grid {
        Grid::from_values(2, values, &mut IdAllocator::new()).unwrap()
    }

    #[test]
    fn test_stuck_grid_has_no_choice() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let g = grid(&[2, 4, 4, 2]);
        assert_eq!(Policy::Random.choose(&g, &mut rng), None);
        assert_eq!(Policy::Greedy.choose(&g, &mut rng), None);
    }

    #[test]
    fn test_greedy_prefers_merge() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // Only vertical moves merge the 4s
        let g = grid(&[4, 2, 4, 0]);
        assert_eq!(Policy::Greedy.choose(&g, &mut rng), Some(Direction::Up));
    }

    #[test]
    fn test_greedy_tie_break_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // No merges anywhere; left is the first direction that moves
        let g = grid(&[0, 2, 0, 0]);
        assert_eq!(Policy::Greedy.choose(&g, &mut rng), Some(Direction::Left));
    }

    #[test]
    fn test_random_only_picks_moving_directions() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        // Top row full and unequal: only down moves
        let g = grid(&[2, 4, 0, 0]);
        for _ in 0..20 {
            assert_eq!(Policy::Random.choose(&g, &mut rng), Some(Direction::Down));
        }
    }
}
