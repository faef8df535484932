//! Board geometry: cell positions, move directions and scan order

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseDirectionError;

/// Default board edge length
pub const DEFAULT_SIZE: usize = 4;

/// Largest supported board edge length
pub const MAX_SIZE: usize = 16;

/// Cell coordinates: `x` is the column, `y` the row (0 = top)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Row-major index into a `size × size` cell vector
    pub fn index(&self, size: usize) -> usize {
        self.y * size + self.x
    }

    /// Neighbouring cell in `direction`, or `None` past the board edge
    pub fn step(&self, direction: Direction, size: usize) -> Option<Pos> {
        let (dx, dy) = direction.offset();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        (x < size && y < size).then_some(Pos::new(x, y))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Move direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    /// Unit offset (dx, dy)
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    /// Accepts direction names, keyboard arrow key names and WASD
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let by_name = |name: &str| match name {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        };
        // The arrow prefix only combines with full names, never WASD
        let direction = match lower.strip_prefix("arrow") {
            Some(rest) => by_name(rest),
            None => by_name(&lower).or(match lower.as_str() {
                "w" => Some(Direction::Up),
                "s" => Some(Direction::Down),
                "a" => Some(Direction::Left),
                "d" => Some(Direction::Right),
                _ => None,
            }),
        };
        direction.ok_or_else(|| ParseDirectionError(s.trim().to_string()))
    }
}

/// Cells in the order a move must visit them.
///
/// Rows are the outer loop and columns the inner one. Moving right scans
/// columns from the far edge, moving down scans rows from the far edge, so
/// a tile is always processed after every tile in front of it.
pub fn traversal(size: usize, direction: Direction) -> impl Iterator<Item = Pos> {
    (0..size).flat_map(move |i| {
        (0..size).map(move |j| {
            let y = if direction == Direction::Down { size - i - 1 } else { i };
            let x = if direction == Direction::Right { size - j - 1 } else { j };
            Pos::new(x, y)
        })
    })
}
