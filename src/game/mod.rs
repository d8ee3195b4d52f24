//! # Game Module
//!
//! Core game state management and the data model it is built from.
//!
//! This module contains the fundamental building blocks of Dicestead:
//! - Faces, dice and their level/XP progression
//! - Board cells and the progress-meter primitive
//! - Currencies and the purse
//! - The turn engine with its animation and prompt state machines

pub mod animation;
pub mod autoplay;
pub mod cell;
pub mod currency;
pub mod dice;
pub mod faces;
pub mod prompt;
pub mod state;

pub use animation::*;
pub use autoplay::*;
pub use cell::*;
pub use currency::*;
pub use dice::*;
pub use faces::*;
pub use prompt::*;
pub use state::*;

use serde::{Deserialize, Serialize};

/// A cell coordinate; `(0, 0)` is the top-left corner and `y` grows
/// downwards.
///
/// Signed so that offsets (a building's right half, the settlement layout
/// relative to the board centre) can be added without casts. Positions off the
/// board are legal values; [`Board::get`] simply returns `None` for them.
///
/// # Examples
///
/// ```
/// use dicestead::Position;
///
/// let bedroom = Position::new(6, 7);
/// let right_half = bedroom + Position::new(1, 0);
/// assert_eq!(right_half, Position::new(7, 7));
/// assert_eq!(bedroom.cardinal_adjacent_positions().len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Walking distance between two cells; dice and explorers never move
    /// diagonally.
    ///
    /// # Examples
    ///
    /// ```
    /// use dicestead::Position;
    ///
    /// let home = Position::new(6, 7);
    /// assert_eq!(home.manhattan_distance(Position::new(9, 3)), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// The four cells sharing an edge with this one, in [`Direction::all`]
    /// order. Used for the explore frontier and map cluster growth.
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        Direction::all()
            .into_iter()
            .map(|direction| self.step(direction))
            .collect()
    }

    pub fn step(self, direction: Direction) -> Position {
        self + direction.to_delta()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Edge neighbours of a board cell. North is towards row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// One-cell offset towards the neighbour.
    ///
    /// # Examples
    ///
    /// ```
    /// use dicestead::{Direction, Position};
    ///
    /// assert_eq!(Direction::North.to_delta(), Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
        }
    }

    /// Neighbour order shared by adjacency queries, which keeps map
    /// generation reproducible for a seed.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::West,
            Direction::East,
            Direction::South,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let pos = Position::new(5, 10);
        assert_eq!(pos.x, 5);
        assert_eq!(pos.y, 10);
    }

    #[test]
    fn test_position_manhattan_distance() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, 4);
        assert_eq!(pos1.manhattan_distance(pos2), 7);
    }

    #[test]
    fn test_position_cardinal_adjacent() {
        let pos = Position::new(5, 5);
        let adjacent = pos.cardinal_adjacent_positions();
        assert_eq!(adjacent.len(), 4);
        assert!(adjacent.contains(&Position::new(5, 4))); // North
        assert!(adjacent.contains(&Position::new(4, 5))); // West
        assert!(!adjacent.contains(&Position::new(4, 4))); // No diagonal
    }

    #[test]
    fn test_position_arithmetic() {
        let pos1 = Position::new(5, 10);
        let pos2 = Position::new(3, 2);
        assert_eq!(pos1 + pos2, Position::new(8, 12));
        assert_eq!(pos1 - pos2, Position::new(2, 8));
    }

    #[test]
    fn test_direction_deltas_are_unit_steps() {
        let origin = Position::new(0, 0);
        for direction in Direction::all() {
            assert_eq!(origin.manhattan_distance(direction.to_delta()), 1);
        }
        assert_eq!(Position::new(4, 4).step(Direction::West), Position::new(3, 4));
    }
}
