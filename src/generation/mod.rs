//! # Generation Module
//!
//! Seeded procedural map generation.
//!
//! A [`LevelDef`] names the seed and board size of a session. Generators turn it
//! into content through the [`Generator`] trait, drawing every random number
//! from the session's [`GameRng`] so the same definition always yields the same
//! board.

pub mod map;

pub use map::*;

use crate::config::{
    DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, DEFAULT_SEED, MAX_BOARD_HEIGHT, MAX_BOARD_WIDTH,
    MIN_BOARD_HEIGHT, MIN_BOARD_WIDTH,
};
use crate::game::Position;
use crate::{DicesteadError, DicesteadResult, GameRng};
use serde::{Deserialize, Serialize};

/// Seed and dimensions of a session.
///
/// # Examples
///
/// ```
/// use dicestead::LevelDef;
///
/// let def: LevelDef = serde_json::from_str(r#"{"seed": "abc", "w": 20, "h": 12}"#).unwrap();
/// assert_eq!(def.width, 20);
/// assert_eq!(def.height, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDef {
    pub seed: String,
    #[serde(alias = "w")]
    pub width: u32,
    #[serde(alias = "h")]
    pub height: u32,
}

impl LevelDef {
    pub fn new(seed: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            seed: seed.into(),
            width,
            height,
        }
    }

    /// Checks the board fits the settlement and the temple, and is no larger
    /// than the configured maximum.
    pub fn validate(&self) -> DicesteadResult<()> {
        if self.width < MIN_BOARD_WIDTH || self.height < MIN_BOARD_HEIGHT {
            return Err(DicesteadError::GenerationFailed(format!(
                "Board {}x{} is smaller than the minimum {}x{}",
                self.width, self.height, MIN_BOARD_WIDTH, MIN_BOARD_HEIGHT
            )));
        }
        if self.width > MAX_BOARD_WIDTH || self.height > MAX_BOARD_HEIGHT {
            return Err(DicesteadError::GenerationFailed(format!(
                "Board {}x{} is larger than the maximum {}x{}",
                self.width, self.height, MAX_BOARD_WIDTH, MAX_BOARD_HEIGHT
            )));
        }
        Ok(())
    }

    /// Centre cell the starting settlement is laid around.
    pub fn center(&self) -> Position {
        Position::new((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Cell count; saturates instead of overflowing on unvalidated sizes.
    pub fn area(&self) -> u32 {
        self.width.saturating_mul(self.height)
    }
}

impl Default for LevelDef {
    fn default() -> Self {
        Self::new(DEFAULT_SEED, DEFAULT_BOARD_WIDTH, DEFAULT_BOARD_HEIGHT)
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content for `level_def`, drawing from `rng`.
    fn generate(&self, level_def: &LevelDef, rng: &mut GameRng) -> DicesteadResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, level_def: &LevelDef) -> DicesteadResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}
