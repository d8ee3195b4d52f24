//! # Dicestead
//!
//! A deterministic engine for a grid settlement builder played with dice.
//!
//! ## Architecture Overview
//!
//! Every die is a worker and every face of a die is an action category with its
//! own level and experience. Each turn the rolled dice are assigned to board
//! cells, and the cell type decides what the activation does.
//!
//! - **Game State**: the aggregate root owning board, dice, purse and the
//!   turn/activation state machines
//! - **Cell Registry**: a static table of cell-type descriptors, each pointing at
//!   a `CellBehavior` implementation
//! - **Generation System**: seeded map generation (temple, forests, quarries)
//! - **Input System**: serializable commands and a pointer-input adapter
//!
//! The engine has no rendering. A presentation layer reads the state each frame,
//! calls [`GameState::tick`] and issues commands in response to input.

pub mod cells;
pub mod game;
pub mod generation;
pub mod input;
pub mod utils;

// Core module re-exports
pub use cells::*;
pub use game::*;
pub use generation::*;
pub use input::*;
pub use utils::*;

/// Core error type for the Dicestead engine.
#[derive(thiserror::Error, Debug)]
pub enum DicesteadError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid for the requested operation
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Dicestead codebase.
pub type DicesteadResult<T> = Result<T, DicesteadError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default level seed
    pub const DEFAULT_SEED: &str = "test";

    /// Default board width in cells
    pub const DEFAULT_BOARD_WIDTH: u32 = 16;

    /// Default board height in cells
    pub const DEFAULT_BOARD_HEIGHT: u32 = 12;

    /// Smallest board that fits the starting settlement and the temple
    pub const MIN_BOARD_WIDTH: u32 = 10;

    /// Smallest board height
    pub const MIN_BOARD_HEIGHT: u32 = 8;

    /// Largest board width accepted by a level definition
    pub const MAX_BOARD_WIDTH: u32 = 256;

    /// Largest board height
    pub const MAX_BOARD_HEIGHT: u32 = 256;

    /// Seeds in the purse at the start of a session
    pub const STARTING_SEEDS: i32 = 1;

    /// Duration of a die moving onto a cell, in milliseconds
    pub const MOVE_DURATION_MS: f32 = 250.0;

    /// Duration of the end-of-turn roll, in milliseconds
    pub const ROLL_DURATION_MS: f32 = 600.0;

    /// How long a floating text stays alive, in milliseconds
    pub const FLOATER_LIFETIME_MS: f32 = 1500.0;

    /// Frames per second target for headless drivers
    pub const TARGET_FPS: u64 = 60;
}
