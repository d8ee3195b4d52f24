//! # Utilities Module
//!
//! Utility functions shared by the engine: the seeded random generator.

pub mod random;

pub use random::*;
