//! # Faces
//!
//! Action categories offered by die faces and the level/XP progression each
//! face carries independently.

use serde::{Deserialize, Serialize};

/// Highest level a face can reach.
pub const MAX_LEVEL: u32 = 8;

/// XP granted by studying, indexed by the studying face's level (1-based).
const TRAIN_XP: [u32; MAX_LEVEL as usize] = [1, 2, 3, 5, 7, 10, 14, 20];

/// An action category a die face can offer, or a cell can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Farm,
    Gather,
    Explore,
    Trade,
    Build,
    Entertain,
    /// Wildcard matching every category
    Any,
}

impl Face {
    /// The six concrete categories, in registry order.
    pub const BASE: [Face; 6] = [
        Face::Farm,
        Face::Gather,
        Face::Explore,
        Face::Trade,
        Face::Build,
        Face::Entertain,
    ];

    /// Display name of the category.
    pub fn name(self) -> &'static str {
        match self {
            Face::Farm => "Farm",
            Face::Gather => "Gather",
            Face::Explore => "Explore",
            Face::Trade => "Trade",
            Face::Build => "Build",
            Face::Entertain => "Entertain",
            Face::Any => "Any",
        }
    }

    /// Whether this face satisfies `other`, treating `Any` as a wildcard on
    /// either side.
    pub fn matches(self, other: Face) -> bool {
        face_match(self, other)
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Wildcard-aware face comparison.
///
/// # Examples
///
/// ```
/// use dicestead::{face_match, Face};
///
/// assert!(face_match(Face::Farm, Face::Farm));
/// assert!(face_match(Face::Any, Face::Trade));
/// assert!(face_match(Face::Trade, Face::Any));
/// assert!(!face_match(Face::Farm, Face::Trade));
/// ```
pub fn face_match(a: Face, b: Face) -> bool {
    a == Face::Any || b == Face::Any || a == b
}

/// XP needed to advance past `level`.
pub fn xp_for_next_level(level: u32) -> u32 {
    level * level
}

/// Tiered discount a trading face of `level` earns.
pub fn trade_discount(level: u32) -> u32 {
    match level {
        l if l >= 8 => 3,
        l if l >= 4 => 2,
        l if l >= 2 => 1,
        _ => 0,
    }
}

/// XP a study session grants to a face of `level`.
pub fn train_xp(level: u32) -> u32 {
    let idx = level.clamp(1, MAX_LEVEL) as usize - 1;
    TRAIN_XP[idx]
}

/// One of the six faces of a die, with its own progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceState {
    pub face: Face,
    pub level: u32,
    pub xp: u32,
    pub xp_next: u32,
}

impl FaceState {
    /// A fresh level-1 face.
    pub fn new(face: Face) -> Self {
        Self::with_level(face, 1)
    }

    /// A face starting at `level` (clamped to `1..=MAX_LEVEL`) with no XP.
    pub fn with_level(face: Face, level: u32) -> Self {
        let level = level.clamp(1, MAX_LEVEL);
        Self {
            face,
            level,
            xp: 0,
            xp_next: xp_for_next_level(level),
        }
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_LEVEL
    }

    /// Grants XP, carrying the excess over level-ups.
    ///
    /// Returns the number of levels gained. At `MAX_LEVEL` this is a no-op.
    pub fn earn_xp(&mut self, amount: u32) -> u32 {
        if self.is_max_level() || amount == 0 {
            return 0;
        }

        let start_level = self.level;
        self.xp = self.xp.saturating_add(amount);
        while self.level < MAX_LEVEL && self.xp >= self.xp_next {
            self.xp -= self.xp_next;
            self.level += 1;
            self.xp_next = xp_for_next_level(self.level);
        }
        if self.is_max_level() {
            self.xp = 0;
        }

        self.level - start_level
    }
}
