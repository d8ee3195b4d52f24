//! # Prompts
//!
//! Modal interactions opened by an activation. While a prompt is open all input
//! goes to it, and the turn cannot end.

use super::{Cost, Currency, Position};
use crate::cells::CellType;
use serde::{Deserialize, Serialize};

/// The activation that opened a prompt, kept so it can be reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Activation {
    pub die: usize,
    pub cell: Position,
    /// Where the die stood before walking onto the cell
    pub origin: Position,
    pub prev_used_idx: Option<u32>,
}

/// A pending modal interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Prompt {
    /// Choose what to build
    BuildMenu(Activation),
    /// Choose where to put it
    BuildPlace {
        activation: Activation,
        kind: BuildKind,
    },
    /// Buy currencies or stocked faces
    Market {
        activation: Activation,
        purchases: u32,
    },
    /// Pick another die, then the face it should show
    Kitchen {
        activation: Activation,
        target: Option<usize>,
    },
    /// Pick which face the shelved face replaces
    Library(Activation),
    /// All temple quadrants are complete
    Victory,
}

impl Prompt {
    /// The board accepts taps only to complete a pending placement.
    pub fn is_build_mode(&self) -> bool {
        matches!(self, Prompt::BuildPlace { .. })
    }

    pub fn activation(&self) -> Option<&Activation> {
        match self {
            Prompt::BuildMenu(activation) | Prompt::Library(activation) => Some(activation),
            Prompt::BuildPlace { activation, .. }
            | Prompt::Market { activation, .. }
            | Prompt::Kitchen { activation, .. } => Some(activation),
            Prompt::Victory => None,
        }
    }
}

/// An answer to the open prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "choice", rename_all = "snake_case")]
pub enum PromptChoice {
    Build { kind: BuildKind },
    Buy { currency: Currency, amount: u32 },
    BuyFace { slot: usize },
    PickDie { die: usize },
    PickFace { face: usize },
    /// Close a prompt after completing it
    Done,
    /// Step back inside a multi-step prompt
    Back,
    /// Abort and revert the activation
    Cancel,
}

/// Constructible buildings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildKind {
    Bedroom,
    CuddleRoom,
    Crop,
    Kitchen,
    Study,
    Parlor,
    RerollGym,
    Library,
    CombineRoom,
}

/// `base * 2^exp`, saturating.
fn exponential(base: u32, exp: u32) -> i32 {
    let scaled = 2u32
        .checked_pow(exp)
        .and_then(|factor| base.checked_mul(factor))
        .unwrap_or(u32::MAX);
    i32::try_from(scaled).unwrap_or(i32::MAX)
}

pub fn bedroom_cost(count: u32) -> Cost {
    Cost::new().with(Currency::Wood, exponential(4, count.saturating_sub(2)))
}

pub fn study_cost(count: u32) -> Cost {
    Cost::new().with(Currency::Stone, exponential(3, count))
}

pub fn reroll_cost(count: u32) -> Cost {
    Cost::new().with(Currency::Money, exponential(4, count))
}

pub fn library_cost(count: u32) -> Cost {
    Cost::new()
        .with(Currency::Stone, exponential(4, count))
        .with(Currency::Money, exponential(4, count))
}

impl BuildKind {
    pub const ALL: [BuildKind; 9] = [
        BuildKind::Bedroom,
        BuildKind::CuddleRoom,
        BuildKind::Crop,
        BuildKind::Kitchen,
        BuildKind::Study,
        BuildKind::Parlor,
        BuildKind::RerollGym,
        BuildKind::Library,
        BuildKind::CombineRoom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuildKind::Bedroom => "Bedroom",
            BuildKind::CuddleRoom => "Cuddle Room",
            BuildKind::Crop => "Crop",
            BuildKind::Kitchen => "Kitchen",
            BuildKind::Study => "Study",
            BuildKind::Parlor => "Parlor",
            BuildKind::RerollGym => "Reroll Gym",
            BuildKind::Library => "Library",
            BuildKind::CombineRoom => "Combine Room",
        }
    }

    /// Cell types placed: the main cell and, for wide buildings, its right half.
    pub fn cell_types(self) -> (CellType, Option<CellType>) {
        match self {
            BuildKind::Bedroom => (CellType::Bedroom, None),
            BuildKind::CuddleRoom => (CellType::CuddleLeft, Some(CellType::CuddleRight)),
            BuildKind::Crop => (CellType::Crop, None),
            BuildKind::Kitchen => (CellType::KitchenLeft, Some(CellType::KitchenRight)),
            BuildKind::Study => (CellType::Study, None),
            BuildKind::Parlor => (CellType::Entertain, None),
            BuildKind::RerollGym => (CellType::Reroll, None),
            BuildKind::Library => (CellType::Replace, None),
            BuildKind::CombineRoom => (CellType::UpgradeLeft, Some(CellType::UpgradeRight)),
        }
    }

    pub fn is_wide(self) -> bool {
        self.cell_types().1.is_some()
    }

    /// Price given how many of this building already stand.
    pub fn cost(self, count: u32) -> Cost {
        match self {
            BuildKind::Bedroom => bedroom_cost(count),
            BuildKind::Study => study_cost(count),
            BuildKind::RerollGym => reroll_cost(count),
            BuildKind::Library => library_cost(count),
            BuildKind::CuddleRoom => Cost::new()
                .with(Currency::Wood, 8)
                .with(Currency::Stone, 8),
            BuildKind::Crop => Cost::new().with(Currency::Wood, 2),
            BuildKind::Kitchen => Cost::new()
                .with(Currency::Wood, 6)
                .with(Currency::Stone, 4),
            BuildKind::Parlor => Cost::new()
                .with(Currency::Wood, 6)
                .with(Currency::Money, 4),
            BuildKind::CombineRoom => Cost::new()
                .with(Currency::Stone, 10)
                .with(Currency::Money, 10),
        }
    }
}

/// A build-menu entry as offered to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOption {
    pub kind: BuildKind,
    pub cost: Cost,
    pub affordable: bool,
}
