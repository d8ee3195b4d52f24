//! # Cell Registry
//!
//! The fixed catalog of cell types and the behaviour each one plugs in.
//!
//! Every cell type has a static [`CellTypeDescriptor`] describing its data
//! contract (indoor flag, required face, footprint, currency) and pointing at a
//! [`CellBehavior`] implementation. Behaviours are looked up by type, so each
//! state machine stays isolated in its own unit struct:
//! - `wilds`: unexplored tiles, meadows, forests, quarries and ruins
//! - `farm`: crop fields
//! - `town`: the starting town services and trade-like buildings
//! - `rooms`: bedrooms, storage and the paired rooms (kitchen, cuddle, combine)
//! - `temple`: the two-stage landmark

pub mod farm;
pub mod rooms;
pub mod temple;
pub mod town;
pub mod wilds;

use crate::game::{Activation, Currency, Face, GameState, Position};
use crate::DicesteadResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index into the cell-type registry.
///
/// The order is part of the data contract: each inner-temple quadrant sits
/// exactly four entries after its outer counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Unexplored,
    Meadow,
    Bedroom,
    Forest,
    Quarry,
    Build,
    TownSell,
    TownBuy,
    TownEntertain,
    Ruin,
    Study,
    StorageWood,
    StorageStone,
    StorageSeed,
    StorageCrop,
    StorageMoney,
    Crop,
    Reroll,
    Replace,
    Entertain,
    CuddleLeft,
    CuddleRight,
    UpgradeLeft,
    UpgradeRight,
    KitchenLeft,
    KitchenRight,
    TempleUpperLeft,
    TempleUpperRight,
    TempleLowerLeft,
    TempleLowerRight,
    InnerTempleUpperLeft,
    InnerTempleUpperRight,
    InnerTempleLowerLeft,
    InnerTempleLowerRight,
}

impl CellType {
    pub const COUNT: usize = 34;

    /// The registry entry for this type.
    pub fn descriptor(self) -> &'static CellTypeDescriptor {
        &CELL_TYPES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Stage-two counterpart of an outer temple quadrant.
    pub fn temple_stage_two(self) -> Option<CellType> {
        match self {
            CellType::TempleUpperLeft => Some(CellType::InnerTempleUpperLeft),
            CellType::TempleUpperRight => Some(CellType::InnerTempleUpperRight),
            CellType::TempleLowerLeft => Some(CellType::InnerTempleLowerLeft),
            CellType::TempleLowerRight => Some(CellType::InnerTempleLowerRight),
            _ => None,
        }
    }

    pub fn is_outer_temple(self) -> bool {
        self.temple_stage_two().is_some()
    }

    pub fn is_inner_temple(self) -> bool {
        matches!(
            self,
            CellType::InnerTempleUpperLeft
                | CellType::InnerTempleUpperRight
                | CellType::InnerTempleLowerLeft
                | CellType::InnerTempleLowerRight
        )
    }

    /// Offset to the other half of a paired (wide) room.
    pub fn sibling_offset(self) -> Option<Position> {
        match self {
            CellType::CuddleLeft | CellType::UpgradeLeft | CellType::KitchenLeft => {
                Some(Position::new(1, 0))
            }
            CellType::CuddleRight | CellType::UpgradeRight | CellType::KitchenRight => {
                Some(Position::new(-1, 0))
            }
            _ => None,
        }
    }

    /// Storage cell showing `currency`.
    pub fn storage_for(currency: Currency) -> CellType {
        match currency {
            Currency::Money => CellType::StorageMoney,
            Currency::Seeds => CellType::StorageSeed,
            Currency::Wood => CellType::StorageWood,
            Currency::Stone => CellType::StorageStone,
            Currency::Crop => CellType::StorageCrop,
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional per-type hooks. Every method defaults to doing nothing.
pub trait CellBehavior: Sync + fmt::Debug {
    /// Resets type-specific fields when the type is (re)assigned or revealed.
    fn on_init(&self, _state: &mut GameState, _pos: Position) {}

    /// Reason the cell cannot take `die` this turn, if any.
    fn check_precondition(&self, _state: &GameState, _pos: Position, _die: usize) -> Option<String> {
        None
    }

    /// Runs once when the die has arrived on the cell.
    fn on_activate(
        &self,
        _state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        _activation: Activation,
    ) -> DicesteadResult<()> {
        Ok(())
    }

    /// Per-frame recompute.
    fn on_tick(&self, _state: &mut GameState, _pos: Position) {}
}

/// Static data for one cell type.
#[derive(Debug)]
pub struct CellTypeDescriptor {
    pub cell_type: CellType,
    pub name: &'static str,
    /// Short text drawn on the cell
    pub label: Option<&'static str>,
    pub indoors: bool,
    /// Face a die must show to activate the cell; `None` means never
    pub need_face: Option<Face>,
    pub wide: bool,
    pub tall: bool,
    /// Currency produced by gathering here
    pub currency: Option<Currency>,
    pub behavior: &'static dyn CellBehavior,
}

impl CellTypeDescriptor {
    const fn new(cell_type: CellType, name: &'static str, behavior: &'static dyn CellBehavior) -> Self {
        Self {
            cell_type,
            name,
            label: None,
            indoors: false,
            need_face: None,
            wide: false,
            tall: false,
            currency: None,
            behavior,
        }
    }

    const fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    const fn indoors(mut self) -> Self {
        self.indoors = true;
        self
    }

    const fn needs(mut self, face: Face) -> Self {
        self.need_face = Some(face);
        self
    }

    const fn wide(mut self) -> Self {
        self.wide = true;
        self
    }

    const fn tall(mut self) -> Self {
        self.tall = true;
        self
    }

    const fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Whether a die can ever be assigned here.
    pub fn is_activatable(&self) -> bool {
        self.need_face.is_some()
    }
}

/// The registry, indexed by `CellType as usize`.
pub static CELL_TYPES: [CellTypeDescriptor; CellType::COUNT] = [
    CellTypeDescriptor::new(CellType::Unexplored, "Unexplored", &wilds::UnexploredBehavior)
        .label("?")
        .needs(Face::Explore),
    CellTypeDescriptor::new(CellType::Meadow, "Meadow", &wilds::ForageBehavior)
        .label("Forage")
        .needs(Face::Gather),
    CellTypeDescriptor::new(CellType::Bedroom, "Bedroom", &rooms::InertBehavior)
        .label("Bedroom")
        .indoors(),
    CellTypeDescriptor::new(CellType::Forest, "Forest", &wilds::GatherBehavior)
        .label("Wood")
        .needs(Face::Gather)
        .currency(Currency::Wood),
    CellTypeDescriptor::new(CellType::Quarry, "Quarry", &wilds::GatherBehavior)
        .label("Stone")
        .needs(Face::Gather)
        .currency(Currency::Stone),
    CellTypeDescriptor::new(CellType::Build, "Build", &town::BuildBehavior)
        .label("Build")
        .indoors()
        .needs(Face::Build),
    CellTypeDescriptor::new(CellType::TownSell, "Sell", &town::SellBehavior)
        .label("Sell")
        .indoors()
        .needs(Face::Trade),
    CellTypeDescriptor::new(CellType::TownBuy, "Market", &town::MarketBehavior)
        .label("Market")
        .indoors()
        .needs(Face::Trade),
    CellTypeDescriptor::new(CellType::TownEntertain, "Busk", &town::BuskBehavior)
        .label("Busk")
        .indoors()
        .needs(Face::Entertain),
    CellTypeDescriptor::new(CellType::Ruin, "Ruin", &wilds::RuinBehavior)
        .label("Ruin")
        .needs(Face::Explore),
    CellTypeDescriptor::new(CellType::Study, "Study", &town::StudyBehavior)
        .label("Study")
        .indoors()
        .needs(Face::Any),
    CellTypeDescriptor::new(CellType::StorageWood, "Wood Pile", &rooms::InertBehavior)
        .currency(Currency::Wood),
    CellTypeDescriptor::new(CellType::StorageStone, "Stone Pile", &rooms::InertBehavior)
        .currency(Currency::Stone),
    CellTypeDescriptor::new(CellType::StorageSeed, "Seed Bin", &rooms::InertBehavior)
        .currency(Currency::Seeds),
    CellTypeDescriptor::new(CellType::StorageCrop, "Granary", &rooms::InertBehavior)
        .currency(Currency::Crop),
    CellTypeDescriptor::new(CellType::StorageMoney, "Vault", &rooms::InertBehavior)
        .indoors()
        .currency(Currency::Money),
    CellTypeDescriptor::new(CellType::Crop, "Crop", &farm::CropBehavior)
        .needs(Face::Farm),
    CellTypeDescriptor::new(CellType::Reroll, "Reroll Gym", &town::RerollBehavior)
        .label("Reroll")
        .indoors()
        .needs(Face::Any),
    CellTypeDescriptor::new(CellType::Replace, "Library", &town::LibraryBehavior)
        .label("Library")
        .indoors()
        .needs(Face::Any),
    CellTypeDescriptor::new(CellType::Entertain, "Parlor", &town::ParlorBehavior)
        .label("Parlor")
        .indoors()
        .needs(Face::Entertain),
    CellTypeDescriptor::new(CellType::CuddleLeft, "Cuddle Room", &rooms::CuddleBehavior)
        .label("Cuddle")
        .indoors()
        .needs(Face::Any)
        .wide(),
    CellTypeDescriptor::new(CellType::CuddleRight, "Cuddle Room", &rooms::CuddleBehavior)
        .indoors()
        .needs(Face::Any),
    CellTypeDescriptor::new(CellType::UpgradeLeft, "Combine Room", &rooms::CombineBehavior)
        .label("Combine")
        .indoors()
        .needs(Face::Any)
        .wide(),
    CellTypeDescriptor::new(CellType::UpgradeRight, "Combine Room", &rooms::CombineBehavior)
        .indoors()
        .needs(Face::Any),
    CellTypeDescriptor::new(CellType::KitchenLeft, "Kitchen", &rooms::KitchenBehavior)
        .label("Kitchen")
        .indoors()
        .needs(Face::Farm)
        .wide(),
    CellTypeDescriptor::new(CellType::KitchenRight, "Kitchen", &rooms::KitchenBehavior)
        .indoors()
        .needs(Face::Farm),
    CellTypeDescriptor::new(CellType::TempleUpperLeft, "Temple", &temple::OuterTempleBehavior)
        .label("Temple")
        .needs(Face::Build)
        .wide()
        .tall(),
    CellTypeDescriptor::new(CellType::TempleUpperRight, "Temple", &temple::OuterTempleBehavior)
        .needs(Face::Build),
    CellTypeDescriptor::new(CellType::TempleLowerLeft, "Temple", &temple::OuterTempleBehavior)
        .needs(Face::Build),
    CellTypeDescriptor::new(CellType::TempleLowerRight, "Temple", &temple::OuterTempleBehavior)
        .needs(Face::Build),
    CellTypeDescriptor::new(CellType::InnerTempleUpperLeft, "Inner Temple", &temple::InnerTempleBehavior)
        .label("Sanctum")
        .needs(Face::Any)
        .wide()
        .tall(),
    CellTypeDescriptor::new(CellType::InnerTempleUpperRight, "Inner Temple", &temple::InnerTempleBehavior)
        .needs(Face::Any),
    CellTypeDescriptor::new(CellType::InnerTempleLowerLeft, "Inner Temple", &temple::InnerTempleBehavior)
        .needs(Face::Any),
    CellTypeDescriptor::new(CellType::InnerTempleLowerRight, "Inner Temple", &temple::InnerTempleBehavior)
        .needs(Face::Any),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_indexed_by_type() {
        for (idx, desc) in CELL_TYPES.iter().enumerate() {
            assert_eq!(desc.cell_type as usize, idx, "{} out of place", desc.name);
        }
    }

    #[test]
    fn test_inner_temple_is_four_after_outer() {
        for outer in [
            CellType::TempleUpperLeft,
            CellType::TempleUpperRight,
            CellType::TempleLowerLeft,
            CellType::TempleLowerRight,
        ] {
            let inner = outer.temple_stage_two().unwrap();
            assert_eq!(inner as usize, outer as usize + 4);
            assert!(inner.is_inner_temple());
        }
    }

    #[test]
    fn test_pure_storage_is_not_activatable() {
        assert!(!CellType::Bedroom.descriptor().is_activatable());
        assert!(!CellType::StorageMoney.descriptor().is_activatable());
        assert!(CellType::Meadow.descriptor().is_activatable());
    }

    #[test]
    fn test_gather_currencies() {
        assert_eq!(CellType::Forest.descriptor().currency, Some(Currency::Wood));
        assert_eq!(CellType::Quarry.descriptor().currency, Some(Currency::Stone));
        for currency in Currency::ALL {
            assert_eq!(CellType::storage_for(currency).descriptor().currency, Some(currency));
        }
    }

    #[test]
    fn test_siblings_point_at_each_other() {
        for (left, right) in [
            (CellType::CuddleLeft, CellType::CuddleRight),
            (CellType::UpgradeLeft, CellType::UpgradeRight),
            (CellType::KitchenLeft, CellType::KitchenRight),
        ] {
            let l = left.sibling_offset().unwrap();
            let r = right.sibling_offset().unwrap();
            assert_eq!(l + r, Position::new(0, 0));
        }
    }
}
