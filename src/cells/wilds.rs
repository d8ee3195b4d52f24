//! Outdoor cells: the fog of war, meadows, forests, quarries and ruins.

use super::{CellBehavior, CellType, CellTypeDescriptor};
use crate::game::{trade_discount, Activation, Currency, GameState, Position};
use crate::{DicesteadError, DicesteadResult};
use log::debug;

/// Work needed to reveal a tile, by what lies underneath.
pub fn explore_cost(hidden: CellType) -> u32 {
    match hidden {
        CellType::Forest | CellType::Quarry => 2,
        CellType::Ruin => 3,
        t if t.is_outer_temple() || t.is_inner_temple() => 4,
        _ => 1,
    }
}

/// Foraging odds out of [`FORAGE_ODDS_TOTAL`].
const FORAGE_ODDS: [(Currency, u32); 5] = [
    (Currency::Crop, 4),
    (Currency::Seeds, 2),
    (Currency::Money, 1),
    (Currency::Wood, 12),
    (Currency::Stone, 13),
];

pub const FORAGE_ODDS_TOTAL: u32 = 32;

/// Maps a roll in `0..FORAGE_ODDS_TOTAL` to the item found.
pub fn forage_draw(roll: u32) -> Currency {
    let mut roll = roll;
    for (currency, weight) in FORAGE_ODDS {
        if roll < weight {
            return currency;
        }
        roll -= weight;
    }
    Currency::Stone
}

/// Ruins take a while to dig through.
const RUIN_WORK: u32 = 4;

#[derive(Debug)]
pub struct UnexploredBehavior;

impl CellBehavior for UnexploredBehavior {
    fn on_init(&self, state: &mut GameState, pos: Position) {
        if let Some(cell) = state.cell_mut(pos) {
            let cost = explore_cost(cell.cell_type);
            cell.reset_progress(cost);
        }
    }

    fn check_precondition(&self, state: &GameState, pos: Position, _die: usize) -> Option<String> {
        let frontier = state
            .board
            .neighbors(pos)
            .into_iter()
            .any(|p| state.cell(p).map_or(false, |cell| cell.explored));
        if frontier {
            None
        } else {
            Some("Too far".to_string())
        }
    }

    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        let progress = state.progress_cell(activation.cell, activation.die)?;
        if progress.advanced {
            debug!("Explored {}", activation.cell);
            state.set_explored(activation.cell);
            state.add_floater(activation.cell, "Explored!");
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ForageBehavior;

impl CellBehavior for ForageBehavior {
    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        let level = state.die(activation.die)?.active_face().level;
        for _ in 0..=trade_discount(level) {
            let found = forage_draw(state.rng.range(FORAGE_ODDS_TOTAL));
            state.resource_mod(found, 1);
        }
        state.grant_xp(activation.die, 1);
        Ok(())
    }
}

/// Forests and quarries: a finite pile of one currency.
#[derive(Debug)]
pub struct GatherBehavior;

impl CellBehavior for GatherBehavior {
    fn on_init(&self, state: &mut GameState, pos: Position) {
        let resources = 5 + state.rng.range(5);
        if let Some(cell) = state.cell_mut(pos) {
            cell.resources = resources;
            cell.reset_progress(resources);
        }
    }

    fn on_activate(
        &self,
        state: &mut GameState,
        desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        let currency = desc.currency.ok_or_else(|| {
            DicesteadError::InvalidState(format!("{} has no currency to gather", desc.name))
        })?;
        let progress = state.progress_cell(activation.cell, activation.die)?;
        state.resource_mod(currency, progress.amount as i32);

        let remaining = match state.cell_mut(activation.cell) {
            Some(cell) => {
                cell.resources = cell.remaining();
                cell.resources
            }
            None => 0,
        };
        if remaining == 0 {
            debug!("{} at {} is depleted", desc.name, activation.cell);
            state.set_cell(activation.cell, CellType::Meadow);
            state.add_floater(activation.cell, "Depleted");
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct RuinBehavior;

impl CellBehavior for RuinBehavior {
    fn on_init(&self, state: &mut GameState, pos: Position) {
        if let Some(cell) = state.cell_mut(pos) {
            cell.reset_progress(RUIN_WORK);
        }
    }

    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        let progress = state.progress_cell(activation.cell, activation.die)?;
        if progress.advanced {
            let money = 2 + state.rng.range(4);
            let seeds = 1 + state.rng.range(2);
            state.resource_mod(Currency::Money, money as i32);
            state.resource_mod(Currency::Seeds, seeds as i32);
            state.set_cell(activation.cell, CellType::Meadow);
            state.add_floater(activation.cell, "Ruin cleared");
        }
        Ok(())
    }
}
