//! # Town Services
//!
//! The starting town (build site, sell stall, market, busking corner) and the
//! single-cell service buildings the player can add later (study, reroll gym,
//! library, parlor). Prompt-driven services also own the handlers for the
//! choices their prompt accepts.

use super::{CellBehavior, CellType, CellTypeDescriptor};
use crate::game::{
    trade_discount, train_xp, Activation, BuildKind, Currency, Face, FaceState, GameEvent,
    GameState, Position, Prompt, PromptChoice, FACES_PER_DIE,
};
use crate::{DicesteadError, DicesteadResult};
use log::{debug, info};

/// Money paid per crop at the sell stall.
pub const SELL_PRICE: i32 = 2;

/// Fee for a study session.
pub const STUDY_FEE: i32 = 2;

/// Faces a market offers each turn.
pub const MARKET_STOCK: usize = 2;

/// Base market price of a currency before the trade discount.
pub fn market_unit_price(currency: Currency) -> Option<u32> {
    match currency {
        Currency::Seeds => Some(2),
        Currency::Wood | Currency::Stone => Some(4),
        Currency::Crop => Some(3),
        Currency::Money => None,
    }
}

/// Market price of a currency for a trader of `level`.
pub fn discounted_price(currency: Currency, level: u32) -> Option<u32> {
    market_unit_price(currency).map(|base| base.saturating_sub(trade_discount(level)).max(1))
}

/// Market price of a stocked face for a trader of `level`.
pub fn face_price(level: u32) -> u32 {
    8u32.saturating_sub(2 * trade_discount(level)).max(2)
}

fn invalid(message: impl Into<String>) -> DicesteadError {
    DicesteadError::InvalidAction(message.into())
}

fn active_level(state: &GameState, die: usize) -> DicesteadResult<u32> {
    Ok(state.die(die)?.active_face().level)
}

/// Performance income: one coin flip per level point.
fn perform(state: &mut GameState, activation: Activation, sides: u32) -> DicesteadResult<()> {
    let level = active_level(state, activation.die)?;
    let earned: u32 = (0..level).map(|_| state.rng.range(sides)).sum();
    if earned > 0 {
        state.resource_mod(Currency::Money, earned as i32);
    } else {
        state.add_floater(activation.cell, "No tips");
    }
    state.grant_xp(activation.die, 1);
    Ok(())
}

// ----------------------------------------------------------------------
// Build site
// ----------------------------------------------------------------------

#[derive(Debug)]
pub struct BuildBehavior;

impl CellBehavior for BuildBehavior {
    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        state.open_prompt(Prompt::BuildMenu(activation))
    }
}

/// Picks what to build from the menu.
pub fn choose_build_kind(
    state: &mut GameState,
    activation: Activation,
    kind: BuildKind,
) -> DicesteadResult<()> {
    let cost = state.build_cost(kind);
    if !state.purse.can_afford(&cost) {
        return Err(invalid(format!("{} costs {}", kind.name(), cost)));
    }
    state.prompt = Some(Prompt::BuildPlace { activation, kind });
    Ok(())
}

fn placement_cell_reason(state: &GameState, pos: Position) -> Option<String> {
    let Some(cell) = state.cell(pos) else {
        return Some("Out of bounds".to_string());
    };
    if !cell.explored {
        return Some("Unexplored".to_string());
    }
    if cell.cell_type != CellType::Meadow {
        return Some("Not a meadow".to_string());
    }
    if cell.is_used(state.turn_idx) {
        return Some("In use".to_string());
    }
    if state.die_at(pos).is_some() {
        return Some("Occupied".to_string());
    }
    None
}

/// Why a building of `kind` cannot go at `pos`.
///
/// Buildings go on explored meadows nobody is standing on. Wide buildings
/// also claim the meadow to the right.
pub fn placement_block_reason(state: &GameState, kind: BuildKind, pos: Position) -> Option<String> {
    placement_cell_reason(state, pos).or_else(|| {
        if kind.is_wide() {
            placement_cell_reason(state, pos + Position::new(1, 0))
                .map(|reason| format!("Right half: {}", reason))
        } else {
            None
        }
    })
}

/// Pays for and places the pending building.
pub fn finish_build(
    state: &mut GameState,
    activation: Activation,
    kind: BuildKind,
    pos: Position,
) -> DicesteadResult<()> {
    if let Some(reason) = placement_block_reason(state, kind, pos) {
        return Err(invalid(format!("Cannot build at {}: {}", pos, reason)));
    }
    let cost = state.build_cost(kind);
    if !state.purse.can_afford(&cost) {
        return Err(invalid(format!("{} costs {}", kind.name(), cost)));
    }

    for &(currency, amount) in &cost.items {
        state.resource_mod(currency, -amount);
    }
    let (main, right) = kind.cell_types();
    state.set_cell(pos, main);
    if let Some(right) = right {
        state.set_cell(pos + Position::new(1, 0), right);
    }

    state.add_floater(pos, "Built!");
    state.grant_xp(activation.die, 1);
    state.push_event(GameEvent::CellBuilt {
        pos,
        cell_type: main,
    });
    state.prompt = None;
    info!("Built {} at {} for {}", kind.name(), pos, cost);
    Ok(())
}

// ----------------------------------------------------------------------
// Sell stall
// ----------------------------------------------------------------------

#[derive(Debug)]
pub struct SellBehavior;

impl CellBehavior for SellBehavior {
    fn check_precondition(&self, state: &GameState, _pos: Position, _die: usize) -> Option<String> {
        if state.purse[Currency::Crop] <= 0 {
            Some("No crop".to_string())
        } else {
            None
        }
    }

    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        let crop = state.purse[Currency::Crop].max(0) as u32;
        if let Some(cell) = state.cell_mut(activation.cell) {
            cell.reset_progress(crop);
        }
        let progress = state.progress_cell(activation.cell, activation.die)?;
        let sold = progress.amount as i32;
        state.resource_mod(Currency::Crop, -sold);
        state.resource_mod(Currency::Money, sold * SELL_PRICE);
        if let Some(cell) = state.cell_mut(activation.cell) {
            cell.progress = 0;
        }
        debug!("Sold {} crop", sold);
        Ok(())
    }

    fn on_tick(&self, state: &mut GameState, pos: Position) {
        let crop = state.purse[Currency::Crop].max(0) as u32;
        if let Some(cell) = state.cell_mut(pos) {
            cell.progress_max = crop;
        }
    }
}

// ----------------------------------------------------------------------
// Market
// ----------------------------------------------------------------------

/// Refills a market with fresh faces for the turn.
pub fn restock_market(state: &mut GameState, pos: Position) {
    let stock: Vec<Face> = (0..MARKET_STOCK)
        .map(|_| Face::BASE[state.rng.index(Face::BASE.len())])
        .collect();
    if let Some(cell) = state.cell_mut(pos) {
        cell.stock = stock;
    }
}

#[derive(Debug)]
pub struct MarketBehavior;

impl CellBehavior for MarketBehavior {
    fn on_init(&self, state: &mut GameState, pos: Position) {
        restock_market(state, pos);
    }

    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        state.open_prompt(Prompt::Market {
            activation,
            purchases: 0,
        })
    }
}

/// Handles a choice made in the market prompt.
pub fn choose_market(
    state: &mut GameState,
    activation: Activation,
    purchases: u32,
    choice: PromptChoice,
) -> DicesteadResult<()> {
    match choice {
        PromptChoice::Buy { currency, amount } => {
            buy_currency(state, activation, currency, amount)?;
            state.prompt = Some(Prompt::Market {
                activation,
                purchases: purchases + 1,
            });
            Ok(())
        }
        PromptChoice::BuyFace { slot } => {
            buy_face(state, activation, slot)?;
            state.prompt = Some(Prompt::Market {
                activation,
                purchases: purchases + 1,
            });
            Ok(())
        }
        PromptChoice::Done => {
            state.prompt = None;
            Ok(())
        }
        PromptChoice::Cancel if purchases == 0 => state.cancel_activation(activation),
        PromptChoice::Cancel => Err(invalid("Purchases were already made")),
        other => Err(invalid(format!("The market does not accept {:?}", other))),
    }
}

fn buy_currency(
    state: &mut GameState,
    activation: Activation,
    currency: Currency,
    amount: u32,
) -> DicesteadResult<()> {
    if amount == 0 {
        return Err(invalid("Nothing to buy"));
    }
    let level = active_level(state, activation.die)?;
    let unit = discounted_price(currency, level)
        .ok_or_else(|| invalid(format!("The market does not sell {}", currency)))?;
    let total = unit.saturating_mul(amount);
    if i64::from(state.purse[Currency::Money]) < i64::from(total) {
        return Err(invalid(format!("{} {} costs {} money", amount, currency, total)));
    }
    state.resource_mod(Currency::Money, -(total as i32));
    state.resource_mod(currency, amount as i32);
    state.grant_xp(activation.die, 1);
    debug!("Bought {} {} for {} money", amount, currency, total);
    Ok(())
}

fn buy_face(state: &mut GameState, activation: Activation, slot: usize) -> DicesteadResult<()> {
    let face = state
        .cell(activation.cell)
        .and_then(|cell| cell.stock.get(slot).copied())
        .ok_or_else(|| invalid(format!("No face in slot {}", slot)))?;
    let level = active_level(state, activation.die)?;
    let price = face_price(level) as i32;
    if state.purse[Currency::Money] < price {
        return Err(invalid(format!("{} costs {} money", face, price)));
    }
    let shelf = state
        .board
        .find(|cell| cell.explored && cell.cell_type == CellType::Replace && cell.stored_face.is_none())
        .ok_or_else(|| invalid("No empty library shelf"))?;

    state.resource_mod(Currency::Money, -price);
    if let Some(cell) = state.cell_mut(shelf) {
        cell.stored_face = Some(FaceState::new(face));
    }
    if let Some(cell) = state.cell_mut(activation.cell) {
        cell.stock.remove(slot);
    }
    state.add_floater(shelf, format!("New {} face", face));
    state.grant_xp(activation.die, 1);
    Ok(())
}

// ----------------------------------------------------------------------
// Income buildings
// ----------------------------------------------------------------------

/// Street performance: each level point flips a coin for one money.
#[derive(Debug)]
pub struct BuskBehavior;

impl CellBehavior for BuskBehavior {
    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        perform(state, activation, 2)
    }
}

/// Indoor performance: each level point earns up to two money.
#[derive(Debug)]
pub struct ParlorBehavior;

impl CellBehavior for ParlorBehavior {
    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        perform(state, activation, 3)
    }
}

// ----------------------------------------------------------------------
// Dice services
// ----------------------------------------------------------------------

#[derive(Debug)]
pub struct StudyBehavior;

impl CellBehavior for StudyBehavior {
    fn check_precondition(&self, state: &GameState, _pos: Position, _die: usize) -> Option<String> {
        if state.purse[Currency::Money] < STUDY_FEE {
            Some(format!("Need {} money", STUDY_FEE))
        } else {
            None
        }
    }

    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        let level = active_level(state, activation.die)?;
        state.resource_mod(Currency::Money, -STUDY_FEE);
        state.grant_xp(activation.die, train_xp(level));
        state.add_floater(activation.cell, "Studied");
        Ok(())
    }
}

#[derive(Debug)]
pub struct RerollBehavior;

impl CellBehavior for RerollBehavior {
    fn check_precondition(&self, state: &GameState, _pos: Position, die: usize) -> Option<String> {
        if state.free_dice_except(die).is_empty() {
            Some("No dice to reroll".to_string())
        } else {
            None
        }
    }

    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        for idx in state.free_dice_except(activation.die) {
            let face = state.rng.index(FACES_PER_DIE);
            state.dice[idx].cur_face = face;
        }
        state.add_floater(activation.cell, "Rerolled!");
        state.grant_xp(activation.die, 1);
        Ok(())
    }
}

/// Shelf holding one bought face until a die learns it.
#[derive(Debug)]
pub struct LibraryBehavior;

impl CellBehavior for LibraryBehavior {
    fn check_precondition(&self, state: &GameState, pos: Position, die: usize) -> Option<String> {
        let stored = match state.cell(pos).and_then(|cell| cell.stored_face) {
            Some(stored) => stored,
            None => return Some("Empty shelf".to_string()),
        };
        let worker = state.dice.get(die)?;
        if worker.faces.iter().all(|face| face.face == stored.face) {
            Some("Nothing to learn".to_string())
        } else {
            None
        }
    }

    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        state.open_prompt(Prompt::Library(activation))
    }
}

/// Handles a choice made in the library prompt.
pub fn choose_library(
    state: &mut GameState,
    activation: Activation,
    choice: PromptChoice,
) -> DicesteadResult<()> {
    match choice {
        PromptChoice::PickFace { face } => {
            if face >= FACES_PER_DIE {
                return Err(invalid(format!("No face {}", face)));
            }
            let stored = state
                .cell_mut(activation.cell)
                .and_then(|cell| cell.stored_face.take())
                .ok_or_else(|| invalid("The shelf is empty"))?;
            state.die_mut(activation.die)?.faces[face] = stored;
            state.add_floater(activation.cell, format!("Learned {}", stored.face));
            state.prompt = None;
            Ok(())
        }
        PromptChoice::Cancel => state.cancel_activation(activation),
        other => Err(invalid(format!("The library does not accept {:?}", other))),
    }
}
