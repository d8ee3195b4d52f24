//! # Temple
//!
//! The 2x2 landmark. Each outer quadrant is rebuilt with Build work into its
//! inner counterpart; each inner quadrant is completed by devoting a die to it,
//! which removes the die for good. Completing all four inner quadrants wins.

use super::{CellBehavior, CellTypeDescriptor};
use crate::game::{Activation, GameEvent, GameState, Position};
use crate::{DicesteadError, DicesteadResult};
use log::info;

/// Build work to restore an outer quadrant.
pub const OUTER_TEMPLE_WORK: u32 = 8;

/// Work to complete an inner quadrant.
pub const INNER_TEMPLE_WORK: u32 = 12;

#[derive(Debug)]
pub struct OuterTempleBehavior;

impl CellBehavior for OuterTempleBehavior {
    fn on_init(&self, state: &mut GameState, pos: Position) {
        if let Some(cell) = state.cell_mut(pos) {
            cell.reset_progress(OUTER_TEMPLE_WORK);
        }
    }

    fn on_activate(
        &self,
        state: &mut GameState,
        desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        let progress = state.progress_cell(activation.cell, activation.die)?;
        if !progress.advanced {
            return Ok(());
        }
        let inner = desc.cell_type.temple_stage_two().ok_or_else(|| {
            DicesteadError::InvalidState(format!("{} has no inner stage", desc.cell_type))
        })?;
        state.set_cell(activation.cell, inner);
        state.add_floater(activation.cell, "Awakened!");
        state.push_event(GameEvent::TempleAwakened {
            pos: activation.cell,
        });
        info!("Temple quadrant at {} awakened", activation.cell);
        Ok(())
    }
}

#[derive(Debug)]
pub struct InnerTempleBehavior;

impl CellBehavior for InnerTempleBehavior {
    fn on_init(&self, state: &mut GameState, pos: Position) {
        if let Some(cell) = state.cell_mut(pos) {
            cell.reset_progress(INNER_TEMPLE_WORK);
        }
    }

    fn check_precondition(&self, state: &GameState, pos: Position, _die: usize) -> Option<String> {
        if state.cell(pos).map_or(false, |cell| cell.completed) {
            return Some("Complete".to_string());
        }
        if state.dice.len() <= 2 && state.completed_temple_quadrants() < 2 {
            return Some("Too few dice".to_string());
        }
        None
    }

    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        let progress = state.progress_cell(activation.cell, activation.die)?;
        if !progress.advanced {
            return Ok(());
        }
        state.remove_die(activation.die)?;
        state.add_floater(activation.cell, "Devoted");
        state.mark_temple_completed(activation.cell)?;
        Ok(())
    }
}
