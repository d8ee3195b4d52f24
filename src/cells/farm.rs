//! Crop fields: sow, tend, harvest, repeat.

use super::{CellBehavior, CellTypeDescriptor};
use crate::game::{Activation, CropStage, Currency, GameEvent, GameState, Position};
use crate::DicesteadResult;
use log::debug;

/// Crop brought in by one harvest.
pub const HARVEST_YIELD: i32 = 8;

#[derive(Debug)]
pub struct CropBehavior;

impl CellBehavior for CropBehavior {
    fn on_init(&self, state: &mut GameState, pos: Position) {
        if let Some(cell) = state.cell_mut(pos) {
            cell.crop_stage = CropStage::Field;
            cell.reset_progress(CropStage::Field.work_needed());
        }
    }

    fn check_precondition(&self, state: &GameState, pos: Position, _die: usize) -> Option<String> {
        let cell = state.cell(pos)?;
        let needs_seed = cell.crop_stage == CropStage::Field && cell.progress == 0;
        if needs_seed && state.purse[Currency::Seeds] < 1 {
            Some("Need seeds".to_string())
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
        let pos = activation.cell;
        let Some((stage, started)) = state.cell(pos).map(|c| (c.crop_stage, c.progress > 0)) else {
            return Ok(());
        };
        if stage == CropStage::Field && !started {
            state.resource_mod(Currency::Seeds, -1);
        }

        let progress = state.progress_cell(pos, activation.die)?;
        if !progress.advanced {
            return Ok(());
        }

        let next = stage.next();
        if let Some(cell) = state.cell_mut(pos) {
            cell.crop_stage = next;
            cell.reset_progress(next.work_needed());
        }
        debug!("{} done at {}, now {:?}", stage.action_name(), pos, next);

        if stage == CropStage::Ripe {
            state.resource_mod(Currency::Crop, HARVEST_YIELD);
            state.add_floater(pos, "Harvest!");
            state.push_event(GameEvent::CropHarvested {
                pos,
                amount: HARVEST_YIELD,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::CellType;
    use crate::game::{Face, FaceState};
    use crate::generation::LevelDef;

    fn farm_state() -> (GameState, Position) {
        let mut state = GameState::new(&LevelDef::new("farm", 16, 14)).unwrap();
        let pos = Position::new(9, 6);
        state.set_cell(pos, CellType::Crop);
        state.dice[1].faces[0] = FaceState::with_level(Face::Farm, 8);
        (state, pos)
    }

    fn work(state: &mut GameState, pos: Position) {
        state.select_die(1).unwrap();
        state.activate_cell(pos).unwrap();
        state.finish_animation().unwrap();
        state.next_turn().unwrap();
        state.finish_animation().unwrap();
        state.dice[1].cur_face = 0;
    }

    #[test]
    fn test_sowing_needs_a_seed() {
        let (mut state, pos) = farm_state();
        state.purse.set(Currency::Seeds, 0);
        assert_eq!(state.cell_block_reason(pos, 1), Some("Need seeds".to_string()));
    }

    #[test]
    fn test_full_cycle_consumes_one_seed_and_harvests() {
        let (mut state, pos) = farm_state();
        assert_eq!(state.purse[Currency::Seeds], 1);

        work(&mut state, pos);
        assert_eq!(state.purse[Currency::Seeds], 0);
        assert_eq!(state.cell(pos).map(|c| c.crop_stage), Some(CropStage::Sprout));

        work(&mut state, pos);
        assert_eq!(state.cell(pos).map(|c| c.crop_stage), Some(CropStage::Ripe));

        work(&mut state, pos);
        assert_eq!(state.cell(pos).map(|c| c.crop_stage), Some(CropStage::Field));
        assert_eq!(state.purse[Currency::Crop], HARVEST_YIELD);
        assert_eq!(state.purse[Currency::Seeds], 0);
        assert_eq!(state.statistics.crops_harvested, 1);
    }

    #[test]
    fn test_partial_sowing_does_not_charge_twice() {
        let (mut state, pos) = farm_state();
        state.dice[1].faces[0] = FaceState::new(Face::Farm);
        work(&mut state, pos);
        assert_eq!(state.purse[Currency::Seeds], 0);
        assert_eq!(state.cell(pos).map(|c| c.progress), Some(1));
        // Started fields need no further seed
        assert_eq!(state.cell_block_reason(pos, 1), None);
    }
}
