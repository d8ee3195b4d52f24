//! Indoor rooms: bedrooms and storage (inert), plus the two-cell rooms that
//! work on pairs of dice.
//!
//! Paired rooms resolve when the second half is filled in the same turn; the
//! first die to arrive just waits.

use super::{CellBehavior, CellTypeDescriptor};
use crate::game::{
    Activation, Face, FaceState, GameState, Position, Prompt, PromptChoice, FACES_PER_DIE,
    MAX_LEVEL,
};
use crate::{DicesteadError, DicesteadResult};
use log::info;

/// Turns a bred or merged die stays busy, parents included.
pub const NURSERY_TURNS: u32 = 2;

/// Bedrooms and storage: nothing to do there.
#[derive(Debug)]
pub struct InertBehavior;

impl CellBehavior for InertBehavior {}

/// Position of the other half of the paired room at `pos`.
fn sibling(state: &GameState, pos: Position) -> Option<Position> {
    let offset = state.cell(pos)?.cell_type.sibling_offset()?;
    Some(pos + offset)
}

/// Left half of the paired room containing `pos`.
fn left_half(state: &GameState, pos: Position) -> Position {
    match state.cell(pos).and_then(|cell| cell.cell_type.sibling_offset()) {
        Some(offset) if offset.x < 0 => pos + offset,
        _ => pos,
    }
}

/// The die already waiting on the other half this turn.
fn waiting_partner(state: &GameState, activation: &Activation) -> Option<usize> {
    let other = sibling(state, activation.cell)?;
    if !state.cell(other)?.is_used(state.turn_idx) {
        return None;
    }
    state
        .dice
        .iter()
        .enumerate()
        .find(|&(idx, die)| idx != activation.die && die.used && die.pos == other)
        .map(|(idx, _)| idx)
}

fn sibling_in_use(state: &GameState, pos: Position) -> bool {
    sibling(state, pos)
        .and_then(|other| state.cell(other))
        .map_or(false, |cell| cell.is_used(state.turn_idx))
}

/// Level-ups from merging two faces in the same slot.
///
/// Matching faces pool their levels; otherwise the first face gains a level.
pub fn merge_faces(a: FaceState, b: FaceState) -> FaceState {
    let level = if a.face == b.face {
        a.level + b.level
    } else {
        a.level + 1
    };
    FaceState::with_level(a.face, level.min(MAX_LEVEL))
}

// ----------------------------------------------------------------------
// Kitchen
// ----------------------------------------------------------------------

/// Feeds another die so it can switch to a face of the player's choosing.
#[derive(Debug)]
pub struct KitchenBehavior;

impl CellBehavior for KitchenBehavior {
    fn check_precondition(&self, state: &GameState, pos: Position, die: usize) -> Option<String> {
        if sibling_in_use(state, pos) {
            return Some("Kitchen busy".to_string());
        }
        if state.free_dice_except(die).is_empty() {
            return Some("No one to feed".to_string());
        }
        None
    }

    fn on_activate(
        &self,
        state: &mut GameState,
        _desc: &'static CellTypeDescriptor,
        activation: Activation,
    ) -> DicesteadResult<()> {
        state.open_prompt(Prompt::Kitchen {
            activation,
            target: None,
        })
    }
}

/// Handles a choice made in the kitchen prompt.
pub fn choose_kitchen(
    state: &mut GameState,
    activation: Activation,
    target: Option<usize>,
    choice: PromptChoice,
) -> DicesteadResult<()> {
    match (target, choice) {
        (None, PromptChoice::PickDie { die }) => {
            if die == activation.die || state.die(die)?.used {
                return Err(DicesteadError::InvalidAction(format!(
                    "Die {} cannot be fed",
                    die
                )));
            }
            state.prompt = Some(Prompt::Kitchen {
                activation,
                target: Some(die),
            });
            Ok(())
        }
        (Some(target), PromptChoice::PickFace { face }) => {
            if face >= FACES_PER_DIE {
                return Err(DicesteadError::InvalidAction(format!("No face {}", face)));
            }
            state.die_mut(target)?.cur_face = face;
            state.grant_xp(activation.die, 1);
            state.add_floater(activation.cell, "Fed!");
            state.prompt = None;
            Ok(())
        }
        (Some(_), PromptChoice::Back) => {
            state.prompt = Some(Prompt::Kitchen {
                activation,
                target: None,
            });
            Ok(())
        }
        (_, PromptChoice::Cancel) => state.cancel_activation(activation),
        (_, other) => Err(DicesteadError::InvalidAction(format!(
            "The kitchen does not accept {:?} now",
            other
        ))),
    }
}

// ----------------------------------------------------------------------
// Cuddle room
// ----------------------------------------------------------------------

/// Two dice in the room produce a child die.
#[derive(Debug)]
pub struct CuddleBehavior;

impl CellBehavior for CuddleBehavior {
    fn check_precondition(&self, state: &GameState, _pos: Position, _die: usize) -> Option<String> {
        if state.free_bedroom().is_none() {
            Some("Need a free bedroom".to_string())
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
        match waiting_partner(state, &activation) {
            Some(partner) => breed(state, partner, activation),
            None => {
                state.add_floater(activation.cell, "Waiting for partner");
                Ok(())
            }
        }
    }
}

fn breed(state: &mut GameState, partner: usize, activation: Activation) -> DicesteadResult<()> {
    let bedroom = state
        .free_bedroom()
        .ok_or_else(|| DicesteadError::InvalidState("No free bedroom for the child".to_string()))?;

    let mut pool: Vec<Face> = state
        .die(partner)?
        .faces
        .iter()
        .chain(state.die(activation.die)?.faces.iter())
        .map(|face| face.face)
        .chain(Face::BASE)
        .collect();
    state.rng.shuffle(&mut pool);
    let faces: [FaceState; FACES_PER_DIE] = std::array::from_fn(|i| FaceState::new(pool[i]));

    let child = state.add_die(faces, bedroom);
    let child_id = state.dice[child].id;
    let until = state.turn_idx + NURSERY_TURNS;
    for idx in [partner, activation.die, child] {
        state.dice[idx].lock_until(until);
    }

    let room = left_half(state, activation.cell);
    if let Some(cell) = state.cell_mut(room) {
        cell.child = Some(child_id);
    }
    state.add_floater(bedroom, "A new die!");
    info!("Die {} was born in the cuddle room at {}", child_id, room);
    Ok(())
}

// ----------------------------------------------------------------------
// Combine room
// ----------------------------------------------------------------------

/// Two dice in the room merge into one stronger die.
#[derive(Debug)]
pub struct CombineBehavior;

impl CellBehavior for CombineBehavior {
    fn check_precondition(&self, state: &GameState, _pos: Position, _die: usize) -> Option<String> {
        if state.dice.len() <= 2 {
            Some("Need 3+ dice".to_string())
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
        match waiting_partner(state, &activation) {
            Some(partner) => combine(state, partner, activation),
            None => {
                state.add_floater(activation.cell, "Waiting for partner");
                Ok(())
            }
        }
    }
}

fn combine(state: &mut GameState, partner: usize, activation: Activation) -> DicesteadResult<()> {
    if state.dice.len() <= 2 {
        return Err(DicesteadError::InvalidState(
            "Combining would leave fewer than two dice".to_string(),
        ));
    }

    let room = left_half(state, activation.cell);
    let (first, second) = if state.die(partner)?.pos == room {
        (partner, activation.die)
    } else {
        (activation.die, partner)
    };
    let a = state.die(first)?.clone();
    let b = state.die(second)?.clone();
    let faces: [FaceState; FACES_PER_DIE] =
        std::array::from_fn(|i| merge_faces(a.faces[i], b.faces[i]));

    state.remove_die(first.max(second))?;
    state.remove_die(first.min(second))?;
    let merged = state.add_die(faces, a.bedroom);
    let until = state.turn_idx + NURSERY_TURNS;
    let die = &mut state.dice[merged];
    die.pos = room;
    die.lock_until(until);
    let merged_id = die.id;

    state.add_floater(room, "Combined!");
    info!("Dice {} and {} combined into die {}", a.id, b.id, merged_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::CellType;
    use crate::generation::LevelDef;

    const LEFT: Position = Position { x: 9, y: 6 };
    const RIGHT: Position = Position { x: 10, y: 6 };

    fn room_state(left: CellType, right: CellType) -> GameState {
        let mut state = GameState::new(&LevelDef::new("rooms", 16, 14)).unwrap();
        state.set_explored(RIGHT);
        state.set_cell(LEFT, left);
        state.set_cell(RIGHT, right);
        state
    }

    fn send(state: &mut GameState, die: usize, pos: Position) -> DicesteadResult<()> {
        state.select_die(die)?;
        state.activate_cell(pos)?;
        state.finish_animation()
    }

    #[test]
    fn test_merge_faces() {
        let a = FaceState::with_level(Face::Build, 3);
        let b = FaceState::with_level(Face::Build, 4);
        assert_eq!(merge_faces(a, b).level, 7);
        let c = FaceState::with_level(Face::Farm, 6);
        assert_eq!(merge_faces(a, c), FaceState::with_level(Face::Build, 4));
        let d = FaceState::with_level(Face::Build, 7);
        assert_eq!(merge_faces(d, d).level, MAX_LEVEL);
    }

    #[test]
    fn test_combine_rejected_with_two_dice() {
        let state = room_state(CellType::UpgradeLeft, CellType::UpgradeRight);
        assert_eq!(state.cell_block_reason(LEFT, 0), Some("Need 3+ dice".to_string()));
    }

    #[test]
    fn test_cuddle_breeds_a_child() {
        let mut state = room_state(CellType::CuddleLeft, CellType::CuddleRight);
        let bedroom = Position::new(11, 6);
        state.set_explored(bedroom);
        state.set_cell(bedroom, CellType::Bedroom);

        send(&mut state, 0, LEFT).unwrap();
        assert_eq!(state.dice.len(), 2);
        send(&mut state, 1, RIGHT).unwrap();
        assert_eq!(state.dice.len(), 3);

        let child = &state.dice[2];
        assert_eq!(child.bedroom, bedroom);
        assert!(child.faces.iter().all(|face| face.level == 1));
        assert_eq!(state.cell(LEFT).and_then(|c| c.child), Some(child.id));
        assert!(state.dice.iter().all(|die| die.used_until == Some(2)));

        // Turn 1: everyone is still busy
        state.next_turn().unwrap();
        state.finish_animation().unwrap();
        assert!(state.dice.iter().all(|die| die.used));
        assert_eq!(state.dice[0].pos, LEFT);

        // Turn 2: free again
        state.next_turn().unwrap();
        state.finish_animation().unwrap();
        assert!(state.dice.iter().all(|die| !die.used && die.used_until.is_none()));
    }

    #[test]
    fn test_cuddle_needs_free_bedroom() {
        let state = room_state(CellType::CuddleLeft, CellType::CuddleRight);
        assert_eq!(
            state.cell_block_reason(LEFT, 0),
            Some("Need a free bedroom".to_string())
        );
    }

    #[test]
    fn test_combine_merges_two_of_three() {
        let mut state = room_state(CellType::UpgradeLeft, CellType::UpgradeRight);
        let bedroom = state.dice[0].bedroom;
        state.add_die([FaceState::new(Face::Build); FACES_PER_DIE], bedroom);
        state.dice[0].faces = [FaceState::with_level(Face::Build, 2); FACES_PER_DIE];
        state.dice[1].faces = [FaceState::with_level(Face::Build, 3); FACES_PER_DIE];
        let home = state.dice[0].bedroom;

        send(&mut state, 0, LEFT).unwrap();
        send(&mut state, 1, RIGHT).unwrap();

        assert_eq!(state.dice.len(), 2);
        let merged = &state.dice[1];
        assert!(merged.faces.iter().all(|face| face.level == 5 && face.xp == 0));
        assert_eq!(merged.bedroom, home);
        assert_eq!(merged.pos, LEFT);
        assert!(merged.is_locked(1));
    }

    #[test]
    fn test_failed_combine_hands_die_back() {
        let mut state = room_state(CellType::UpgradeLeft, CellType::UpgradeRight);
        let bedroom = state.dice[0].bedroom;
        state.add_die([FaceState::new(Face::Build); FACES_PER_DIE], bedroom);
        send(&mut state, 0, LEFT).unwrap();

        state.select_die(1).unwrap();
        state.activate_cell(RIGHT).unwrap();
        let origin = state.dice[1].pos;
        // The spare die leaves while die 1 is still walking over
        state.remove_die(2).unwrap();

        assert!(state.finish_animation().is_err());
        assert!(state.animation.is_none());
        assert_eq!(state.dice.len(), 2);
        assert!(!state.dice[1].used);
        assert_eq!(state.dice[1].pos, origin);
        assert_eq!(state.cell(RIGHT).and_then(|cell| cell.used_idx), None);
        assert!(state.dice[0].used);
    }

    #[test]
    fn test_kitchen_sets_face_of_other_die() {
        let mut state = room_state(CellType::KitchenLeft, CellType::KitchenRight);
        state.dice[0].cur_face = 2; // Farm
        send(&mut state, 0, LEFT).unwrap();
        assert!(matches!(state.prompt, Some(Prompt::Kitchen { target: None, .. })));

        assert!(state.choose(PromptChoice::PickDie { die: 0 }).is_err());
        state.choose(PromptChoice::PickDie { die: 1 }).unwrap();
        state.choose(PromptChoice::Back).unwrap();
        state.choose(PromptChoice::PickDie { die: 1 }).unwrap();
        state.choose(PromptChoice::PickFace { face: 4 }).unwrap();

        assert!(state.prompt.is_none());
        assert_eq!(state.dice[1].cur_face, 4);
        assert_eq!(state.dice[1].current(), Face::Trade);
        // The other half cannot be used the same turn
        state.dice[1].cur_face = 0;
        assert_eq!(state.cell_block_reason(RIGHT, 1), Some("Kitchen busy".to_string()));
    }
}
