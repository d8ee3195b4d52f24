//! # Dice
//!
//! Worker dice: six faces, a home bedroom and the per-turn usage flags.

use super::{Face, FaceState, Position};
use serde::{Deserialize, Serialize};

/// Number of faces on every die.
pub const FACES_PER_DIE: usize = 6;

/// Stable identifier of a die, assigned in creation order.
pub type DieId = u32;

/// A worker unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Die {
    pub id: DieId,
    pub faces: [FaceState; FACES_PER_DIE],
    /// Grid cell the die currently stands on
    pub pos: Position,
    /// Home cell the die returns to at the end of a turn
    pub bedroom: Position,
    /// Index of the rolled face
    pub cur_face: usize,
    /// Consumed this turn
    pub used: bool,
    /// Turn index from which the die is free again
    pub used_until: Option<u32>,
}

impl Die {
    /// Creates a level-1 die standing in its bedroom, showing face 0.
    pub fn new(id: DieId, faces: [Face; FACES_PER_DIE], bedroom: Position) -> Self {
        Self::from_face_states(id, faces.map(FaceState::new), bedroom)
    }

    /// Creates a die from already progressed faces.
    pub fn from_face_states(
        id: DieId,
        faces: [FaceState; FACES_PER_DIE],
        bedroom: Position,
    ) -> Self {
        Self {
            id,
            faces,
            pos: bedroom,
            bedroom,
            cur_face: 0,
            used: false,
            used_until: None,
        }
    }

    /// The rolled face's state.
    pub fn active_face(&self) -> &FaceState {
        &self.faces[self.cur_face]
    }

    pub fn active_face_mut(&mut self) -> &mut FaceState {
        &mut self.faces[self.cur_face]
    }

    /// The rolled face's category.
    pub fn current(&self) -> Face {
        self.active_face().face
    }

    /// Whether the die is held over into the turn `turn_idx`.
    pub fn is_locked(&self, turn_idx: u32) -> bool {
        self.used_until.map_or(false, |until| turn_idx < until)
    }

    /// Locks the die until `turn_idx`, marking it used meanwhile.
    pub fn lock_until(&mut self, turn_idx: u32) {
        self.used = true;
        self.used_until = Some(turn_idx);
    }

    /// Whether the die can still be assigned this turn.
    pub fn is_free(&self) -> bool {
        !self.used
    }
}
