//! # Animation
//!
//! Timed transitions that block input while they run. An animation is a plain
//! state machine advanced by `tick`; the renderer reads its progress and the
//! interpolation targets stored in it.

use super::{Activation, Position, FACES_PER_DIE};
use crate::config::{MOVE_DURATION_MS, ROLL_DURATION_MS};
use serde::Serialize;

/// Normalised progress of a timed segment at `elapsed` ms.
///
/// 0 before `start_offset`, 1 once `start_offset + duration` has passed.
pub fn progress(elapsed: f32, start_offset: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return if elapsed >= start_offset { 1.0 } else { 0.0 };
    }
    ((elapsed - start_offset) / duration).clamp(0.0, 1.0)
}

/// Linear interpolation between two grid positions.
pub fn lerp(from: Position, to: Position, t: f32) -> (f32, f32) {
    let t = t.clamp(0.0, 1.0);
    (
        from.x as f32 + (to.x - from.x) as f32 * t,
        from.y as f32 + (to.y - from.y) as f32 * t,
    )
}

/// One die's part of the end-of-turn roll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DieRoll {
    pub die: usize,
    pub from: Position,
    pub to: Position,
    /// Face index the die lands on
    pub face: usize,
}

/// What an animation is moving.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AnimationKind {
    /// A die walking onto the cell it activates
    MoveDie { activation: Activation },
    /// All free dice re-rolling and walking home
    Roll { rolls: Vec<DieRoll> },
}

/// An in-flight timed transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    pub kind: AnimationKind,
    pub start_offset: f32,
    pub duration: f32,
    pub elapsed: f32,
}

impl Animation {
    pub fn move_die(activation: Activation) -> Self {
        Self {
            kind: AnimationKind::MoveDie { activation },
            start_offset: 0.0,
            duration: MOVE_DURATION_MS,
            elapsed: 0.0,
        }
    }

    pub fn roll(rolls: Vec<DieRoll>) -> Self {
        Self {
            kind: AnimationKind::Roll { rolls },
            start_offset: 0.0,
            duration: ROLL_DURATION_MS,
            elapsed: 0.0,
        }
    }

    /// Advances by `dt` ms and reports whether the animation has finished.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt.max(0.0);
        self.is_finished()
    }

    /// Jumps to the end.
    pub fn complete(&mut self) {
        self.elapsed = self.elapsed.max(self.start_offset + self.duration);
    }

    pub fn progress(&self) -> f32 {
        progress(self.elapsed, self.start_offset, self.duration)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.start_offset + self.duration
    }

    /// Interpolated draw position of `die`, if this animation moves it.
    pub fn die_position(&self, die: usize) -> Option<(f32, f32)> {
        let t = self.progress();
        match &self.kind {
            AnimationKind::MoveDie { activation } if activation.die == die => {
                Some(lerp(activation.origin, activation.cell, t))
            }
            AnimationKind::Roll { rolls } => rolls
                .iter()
                .find(|roll| roll.die == die)
                .map(|roll| lerp(roll.from, roll.to, t)),
            _ => None,
        }
    }

    /// Face a rolling die shows right now; it tumbles towards its final face.
    pub fn die_face(&self, die: usize) -> Option<usize> {
        let AnimationKind::Roll { rolls } = &self.kind else {
            return None;
        };
        let roll = rolls.iter().find(|roll| roll.die == die)?;
        let spins = ((1.0 - self.progress()) * 12.0) as usize;
        Some((roll.face + spins) % FACES_PER_DIE)
    }
}
