//! # Input Module
//!
//! Pointer-style input handling for a presentation layer.
//!
//! The engine only knows [`Command`]s. A frontend reports what the player did
//! as a [`PlayerInput`] and the [`InputHandler`] decides, from the current
//! state, which command that means. Input arriving while an animation runs is
//! swallowed.

pub mod commands;

pub use commands::*;

use crate::game::{GameState, Position, PromptChoice};
use crate::DicesteadResult;
use log::debug;

/// Input handler translating player gestures into commands.
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Tapping the selected die again deselects it
    pub tap_to_deselect: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use dicestead::InputHandler;
    ///
    /// let input_handler = InputHandler::new();
    /// assert!(input_handler.tap_to_deselect);
    /// ```
    pub fn new() -> Self {
        Self {
            tap_to_deselect: true,
        }
    }

    /// Converts player input to the command it stands for, if any.
    pub fn input_to_command(
        &self,
        input: PlayerInput,
        game_state: &GameState,
    ) -> DicesteadResult<Option<Command>> {
        if game_state.animation.is_some() {
            debug!("Swallowed {:?} during animation", input);
            return Ok(None);
        }

        let command = match input {
            PlayerInput::Tap(pos) => self.tap_to_command(pos, game_state),
            PlayerInput::EndTurn => {
                if game_state.prompt.is_none() {
                    Some(Command::NextTurn)
                } else {
                    None
                }
            }
            PlayerInput::Choose(choice) => game_state
                .prompt
                .as_ref()
                .map(|_| Command::Choose { choice }),
            PlayerInput::Cancel => {
                if game_state.prompt.is_some() {
                    Some(Command::Choose {
                        choice: PromptChoice::Cancel,
                    })
                } else if game_state.selected_die.is_some() {
                    Some(Command::DeselectDie)
                } else {
                    None
                }
            }
        };
        Ok(command)
    }

    fn tap_to_command(&self, pos: Position, game_state: &GameState) -> Option<Command> {
        if game_state.is_build_mode() {
            return Some(Command::FinishBuild { pos });
        }
        if game_state.prompt.is_some() {
            return None;
        }

        if let Some(die) = game_state.free_die_at(pos) {
            if game_state.selected_die == Some(die) {
                return self.tap_to_deselect.then_some(Command::DeselectDie);
            }
            return Some(Command::SelectDie { die });
        }

        if game_state.is_cell_selectable(pos) {
            Some(Command::ActivateCell { pos })
        } else {
            None
        }
    }
}

/// What the player did.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerInput {
    /// Pointer tap on a board cell
    Tap(Position),
    /// End-turn button
    EndTurn,
    /// A prompt button
    Choose(PromptChoice),
    /// Back out of the current selection or prompt
    Cancel,
}
