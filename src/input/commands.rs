//! # Command Definitions
//!
//! Serializable engine commands. Every way of driving a session (pointer input,
//! the autoplayer, a JSON script) ends up as a sequence of [`Command`]s applied
//! to the [`GameState`].

use crate::game::{GameState, Position, PromptChoice};
use crate::DicesteadResult;
use serde::{Deserialize, Serialize};

/// A single engine call.
///
/// # Examples
///
/// ```
/// use dicestead::{Command, Position};
///
/// let command: Command =
///     serde_json::from_str(r#"{"command": "activate_cell", "pos": {"x": 5, "y": 7}}"#).unwrap();
/// assert_eq!(command, Command::ActivateCell { pos: Position::new(5, 7) });
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SelectDie { die: usize },
    DeselectDie,
    ActivateCell { pos: Position },
    FinishBuild { pos: Position },
    Choose { choice: PromptChoice },
    NextTurn,
    /// Advance timers by `dt` milliseconds
    Tick { dt: f32 },
    FinishAnimation,
}

impl Command {
    /// Applies the command to `state`.
    pub fn apply(&self, state: &mut GameState) -> DicesteadResult<()> {
        match self {
            Command::SelectDie { die } => state.select_die(*die),
            Command::DeselectDie => {
                state.deselect_die();
                Ok(())
            }
            Command::ActivateCell { pos } => state.activate_cell(*pos),
            Command::FinishBuild { pos } => state.finish_build(*pos),
            Command::Choose { choice } => state.choose(*choice),
            Command::NextTurn => state.next_turn(),
            Command::Tick { dt } => state.tick(*dt),
            Command::FinishAnimation => state.finish_animation(),
        }
    }

    /// Whether the command starts an animation that must finish before the
    /// next command is accepted.
    pub fn animates(&self) -> bool {
        matches!(self, Command::ActivateCell { .. } | Command::NextTurn)
    }
}

/// Parses a JSON array of commands.
pub fn parse_script(json: &str) -> DicesteadResult<Vec<Command>> {
    Ok(serde_json::from_str(json)?)
}
