//! # Autoplay Module
//!
//! Debug driver that plays a session on its own: it sends each free die to the
//! most useful cell it can work, answers prompts, and ends the turn when no
//! die has anything left to do. Used by the CLI and by soak tests.

use super::{BuildKind, GameState, Position, Prompt, PromptChoice};
use crate::cells::CellType;
use crate::input::Command;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Buildings the autoplayer is willing to buy, in order of preference.
const BUILD_PREFERENCE: [BuildKind; 4] = [
    BuildKind::Crop,
    BuildKind::Bedroom,
    BuildKind::Study,
    BuildKind::Parlor,
];

/// How much the autoplayer wants to work a cell type; `None` means never.
fn cell_priority(cell_type: CellType) -> Option<u32> {
    let priority = match cell_type {
        CellType::Crop => 9,
        CellType::TownSell | CellType::Build => 8,
        CellType::Forest | CellType::Quarry => 7,
        CellType::Ruin => 6,
        CellType::Unexplored => 5,
        CellType::TempleUpperLeft
        | CellType::TempleUpperRight
        | CellType::TempleLowerLeft
        | CellType::TempleLowerRight => 4,
        CellType::Study | CellType::Replace => 3,
        CellType::Meadow | CellType::TownEntertain | CellType::Entertain => 2,
        CellType::Reroll => 1,
        _ => return None,
    };
    Some(priority)
}

/// Autoplay state and decision making.
#[derive(Debug, Clone)]
pub struct AutoplayState {
    /// Whether autoplay is currently enabled
    pub enabled: bool,
    /// Dice given up on for the current turn
    skipped: HashSet<usize>,
    /// Turn the skip list belongs to
    turn_idx: u32,
    /// Abort the open prompt on the next decision
    cancel_prompt: bool,
}

impl Default for AutoplayState {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoplayState {
    pub fn new() -> Self {
        Self {
            enabled: true,
            skipped: HashSet::new(),
            turn_idx: 0,
            cancel_prompt: false,
        }
    }

    /// Toggles autoplay on/off.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.skipped.clear();
            self.cancel_prompt = false;
        }
        self.enabled
    }

    /// Tells the autoplayer its last command was refused.
    pub fn record_failure(&mut self, game_state: &GameState) {
        if game_state.prompt.is_some() {
            self.cancel_prompt = true;
        } else if let Some(die) = game_state.selected_die {
            self.skipped.insert(die);
        }
    }

    /// Decides the next command, or `None` while an animation runs.
    pub fn next_command(&mut self, game_state: &GameState) -> Option<Command> {
        if !self.enabled || game_state.animation.is_some() {
            return None;
        }
        if self.turn_idx != game_state.turn_idx {
            self.turn_idx = game_state.turn_idx;
            self.skipped.clear();
        }

        if let Some(prompt) = &game_state.prompt {
            let choice = self.answer_prompt(prompt, game_state);
            return Some(match choice {
                Answer::Choose(choice) => Command::Choose { choice },
                Answer::Place(pos) => Command::FinishBuild { pos },
            });
        }

        if let Some(die) = game_state.selected_die {
            if !self.skipped.contains(&die) {
                if let Some(pos) = self.best_cell(game_state, die) {
                    return Some(Command::ActivateCell { pos });
                }
                self.skipped.insert(die);
            }
            return Some(Command::DeselectDie);
        }

        let next_die = game_state
            .dice
            .iter()
            .enumerate()
            .find(|&(idx, die)| die.is_free() && !self.skipped.contains(&idx))
            .map(|(idx, _)| idx);
        match next_die {
            Some(die) => Some(Command::SelectDie { die }),
            None => Some(Command::NextTurn),
        }
    }

    fn answer_prompt(&mut self, prompt: &Prompt, game_state: &GameState) -> Answer {
        if self.cancel_prompt {
            self.cancel_prompt = false;
            return self.cancel(prompt);
        }
        match prompt {
            Prompt::Victory | Prompt::Market { .. } => Answer::Choose(PromptChoice::Done),
            Prompt::BuildMenu(_) => match Self::preferred_build(game_state) {
                Some(kind) => Answer::Choose(PromptChoice::Build { kind }),
                None => self.cancel(prompt),
            },
            Prompt::BuildPlace { .. } => {
                let spot = game_state
                    .board
                    .positions()
                    .into_iter()
                    .find(|&pos| game_state.placement_block_reason(pos).is_none());
                match spot {
                    Some(pos) => Answer::Place(pos),
                    None => self.cancel(prompt),
                }
            }
            Prompt::Library(activation) => {
                let stored = game_state
                    .cell(activation.cell)
                    .and_then(|cell| cell.stored_face);
                let face = game_state.dice.get(activation.die).and_then(|die| {
                    die.faces
                        .iter()
                        .enumerate()
                        .filter(|(_, face)| stored.map_or(true, |s| s.face != face.face))
                        .min_by_key(|(_, face)| face.level)
                        .map(|(idx, _)| idx)
                });
                match face {
                    Some(face) => Answer::Choose(PromptChoice::PickFace { face }),
                    None => self.cancel(prompt),
                }
            }
            Prompt::Kitchen { .. } => self.cancel(prompt),
        }
    }

    /// Cancels the prompt and gives up on its die for this turn.
    fn cancel(&mut self, prompt: &Prompt) -> Answer {
        if let Some(activation) = prompt.activation() {
            self.skipped.insert(activation.die);
        }
        Answer::Choose(PromptChoice::Cancel)
    }

    fn preferred_build(game_state: &GameState) -> Option<BuildKind> {
        BUILD_PREFERENCE
            .into_iter()
            .find(|&kind| game_state.purse.can_afford(&game_state.build_cost(kind)))
    }

    /// The most useful cell `die` can work right now.
    fn best_cell(&self, game_state: &GameState, die: usize) -> Option<Position> {
        let from = game_state.dice.get(die)?.pos;
        let can_build = Self::preferred_build(game_state).is_some();
        game_state
            .board
            .iter()
            .filter_map(|cell| {
                let cell_type = cell.eff_type();
                if cell_type == CellType::Build && !can_build {
                    return None;
                }
                let priority = cell_priority(cell_type)?;
                if game_state.cell_block_reason(cell.pos, die).is_some() {
                    return None;
                }
                Some((cell.pos, priority))
            })
            .min_by_key(|&(pos, priority)| (Reverse(priority), pos.manhattan_distance(from)))
            .map(|(pos, _)| pos)
    }
}

enum Answer {
    Choose(PromptChoice),
    Place(Position),
}
