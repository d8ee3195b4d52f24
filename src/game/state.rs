//! # Game State Module
//!
//! Central game state management and the turn/activation state machines.
//!
//! `GameState` owns the board, the dice, the purse and the transient
//! presentation queues. A presentation layer calls [`GameState::tick`] every
//! frame and issues `select_die` / `activate_cell` / `choose` / `finish_build` /
//! `next_turn` in response to input. Every mutation happens synchronously
//! inside one of those calls, so at most one animation and at most one prompt
//! can be outstanding at any time.

use super::{
    face_match, Activation, Animation, AnimationKind, Board, BuildKind, BuildOption, Cell, Cost,
    Currency, Die, DieId, DieRoll, Face, FaceState, Position, Progress, Prompt, PromptChoice,
    Purse, FACES_PER_DIE,
};
use crate::cells::{rooms, town, CellType, CellTypeDescriptor};
use crate::config::{FLOATER_LIFETIME_MS, STARTING_SEEDS};
use crate::generation::{starting_bedrooms, Generator, LevelDef, MapGenerator};
use crate::{DicesteadError, DicesteadResult, GameRng};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// Faces of the two starting dice. Both start on face 0, so the first turn
/// always shows Explore and Farm.
const STARTING_FACES: [[Face; FACES_PER_DIE]; 2] = [
    [
        Face::Explore,
        Face::Gather,
        Face::Farm,
        Face::Trade,
        Face::Build,
        Face::Entertain,
    ],
    [
        Face::Farm,
        Face::Gather,
        Face::Explore,
        Face::Build,
        Face::Trade,
        Face::Entertain,
    ],
];

/// Short-lived text drawn above a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Floater {
    pub pos: Position,
    pub text: String,
    pub age_ms: f32,
}

/// Things that happened, queued for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    TurnStarted { turn: u32 },
    DieActivated { die: DieId, pos: Position, cell_type: CellType },
    CellExplored { pos: Position, cell_type: CellType },
    FaceLeveledUp { die: DieId, face: Face, level: u32 },
    CellBuilt { pos: Position, cell_type: CellType },
    CropHarvested { pos: Position, amount: i32 },
    DieAdded { die: DieId },
    DieRemoved { die: DieId },
    TempleAwakened { pos: Position },
    TempleQuadrantCompleted { pos: Position },
    GameWon { turn: u32 },
}

/// Session statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameStatistics {
    /// Dice assigned to cells
    pub activations: u32,
    /// Cells revealed
    pub cells_explored: u32,
    /// Buildings constructed
    pub buildings_built: u32,
    /// Crops brought in
    pub crops_harvested: u32,
    /// Dice bred or merged into existence
    pub dice_added: u32,
    /// Dice merged away or sacrificed
    pub dice_removed: u32,
    /// Face levels gained
    pub levels_gained: u32,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics based on a game event.
    pub fn update_from_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::DieActivated { .. } => self.activations += 1,
            GameEvent::CellExplored { .. } => self.cells_explored += 1,
            GameEvent::CellBuilt { .. } => self.buildings_built += 1,
            GameEvent::CropHarvested { .. } => self.crops_harvested += 1,
            GameEvent::DieAdded { .. } => self.dice_added += 1,
            GameEvent::DieRemoved { .. } => self.dice_removed += 1,
            GameEvent::FaceLeveledUp { .. } => self.levels_gained += 1,
            _ => {}
        }
    }
}

/// Whether the session has been won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletionState {
    Playing,
    /// All four inner temple quadrants are complete
    Won,
}

/// The aggregate root of a game session.
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// The only randomness source of the session
    #[serde(skip)]
    pub rng: GameRng,
    pub level_def: LevelDef,
    /// Monotonic turn counter starting at 0
    pub turn_idx: u32,
    pub board: Board,
    /// Roster in insertion order
    pub dice: Vec<Die>,
    pub selected_die: Option<usize>,
    pub purse: Purse,
    /// Storage cell of each currency, for floater placement
    pub resource_pos: BTreeMap<Currency, Position>,
    pub prompt: Option<Prompt>,
    pub animation: Option<Animation>,
    pub floaters: Vec<Floater>,
    pub completion_state: CompletionState,
    pub statistics: GameStatistics,
    #[serde(skip)]
    events: Vec<GameEvent>,
    next_die_id: DieId,
}

impl GameState {
    /// Creates a new session from a level definition.
    ///
    /// # Examples
    ///
    /// ```
    /// use dicestead::{GameState, LevelDef};
    ///
    /// let state = GameState::new(&LevelDef::new("test1", 16, 14)).unwrap();
    /// assert_eq!(state.turn_idx, 0);
    /// assert_eq!(state.dice.len(), 2);
    /// ```
    pub fn new(level_def: &LevelDef) -> DicesteadResult<Self> {
        level_def.validate()?;

        let mut rng = GameRng::new(&level_def.seed);
        let generator = MapGenerator::new();
        let board = generator.generate(level_def, &mut rng)?;
        generator.validate(&board, level_def)?;

        let mut state = Self {
            rng,
            level_def: level_def.clone(),
            turn_idx: 0,
            board,
            dice: Vec::new(),
            selected_die: None,
            purse: Purse::new(),
            resource_pos: BTreeMap::new(),
            prompt: None,
            animation: None,
            floaters: Vec::new(),
            completion_state: CompletionState::Playing,
            statistics: GameStatistics::new(),
            events: Vec::new(),
            next_die_id: 0,
        };

        for pos in state.board.positions() {
            state.init_cell(pos);
        }

        for currency in Currency::ALL {
            let storage = CellType::storage_for(currency);
            if let Some(pos) = state.board.find(|cell| cell.cell_type == storage) {
                state.resource_pos.insert(currency, pos);
            }
        }

        for (faces, bedroom) in STARTING_FACES.iter().zip(starting_bedrooms(level_def)) {
            state.spawn_die(faces.map(FaceState::new), bedroom);
        }
        state.purse.set(Currency::Seeds, STARTING_SEEDS);

        info!(
            "New session: seed {:?}, {}x{} board, {} dice",
            level_def.seed,
            level_def.width,
            level_def.height,
            state.dice.len()
        );
        Ok(state)
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.board.get(pos)
    }

    pub fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.board.get_mut(pos)
    }

    /// Descriptor of the cell's effective type.
    pub fn eff_descriptor(&self, pos: Position) -> Option<&'static CellTypeDescriptor> {
        self.board.get(pos).map(|cell| cell.eff_type().descriptor())
    }

    pub fn die(&self, idx: usize) -> DicesteadResult<&Die> {
        self.dice
            .get(idx)
            .ok_or_else(|| DicesteadError::InvalidAction(format!("No die at index {}", idx)))
    }

    pub fn die_mut(&mut self, idx: usize) -> DicesteadResult<&mut Die> {
        self.dice
            .get_mut(idx)
            .ok_or_else(|| DicesteadError::InvalidAction(format!("No die at index {}", idx)))
    }

    /// Index of a die standing on `pos`.
    pub fn die_at(&self, pos: Position) -> Option<usize> {
        self.dice.iter().position(|die| die.pos == pos)
    }

    /// Index of a still unused die standing on `pos`.
    pub fn free_die_at(&self, pos: Position) -> Option<usize> {
        self.dice.iter().position(|die| die.pos == pos && die.is_free())
    }

    /// Unused dice other than `die`.
    pub fn free_dice_except(&self, die: usize) -> Vec<usize> {
        self.dice
            .iter()
            .enumerate()
            .filter(|&(idx, other)| idx != die && other.is_free())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// First bedroom no die calls home.
    pub fn free_bedroom(&self) -> Option<Position> {
        self.board.find(|cell| {
            cell.explored
                && cell.cell_type == CellType::Bedroom
                && !self.dice.iter().any(|die| die.bedroom == cell.pos)
        })
    }

    pub fn is_game_won(&self) -> bool {
        self.completion_state == CompletionState::Won
    }

    /// Whether the board accepts a placement tap.
    pub fn is_build_mode(&self) -> bool {
        self.prompt.as_ref().map_or(false, Prompt::is_build_mode)
    }

    /// Inner temple quadrants already completed.
    pub fn completed_temple_quadrants(&self) -> usize {
        self.board
            .iter()
            .filter(|cell| cell.cell_type.is_inner_temple() && cell.completed)
            .count()
    }

    /// Where the renderer should draw die `idx` this frame.
    pub fn die_draw_pos(&self, idx: usize) -> Option<(f32, f32)> {
        let die = self.dice.get(idx)?;
        self.animation
            .as_ref()
            .and_then(|anim| anim.die_position(idx))
            .or(Some((die.pos.x as f32, die.pos.y as f32)))
    }

    /// Face die `idx` shows this frame.
    pub fn die_display_face(&self, idx: usize) -> Option<usize> {
        let die = self.dice.get(idx)?;
        self.animation
            .as_ref()
            .and_then(|anim| anim.die_face(idx))
            .or(Some(die.cur_face))
    }

    // ------------------------------------------------------------------
    // Selectability predicates
    // ------------------------------------------------------------------

    /// Why `die` cannot activate the cell at `pos`, or `None` if it can.
    pub fn cell_block_reason(&self, pos: Position, die: usize) -> Option<String> {
        let Some(cell) = self.board.get(pos) else {
            return Some("Out of bounds".to_string());
        };
        let Some(worker) = self.dice.get(die) else {
            return Some("No such die".to_string());
        };
        if worker.used {
            return Some("Already worked".to_string());
        }
        let desc = cell.eff_type().descriptor();
        let Some(need_face) = desc.need_face else {
            return Some("Nothing to do here".to_string());
        };
        if cell.is_used(self.turn_idx) {
            return Some("In use".to_string());
        }
        let occupied = self
            .dice
            .iter()
            .enumerate()
            .any(|(idx, other)| idx != die && other.used && other.pos == pos);
        if occupied {
            return Some("Occupied".to_string());
        }
        if !face_match(need_face, worker.current()) {
            return Some(format!("Needs {}", need_face));
        }
        desc.behavior.check_precondition(self, pos, die)
    }

    /// Whether the selected die may be sent to `pos` right now.
    pub fn is_cell_selectable(&self, pos: Position) -> bool {
        if self.animation.is_some() || self.prompt.is_some() {
            return false;
        }
        self.selected_die
            .map_or(false, |die| self.cell_block_reason(pos, die).is_none())
    }

    /// All cells the selected die may be sent to.
    pub fn selectable_cells(&self) -> Vec<Position> {
        self.board
            .positions()
            .into_iter()
            .filter(|&pos| self.is_cell_selectable(pos))
            .collect()
    }

    /// Why `pos` cannot take the pending building, or `None` if it can.
    pub fn placement_block_reason(&self, pos: Position) -> Option<String> {
        match &self.prompt {
            Some(Prompt::BuildPlace { kind, .. }) => town::placement_block_reason(self, *kind, pos),
            _ => Some("Not placing a building".to_string()),
        }
    }

    /// Price of the next building of `kind`.
    pub fn build_cost(&self, kind: BuildKind) -> Cost {
        kind.cost(self.board.count_type(kind.cell_types().0))
    }

    /// The build menu as it stands.
    pub fn build_options(&self) -> Vec<BuildOption> {
        BuildKind::ALL
            .iter()
            .map(|&kind| {
                let cost = self.build_cost(kind);
                let affordable = self.purse.can_afford(&cost);
                BuildOption {
                    kind,
                    cost,
                    affordable,
                }
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Turn lifecycle
    // ------------------------------------------------------------------

    fn ensure_idle(&self) -> DicesteadResult<()> {
        if self.animation.is_some() {
            return Err(DicesteadError::InvalidState(
                "An animation is in progress".to_string(),
            ));
        }
        if self.prompt.is_some() {
            return Err(DicesteadError::InvalidState("A prompt is open".to_string()));
        }
        Ok(())
    }

    /// Selects an unused die for the next activation.
    pub fn select_die(&mut self, idx: usize) -> DicesteadResult<()> {
        self.ensure_idle()?;
        let die = self.die(idx)?;
        if die.used {
            return Err(DicesteadError::InvalidAction(format!(
                "Die {} has already been used",
                idx
            )));
        }
        self.selected_die = Some(idx);
        Ok(())
    }

    pub fn deselect_die(&mut self) {
        self.selected_die = None;
    }

    /// Sends the selected die to `pos`.
    ///
    /// The cell's effect runs when the move animation finishes.
    pub fn activate_cell(&mut self, pos: Position) -> DicesteadResult<()> {
        self.ensure_idle()?;
        let die = self
            .selected_die
            .ok_or_else(|| DicesteadError::InvalidAction("No die selected".to_string()))?;
        if let Some(reason) = self.cell_block_reason(pos, die) {
            return Err(DicesteadError::InvalidAction(format!(
                "Cannot activate {}: {}",
                pos, reason
            )));
        }

        let turn_idx = self.turn_idx;
        let cell = self
            .board
            .get_mut(pos)
            .ok_or_else(|| DicesteadError::InvalidAction(format!("No cell at {}", pos)))?;
        let prev_used_idx = cell.used_idx;
        cell.used_idx = Some(turn_idx);

        let worker = &mut self.dice[die];
        worker.used = true;
        let activation = Activation {
            die,
            cell: pos,
            origin: worker.pos,
            prev_used_idx,
        };

        debug!("Die {} heads to {} showing {}", die, pos, worker.current());
        self.selected_die = None;
        self.animation = Some(Animation::move_die(activation));
        Ok(())
    }

    /// Ends the turn: every non-locked die rolls and heads home.
    pub fn next_turn(&mut self) -> DicesteadResult<()> {
        self.ensure_idle()?;
        let next = self.turn_idx + 1;
        let mut rolls = Vec::new();
        for idx in 0..self.dice.len() {
            if self.dice[idx].is_locked(next) {
                continue;
            }
            let face = self.rng.index(FACES_PER_DIE);
            let die = &self.dice[idx];
            rolls.push(DieRoll {
                die: idx,
                from: die.pos,
                to: die.bedroom,
                face,
            });
        }
        debug!("Rolling {} dice for turn {}", rolls.len(), next);
        self.selected_die = None;
        self.animation = Some(Animation::roll(rolls));
        Ok(())
    }

    /// Advances timers by `dt` milliseconds. Negative and non-finite steps
    /// count as zero.
    pub fn tick(&mut self, dt: f32) -> DicesteadResult<()> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        for floater in &mut self.floaters {
            floater.age_ms += dt;
        }
        self.floaters
            .retain(|floater| floater.age_ms < FLOATER_LIFETIME_MS);

        for pos in self.board.positions() {
            if let Some(desc) = self.eff_descriptor(pos) {
                desc.behavior.on_tick(self, pos);
            }
        }

        let finished = match self.animation.as_mut() {
            Some(animation) => animation.advance(dt),
            None => false,
        };
        if finished {
            if let Some(animation) = self.animation.take() {
                self.resolve_animation(animation)?;
            }
        }
        Ok(())
    }

    /// Completes the running animation immediately.
    pub fn finish_animation(&mut self) -> DicesteadResult<()> {
        if let Some(animation) = self.animation.as_mut() {
            animation.complete();
            self.tick(0.0)?;
        }
        Ok(())
    }

    fn resolve_animation(&mut self, animation: Animation) -> DicesteadResult<()> {
        match animation.kind {
            AnimationKind::MoveDie { activation } => {
                let result = self.resolve_activation(activation);
                if let Err(err) = &result {
                    warn!("Activation of {} failed, reverting: {}", activation.cell, err);
                    self.revert_activation(activation);
                }
                result
            }
            AnimationKind::Roll { rolls } => {
                self.resolve_roll(rolls);
                Ok(())
            }
        }
    }

    fn resolve_activation(&mut self, activation: Activation) -> DicesteadResult<()> {
        let desc = self.eff_descriptor(activation.cell).ok_or_else(|| {
            DicesteadError::InvalidState(format!("No cell at {}", activation.cell))
        })?;
        let die = self.die_mut(activation.die)?;
        die.pos = activation.cell;
        let die_id = die.id;

        debug!("Die {} activates {} at {}", die_id, desc.name, activation.cell);
        self.push_event(GameEvent::DieActivated {
            die: die_id,
            pos: activation.cell,
            cell_type: desc.cell_type,
        });
        desc.behavior.on_activate(self, desc, activation)
    }

    fn resolve_roll(&mut self, rolls: Vec<DieRoll>) {
        self.turn_idx += 1;
        let turn_idx = self.turn_idx;
        for die in &mut self.dice {
            if die.used_until.map_or(false, |until| turn_idx >= until) {
                die.used_until = None;
            }
        }
        for roll in rolls {
            if let Some(die) = self.dice.get_mut(roll.die) {
                die.cur_face = roll.face;
                die.pos = roll.to;
                die.used = false;
            }
        }

        let markets: Vec<Position> = self
            .board
            .iter()
            .filter(|cell| cell.eff_type() == CellType::TownBuy)
            .map(|cell| cell.pos)
            .collect();
        for pos in markets {
            town::restock_market(self, pos);
        }

        debug!("Turn {} begins", turn_idx);
        self.push_event(GameEvent::TurnStarted { turn: turn_idx });
    }

    // ------------------------------------------------------------------
    // Prompts
    // ------------------------------------------------------------------

    /// Opens a prompt; only one can be open at a time.
    pub fn open_prompt(&mut self, prompt: Prompt) -> DicesteadResult<()> {
        if self.prompt.is_some() {
            return Err(DicesteadError::InvalidState(
                "A prompt is already open".to_string(),
            ));
        }
        self.prompt = Some(prompt);
        Ok(())
    }

    /// Answers the open prompt.
    pub fn choose(&mut self, choice: PromptChoice) -> DicesteadResult<()> {
        if self.animation.is_some() {
            return Err(DicesteadError::InvalidState(
                "An animation is in progress".to_string(),
            ));
        }
        let prompt = self
            .prompt
            .clone()
            .ok_or_else(|| DicesteadError::InvalidState("No prompt is open".to_string()))?;

        match (prompt, choice) {
            (Prompt::Victory, PromptChoice::Done) => {
                self.prompt = None;
                Ok(())
            }
            (Prompt::BuildMenu(activation), PromptChoice::Build { kind }) => {
                town::choose_build_kind(self, activation, kind)
            }
            (Prompt::BuildMenu(activation), PromptChoice::Cancel)
            | (Prompt::BuildPlace { activation, .. }, PromptChoice::Cancel) => {
                self.cancel_activation(activation)
            }
            (Prompt::BuildPlace { activation, .. }, PromptChoice::Back) => {
                self.prompt = Some(Prompt::BuildMenu(activation));
                Ok(())
            }
            (
                Prompt::Market {
                    activation,
                    purchases,
                },
                choice,
            ) => town::choose_market(self, activation, purchases, choice),
            (Prompt::Library(activation), choice) => town::choose_library(self, activation, choice),
            (Prompt::Kitchen { activation, target }, choice) => {
                rooms::choose_kitchen(self, activation, target, choice)
            }
            (prompt, choice) => Err(DicesteadError::InvalidAction(format!(
                "{:?} does not accept {:?}",
                prompt, choice
            ))),
        }
    }

    /// Places the pending building at `pos`.
    pub fn finish_build(&mut self, pos: Position) -> DicesteadResult<()> {
        if self.animation.is_some() {
            return Err(DicesteadError::InvalidState(
                "An animation is in progress".to_string(),
            ));
        }
        match self.prompt.clone() {
            Some(Prompt::BuildPlace { activation, kind }) => {
                town::finish_build(self, activation, kind, pos)
            }
            _ => Err(DicesteadError::InvalidState(
                "Not placing a building".to_string(),
            )),
        }
    }

    /// Undoes an activation whose prompt was cancelled and hands control back
    /// to die selection.
    pub fn cancel_activation(&mut self, activation: Activation) -> DicesteadResult<()> {
        self.die(activation.die)?;
        self.revert_activation(activation);
        self.prompt = None;
        self.selected_die = Some(activation.die);
        debug!("Activation of {} cancelled", activation.cell);
        Ok(())
    }

    /// Hands the cell and the die back as they were before `activation`.
    fn revert_activation(&mut self, activation: Activation) {
        if let Some(cell) = self.board.get_mut(activation.cell) {
            cell.used_idx = activation.prev_used_idx;
        }
        if let Some(die) = self.dice.get_mut(activation.die) {
            die.used = false;
            die.pos = activation.origin;
        }
    }

    // ------------------------------------------------------------------
    // Mutators used by cell behaviours
    // ------------------------------------------------------------------

    /// Runs the init hook of the cell's effective type.
    pub fn init_cell(&mut self, pos: Position) {
        let Some(cell) = self.board.get_mut(pos) else {
            return;
        };
        cell.reset_transient();
        let desc = cell.eff_type().descriptor();
        desc.behavior.on_init(self, pos);
    }

    /// Assigns a new type to a cell and initialises it.
    pub fn set_cell(&mut self, pos: Position, cell_type: CellType) {
        if let Some(cell) = self.board.get_mut(pos) {
            cell.cell_type = cell_type;
            self.init_cell(pos);
        }
    }

    /// Reveals a cell; its real type is initialised on the way.
    pub fn set_explored(&mut self, pos: Position) {
        let Some(cell) = self.board.get_mut(pos) else {
            return;
        };
        if cell.explored {
            return;
        }
        cell.explored = true;
        let cell_type = cell.cell_type;
        self.init_cell(pos);
        self.push_event(GameEvent::CellExplored { pos, cell_type });
    }

    pub fn add_floater(&mut self, pos: Position, text: impl Into<String>) {
        self.floaters.push(Floater {
            pos,
            text: text.into(),
            age_ms: 0.0,
        });
    }

    /// Adjusts a currency and shows the change above its storage cell.
    pub fn resource_mod(&mut self, currency: Currency, delta: i32) {
        if delta == 0 {
            return;
        }
        self.purse.add(currency, delta);
        if let Some(&pos) = self.resource_pos.get(&currency) {
            self.add_floater(pos, format!("{:+} {}", delta, currency));
        }
    }

    /// Grants XP to the active face of die `idx`.
    pub fn grant_xp(&mut self, idx: usize, amount: u32) {
        let Some(die) = self.dice.get_mut(idx) else {
            return;
        };
        let gained = die.active_face_mut().earn_xp(amount);
        if gained > 0 {
            let event = GameEvent::FaceLeveledUp {
                die: die.id,
                face: die.current(),
                level: die.active_face().level,
            };
            self.push_event(event);
        }
    }

    /// One unit of work by die `idx` against the meter of the cell at `pos`.
    pub fn progress_cell(&mut self, pos: Position, idx: usize) -> DicesteadResult<Progress> {
        let die = self
            .dice
            .get_mut(idx)
            .ok_or_else(|| DicesteadError::InvalidAction(format!("No die at index {}", idx)))?;
        let cell = self
            .board
            .get_mut(pos)
            .ok_or_else(|| DicesteadError::InvalidAction(format!("No cell at {}", pos)))?;

        let level_before = die.active_face().level;
        let progress = cell.do_progress(die.active_face_mut());
        let level_after = die.active_face().level;
        let (die_id, face) = (die.id, die.current());

        if level_after > level_before {
            for level in level_before + 1..=level_after {
                self.push_event(GameEvent::FaceLeveledUp {
                    die: die_id,
                    face,
                    level,
                });
            }
        }
        Ok(progress)
    }

    /// Appends a die without announcing it. Returns its index.
    pub fn spawn_die(&mut self, faces: [FaceState; FACES_PER_DIE], bedroom: Position) -> usize {
        let id = self.next_die_id;
        self.next_die_id += 1;
        self.dice.push(Die::from_face_states(id, faces, bedroom));
        self.dice.len() - 1
    }

    /// Adds a die born during play. Returns its index.
    pub fn add_die(&mut self, faces: [FaceState; FACES_PER_DIE], bedroom: Position) -> usize {
        let idx = self.spawn_die(faces, bedroom);
        let id = self.dice[idx].id;
        info!("Die {} joins the settlement, home at {}", id, bedroom);
        self.push_event(GameEvent::DieAdded { die: id });
        idx
    }

    /// Removes a die from the roster for good.
    pub fn remove_die(&mut self, idx: usize) -> DicesteadResult<Die> {
        if idx >= self.dice.len() {
            return Err(DicesteadError::InvalidAction(format!(
                "No die at index {}",
                idx
            )));
        }
        let die = self.dice.remove(idx);
        self.selected_die = match self.selected_die {
            Some(selected) if selected == idx => None,
            Some(selected) if selected > idx => Some(selected - 1),
            other => other,
        };
        info!("Die {} leaves the settlement", die.id);
        self.push_event(GameEvent::DieRemoved { die: die.id });
        Ok(die)
    }

    /// Marks an inner temple quadrant complete and checks for victory.
    pub fn mark_temple_completed(&mut self, pos: Position) -> DicesteadResult<bool> {
        let cell = self
            .board
            .get_mut(pos)
            .ok_or_else(|| DicesteadError::InvalidAction(format!("No cell at {}", pos)))?;
        if !cell.cell_type.is_inner_temple() {
            return Err(DicesteadError::InvalidAction(format!(
                "{} is not an inner temple quadrant",
                pos
            )));
        }
        if !cell.completed {
            cell.completed = true;
            self.push_event(GameEvent::TempleQuadrantCompleted { pos });
        }
        Ok(self.check_temple_win())
    }

    /// Declares victory once all four quadrants are complete. Fires once.
    pub fn check_temple_win(&mut self) -> bool {
        if self.is_game_won() || self.completed_temple_quadrants() < 4 {
            return false;
        }
        self.completion_state = CompletionState::Won;
        self.prompt = Some(Prompt::Victory);
        info!("The temple is complete on turn {}", self.turn_idx);
        self.push_event(GameEvent::GameWon {
            turn: self.turn_idx,
        });
        true
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.statistics.update_from_event(&event);
        self.events.push(event);
    }

    /// Takes the queued events.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pretty JSON snapshot of the session for debugging.
    pub fn snapshot_json(&self) -> DicesteadResult<String> {
        serde_json::to_string_pretty(self).map_err(DicesteadError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MOVE_DURATION_MS;

    fn new_state() -> GameState {
        GameState::new(&LevelDef::new("test1", 16, 14)).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = new_state();
        assert_eq!(state.turn_idx, 0);
        assert_eq!(state.dice.len(), 2);
        assert_eq!(state.dice[0].bedroom, Position::new(6, 7));
        assert_eq!(state.dice[1].bedroom, Position::new(7, 7));
        assert_eq!(state.dice[0].current(), Face::Explore);
        assert_eq!(state.dice[1].current(), Face::Farm);
        assert_eq!(state.purse[Currency::Money], 0);
        assert_eq!(state.purse[Currency::Seeds], 1);
        assert!(state.prompt.is_none());
        assert!(state.animation.is_none());
        assert_eq!(state.resource_pos.len(), Currency::COUNT);
    }

    #[test]
    fn test_too_small_board_is_rejected() {
        assert!(GameState::new(&LevelDef::new("tiny", 4, 4)).is_err());
    }

    #[test]
    fn test_select_used_die_fails() {
        let mut state = new_state();
        state.dice[0].used = true;
        assert!(state.select_die(0).is_err());
        assert!(state.select_die(5).is_err());
        assert!(state.select_die(1).is_ok());
        assert_eq!(state.selected_die, Some(1));
    }

    #[test]
    fn test_activation_blocked_while_animating() {
        let mut state = new_state();
        state.select_die(0).unwrap();
        state.activate_cell(Position::new(5, 7)).unwrap();
        assert!(state.animation.is_some());
        assert!(state.select_die(1).is_err());
        assert!(state.next_turn().is_err());
        state.finish_animation().unwrap();
        assert!(state.animation.is_none());
        assert!(state.dice[0].used);
        assert_eq!(state.dice[0].pos, Position::new(5, 7));
    }

    #[test]
    fn test_wrong_face_is_rejected() {
        let mut state = new_state();
        // Die 1 shows Farm; unexplored tiles need Explore
        state.select_die(1).unwrap();
        assert_eq!(
            state.cell_block_reason(Position::new(5, 7), 1),
            Some("Needs Explore".to_string())
        );
        assert!(state.activate_cell(Position::new(5, 7)).is_err());
        assert!(state.dice[1].is_free());
    }

    #[test]
    fn test_next_turn_frees_dice() {
        let mut state = new_state();
        state.select_die(0).unwrap();
        state.activate_cell(Position::new(5, 7)).unwrap();
        state.finish_animation().unwrap();
        state.next_turn().unwrap();
        state.finish_animation().unwrap();
        assert_eq!(state.turn_idx, 1);
        assert!(state.dice.iter().all(|die| !die.used));
        assert!(state.dice.iter().all(|die| die.pos == die.bedroom));
    }

    #[test]
    fn test_floaters_expire() {
        let mut state = new_state();
        state.add_floater(Position::new(1, 1), "hello");
        state.tick(FLOATER_LIFETIME_MS / 2.0).unwrap();
        assert_eq!(state.floaters.len(), 1);
        state.tick(FLOATER_LIFETIME_MS).unwrap();
        assert!(state.floaters.is_empty());
    }

    #[test]
    fn test_tick_ignores_negative_and_non_finite_steps() {
        let mut state = new_state();
        state.add_floater(Position::new(1, 1), "hello");
        state.tick(-500.0).unwrap();
        state.tick(f32::NAN).unwrap();
        assert_eq!(state.floaters[0].age_ms, 0.0);

        state.select_die(0).unwrap();
        state.activate_cell(Position::new(5, 7)).unwrap();
        state.tick(f32::NAN).unwrap();
        state.tick(f32::INFINITY).unwrap();
        state.tick(-MOVE_DURATION_MS).unwrap();
        assert!(state.animation.is_some());
        state.tick(MOVE_DURATION_MS).unwrap();
        assert!(state.animation.is_none());
        assert!(state.cell(Position::new(5, 7)).unwrap().explored);
    }

    #[test]
    fn test_used_die_cannot_work_again() {
        let mut state = new_state();
        state.select_die(0).unwrap();
        state.activate_cell(Position::new(5, 7)).unwrap();
        state.finish_animation().unwrap();

        let next = Position::new(4, 7);
        assert_eq!(
            state.cell_block_reason(next, 0),
            Some("Already worked".to_string())
        );
        state.selected_die = Some(0);
        assert!(state.activate_cell(next).is_err());
        assert!(state.animation.is_none());
    }

    #[test]
    fn test_remove_die_adjusts_selection() {
        let mut state = new_state();
        let bedroom = state.dice[0].bedroom;
        state.add_die([FaceState::new(Face::Build); FACES_PER_DIE], bedroom);
        state.selected_die = Some(2);
        state.remove_die(0).unwrap();
        assert_eq!(state.selected_die, Some(1));
        assert_eq!(state.statistics.dice_removed, 1);
        assert!(state.remove_die(9).is_err());
    }

    #[test]
    fn test_snapshot_json() {
        let state = new_state();
        let json = state.snapshot_json().unwrap();
        assert!(json.contains("\"turn_idx\": 0"));
        assert!(!json.contains("\"rng\""));
    }
}
