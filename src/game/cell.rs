//! # Board Cells
//!
//! Per-tile mutable state, the fixed-size board holding it, and the
//! progress-meter primitive shared by every multi-turn action.

use super::{DieId, Face, FaceState, Position};
use crate::cells::CellType;
use serde::{Deserialize, Serialize};

/// Growth stage of a crop cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CropStage {
    /// Empty field waiting to be sown
    #[default]
    Field,
    /// Sown, needs tending
    Sprout,
    /// Ready to harvest
    Ripe,
}

impl CropStage {
    /// Work units needed to finish this stage.
    pub fn work_needed(self) -> u32 {
        match self {
            CropStage::Field => 2,
            CropStage::Sprout => 8,
            CropStage::Ripe => 4,
        }
    }

    /// The stage that follows, looping back to an empty field.
    pub fn next(self) -> CropStage {
        match self {
            CropStage::Field => CropStage::Sprout,
            CropStage::Sprout => CropStage::Ripe,
            CropStage::Ripe => CropStage::Field,
        }
    }

    /// Name of the work done in this stage.
    pub fn action_name(self) -> &'static str {
        match self {
            CropStage::Field => "Sow",
            CropStage::Sprout => "Tend",
            CropStage::Ripe => "Harvest",
        }
    }
}

/// Outcome of one unit of work against a progress meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Work applied (and XP granted)
    pub amount: u32,
    /// Whether the meter is now full
    pub advanced: bool,
}

/// One board tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub pos: Position,
    /// Stored type; see [`Cell::eff_type`]
    pub cell_type: CellType,
    pub explored: bool,
    /// Last turn this cell was consumed
    pub used_idx: Option<u32>,
    pub progress: u32,
    pub progress_max: u32,
    /// Remaining yield of forests and quarries
    pub resources: u32,
    pub crop_stage: CropStage,
    /// Face waiting on a library shelf
    pub stored_face: Option<FaceState>,
    /// Die born in this cuddle room
    pub child: Option<DieId>,
    /// Inner temple quadrant finished
    pub completed: bool,
    /// Faces stocked by a market
    pub stock: Vec<Face>,
}

impl Cell {
    /// A fresh unexplored meadow.
    pub fn new(pos: Position) -> Self {
        Self {
            pos,
            cell_type: CellType::Meadow,
            explored: false,
            used_idx: None,
            progress: 0,
            progress_max: 0,
            resources: 0,
            crop_stage: CropStage::Field,
            stored_face: None,
            child: None,
            completed: false,
            stock: Vec::new(),
        }
    }

    /// Type used by all gameplay checks: `Unexplored` until explored.
    pub fn eff_type(&self) -> CellType {
        if self.explored {
            self.cell_type
        } else {
            CellType::Unexplored
        }
    }

    pub fn is_used(&self, turn_idx: u32) -> bool {
        self.used_idx == Some(turn_idx)
    }

    /// Clears type-specific state before a (re)initialisation.
    pub fn reset_transient(&mut self) {
        self.progress = 0;
        self.progress_max = 0;
        self.resources = 0;
        self.crop_stage = CropStage::Field;
        self.stored_face = None;
        self.child = None;
        self.completed = false;
        self.stock.clear();
    }

    /// Restarts the progress meter with a new cap.
    pub fn reset_progress(&mut self, progress_max: u32) {
        self.progress = 0;
        self.progress_max = progress_max;
    }

    pub fn remaining(&self) -> u32 {
        self.progress_max.saturating_sub(self.progress)
    }

    /// Applies one unit of work by `face`.
    ///
    /// The work is the face level, but never more than the meter has left. The
    /// face earns that much XP.
    ///
    /// # Examples
    ///
    /// ```
    /// use dicestead::{Cell, Face, FaceState, Position};
    ///
    /// let mut cell = Cell::new(Position::new(0, 0));
    /// cell.reset_progress(3);
    /// let mut face = FaceState::with_level(Face::Build, 5);
    /// let progress = cell.do_progress(&mut face);
    /// assert_eq!(progress.amount, 3);
    /// assert!(progress.advanced);
    /// assert_eq!(cell.progress, 3);
    /// ```
    pub fn do_progress(&mut self, face: &mut FaceState) -> Progress {
        let amount = self.remaining().min(face.level);
        self.progress += amount;
        face.earn_xp(amount);
        Progress {
            amount,
            advanced: self.progress >= self.progress_max,
        }
    }
}

/// The fixed-size grid of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub width: u32,
    pub height: u32,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates a board of unexplored meadows.
    pub fn new(width: u32, height: u32) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(Position::new(x as i32, y as i32)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.index(pos).map(|idx| &self.cells[idx])
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.index(pos).map(move |idx| &mut self.cells[idx])
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> Vec<Position> {
        self.cells.iter().map(|cell| cell.pos).collect()
    }

    /// In-bounds cardinal neighbours of `pos`.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .filter(|&p| self.in_bounds(p))
            .collect()
    }

    /// Number of cells whose stored type is `cell_type`.
    pub fn count_type(&self, cell_type: CellType) -> u32 {
        self.cells
            .iter()
            .filter(|cell| cell.cell_type == cell_type)
            .count() as u32
    }

    /// First cell (row-major) matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&Cell) -> bool) -> Option<Position> {
        self.cells.iter().find(|cell| predicate(cell)).map(|cell| cell.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexplored_cell_effective_type() {
        let mut cell = Cell::new(Position::new(2, 3));
        cell.cell_type = CellType::Forest;
        assert_eq!(cell.eff_type(), CellType::Unexplored);
        cell.explored = true;
        assert_eq!(cell.eff_type(), CellType::Forest);
    }

    #[test]
    fn test_do_progress_caps_at_remaining() {
        let mut cell = Cell::new(Position::new(0, 0));
        cell.reset_progress(8);
        cell.progress = 6;
        let mut face = FaceState::with_level(Face::Build, 5);
        let progress = cell.do_progress(&mut face);
        assert_eq!(progress.amount, 2);
        assert!(progress.advanced);
        assert_eq!(cell.progress, 8);
        assert_eq!(face.xp, 2);
    }

    #[test]
    fn test_do_progress_partial() {
        let mut cell = Cell::new(Position::new(0, 0));
        cell.reset_progress(8);
        let mut face = FaceState::new(Face::Build);
        let progress = cell.do_progress(&mut face);
        assert_eq!(progress.amount, 1);
        assert!(!progress.advanced);
        // Level 1 needs a single XP to reach level 2
        assert_eq!(face.level, 2);
    }

    #[test]
    fn test_board_bounds_and_lookup() {
        let board = Board::new(4, 3);
        assert!(board.in_bounds(Position::new(3, 2)));
        assert!(!board.in_bounds(Position::new(4, 0)));
        assert!(!board.in_bounds(Position::new(-1, 0)));
        assert_eq!(board.get(Position::new(1, 2)).map(|c| c.pos), Some(Position::new(1, 2)));
        assert!(board.get(Position::new(0, 3)).is_none());
        assert_eq!(board.iter().count(), 12);
    }

    #[test]
    fn test_board_neighbors_clipped() {
        let board = Board::new(4, 3);
        assert_eq!(board.neighbors(Position::new(0, 0)).len(), 2);
        assert_eq!(board.neighbors(Position::new(1, 1)).len(), 4);
    }

    #[test]
    fn test_crop_stage_cycle() {
        let mut stage = CropStage::Field;
        let mut total = 0;
        for _ in 0..3 {
            total += stage.work_needed();
            stage = stage.next();
        }
        assert_eq!(stage, CropStage::Field);
        assert_eq!(total, 14);
    }
}
