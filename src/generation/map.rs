//! # Map Generation
//!
//! Lays out a fresh board: the starting settlement in the centre, the temple
//! somewhere far from it, then clusters of forest and quarry and a scattering
//! of ruins on the remaining meadows.

use super::{Generator, LevelDef};
use crate::cells::CellType;
use crate::game::{Board, Position};
use crate::{DicesteadError, DicesteadResult, GameRng};
use log::debug;
use std::collections::{HashSet, VecDeque};

/// Starting settlement, rows `cy-1..=cy+1`, columns `cx-2..=cx+1`.
pub const START_LAYOUT: [[CellType; 4]; 3] = [
    [
        CellType::TownSell,
        CellType::TownBuy,
        CellType::TownEntertain,
        CellType::Meadow,
    ],
    [
        CellType::Bedroom,
        CellType::Bedroom,
        CellType::Build,
        CellType::StorageMoney,
    ],
    [
        CellType::StorageWood,
        CellType::StorageStone,
        CellType::StorageSeed,
        CellType::StorageCrop,
    ],
];

/// Offset of the layout's top-left cell from the board centre.
const START_OFFSET: Position = Position { x: -2, y: -1 };

/// Temple quadrants by offset from its top-left cell.
const TEMPLE_LAYOUT: [(Position, CellType); 4] = [
    (Position { x: 0, y: 0 }, CellType::TempleUpperLeft),
    (Position { x: 1, y: 0 }, CellType::TempleUpperRight),
    (Position { x: 0, y: 1 }, CellType::TempleLowerLeft),
    (Position { x: 1, y: 1 }, CellType::TempleLowerRight),
];

/// Bedrooms of the two starting dice.
pub fn starting_bedrooms(level_def: &LevelDef) -> [Position; 2] {
    let center = level_def.center();
    [
        center + Position::new(-2, 0),
        center + Position::new(-1, 0),
    ]
}

/// Reserves a rectangle and the one-cell ring around it.
fn reserve_with_margin(reserved: &mut HashSet<Position>, top_left: Position, width: i32, height: i32) {
    for y in top_left.y - 1..=top_left.y + height {
        for x in top_left.x - 1..=top_left.x + width {
            reserved.insert(Position::new(x, y));
        }
    }
}

/// Generator for the settlement board.
#[derive(Debug, Clone)]
pub struct MapGenerator {
    /// Board cells per forest cluster
    pub forest_density: u32,
    /// Board cells per quarry cluster
    pub quarry_density: u32,
    /// Board cells per ruin
    pub ruin_density: u32,
    /// Forest cluster size is `forest_min + range(forest_spread)`
    pub forest_min: u32,
    pub forest_spread: u32,
    pub quarry_min: u32,
    pub quarry_spread: u32,
}

impl MapGenerator {
    /// Creates a generator with the standard densities.
    ///
    /// # Examples
    ///
    /// ```
    /// use dicestead::{GameRng, Generator, LevelDef, MapGenerator};
    ///
    /// let def = LevelDef::new("doc", 16, 12);
    /// let board = MapGenerator::new().generate(&def, &mut GameRng::new(&def.seed)).unwrap();
    /// assert_eq!(board.width, 16);
    /// ```
    pub fn new() -> Self {
        Self {
            forest_density: 40,
            quarry_density: 60,
            ruin_density: 80,
            forest_min: 3,
            forest_spread: 5,
            quarry_min: 2,
            quarry_spread: 4,
        }
    }

    fn place_start(&self, board: &mut Board, level_def: &LevelDef, reserved: &mut HashSet<Position>) {
        let top_left = level_def.center() + START_OFFSET;
        for (dy, row) in START_LAYOUT.iter().enumerate() {
            for (dx, &cell_type) in row.iter().enumerate() {
                let pos = top_left + Position::new(dx as i32, dy as i32);
                if let Some(cell) = board.get_mut(pos) {
                    cell.cell_type = cell_type;
                    cell.explored = true;
                }
            }
        }
        reserve_with_margin(reserved, top_left, 4, 3);
    }

    fn place_temple(
        &self,
        board: &mut Board,
        level_def: &LevelDef,
        rng: &mut GameRng,
        reserved: &mut HashSet<Position>,
    ) -> DicesteadResult<Position> {
        let center = level_def.center();
        let min_distance = (level_def.width + level_def.height) / 4;
        let mut candidates = Vec::new();
        for y in 0..level_def.height as i32 - 1 {
            for x in 0..level_def.width as i32 - 1 {
                let top_left = Position::new(x, y);
                let clear = TEMPLE_LAYOUT
                    .iter()
                    .all(|&(offset, _)| !reserved.contains(&(top_left + offset)));
                if clear && top_left.manhattan_distance(center) >= min_distance {
                    candidates.push(top_left);
                }
            }
        }
        if candidates.is_empty() {
            return Err(DicesteadError::GenerationFailed(
                "No room for the temple".to_string(),
            ));
        }

        let top_left = candidates[rng.index(candidates.len())];
        for (offset, cell_type) in TEMPLE_LAYOUT {
            if let Some(cell) = board.get_mut(top_left + offset) {
                cell.cell_type = cell_type;
            }
        }
        reserve_with_margin(reserved, top_left, 2, 2);
        debug!("Temple placed at {}", top_left);
        Ok(top_left)
    }

    fn free_meadows(board: &Board, reserved: &HashSet<Position>) -> Vec<Position> {
        board
            .iter()
            .filter(|cell| cell.cell_type == CellType::Meadow && !reserved.contains(&cell.pos))
            .map(|cell| cell.pos)
            .collect()
    }

    /// Grows a blob of `cell_type` from a random free meadow.
    fn grow_cluster(
        &self,
        board: &mut Board,
        rng: &mut GameRng,
        reserved: &HashSet<Position>,
        cell_type: CellType,
        size: u32,
    ) -> u32 {
        let seeds = Self::free_meadows(board, reserved);
        if seeds.is_empty() {
            return 0;
        }
        let mut frontier = VecDeque::new();
        frontier.push_back(seeds[rng.index(seeds.len())]);

        let mut placed = 0;
        while placed < size && !frontier.is_empty() {
            let idx = rng.index(frontier.len());
            let Some(pos) = frontier.swap_remove_back(idx) else {
                break;
            };
            if reserved.contains(&pos) {
                continue;
            }
            let Some(cell) = board.get_mut(pos) else {
                continue;
            };
            if cell.cell_type != CellType::Meadow {
                continue;
            }
            cell.cell_type = cell_type;
            placed += 1;

            let mut next = board.neighbors(pos);
            rng.shuffle(&mut next);
            frontier.extend(next);
        }
        placed
    }

    fn scatter(
        &self,
        board: &mut Board,
        rng: &mut GameRng,
        reserved: &HashSet<Position>,
        cell_type: CellType,
        count: u32,
    ) {
        for _ in 0..count {
            let free = Self::free_meadows(board, reserved);
            if free.is_empty() {
                return;
            }
            if let Some(cell) = board.get_mut(free[rng.index(free.len())]) {
                cell.cell_type = cell_type;
            }
        }
    }
}

impl Generator<Board> for MapGenerator {
    fn generate(&self, level_def: &LevelDef, rng: &mut GameRng) -> DicesteadResult<Board> {
        level_def.validate()?;
        let mut board = Board::new(level_def.width, level_def.height);
        let mut reserved = HashSet::new();

        self.place_start(&mut board, level_def, &mut reserved);
        self.place_temple(&mut board, level_def, rng, &mut reserved)?;

        let area = level_def.area();
        let mut forest = 0;
        for _ in 0..(area / self.forest_density).max(1) {
            let size = self.forest_min + rng.range(self.forest_spread);
            forest += self.grow_cluster(&mut board, rng, &reserved, CellType::Forest, size);
        }
        let mut quarry = 0;
        for _ in 0..(area / self.quarry_density).max(1) {
            let size = self.quarry_min + rng.range(self.quarry_spread);
            quarry += self.grow_cluster(&mut board, rng, &reserved, CellType::Quarry, size);
        }
        self.scatter(
            &mut board,
            rng,
            &reserved,
            CellType::Ruin,
            (area / self.ruin_density).max(1),
        );

        debug!(
            "{} generated {}x{}: {} forest, {} quarry cells",
            self.generator_type(),
            level_def.width,
            level_def.height,
            forest,
            quarry
        );
        Ok(board)
    }

    fn validate(&self, board: &Board, level_def: &LevelDef) -> DicesteadResult<()> {
        if board.width != level_def.width || board.height != level_def.height {
            return Err(DicesteadError::GenerationFailed(format!(
                "Board is {}x{}, expected {}x{}",
                board.width, board.height, level_def.width, level_def.height
            )));
        }
        for (_, cell_type) in TEMPLE_LAYOUT {
            if board.count_type(cell_type) != 1 {
                return Err(DicesteadError::GenerationFailed(format!(
                    "Expected exactly one {:?}",
                    cell_type
                )));
            }
        }
        for &cell_type in START_LAYOUT.iter().flatten() {
            if board.count_type(cell_type) == 0 {
                return Err(DicesteadError::GenerationFailed(format!(
                    "Starting settlement lacks {:?}",
                    cell_type
                )));
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "MapGenerator"
    }
}

impl Default for MapGenerator {
    fn default() -> Self {
        Self::new()
    }
}
