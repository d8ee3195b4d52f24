//! Property-based tests for face progression, progress meters and map
//! generation.
//!
//! Run with: cargo test --release prop_engine

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use dicestead::{
    xp_for_next_level, Cell, CellType, Face, FaceState, GameRng, GameState, Generator, LevelDef,
    MapGenerator, Position, MAX_LEVEL,
};

fn any_face() -> impl Strategy<Value = Face> {
    prop::sample::select(Face::BASE.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Levels stay in range and XP never reaches the threshold below the cap.
    #[test]
    fn prop_face_progression_invariants(
        face in any_face(),
        start in 1u32..=MAX_LEVEL,
        grants in prop::collection::vec(0u32..200, 0..20)
    ) {
        let mut state = FaceState::with_level(face, start);
        for amount in grants {
            let before = state.level;
            let gained = state.earn_xp(amount);
            prop_assert_eq!(state.level, before + gained);
            prop_assert!((1..=MAX_LEVEL).contains(&state.level));
            prop_assert_eq!(state.xp_next, xp_for_next_level(state.level));
            if state.is_max_level() {
                prop_assert_eq!(state.xp, 0);
            } else {
                prop_assert!(state.xp < state.xp_next);
            }
        }
    }

    /// Work is capped by both the face level and what the meter has left.
    #[test]
    fn prop_progress_is_capped(
        level in 1u32..=MAX_LEVEL,
        max in 1u32..40,
        steps in 1usize..12
    ) {
        let mut cell = Cell::new(Position::new(0, 0));
        cell.reset_progress(max);
        let mut face = FaceState::with_level(Face::Build, level);
        for _ in 0..steps {
            let level_before = face.level;
            let remaining = cell.remaining();
            let progress = cell.do_progress(&mut face);
            prop_assert!(progress.amount <= level_before);
            prop_assert!(progress.amount <= remaining);
            prop_assert!(cell.progress <= cell.progress_max);
            prop_assert_eq!(progress.advanced, cell.progress >= cell.progress_max);
        }
    }

    /// Random ranges stay below their bound.
    #[test]
    fn prop_rng_range_in_bounds(seed in "[a-z0-9]{1,12}", n in 1u32..1000) {
        let mut rng = GameRng::new(&seed);
        for _ in 0..50 {
            prop_assert!(rng.range(n) < n);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every legal board size generates a valid map.
    #[test]
    fn prop_generated_maps_validate(
        seed in "[a-z0-9]{1,12}",
        width in 10u32..28,
        height in 8u32..22
    ) {
        let def = LevelDef::new(seed.clone(), width, height);
        let generator = MapGenerator::new();
        let board = generator.generate(&def, &mut GameRng::new(&seed)).unwrap();
        prop_assert!(generator.validate(&board, &def).is_ok());
        prop_assert_eq!(board.count_type(CellType::Bedroom), 2);
    }

    /// A new session is a pure function of its level definition.
    #[test]
    fn prop_new_session_is_deterministic(seed in "[a-z0-9]{1,12}") {
        let def = LevelDef::new(seed, 16, 12);
        let a = GameState::new(&def).unwrap();
        let b = GameState::new(&def).unwrap();
        prop_assert_eq!(a.snapshot_json().unwrap(), b.snapshot_json().unwrap());
    }
}
