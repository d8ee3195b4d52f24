//! Integration test to ensure a session can start up without errors.

use dicestead::{
    config, AutoplayState, CellType, Currency, DicesteadError, DicesteadResult, Face, GameState,
    LevelDef,
};

#[test]
fn test_basic_startup() -> DicesteadResult<()> {
    let game_state = GameState::new(&LevelDef::new("test1", 16, 14))?;

    assert_eq!(game_state.turn_idx, 0);
    assert_eq!(game_state.dice.len(), 2);
    assert!(game_state.prompt.is_none());
    assert!(game_state.animation.is_none());
    assert!(game_state.selected_die.is_none());

    // First-turn rolls are fixed
    let rolled: Vec<Face> = game_state.dice.iter().map(|die| die.current()).collect();
    assert_eq!(rolled, vec![Face::Explore, Face::Farm]);

    // Dice start at home
    for die in &game_state.dice {
        assert_eq!(die.pos, die.bedroom);
        let home = game_state.cell(die.bedroom).map(|cell| cell.cell_type);
        assert_eq!(home, Some(CellType::Bedroom));
    }

    assert_eq!(game_state.purse[Currency::Money], 0);
    assert_eq!(game_state.purse[Currency::Seeds], 1);
    Ok(())
}

#[test]
fn test_every_cell_is_initialised() -> DicesteadResult<()> {
    let game_state = GameState::new(&LevelDef::default())?;
    for cell in game_state.board.iter() {
        match cell.eff_type() {
            CellType::Unexplored => assert!(cell.progress_max >= 1, "{} has no explore cost", cell.pos),
            CellType::TownBuy => assert_eq!(cell.stock.len(), 2),
            _ => {}
        }
    }
    Ok(())
}

#[test]
fn test_storage_positions_are_known() -> DicesteadResult<()> {
    let game_state = GameState::new(&LevelDef::new("storage", 12, 10))?;
    for currency in Currency::ALL {
        let pos = game_state.resource_pos[&currency];
        let cell_type = game_state.cell(pos).map(|cell| cell.cell_type);
        assert_eq!(cell_type, Some(CellType::storage_for(currency)));
    }
    Ok(())
}

#[test]
fn test_undersized_board_is_rejected() {
    assert!(GameState::new(&LevelDef::new("tiny", 9, 8)).is_err());
    assert!(GameState::new(&LevelDef::new("tiny", 10, 7)).is_err());
}

#[test]
fn test_oversized_board_is_rejected() {
    let result = GameState::new(&LevelDef::new("huge", 70_000, 70_000));
    assert!(matches!(result, Err(DicesteadError::GenerationFailed(_))));
    let wide = LevelDef::new("wide", config::MAX_BOARD_WIDTH + 1, config::MIN_BOARD_HEIGHT);
    assert!(GameState::new(&wide).is_err());
}

#[test]
fn test_autoplay_session_runs() -> DicesteadResult<()> {
    let mut game_state = GameState::new(&LevelDef::new("soak", 18, 14))?;
    let mut autoplay = AutoplayState::new();
    let mut steps = 0;
    while game_state.turn_idx < 30 {
        steps += 1;
        assert!(steps < 50_000);
        if game_state.animation.is_some() {
            game_state.finish_animation()?;
            continue;
        }
        if let Some(command) = autoplay.next_command(&game_state) {
            if command.apply(&mut game_state).is_err() {
                autoplay.record_failure(&game_state);
            }
        }
    }
    assert!(game_state.statistics.cells_explored > 0);
    assert!(game_state.dice.len() >= 2);
    Ok(())
}
