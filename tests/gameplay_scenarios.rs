//! End-to-end scenarios driven through the public engine API.

use dicestead::{
    BuildKind, CellType, Command, CropStage, Currency, DicesteadError, DicesteadResult, Face,
    FaceState, GameEvent, GameState, InputHandler, LevelDef, PlayerInput, Position, Prompt,
    PromptChoice, FACES_PER_DIE,
};

const EXPLORE_TARGET: Position = Position { x: 5, y: 7 };
const MARKET: Position = Position { x: 7, y: 6 };
const BUILD_SITE: Position = Position { x: 8, y: 7 };
const TOWN_MEADOW: Position = Position { x: 9, y: 6 };

fn scenario_state() -> GameState {
    GameState::new(&LevelDef::new("test1", 16, 14)).unwrap()
}

fn send(state: &mut GameState, die: usize, pos: Position) -> DicesteadResult<()> {
    state.select_die(die)?;
    state.activate_cell(pos)?;
    state.finish_animation()
}

fn end_turn(state: &mut GameState) -> DicesteadResult<()> {
    state.next_turn()?;
    state.finish_animation()
}

#[test]
fn test_explore_adjacent_meadow() -> DicesteadResult<()> {
    let mut state = scenario_state();
    assert!(!state.cell(EXPLORE_TARGET).unwrap().explored);

    state.select_die(0)?;
    assert!(state.is_cell_selectable(EXPLORE_TARGET));
    state.activate_cell(EXPLORE_TARGET)?;

    // Nothing resolves until the move animation ends
    assert!(!state.cell(EXPLORE_TARGET).unwrap().explored);
    while state.animation.is_some() {
        state.tick(16.0)?;
    }

    let cell = state.cell(EXPLORE_TARGET).unwrap();
    assert!(cell.explored);
    assert_eq!(cell.eff_type(), CellType::Meadow);
    assert!(cell.is_used(0));
    assert_eq!(state.floaters.len(), 1);
    assert_eq!(state.floaters[0].text, "Explored!");
    assert_eq!(state.floaters[0].pos, EXPLORE_TARGET);
    assert!(state.dice[0].used);
    assert_eq!(state.dice[0].pos, EXPLORE_TARGET);

    let events = state.drain_events();
    assert!(events.contains(&GameEvent::CellExplored {
        pos: EXPLORE_TARGET,
        cell_type: CellType::Meadow,
    }));
    Ok(())
}

#[test]
fn test_cell_cannot_be_used_twice_in_a_turn() -> DicesteadResult<()> {
    let mut state = scenario_state();
    send(&mut state, 0, EXPLORE_TARGET)?;
    state.dice[1].faces[0] = FaceState::new(Face::Gather);
    assert_eq!(
        state.cell_block_reason(EXPLORE_TARGET, 1),
        Some("In use".to_string())
    );
    end_turn(&mut state)?;
    state.dice[1].cur_face = 0;
    assert_eq!(state.cell_block_reason(EXPLORE_TARGET, 1), None);
    Ok(())
}

#[test]
fn test_market_buys_wood_at_full_discount() -> DicesteadResult<()> {
    let mut state = scenario_state();
    state.purse.set(Currency::Money, 10);
    state.purse.set(Currency::Stone, 4);
    state.purse.set(Currency::Crop, 7);
    state.dice[0].faces[0] = FaceState::with_level(Face::Trade, 8);

    send(&mut state, 0, MARKET)?;
    let before = state.purse.clone();
    assert!(matches!(
        state.prompt,
        Some(Prompt::Market { purchases: 0, .. })
    ));

    state.choose(PromptChoice::Buy {
        currency: Currency::Wood,
        amount: 10,
    })?;
    assert_eq!(state.purse[Currency::Money], 0);
    assert_eq!(state.purse[Currency::Wood], 10);
    for currency in [Currency::Seeds, Currency::Stone, Currency::Crop] {
        assert_eq!(state.purse[currency], before[currency], "{} changed", currency);
    }

    // Broke now
    let refused = state.choose(PromptChoice::Buy {
        currency: Currency::Wood,
        amount: 1,
    });
    assert!(matches!(refused, Err(DicesteadError::InvalidAction(_))));

    state.choose(PromptChoice::Done)?;
    assert!(state.prompt.is_none());
    Ok(())
}

#[test]
fn test_turn_cannot_end_with_prompt_open() -> DicesteadResult<()> {
    let mut state = scenario_state();
    state.dice[0].faces[0] = FaceState::new(Face::Build);
    send(&mut state, 0, BUILD_SITE)?;
    assert!(state.next_turn().is_err());
    state.choose(PromptChoice::Cancel)?;
    end_turn(&mut state)?;
    assert_eq!(state.turn_idx, 1);
    Ok(())
}

#[test]
fn test_build_crop_and_farm_it() -> DicesteadResult<()> {
    let mut state = scenario_state();
    state.purse.set(Currency::Wood, 2);
    state.dice[0].faces[0] = FaceState::new(Face::Build);

    send(&mut state, 0, BUILD_SITE)?;
    let options = state.build_options();
    let crop = options
        .iter()
        .find(|option| option.kind == BuildKind::Crop)
        .unwrap();
    assert!(crop.affordable);
    assert!(!options
        .iter()
        .find(|option| option.kind == BuildKind::Kitchen)
        .unwrap()
        .affordable);

    state.choose(PromptChoice::Build {
        kind: BuildKind::Crop,
    })?;
    state.finish_build(TOWN_MEADOW)?;
    assert_eq!(state.purse[Currency::Wood], 0);
    assert_eq!(
        state.cell(TOWN_MEADOW).map(|cell| cell.cell_type),
        Some(CellType::Crop)
    );

    // Die 1 shows Farm on the first turn
    state.dice[1].faces[0] = FaceState::with_level(Face::Farm, 8);
    send(&mut state, 1, TOWN_MEADOW)?;
    assert_eq!(state.purse[Currency::Seeds], 0);
    assert_eq!(
        state.cell(TOWN_MEADOW).map(|cell| cell.crop_stage),
        Some(CropStage::Sprout)
    );
    Ok(())
}

#[test]
fn test_combine_is_refused_with_two_dice() -> DicesteadResult<()> {
    let mut state = scenario_state();
    let right = TOWN_MEADOW + Position::new(1, 0);
    state.set_explored(right);
    state.set_cell(TOWN_MEADOW, CellType::UpgradeLeft);
    state.set_cell(right, CellType::UpgradeRight);

    state.select_die(0)?;
    assert!(!state.is_cell_selectable(TOWN_MEADOW));
    let refused = state.activate_cell(TOWN_MEADOW);
    assert!(matches!(refused, Err(DicesteadError::InvalidAction(_))));
    assert_eq!(state.dice.len(), 2);
    assert!(!state.dice[0].used);
    Ok(())
}

#[test]
fn test_locked_dice_skip_the_roll() -> DicesteadResult<()> {
    let mut state = scenario_state();
    state.dice[1].lock_until(2);
    let home = state.dice[1].bedroom;
    state.dice[1].pos = TOWN_MEADOW;

    end_turn(&mut state)?;
    assert_eq!(state.turn_idx, 1);
    assert!(state.dice[1].used);
    assert_eq!(state.dice[1].pos, TOWN_MEADOW);
    assert!(!state.dice[0].used);

    end_turn(&mut state)?;
    assert_eq!(state.turn_idx, 2);
    assert!(!state.dice[1].used);
    assert_eq!(state.dice[1].pos, home);
    assert_eq!(state.dice[1].used_until, None);
    Ok(())
}

#[test]
fn test_same_seed_same_session() -> DicesteadResult<()> {
    let mut a = scenario_state();
    let mut b = scenario_state();
    for _ in 0..5 {
        end_turn(&mut a)?;
        end_turn(&mut b)?;
    }
    let faces = |state: &GameState| -> Vec<usize> { state.dice.iter().map(|d| d.cur_face).collect() };
    assert_eq!(faces(&a), faces(&b));
    assert_eq!(a.snapshot_json()?, b.snapshot_json()?);
    Ok(())
}

#[test]
fn test_sacrifices_win_the_game_once() -> DicesteadResult<()> {
    let mut state = scenario_state();
    let corner = state
        .board
        .find(|cell| cell.cell_type == CellType::TempleUpperLeft)
        .unwrap();
    let quadrants = [
        corner,
        corner + Position::new(1, 0),
        corner + Position::new(0, 1),
        corner + Position::new(1, 1),
    ];
    for pos in quadrants {
        state.set_explored(pos);
        let inner = state.cell(pos).unwrap().cell_type.temple_stage_two().unwrap();
        state.set_cell(pos, inner);
    }
    let bedroom = state.dice[0].bedroom;
    for _ in 0..4 {
        state.add_die([FaceState::with_level(Face::Build, 8); FACES_PER_DIE], bedroom);
    }

    for (turn, pos) in quadrants.into_iter().enumerate() {
        assert!(!state.is_game_won(), "won early on quadrant {}", turn);
        let die = state.dice.len() - 1;
        // Eight levels of work against twelve
        send(&mut state, die, pos)?;
        end_turn(&mut state)?;
        state.dice[die].cur_face = 0;
        send(&mut state, die, pos)?;
        if state.prompt.is_none() {
            end_turn(&mut state)?;
        }
    }

    assert!(state.is_game_won());
    assert_eq!(state.prompt, Some(Prompt::Victory));
    assert_eq!(state.dice.len(), 2);
    let wins = state
        .drain_events()
        .iter()
        .filter(|event| matches!(event, GameEvent::GameWon { .. }))
        .count();
    assert_eq!(wins, 1);
    state.choose(PromptChoice::Done)?;
    assert!(state.prompt.is_none());
    Ok(())
}

#[test]
fn test_input_handler_drives_a_turn() -> DicesteadResult<()> {
    let mut state = scenario_state();
    let handler = InputHandler::new();
    let inputs = [
        PlayerInput::Tap(state.dice[0].bedroom),
        PlayerInput::Tap(EXPLORE_TARGET),
    ];
    for input in inputs {
        if let Some(command) = handler.input_to_command(input, &state)? {
            command.apply(&mut state)?;
        }
    }
    // Input during the move is swallowed
    assert_eq!(handler.input_to_command(PlayerInput::EndTurn, &state)?, None);
    Command::FinishAnimation.apply(&mut state)?;
    assert!(state.cell(EXPLORE_TARGET).unwrap().explored);
    Ok(())
}
