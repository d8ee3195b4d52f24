//! # Dicestead Headless Driver
//!
//! Creates a session and plays it either from a JSON command script or with
//! the autoplayer, logging what happens and optionally writing a final JSON
//! snapshot.

use clap::Parser;
use dicestead::config::TARGET_FPS;
use dicestead::{
    parse_script, AutoplayState, Command, Currency, DicesteadError, DicesteadResult, GameEvent,
    GameState, LevelDef,
};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Command line arguments for the Dicestead driver.
#[derive(Parser, Debug)]
#[command(name = "dicestead")]
#[command(about = "A dice-worker settlement builder, played headless")]
#[command(version)]
struct Args {
    /// Level seed; numeric seeds are used as-is
    #[arg(short, long, default_value = "test1")]
    seed: String,

    /// Board width in cells
    #[arg(long, default_value_t = 16)]
    width: u32,

    /// Board height in cells
    #[arg(long, default_value_t = 14)]
    height: u32,

    /// Turns to autoplay
    #[arg(short, long, default_value_t = 20)]
    turns: u32,

    /// JSON file with a list of commands to replay instead of autoplaying
    #[arg(long)]
    script: Option<PathBuf>,

    /// Write a JSON snapshot of the final state here
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Upper bound on autoplay decisions per turn before giving up.
const MAX_STEPS_PER_TURN: u32 = 1_000;

fn main() -> DicesteadResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting Dicestead v{}", dicestead::VERSION);

    let level_def = LevelDef::new(args.seed.clone(), args.width, args.height);
    let mut state = GameState::new(&level_def)?;

    match &args.script {
        Some(path) => run_script(&mut state, path)?,
        None => run_autoplay(&mut state, args.turns)?,
    }

    report(&state);

    if let Some(path) = &args.snapshot {
        fs::write(path, state.snapshot_json()?)?;
        info!("Snapshot written to {}", path.display());
    }
    Ok(())
}

/// Initializes env_logger with the requested default level.
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_target(false)
        .init();
}

/// Plays frames until the running animation is over.
fn settle(state: &mut GameState) -> DicesteadResult<()> {
    let frame_ms = 1000.0 / TARGET_FPS as f32;
    while state.animation.is_some() {
        state.tick(frame_ms)?;
    }
    Ok(())
}

fn run_script(state: &mut GameState, path: &Path) -> DicesteadResult<()> {
    let commands = parse_script(&fs::read_to_string(path)?)?;
    info!("Replaying {} commands from {}", commands.len(), path.display());
    for (idx, command) in commands.iter().enumerate() {
        command.apply(state)?;
        if command.animates() {
            settle(state)?;
        }
        debug!("Command {} applied: {:?}", idx, command);
        log_events(state);
    }
    Ok(())
}

fn run_autoplay(state: &mut GameState, turns: u32) -> DicesteadResult<()> {
    let mut autoplay = AutoplayState::new();
    let mut steps = 0;
    let mut turn_idx = state.turn_idx;
    while state.turn_idx < turns {
        if state.turn_idx != turn_idx {
            turn_idx = state.turn_idx;
            steps = 0;
        }
        steps += 1;
        if steps > MAX_STEPS_PER_TURN {
            return Err(DicesteadError::InvalidState(format!(
                "Autoplay stalled on turn {}",
                state.turn_idx
            )));
        }

        let Some(command) = autoplay.next_command(state) else {
            settle(state)?;
            continue;
        };
        if let Err(err) = apply(state, &command) {
            warn!("{:?} refused: {}", command, err);
            autoplay.record_failure(state);
        }
        log_events(state);
    }
    Ok(())
}

fn apply(state: &mut GameState, command: &Command) -> DicesteadResult<()> {
    command.apply(state)?;
    if command.animates() {
        settle(state)?;
    }
    Ok(())
}

fn log_events(state: &mut GameState) {
    for event in state.drain_events() {
        match event {
            GameEvent::TurnStarted { turn } => {
                let purse: Vec<String> = Currency::ALL
                    .iter()
                    .map(|&c| format!("{} {}", state.purse[c], c))
                    .collect();
                info!("Turn {}: {}", turn, purse.join(", "));
            }
            GameEvent::GameWon { turn } => info!("Victory on turn {}!", turn),
            other => debug!("{:?}", other),
        }
    }
}

fn report(state: &GameState) {
    let stats = &state.statistics;
    info!(
        "Finished on turn {} with {} dice: {} activations, {} cells explored, {} built, {} harvests",
        state.turn_idx,
        state.dice.len(),
        stats.activations,
        stats.cells_explored,
        stats.buildings_built,
        stats.crops_harvested
    );
    if state.is_game_won() {
        info!("The temple stands complete");
    }
}
