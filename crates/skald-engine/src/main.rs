//! Terminal front end for the Skald kernel.
//!
//! This is the main entry point that wires together configuration,
//! logging, the world, the scheduler, and the player's terminal. It runs
//! the tick loop until a termination condition is met.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `skald-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the world definition (or the built-in starter world) and hydrate it
//! 4. Build the simulator
//! 5. Choose the intent source: live terminal play, or `replay <log.json>`
//! 6. Run the simulation loop
//! 7. Write the intent log and log the result
//!
//! Narration goes to stdout; logs go to stderr.

mod console;
mod error;
mod terminal;

use std::path::{Path, PathBuf};
use std::time::Duration;

use skald_core::config::{LoggingConfig, SimulationConfig};
use skald_core::planner::{IdlePlanner, RoutedSource};
use skald_core::replay::{IntentLog, RecordingSource, ReplaySource};
use skald_core::runner::{self, SimulationResult};
use skald_core::tick::Simulator;
use skald_types::ActorId;
use skald_world::{World, WorldDefinition, starter_world};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleObserver;
use crate::error::EngineError;
use crate::terminal::TerminalIntake;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "skald-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(
        world_name = %config.world.name,
        seed = ?config.world.seed,
        player = %config.world.player_id,
        max_ticks = config.scheduler.max_ticks,
        planner_timeout_ms = config.scheduler.planner_timeout_ms,
        "Configuration loaded"
    );

    // 3. Load and hydrate the world.
    let world = load_world(&config)?;
    info!(
        seed = world.seed(),
        locations = world.locations().count(),
        actors = world.actors().count(),
        items = world.items().count(),
        "World hydrated"
    );

    // 4. Build the simulator.
    let mut sim = Simulator::new(world, &config)?;
    let player = ActorId::new(config.world.player_id.as_str());
    let mut callback = ConsoleObserver::new(player);

    // 5-6. Run live or from a recording.
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.as_slice() {
        [mode, path] if mode == "replay" => {
            replay(&mut sim, &config, Path::new(path), &mut callback)?
        }
        _ => play(&mut sim, &config, &mut callback)?,
    };

    // 7. Log results.
    runner::log_simulation_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "skald-engine shutdown complete"
    );

    Ok(())
}

/// Live play: the player at the terminal, everyone else idle.
fn play(
    sim: &mut Simulator,
    config: &SimulationConfig,
    callback: &mut ConsoleObserver,
) -> Result<SimulationResult, EngineError> {
    let timeout = Duration::from_millis(config.scheduler.planner_timeout_ms);
    let intake = TerminalIntake::spawn(timeout);
    let mut source = RecordingSource::new(RoutedSource::new(intake, IdlePlanner::new()));

    let result = runner::run_simulation(sim, &mut source, config.scheduler.max_ticks, callback)?;

    if let Some(path) = &config.world.replay_log {
        source.log().write_to(path)?;
        info!(path = %path.display(), turns = source.log().len(), "Intent log written");
    }
    Ok(result)
}

/// Re-run a recorded session.
fn replay(
    sim: &mut Simulator,
    config: &SimulationConfig,
    path: &Path,
    callback: &mut ConsoleObserver,
) -> Result<SimulationResult, EngineError> {
    let log = IntentLog::read_from(path)?;
    info!(path = %path.display(), turns = log.len(), "Replaying intent log");
    let mut source = ReplaySource::new(log);
    Ok(runner::run_simulation(sim, &mut source, config.scheduler.max_ticks, callback)?)
}

/// Load configuration from `SKALD_CONFIG` or `skald-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = std::env::var("SKALD_CONFIG")
        .map_or_else(|_| PathBuf::from(CONFIG_FILE), PathBuf::from);
    if config_path.exists() {
        Ok(SimulationConfig::from_file(&config_path)?)
    } else {
        let mut config = SimulationConfig::default();
        config.world.apply_env_overrides()?;
        Ok(config)
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_logging(config: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| EngineError::Logging {
            message: format!("invalid log filter `{}`: {e}", config.level),
        })?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

/// Load the configured world definition, apply the seed override, mark
/// the player, and hydrate.
fn load_world(config: &SimulationConfig) -> Result<World, EngineError> {
    let mut definition = match &config.world.definition_path {
        Some(path) => WorldDefinition::from_file(path)?,
        None => starter_world(),
    };
    if let Some(seed) = config.world.seed {
        definition.seed = seed;
    }

    let player_id = config.world.player_id.as_str();
    if !definition.actors.iter().any(|actor| actor.id.as_str() == player_id) {
        return Err(EngineError::UnknownPlayer {
            player_id: player_id.to_owned(),
        });
    }
    for actor in &mut definition.actors {
        actor.is_player = actor.id.as_str() == player_id;
    }

    Ok(definition.hydrate(config.hydration_options())?)
}
