//! Engine binary for the Acequia simulation.
//!
//! Wires together configuration, structured logging, the water network,
//! and the hourly allocation loop, then runs until every region is
//! satisfied or the hour limit is reached.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ACEQUIA_CONFIG` or `acequia-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the water network from the scenario file or the built-in one
//! 4. Create the simulation clock and optional weather
//! 5. Run the simulation loop
//! 6. Log the result and write the report

mod error;
mod history;
mod report;

use std::path::PathBuf;

use acequia_core::clock::SimulationClock;
use acequia_core::config::{LoggingConfig, SimulationConfig};
use acequia_core::runner::{self, SimulationResult};
use acequia_core::tick::SimulationState;
use acequia_world::WeatherSystem;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::history::HistoryCallback;
use crate::report::RunReport;

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "acequia-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so remember where it
    //    came from and report it afterwards.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("acequia-engine starting");
    info!(
        name = config.simulation.name,
        source = source.as_ref().map(|p| p.display().to_string()),
        max_hours = config.simulation.max_hours,
        start_hour = config.simulation.start_hour,
        weather = config.weather.enabled,
        "Configuration loaded"
    );

    // 3-6. Build, run, report.
    let result = run(&config)?;

    info!(
        end_reason = ?result.end_reason,
        hours_run = result.hours_run,
        "acequia-engine shutdown complete"
    );

    Ok(())
}

/// Build the network, run the loop, and write the report.
fn run(config: &SimulationConfig) -> Result<SimulationResult, EngineError> {
    // 3. Build the network.
    let network = config.scenario.build_network()?;
    info!(
        regions = network.region_count(),
        canals = network.canal_count(),
        scenario = config
            .scenario
            .path
            .as_ref()
            .map(|p| p.display().to_string()),
        "Water network built"
    );

    // 4. Clock and weather.
    let clock = SimulationClock::new(&config.simulation)?;
    let weather = config
        .weather
        .enabled
        .then(|| WeatherSystem::new(config.weather.seed, config.weather.effects()));
    let mut state = SimulationState::new(clock, network, weather);

    // 5. Run.
    let mut callback = HistoryCallback::new();
    let result = runner::run_simulation(&mut state, &mut callback)?;
    info!(hours_recorded = callback.hours().len(), "Simulation loop finished");

    // 6. Log results and write the report.
    runner::log_simulation_end(&result);
    if let Some(path) = &config.report.path {
        let report = RunReport::build(
            &config.simulation.name,
            &result,
            &state,
            callback.into_hours(),
        );
        report.write_to(path)?;
    }

    Ok(result)
}

/// Load the configuration from `ACEQUIA_CONFIG`, then
/// `acequia-config.yaml`, falling back to defaults when neither exists.
///
/// Returns the config and the file it was read from, if any.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let config_path = std::env::var_os("ACEQUIA_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = SimulationConfig::from_file(&config_path)?;
        Ok((config, Some(config_path)))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides();
        Ok((config, None))
    }
}

/// Install the global subscriber. `ACEQUIA_LOG` takes precedence over the
/// configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_env("ACEQUIA_LOG")
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
