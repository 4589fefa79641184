//! Headless host binary for the Orbwalk decision core.
//!
//! Runs one orchestrator against a scripted sandbox lane and reports what
//! it did. This is the reference wiring for a real host: load
//! configuration, build the orchestrator, install pipeline listeners, hold
//! a mode key, and then on every step forward animation events and call
//! `update`.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load the orbwalker configuration from `orbwalk-config.yaml`
//! 3. Load the `session` section and apply `ORBWALK_SEED`
//! 4. Build the sandbox and the seeded orchestrator
//! 5. Install the leash listener, if configured
//! 6. Run the session loop
//! 7. Log the summary

mod config;
mod error;
mod listeners;
mod runner;
mod sandbox;

use std::path::Path;

use orbwalk_core::config::OrbwalkConfig;
use orbwalk_core::orchestrator::Orchestrator;
use orbwalk_types::Vec3;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{SEED_ENV, SessionConfig};
use crate::error::EngineError;
use crate::listeners::Leash;
use crate::sandbox::Sandbox;

/// Path of the shared configuration file.
const CONFIG_PATH: &str = "orbwalk-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration loading or the session run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("orbwalk-engine starting");

    // 2. Load orbwalker configuration.
    let orbwalk_config = load_config()?;
    info!(
        extra_hold = orbwalk_config.movement.extra_hold,
        max_distance = orbwalk_config.movement.max_distance,
        randomize = orbwalk_config.movement.randomize,
        windup = orbwalk_config.delay.windup,
        farm = orbwalk_config.delay.farm,
        missile_check = orbwalk_config.misc.missile_check,
        "Configuration loaded"
    );

    // 3. Load session configuration.
    let seed_override = std::env::var(SEED_ENV).ok();
    let session = SessionConfig::load(Path::new(CONFIG_PATH))?
        .with_seed_override(seed_override.as_deref())?;
    info!(
        seed = session.seed,
        max_ticks = session.max_ticks,
        ping_ms = session.ping_ms,
        mode = %session.mode,
        "Session configuration loaded"
    );

    // 4. Build the sandbox and orchestrator.
    let mut sandbox = Sandbox::new(&session);
    let mut orbwalker = Orchestrator::new(orbwalk_config, SmallRng::seed_from_u64(session.seed));

    // 5. Install listeners.
    if let Some(radius) = session.leash_radius {
        let id = orbwalker.subscribe(Leash::new(Vec3::ZERO, radius));
        info!(listener = %id, radius, "Leash listener installed");
    }

    // 6. Hold the mode key and run.
    orbwalker.toggle_mode(session.mode, true);
    let summary = runner::run_session(&mut orbwalker, &mut sandbox, &session)
        .await
        .map_err(EngineError::from)?;

    // 7. Log the result.
    runner::log_session_end(&summary);

    Ok(())
}

/// Load orbwalker configuration from `orbwalk-config.yaml`, falling back
/// to defaults when the file does not exist.
fn load_config() -> Result<OrbwalkConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        let config = OrbwalkConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(OrbwalkConfig::default())
    }
}
