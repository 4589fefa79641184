//! Session loop runner.
//!
//! [`run_session`] drives one orchestrator against a [`Sandbox`] for a
//! bounded number of steps. Each step:
//!
//! 1. Advance the sandbox and play out the previous step's orders.
//! 2. Forward the resulting animation events to the orchestrator.
//! 3. Run one [`Orchestrator::update`] toward the sandbox cursor.
//! 4. Tally the outcome.
//! 5. Optionally sleep for the tick interval of wall time.

use std::collections::BTreeMap;

use orbwalk_core::orchestrator::{MoveOutcome, Orchestrator, UpdateOutcome};
use orbwalk_types::{OperatingMode, Tick};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::sandbox::{AnimationEvent, Sandbox};

/// Errors that can occur during the session run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The sandbox clock could not advance.
    #[error("sandbox clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: orbwalk_core::clock::ClockError,
    },
}

/// Counters collected over a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Steps executed.
    pub steps: u64,
    /// Tick at the end of the session.
    pub final_tick: Tick,
    /// Active mode at the end of the session.
    pub mode: OperatingMode,
    /// Attack outcomes by label.
    pub attacks: BTreeMap<&'static str, u64>,
    /// Movement outcomes by label.
    pub movement: BTreeMap<&'static str, u64>,
    /// Suppressed movement by reason.
    pub suppressed: BTreeMap<String, u64>,
    /// Attack casts reported by the sandbox.
    pub casts: u64,
    /// Minions killed.
    pub minions_killed: u64,
}

impl SessionSummary {
    fn record(&mut self, outcome: &UpdateOutcome) {
        if let Some(attack) = outcome.attack {
            bump(self.attacks.entry(attack.label()).or_default());
        }
        if let Some(movement) = outcome.movement {
            bump(self.movement.entry(movement.label()).or_default());
            if let MoveOutcome::Suppressed(reason) = movement {
                bump(self.suppressed.entry(reason.to_string()).or_default());
            }
        }
    }

    /// Number of attacks the orchestrator issued.
    pub fn attacks_issued(&self) -> u64 {
        self.attacks.get("issued").copied().unwrap_or(0)
    }
}

fn bump(counter: &mut u64) {
    *counter = counter.saturating_add(1);
}

/// Run the session until `config.max_ticks` steps have executed.
///
/// # Errors
///
/// Returns [`RunnerError`] if the sandbox clock overflows.
pub async fn run_session<R: Rng>(
    orbwalker: &mut Orchestrator<R>,
    sandbox: &mut Sandbox,
    config: &SessionConfig,
) -> Result<SessionSummary, RunnerError> {
    let mut summary = SessionSummary::default();

    info!(
        max_ticks = config.max_ticks,
        tick_interval_ms = config.tick_interval_ms,
        realtime = config.realtime,
        mode = %orbwalker.active_mode(),
        "Session starting"
    );

    for _ in 0..config.max_ticks {
        for event in sandbox.step(config.tick_interval_ms)? {
            match event {
                AnimationEvent::AttackCast(tick) => {
                    orbwalker.observe_attack_cast(tick);
                    bump(&mut summary.casts);
                }
                AnimationEvent::MissileLaunched => orbwalker.observe_missile_launched(),
            }
        }

        let cursor = sandbox.cursor();
        let outcome = orbwalker.update(&mut sandbox.session(), cursor);
        if outcome != UpdateOutcome::default() {
            debug!(tick = sandbox.tick(), ?outcome, "Step decided");
        }
        summary.record(&outcome);
        bump(&mut summary.steps);

        if config.realtime && config.tick_interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(config.tick_interval_ms)).await;
        }
    }

    summary.final_tick = sandbox.tick();
    summary.mode = orbwalker.active_mode();
    summary.minions_killed = sandbox.minions_killed();
    Ok(summary)
}

/// Log the end-of-session summary, including a JSON rendering.
pub fn log_session_end(summary: &SessionSummary) {
    let json = serde_json::to_string(summary).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"));
    info!(
        steps = summary.steps,
        final_tick = summary.final_tick,
        attacks_issued = summary.attacks_issued(),
        minions_killed = summary.minions_killed,
        summary = %json,
        "Session ended"
    );
}
