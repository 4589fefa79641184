//! Engine session configuration.
//!
//! The engine reads the same `orbwalk-config.yaml` as the core. The core's
//! sections (`movement`, `delay`, `misc`, `timing`, `deviation`) are loaded
//! by [`OrbwalkConfig`](orbwalk_core::config::OrbwalkConfig); this module
//! extracts only the `session` section, which describes the sandbox run.
//!
//! `ORBWALK_SEED` overrides `session.seed` when set.

use std::path::Path;

use orbwalk_types::OperatingMode;
use serde::Deserialize;

use crate::error::EngineError;

/// Environment variable overriding [`SessionConfig::seed`].
pub const SEED_ENV: &str = "ORBWALK_SEED";

/// Sandbox session parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionConfig {
    /// Seed for the orbwalker RNG and the sandbox world.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Simulated milliseconds per step.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Number of steps before the session ends.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Sleep for `tick_interval_ms` of wall time between steps.
    #[serde(default)]
    pub realtime: bool,

    /// Simulated round-trip latency in milliseconds.
    #[serde(default = "default_ping_ms")]
    pub ping_ms: u32,

    /// Mode held down for the whole session.
    #[serde(default = "default_mode")]
    pub mode: OperatingMode,

    /// Minions kept alive in the sandbox lane.
    #[serde(default = "default_minion_count")]
    pub minion_count: u16,

    /// Keep movement within this distance of the lane anchor, if set.
    #[serde(default)]
    pub leash_radius: Option<f32>,
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    33
}

const fn default_max_ticks() -> u64 {
    900
}

const fn default_ping_ms() -> u32 {
    45
}

const fn default_mode() -> OperatingMode {
    OperatingMode::LaneClear
}

const fn default_minion_count() -> u16 {
    6
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: default_max_ticks(),
            realtime: false,
            ping_ms: default_ping_ms(),
            mode: default_mode(),
            minion_count: default_minion_count(),
            leash_radius: None,
        }
    }
}

impl SessionConfig {
    /// Load the `session` section from a YAML config file.
    ///
    /// A missing file or a file without a `session` key yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Session`] if the file cannot be read or the
    /// section does not deserialize.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| EngineError::Session {
            message: format!("failed to read config file: {e}"),
        })?;
        Self::parse(&contents)
    }

    /// Extract the `session` section from a full config document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Session`] if the YAML is malformed or the
    /// section does not deserialize.
    pub fn parse(yaml: &str) -> Result<Self, EngineError> {
        let raw: serde_yml::Value = serde_yml::from_str(yaml).map_err(|e| EngineError::Session {
            message: format!("failed to parse config YAML: {e}"),
        })?;
        let Some(section) = raw.get("session") else {
            return Ok(Self::default());
        };
        serde_yml::from_value(section.clone()).map_err(|e| EngineError::Session {
            message: format!("invalid session section: {e}"),
        })
    }

    /// Apply a seed override, as read from [`SEED_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Session`] if the value is not an unsigned
    /// integer.
    pub fn with_seed_override(mut self, value: Option<&str>) -> Result<Self, EngineError> {
        if let Some(raw) = value {
            self.seed = raw.trim().parse().map_err(|e| EngineError::Session {
                message: format!("{SEED_ENV}={raw:?} is not a valid seed: {e}"),
            })?;
        }
        Ok(self)
    }
}
