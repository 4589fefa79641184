//! Configuration loading and typed config structures for the orbwalker.
//!
//! The canonical configuration lives in `orbwalk-config.yaml` at the project
//! root. The host hands the orchestrator a validated [`OrbwalkConfig`]
//! snapshot; the core reads it once per decision and never writes it.
//!
//! Slider-style options keep the ranges of the user-facing menu and are
//! checked by [`OrbwalkConfig::validate`]. The `timing` and `deviation`
//! sections hold constants that used to be literals in the decision code.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An option is outside its allowed range.
    #[error("{option} = {value} is outside {min}..={max}")]
    OutOfRange {
        /// Dotted option path, e.g. `movement.max_distance`.
        option: &'static str,
        /// The rejected value.
        value: u32,
        /// Inclusive lower bound.
        min: u32,
        /// Inclusive upper bound.
        max: u32,
    },

    /// A threshold is NaN, infinite, or negative.
    #[error("{option} = {value} must be a finite, non-negative number")]
    InvalidNumber {
        /// Dotted option path, e.g. `deviation.angle`.
        option: &'static str,
        /// The rejected value.
        value: f32,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level orbwalker configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrbwalkConfig {
    /// Movement order shaping.
    #[serde(default)]
    pub movement: MovementConfig,

    /// User-tunable delays.
    #[serde(default)]
    pub delay: DelayConfig,

    /// Miscellaneous behaviour switches.
    #[serde(default)]
    pub misc: MiscConfig,

    /// Order lockout and throttle constants.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Path-deviation suppression thresholds.
    #[serde(default)]
    pub deviation: DeviationConfig,
}

impl OrbwalkConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::OutOfRange`] if an option fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::OutOfRange`] if an option fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every slider-backed option against its menu range and every
    /// float threshold for a finite, non-negative value.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::OutOfRange`] or
    /// [`ConfigError::InvalidNumber`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("movement.extra_hold", self.movement.extra_hold, 0, 250)?;
        check_range("movement.max_distance", self.movement.max_distance, 500, 1500)?;
        check_range("delay.movement", self.delay.movement, 0, 500)?;
        check_range("delay.windup", self.delay.windup, 0, 200)?;
        check_range("delay.farm", self.delay.farm, 0, 200)?;
        if self.misc.attack_speed_guard_period == 0 {
            return Err(ConfigError::OutOfRange {
                option: "misc.attack_speed_guard_period",
                value: 0,
                min: 1,
                max: u32::from(u16::MAX),
            });
        }
        check_non_negative("movement.randomize_min_distance", self.movement.randomize_min_distance)?;
        check_non_negative("misc.attack_speed_threshold", self.misc.attack_speed_threshold)?;
        check_non_negative("misc.attack_speed_guard_windup", self.misc.attack_speed_guard_windup)?;
        check_non_negative("timing.large_angle", self.timing.large_angle)?;
        check_non_negative("deviation.min_path_length", self.deviation.min_path_length)?;
        check_non_negative("deviation.angle", self.deviation.angle)?;
        check_non_negative("deviation.converge_distance", self.deviation.converge_distance)?;
        check_non_negative("deviation.endpoint_distance", self.deviation.endpoint_distance)?;
        Ok(())
    }
}

fn check_range(option: &'static str, value: u16, min: u16, max: u16) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            option,
            value: u32::from(value),
            min: u32::from(min),
            max: u32::from(max),
        })
    }
}

fn check_non_negative(option: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidNumber { option, value })
    }
}

/// Movement order shaping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovementConfig {
    /// Perturb long move orders by a small random offset.
    #[serde(default = "default_true")]
    pub randomize: bool,

    /// Added to the avatar's bounding radius to form the hold radius.
    #[serde(default)]
    pub extra_hold: u16,

    /// Move orders farther than this are pulled in along the same ray.
    #[serde(default = "default_max_distance")]
    pub max_distance: u16,

    /// Randomization only applies beyond this distance from the avatar.
    #[serde(default = "default_randomize_min_distance")]
    pub randomize_min_distance: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            randomize: true,
            extra_hold: 0,
            max_distance: default_max_distance(),
            randomize_min_distance: default_randomize_min_distance(),
        }
    }
}

/// User-tunable delays, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DelayConfig {
    /// Minimum interval between two movement orders.
    #[serde(default)]
    pub movement: u16,

    /// Extra windup added whenever the orbwalker checks whether it may move.
    #[serde(default = "default_windup_delay")]
    pub windup: u16,

    /// Extra windup added to attack checks in farming modes.
    #[serde(default = "default_farm_delay")]
    pub farm: u16,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            movement: 0,
            windup: default_windup_delay(),
            farm: default_farm_delay(),
        }
    }
}

/// Miscellaneous behaviour switches.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MiscConfig {
    /// Release movement as soon as the attack projectile has launched.
    #[serde(default = "default_true")]
    pub missile_check: bool,

    /// Skip kiting at very high attack speed except every Nth attack.
    #[serde(default = "default_true")]
    pub attack_speed_guard: bool,

    /// Attacks per second above which the guard engages.
    #[serde(default = "default_attack_speed_threshold")]
    pub attack_speed_threshold: f32,

    /// The guard lets every Nth attack cycle kite.
    #[serde(default = "default_attack_speed_guard_period")]
    pub attack_speed_guard_period: u16,

    /// Windup used for the guard's own movement check.
    #[serde(default = "default_attack_speed_guard_windup")]
    pub attack_speed_guard_windup: f32,
}

impl Default for MiscConfig {
    fn default() -> Self {
        Self {
            missile_check: true,
            attack_speed_guard: true,
            attack_speed_threshold: default_attack_speed_threshold(),
            attack_speed_guard_period: default_attack_speed_guard_period(),
            attack_speed_guard_windup: default_attack_speed_guard_windup(),
        }
    }
}

/// Order lockout and throttle constants, in milliseconds unless noted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimingConfig {
    /// Fixed part of the post-attack order lockout and of the move throttle.
    #[serde(default = "default_order_lockout")]
    pub order_lockout: u16,

    /// Upper bound on the latency added to the lockout.
    #[serde(default = "default_latency_cap")]
    pub latency_cap: u16,

    /// How far the last movement tick is rewound after a stop order.
    #[serde(default = "default_stop_grace")]
    pub stop_grace: u16,

    /// Slack granted to the attack readiness check.
    #[serde(default = "default_attack_grace")]
    pub attack_grace: u16,

    /// Direction change (degrees) that counts as a large redirect.
    #[serde(default = "default_large_angle")]
    pub large_angle: f32,

    /// Minimum interval between orders for a large redirect.
    #[serde(default = "default_large_angle_interval")]
    pub large_angle_interval: u16,

    /// Upper bound of the uniform distance jitter, in units.
    #[serde(default = "default_jitter")]
    pub jitter: u16,

    /// How far past `movement.max_distance` a clamped order is placed
    /// before jitter is subtracted, in units.
    #[serde(default = "default_clamp_overshoot")]
    pub clamp_overshoot: u16,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            order_lockout: default_order_lockout(),
            latency_cap: default_latency_cap(),
            stop_grace: default_stop_grace(),
            attack_grace: default_attack_grace(),
            large_angle: default_large_angle(),
            large_angle_interval: default_large_angle_interval(),
            jitter: default_jitter(),
            clamp_overshoot: default_clamp_overshoot(),
        }
    }
}

/// Thresholds for dropping move orders that would not change the current
/// trajectory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviationConfig {
    /// Only paths longer than this are considered.
    #[serde(default = "default_min_path_length")]
    pub min_path_length: f32,

    /// First-segment angle (degrees) below which paths count as parallel.
    #[serde(default = "default_deviation_angle")]
    pub angle: f32,

    /// Parallel paths whose endpoints are closer than this are merged.
    #[serde(default = "default_converge_distance")]
    pub converge_distance: f32,

    /// Endpoints closer than this are merged regardless of angle.
    #[serde(default = "default_endpoint_distance")]
    pub endpoint_distance: f32,
}

impl Default for DeviationConfig {
    fn default() -> Self {
        Self {
            min_path_length: default_min_path_length(),
            angle: default_deviation_angle(),
            converge_distance: default_converge_distance(),
            endpoint_distance: default_endpoint_distance(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

const fn default_max_distance() -> u16 {
    1500
}

const fn default_randomize_min_distance() -> f32 {
    350.0
}

const fn default_windup_delay() -> u16 {
    80
}

const fn default_farm_delay() -> u16 {
    30
}

const fn default_attack_speed_threshold() -> f32 {
    2.6
}

const fn default_attack_speed_guard_period() -> u16 {
    3
}

const fn default_attack_speed_guard_windup() -> f32 {
    500.0
}

const fn default_order_lockout() -> u16 {
    70
}

const fn default_latency_cap() -> u16 {
    60
}

const fn default_stop_grace() -> u16 {
    70
}

const fn default_attack_grace() -> u16 {
    25
}

const fn default_large_angle() -> f32 {
    60.0
}

const fn default_large_angle_interval() -> u16 {
    60
}

const fn default_jitter() -> u16 {
    50
}

const fn default_clamp_overshoot() -> u16 {
    25
}

const fn default_min_path_length() -> f32 {
    100.0
}

const fn default_deviation_angle() -> f32 {
    10.0
}

const fn default_converge_distance() -> f32 {
    500.0
}

const fn default_endpoint_distance() -> f32 {
    50.0
}
