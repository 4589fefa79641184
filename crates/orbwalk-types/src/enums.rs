//! Enumeration types for the Orbwalk decision core.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operating mode
// ---------------------------------------------------------------------------

/// The single operating mode the orbwalker is currently acting in.
///
/// Exactly one mode is active at any time. The active mode only changes
/// through toggle events fed to the mode resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Idle: no automated attacks or movement.
    #[default]
    None,
    /// Only attack minions that are about to die.
    LastHit,
    /// Push a lane: last-hit and attack any minion.
    LaneClear,
    /// Last-hit minions, harass champions in between.
    Hybrid,
    /// Fight: attack champions.
    Combo,
}

impl OperatingMode {
    /// Toggleable modes in fallback priority order (highest first).
    pub const PRIORITY: [Self; 4] = [Self::LastHit, Self::LaneClear, Self::Hybrid, Self::Combo];

    /// Whether this mode is farm-oriented (attacks are timed around minion
    /// health rather than champion trades).
    pub const fn is_farming(self) -> bool {
        matches!(self, Self::LastHit | Self::LaneClear | Self::Hybrid)
    }

    /// Lower-case toggle name of this mode, as used by key bindings.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::LastHit => "lasthit",
            Self::LaneClear => "laneclear",
            Self::Hybrid => "hybrid",
            Self::Combo => "combo",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a toggle name does not match any operating mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operating mode: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for OperatingMode {
    type Err = UnknownMode;

    /// Parse a mode name case-insensitively. Underscores and a trailing
    /// `key` suffix are tolerated so both `"lane_clear"` and
    /// `"laneclearKey"` resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase().replace('_', "");
        let name = lowered.strip_suffix("key").unwrap_or(lowered.as_str());
        match name {
            "none" => Ok(Self::None),
            "lasthit" => Ok(Self::LastHit),
            "laneclear" => Ok(Self::LaneClear),
            "hybrid" => Ok(Self::Hybrid),
            "combo" => Ok(Self::Combo),
            _ => Err(UnknownMode(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Action kind
// ---------------------------------------------------------------------------

/// The kind of order an [`ActionIntent`](crate::ActionIntent) proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Basic attack against a target.
    Attack,
    /// Move to a position.
    Move,
    /// Stop in place at the avatar's server position.
    StopMovement,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Attack => "attack",
            Self::Move => "move",
            Self::StopMovement => "stop_movement",
        };
        f.write_str(name)
    }
}
