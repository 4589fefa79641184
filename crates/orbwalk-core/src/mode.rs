//! Operating mode resolution from exclusive toggle inputs.
//!
//! Each toggleable mode has a key that is either held or released. The
//! most recently pressed key wins. Releasing the key of the active mode
//! falls back to the highest-priority mode whose key is still held
//! (`LastHit > LaneClear > Hybrid > Combo`), or to
//! [`OperatingMode::None`] when nothing is held. Releasing any other key
//! changes nothing.
//!
//! The rule itself is the pure function [`resolve`]; [`ModeResolver`] only
//! remembers which keys are held and which mode is active.

use orbwalk_types::OperatingMode;
use tracing::info;

/// Which mode toggles are currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressedToggles {
    last_hit: bool,
    lane_clear: bool,
    hybrid: bool,
    combo: bool,
}

impl PressedToggles {
    /// Nothing held.
    pub const fn none() -> Self {
        Self {
            last_hit: false,
            lane_clear: false,
            hybrid: false,
            combo: false,
        }
    }

    /// Whether the toggle for `mode` is held. Always `false` for `None`.
    pub const fn is_pressed(&self, mode: OperatingMode) -> bool {
        match mode {
            OperatingMode::None => false,
            OperatingMode::LastHit => self.last_hit,
            OperatingMode::LaneClear => self.lane_clear,
            OperatingMode::Hybrid => self.hybrid,
            OperatingMode::Combo => self.combo,
        }
    }

    /// Record the toggle for `mode` as held or released. `None` is ignored.
    pub const fn set(&mut self, mode: OperatingMode, on: bool) {
        match mode {
            OperatingMode::None => {}
            OperatingMode::LastHit => self.last_hit = on,
            OperatingMode::LaneClear => self.lane_clear = on,
            OperatingMode::Hybrid => self.hybrid = on,
            OperatingMode::Combo => self.combo = on,
        }
    }

    /// Return a copy with the toggle for `mode` set.
    #[must_use]
    pub const fn with(mut self, mode: OperatingMode, on: bool) -> Self {
        self.set(mode, on);
        self
    }

    /// The highest-priority held toggle, if any.
    pub fn highest(&self) -> Option<OperatingMode> {
        OperatingMode::PRIORITY
            .into_iter()
            .find(|mode| self.is_pressed(*mode))
    }
}

/// Compute the active mode after `mode` is toggled `on`/off.
///
/// `pressed` must already reflect the event.
pub fn resolve(
    active: OperatingMode,
    mode: OperatingMode,
    on: bool,
    pressed: &PressedToggles,
) -> OperatingMode {
    if mode == OperatingMode::None {
        return active;
    }
    if on {
        mode
    } else if active == mode {
        pressed.highest().unwrap_or(OperatingMode::None)
    } else {
        active
    }
}

/// Tracks held toggles and the resulting active mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeResolver {
    active: OperatingMode,
    pressed: PressedToggles,
}

impl ModeResolver {
    /// Start idle with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active mode.
    pub const fn active(&self) -> OperatingMode {
        self.active
    }

    /// The held toggles.
    pub const fn pressed(&self) -> &PressedToggles {
        &self.pressed
    }

    /// Apply a toggle event and return the new active mode.
    pub fn toggle(&mut self, mode: OperatingMode, on: bool) -> OperatingMode {
        self.pressed.set(mode, on);
        let next = resolve(self.active, mode, on, &self.pressed);
        if next != self.active {
            info!(from = %self.active, to = %next, "Operating mode changed");
            self.active = next;
        }
        next
    }

    /// Apply a toggle event by key name (`"combo"`, `"laneclearKey"`, ...).
    ///
    /// Unknown names are ignored and return `None`.
    pub fn toggle_named(&mut self, name: &str, on: bool) -> Option<OperatingMode> {
        let mode: OperatingMode = name.parse().ok()?;
        Some(self.toggle(mode, on))
    }
}
