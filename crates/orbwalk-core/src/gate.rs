//! Action gate: every timing rule that decides whether an order may go out.
//!
//! The gate owns [`GateState`] and answers two questions per tick: may the
//! avatar attack, and may it move. Both answers are pure reads. State only
//! changes through the `commit_*` methods, called after an order has been
//! approved by the cancellation pipeline *and* accepted by the command
//! issuer, and through the `observe_*` notifications the host forwards
//! from the simulation's animation events.
//!
//! # Timing model
//!
//! - After an attack order, all orders are blocked for
//!   `order_lockout + min(latency_cap, ping)` so the client does not run
//!   ahead of the server's acceptance of that order.
//! - Attack readiness is measured from the last attack *cast* (the server
//!   event), not from the last attack command.
//! - Both readiness checks compensate half the round-trip latency.

use orbwalk_types::{AvatarSnapshot, Target, TargetSnapshot, Tick};
use serde::Serialize;

use crate::config::TimingConfig;
use crate::windup::{WindupAdjustment, WindupOverrides};

/// Timing state of one orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GateState {
    /// Tick of the last accepted attack order.
    pub last_attack_command_tick: Tick,
    /// Tick of the last accepted movement order (rewound after stops).
    pub last_movement_command_tick: Tick,
    /// No attack or move order may be issued before this tick.
    pub block_orders_until_tick: Tick,
    /// Tick at which the server last reported an attack cast, if ever.
    pub last_attack_cast_tick: Option<Tick>,
    /// The entity last attacked. Identity and position only.
    pub last_target: Option<TargetSnapshot>,
    /// Whether the last attack's projectile has been launched.
    pub missile_in_flight: bool,
    /// Number of accepted attack orders.
    pub total_attacks_issued: u64,
}

/// Per-call inputs the gate needs besides its own state.
#[derive(Debug, Clone, Copy)]
pub struct GateView<'a> {
    /// Current tick.
    pub tick: Tick,
    /// Current round-trip latency, in milliseconds.
    pub ping_ms: u32,
    /// The avatar as of this call.
    pub avatar: &'a AvatarSnapshot,
    /// Whether the last attacked entity is still valid.
    pub last_target_valid: bool,
}

/// Owns [`GateState`] and evaluates readiness against it.
#[derive(Debug)]
pub struct ActionGate {
    state: GateState,
    timing: TimingConfig,
    overrides: WindupOverrides,
}

impl ActionGate {
    /// Create a gate with fresh state.
    pub fn new(timing: TimingConfig, overrides: WindupOverrides) -> Self {
        Self {
            state: GateState::default(),
            timing,
            overrides,
        }
    }

    /// Read-only view of the timing state.
    pub const fn state(&self) -> &GateState {
        &self.state
    }

    /// Replace the timing constants (configuration change). State is kept.
    pub fn set_timing(&mut self, timing: TimingConfig) {
        self.timing = timing;
    }

    /// Whether `tick` still falls inside the post-attack lockout.
    pub const fn orders_blocked(&self, tick: Tick) -> bool {
        tick < self.state.block_orders_until_tick
    }

    /// The lockout applied after an accepted order:
    /// `order_lockout + min(latency_cap, ping)`.
    pub fn order_lockout(&self, ping_ms: u32) -> u64 {
        let latency = ping_ms.min(u32::from(self.timing.latency_cap));
        u64::from(self.timing.order_lockout).saturating_add(u64::from(latency))
    }

    /// Whether an attack order may be issued now.
    ///
    /// `extra_windup` (milliseconds) is added to the attack cycle, together
    /// with whatever the identity override contributes.
    pub fn can_attack(&self, view: &GateView<'_>, extra_windup: f32) -> bool {
        if self.orders_blocked(view.tick) {
            return false;
        }
        let extra = match self.overrides.attack_adjustment(view.avatar) {
            WindupAdjustment::Block => return false,
            WindupAdjustment::Extra(ms) => extra_windup + ms,
        };
        let Some(cast_tick) = self.state.last_attack_cast_tick else {
            return true;
        };
        let now = ticks_to_ms(view.tick)
            + f64::from(view.ping_ms) / 2.0
            + f64::from(self.timing.attack_grace);
        let ready_at =
            ticks_to_ms(cast_tick) + f64::from(view.avatar.attack_delay) * 1000.0 + f64::from(extra);
        now >= ready_at
    }

    /// Whether a movement order may be issued now.
    ///
    /// Once the last attack's projectile is out (and its target still
    /// exists) the attack can no longer be interrupted, so movement is
    /// released early unless `disable_missile_check` is set. Avatars whose
    /// attack cannot be cancelled by a new order may always move.
    pub fn can_move(&self, view: &GateView<'_>, extra_windup: f32, disable_missile_check: bool) -> bool {
        if self.orders_blocked(view.tick) {
            return false;
        }
        if !disable_missile_check && self.state.missile_in_flight && view.last_target_valid {
            return true;
        }
        if !view.avatar.can_cancel_attack {
            return true;
        }
        let Some(cast_tick) = self.state.last_attack_cast_tick else {
            return true;
        };
        let extra = extra_windup + self.overrides.movement_extra(view.avatar);
        let now = ticks_to_ms(view.tick) + f64::from(view.ping_ms) / 2.0;
        let ready_at = ticks_to_ms(cast_tick)
            + f64::from(view.avatar.attack_cast_delay) * 1000.0
            + f64::from(extra);
        now >= ready_at
    }

    /// Record an accepted attack order against `target`.
    pub fn commit_attack(&mut self, view: &GateView<'_>, target: &Target) {
        self.state.last_attack_command_tick = view.tick;
        self.state.last_target = Some(target.snapshot());
        self.state.block_orders_until_tick = view.tick.saturating_add(self.order_lockout(view.ping_ms));
        self.state.total_attacks_issued = self.state.total_attacks_issued.saturating_add(1);
        if view.avatar.can_cancel_attack {
            self.state.missile_in_flight = false;
        }
    }

    /// Record an accepted movement order.
    pub const fn commit_move(&mut self, tick: Tick) {
        self.state.last_movement_command_tick = tick;
    }

    /// Record an accepted stop order: the last movement tick is set
    /// `grace` milliseconds in the past so the next real move is not
    /// throttled by the stop.
    pub fn commit_stop(&mut self, tick: Tick) {
        self.state.last_movement_command_tick = tick.saturating_sub(u64::from(self.timing.stop_grace));
    }

    /// The server started an attack animation at `tick`.
    pub const fn observe_attack_cast(&mut self, tick: Tick) {
        self.state.last_attack_cast_tick = Some(tick);
        self.state.missile_in_flight = false;
    }

    /// The projectile of the current attack has been launched.
    pub const fn observe_missile_launched(&mut self) {
        self.state.missile_in_flight = true;
    }
}

#[allow(clippy::cast_precision_loss)]
const fn ticks_to_ms(tick: Tick) -> f64 {
    tick as f64
}
