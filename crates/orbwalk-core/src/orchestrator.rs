//! The orchestrator: the single entry point the host loop talks to.
//!
//! An [`Orchestrator`] owns the [`ActionGate`], the
//! [`CancellationPipeline`], the [`ModeResolver`], the configuration and the
//! RNG. Each call receives a [`Session`] of borrowed host collaborators,
//! reads the clock and a fresh avatar snapshot, decides, and (at most once)
//! issues an order through the session's [`CommandIssuer`].
//!
//! # Commit protocol
//!
//! For every order attempt:
//!
//! 1. The gate is consulted; a blocked tick ends the attempt with no side
//!    effect.
//! 2. An [`ActionIntent`] is built and run through the pipeline. A veto ends
//!    the attempt with no side effect.
//! 3. The approved intent is issued. Only if the issuer accepts it is the
//!    gate state committed.
//!
//! Every call returns an outcome value describing what happened. Outcomes
//! are informational; none of them is an error.
//!
//! [`CommandIssuer`]: crate::host::CommandIssuer

use orbwalk_types::{ActionIntent, AvatarSnapshot, EntityId, ListenerId, OperatingMode, Target, Tick, Vec3};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, OrbwalkConfig};
use crate::gate::{ActionGate, GateState, GateView};
use crate::host::Session;
use crate::mode::ModeResolver;
use crate::pipeline::{CancellationPipeline, IntentListener, Verdict};
use crate::planner::{MovePlan, MovementPlanner, SuppressReason};
use crate::windup::WindupOverrides;

/// Result of an attack attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// The attack was issued and committed against this entity.
    Issued(EntityId),
    /// Orders are locked out after a recent attack.
    Blocked,
    /// The avatar cannot be controlled right now.
    AvatarUnavailable,
    /// No valid target was supplied or found.
    NoTarget,
    /// A pipeline listener vetoed the attack.
    Vetoed,
    /// The command issuer refused the order.
    Rejected,
}

impl AttackOutcome {
    /// Short stable label, for counters and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Issued(_) => "issued",
            Self::Blocked => "blocked",
            Self::AvatarUnavailable => "avatar_unavailable",
            Self::NoTarget => "no_target",
            Self::Vetoed => "vetoed",
            Self::Rejected => "rejected",
        }
    }
}

/// Result of a movement attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// A move order was issued and committed.
    Moved(Vec3),
    /// A stop order was issued and committed.
    Stopped(Vec3),
    /// Orders are locked out after a recent attack.
    Blocked,
    /// The avatar cannot be controlled right now.
    AvatarUnavailable,
    /// The planner decided not to issue anything.
    Suppressed(SuppressReason),
    /// A pipeline listener vetoed the order.
    Vetoed,
    /// The command issuer refused the order.
    Rejected,
}

impl MoveOutcome {
    /// Short stable label, for counters and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Moved(_) => "moved",
            Self::Stopped(_) => "stopped",
            Self::Blocked => "blocked",
            Self::AvatarUnavailable => "avatar_unavailable",
            Self::Suppressed(_) => "suppressed",
            Self::Vetoed => "vetoed",
            Self::Rejected => "rejected",
        }
    }
}

/// What one [`Orchestrator::update`] step attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateOutcome {
    /// The attack attempt, if the gate allowed one and a target existed.
    pub attack: Option<AttackOutcome>,
    /// The movement attempt, if the gate allowed one.
    pub movement: Option<MoveOutcome>,
}

/// Composes gate, pipeline, planner and mode resolution into attack and
/// move decisions.
pub struct Orchestrator<R> {
    gate: ActionGate,
    pipeline: CancellationPipeline,
    modes: ModeResolver,
    config: OrbwalkConfig,
    rng: R,
    enabled: bool,
    force_target: Option<EntityId>,
}

impl<R: Rng> Orchestrator<R> {
    /// Create an enabled orchestrator with the stock windup overrides.
    pub fn new(config: OrbwalkConfig, rng: R) -> Self {
        Self::with_overrides(config, WindupOverrides::standard(), rng)
    }

    /// Create an enabled orchestrator with a custom override table.
    pub fn with_overrides(config: OrbwalkConfig, overrides: WindupOverrides, rng: R) -> Self {
        Self {
            gate: ActionGate::new(config.timing.clone(), overrides),
            pipeline: CancellationPipeline::new(),
            modes: ModeResolver::new(),
            config,
            rng,
            enabled: true,
            force_target: None,
        }
    }

    /// Attempt an attack.
    ///
    /// When `target` is `None` the target is chosen with [`Self::target`].
    pub fn attack(&mut self, session: &mut Session<'_>, target: Option<Target>) -> AttackOutcome {
        let tick = session.clock.current_tick();
        if self.gate.orders_blocked(tick) {
            debug!(tick, reason = "blocked", kind = "attack", "Attack suppressed");
            return AttackOutcome::Blocked;
        }
        let Some(avatar) = session.avatar.snapshot() else {
            return AttackOutcome::AvatarUnavailable;
        };
        let Some(target) = target.or_else(|| self.pick_target(session, &avatar)) else {
            return AttackOutcome::NoTarget;
        };
        if !session.targets.is_valid(target.id) {
            debug!(tick, target = %target.id, "Attack target no longer valid");
            return AttackOutcome::NoTarget;
        }

        let approved = match self.pipeline.run(ActionIntent::attack(target)) {
            Verdict::Proceed(intent) => intent,
            Verdict::Veto => {
                debug!(tick, reason = "vetoed", kind = "attack", "Attack suppressed");
                return AttackOutcome::Vetoed;
            }
        };
        // A listener may have retargeted; whatever it chose must still exist.
        let Some(target) = approved.target.and_then(|t| session.targets.resolve(t.id)) else {
            debug!(tick, "Approved attack target is no longer valid");
            return AttackOutcome::NoTarget;
        };

        if !session.issuer.issue_attack(&target) {
            warn!(tick, target = %target.id, "Attack order rejected by issuer");
            return AttackOutcome::Rejected;
        }
        let view = self.view(session, &avatar, tick);
        self.gate.commit_attack(&view, &target);
        info!(
            tick,
            target = %target.id,
            block_until = self.gate.state().block_orders_until_tick,
            total = self.gate.state().total_attacks_issued,
            "Attack issued"
        );
        AttackOutcome::Issued(target.id)
    }

    /// Attempt a movement order towards `position`.
    pub fn move_to(&mut self, session: &mut Session<'_>, position: Vec3) -> MoveOutcome {
        let tick = session.clock.current_tick();
        if self.gate.orders_blocked(tick) {
            debug!(tick, reason = "blocked", kind = "move", "Move suppressed");
            return MoveOutcome::Blocked;
        }
        let Some(avatar) = session.avatar.snapshot() else {
            return MoveOutcome::AvatarUnavailable;
        };
        let view = self.view(session, &avatar, tick);
        let plan = MovementPlanner::new(&self.config, &self.gate).plan(
            &view,
            position,
            session.navigator,
            &mut self.rng,
        );

        match plan {
            MovePlan::Suppressed(reason) => {
                debug!(tick, %reason, kind = "move", "Move suppressed");
                MoveOutcome::Suppressed(reason)
            }
            MovePlan::Stop(at) => {
                let Verdict::Proceed(intent) = self.pipeline.run(ActionIntent::stop(at)) else {
                    debug!(tick, reason = "vetoed", kind = "stop", "Stop suppressed");
                    return MoveOutcome::Vetoed;
                };
                if !session.issuer.issue_stop(intent.position) {
                    warn!(tick, "Stop order rejected by issuer");
                    return MoveOutcome::Rejected;
                }
                self.gate.commit_stop(tick);
                info!(tick, x = intent.position.x, y = intent.position.y, "Stop issued");
                MoveOutcome::Stopped(intent.position)
            }
            MovePlan::Move {
                position,
                redirect_angle,
            } => {
                let Verdict::Proceed(intent) = self.pipeline.run(ActionIntent::movement(position))
                else {
                    debug!(tick, reason = "vetoed", kind = "move", "Move suppressed");
                    return MoveOutcome::Vetoed;
                };
                if !session.issuer.issue_move(intent.position) {
                    warn!(tick, "Move order rejected by issuer");
                    return MoveOutcome::Rejected;
                }
                self.gate.commit_move(tick);
                info!(
                    tick,
                    x = intent.position.x,
                    y = intent.position.y,
                    redirect_angle,
                    "Move issued"
                );
                MoveOutcome::Moved(intent.position)
            }
        }
    }

    /// The target the orchestrator would attack now.
    ///
    /// A forced target wins while it is valid and inside attack range;
    /// otherwise the provider picks for the active mode.
    pub fn target(&self, session: &Session<'_>) -> Option<Target> {
        let avatar = session.avatar.snapshot()?;
        self.pick_target(session, &avatar)
    }

    /// Whether dependent logic should hold off. Delegates to the provider.
    pub fn should_wait(&self, session: &Session<'_>) -> bool {
        session.targets.should_wait()
    }

    /// Enemy minions within `radius`. Delegates to the provider.
    pub fn nearby_minions(&self, session: &Session<'_>, radius: f32) -> Vec<Target> {
        session.targets.nearby_minions(radius)
    }

    /// The per-frame orbwalk step.
    ///
    /// Attacks when the attack cycle allows and a target exists, then moves
    /// toward `cursor` once the windup is over. Does nothing while disabled
    /// or with no active mode.
    pub fn update(&mut self, session: &mut Session<'_>, cursor: Vec3) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();
        let mode = self.modes.active();
        if !self.enabled || mode == OperatingMode::None {
            return outcome;
        }

        let tick = session.clock.current_tick();
        let Some(avatar) = session.avatar.snapshot() else {
            return outcome;
        };
        let extra = if mode.is_farming() {
            f32::from(self.config.delay.farm)
        } else {
            0.0
        };
        let view = self.view(session, &avatar, tick);
        if self.gate.can_attack(&view, extra) {
            if let Some(target) = self.pick_target(session, &avatar) {
                outcome.attack = Some(self.attack(session, Some(target)));
            }
        }

        let view = self.view(session, &avatar, tick);
        let windup = f32::from(self.config.delay.windup);
        if self.gate.can_move(&view, windup, !self.config.misc.missile_check) {
            outcome.movement = Some(self.move_to(session, cursor));
        }
        outcome
    }

    /// Append a listener to the cancellation pipeline.
    pub fn subscribe<L>(&mut self, listener: L) -> ListenerId
    where
        L: IntentListener + 'static,
    {
        self.pipeline.subscribe(listener)
    }

    /// Remove a pipeline listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.pipeline.unsubscribe(id)
    }

    /// Apply a mode toggle event and return the active mode.
    pub fn toggle_mode(&mut self, mode: OperatingMode, on: bool) -> OperatingMode {
        self.modes.toggle(mode, on)
    }

    /// Apply a mode toggle event by key name. Unknown names are ignored.
    pub fn toggle_named(&mut self, name: &str, on: bool) -> Option<OperatingMode> {
        self.modes.toggle_named(name, on)
    }

    /// The active operating mode.
    pub const fn active_mode(&self) -> OperatingMode {
        self.modes.active()
    }

    /// Enable or disable [`Self::update`]. Explicit attack and move calls
    /// are unaffected.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!(enabled, "Orbwalker toggled");
        }
        self.enabled = enabled;
    }

    /// Whether [`Self::update`] acts.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Prefer this entity over the provider's choice while it stays valid
    /// and in range. `None` clears it.
    pub const fn set_force_target(&mut self, id: Option<EntityId>) {
        self.force_target = id;
    }

    /// Replace the configuration. Gate state is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] or [`ConfigError::InvalidNumber`]
    /// and keeps the current configuration if `config` fails validation.
    pub fn set_config(&mut self, config: OrbwalkConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.gate.set_timing(config.timing.clone());
        self.config = config;
        Ok(())
    }

    /// The current configuration.
    pub const fn config(&self) -> &OrbwalkConfig {
        &self.config
    }

    /// The server started an attack animation at `tick`.
    pub const fn observe_attack_cast(&mut self, tick: Tick) {
        self.gate.observe_attack_cast(tick);
    }

    /// The current attack's projectile has been launched.
    pub const fn observe_missile_launched(&mut self) {
        self.gate.observe_missile_launched();
    }

    /// Read-only view of the timing state.
    pub const fn gate_state(&self) -> &GateState {
        self.gate.state()
    }

    fn pick_target(&self, session: &Session<'_>, avatar: &AvatarSnapshot) -> Option<Target> {
        let forced = self
            .force_target
            .and_then(|id| session.targets.resolve(id))
            .filter(|t| avatar.in_attack_range(t));
        forced.or_else(|| session.targets.target(self.modes.active()))
    }

    fn view<'a>(&self, session: &Session<'_>, avatar: &'a AvatarSnapshot, tick: Tick) -> GateView<'a> {
        let last_target_valid = self
            .gate
            .state()
            .last_target
            .as_ref()
            .is_some_and(|t| session.targets.is_valid(t.id));
        GateView {
            tick,
            ping_ms: session.clock.ping_ms(),
            avatar,
            last_target_valid,
        }
    }
}

impl<R> core::fmt::Debug for Orchestrator<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("gate", &self.gate)
            .field("pipeline", &self.pipeline)
            .field("mode", &self.modes.active())
            .field("enabled", &self.enabled)
            .field("force_target", &self.force_target)
            .finish_non_exhaustive()
    }
}
