//! Movement planner: turns a desired destination into the order that should
//! actually be sent, or into a reason not to send one.
//!
//! The planner is pure apart from the injected RNG. It never issues orders
//! or touches [`GateState`](crate::gate::GateState); the orchestrator runs
//! the resulting plan through the cancellation pipeline and commits it.
//!
//! Steps, in order:
//!
//! 1. Movement delay and attack-speed guard.
//! 2. Hold radius: destinations inside the avatar's hold radius become a
//!    stop at the server position (or nothing, if already standing still).
//! 3. Destinations closer than the bounding radius to the server position
//!    are pushed out along the same ray, so the server does not reject a
//!    zero-length move.
//! 4. Destinations beyond the maximum distance are pulled in, with jitter so
//!    consecutive orders do not sit exactly on the boundary.
//! 5. Optional randomization of long orders around the destination.
//! 6. Path-deviation suppression: a new order that would produce the same
//!    trajectory as the current path is dropped.
//! 7. Throttle: small redirects wait for the full order lockout; large
//!    redirects only for a short interval.

use core::f32::consts::TAU;

use orbwalk_types::{AvatarSnapshot, Vec3, path_length};
use rand::Rng;

use crate::config::OrbwalkConfig;
use crate::gate::{ActionGate, GateView};
use crate::host::Navigator;

/// Why a movement request produced no order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Inside the user-configured minimum interval between moves.
    MovementDelay,
    /// High attack speed; this attack cycle does not kite.
    AttackSpeedGuard,
    /// Destination is inside the hold radius and the avatar is not moving.
    Holding,
    /// The current path already serves the destination.
    PathDeviation,
    /// Too soon after the previous movement order.
    Throttled,
}

impl core::fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::MovementDelay => "movement_delay",
            Self::AttackSpeedGuard => "attack_speed_guard",
            Self::Holding => "holding",
            Self::PathDeviation => "path_deviation",
            Self::Throttled => "throttled",
        };
        f.write_str(name)
    }
}

/// What the planner decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovePlan {
    /// Stop in place at this (server) position.
    Stop(Vec3),
    /// Move to `position`.
    Move {
        /// Final destination after shaping.
        position: Vec3,
        /// Angle (degrees) between the current and the new first path
        /// segment; 0 when the avatar had no significant path.
        redirect_angle: f32,
    },
    /// No order.
    Suppressed(SuppressReason),
}

/// Shapes movement requests against configuration and gate state.
#[derive(Debug, Clone, Copy)]
pub struct MovementPlanner<'a> {
    config: &'a OrbwalkConfig,
    gate: &'a ActionGate,
}

impl<'a> MovementPlanner<'a> {
    /// Create a planner reading `config` and `gate`.
    pub const fn new(config: &'a OrbwalkConfig, gate: &'a ActionGate) -> Self {
        Self { config, gate }
    }

    /// Plan a movement order towards `destination`.
    pub fn plan<R: Rng>(
        &self,
        view: &GateView<'_>,
        destination: Vec3,
        navigator: &dyn Navigator,
        rng: &mut R,
    ) -> MovePlan {
        let avatar = view.avatar;
        let state = self.gate.state();
        let since_last_move = view.tick.saturating_sub(state.last_movement_command_tick);

        if since_last_move < u64::from(self.config.delay.movement) {
            return MovePlan::Suppressed(SuppressReason::MovementDelay);
        }

        if self.attack_speed_guard_engaged(view) {
            return MovePlan::Suppressed(SuppressReason::AttackSpeedGuard);
        }

        let hold_radius = avatar.bounding_radius + f32::from(self.config.movement.extra_hold);
        if destination.distance(avatar.position) < hold_radius {
            if avatar.path.is_empty() {
                return MovePlan::Suppressed(SuppressReason::Holding);
            }
            return MovePlan::Stop(avatar.server_position);
        }

        let position = self.shape_destination(avatar, destination, navigator, rng);

        let redirect_angle = match self.compare_paths(avatar, position, navigator) {
            PathComparison::Redundant => {
                return MovePlan::Suppressed(SuppressReason::PathDeviation);
            }
            PathComparison::Redirect(angle) => angle,
            PathComparison::NoPath => 0.0,
        };

        let timing = &self.config.timing;
        let lockout = self.gate.order_lockout(view.ping_ms);
        if redirect_angle < timing.large_angle {
            if since_last_move < lockout {
                return MovePlan::Suppressed(SuppressReason::Throttled);
            }
        } else if since_last_move < u64::from(timing.large_angle_interval) {
            return MovePlan::Suppressed(SuppressReason::Throttled);
        }

        MovePlan::Move {
            position,
            redirect_angle,
        }
    }

    /// At very high attack speed, only every Nth attack cycle is allowed to
    /// kite; the rest stand still unless the attack is long finished.
    fn attack_speed_guard_engaged(&self, view: &GateView<'_>) -> bool {
        let misc = &self.config.misc;
        if !misc.attack_speed_guard || misc.attack_speed_threshold <= 0.0 {
            return false;
        }
        if view.avatar.attack_delay >= 1.0 / misc.attack_speed_threshold {
            return false;
        }
        let off_cycle = self
            .gate
            .state()
            .total_attacks_issued
            .checked_rem(u64::from(misc.attack_speed_guard_period))
            .is_some_and(|r| r != 0);
        let windup = misc.attack_speed_guard_windup + f32::from(self.config.delay.windup);
        off_cycle && !self.gate.can_move(view, windup, true)
    }

    /// Extension, clamping, and randomization.
    fn shape_destination<R: Rng>(
        &self,
        avatar: &AvatarSnapshot,
        destination: Vec3,
        navigator: &dyn Navigator,
        rng: &mut R,
    ) -> Vec3 {
        let movement = &self.config.movement;
        let timing = &self.config.timing;
        let server = avatar.server_position;
        let mut position = destination;

        if position.distance(server) < avatar.bounding_radius {
            let jitter = f32::from(rng.random_range(0..=timing.jitter));
            position = server.extend(position, avatar.bounding_radius + jitter);
        }

        let max_distance = f32::from(movement.max_distance);
        if position.distance(server) > max_distance {
            let jitter = f32::from(rng.random_range(0..=timing.jitter));
            let reach = max_distance + f32::from(timing.clamp_overshoot) - jitter;
            position = server.extend(position, reach);
        }

        if movement.randomize && avatar.position.distance(position) > movement.randomize_min_distance {
            let angle = rng.random::<f32>() * TAU;
            let radius = avatar.bounding_radius / 2.0;
            let x = radius.mul_add(angle.cos(), position.x);
            let y = radius.mul_add(angle.sin(), position.y);
            position = Vec3::new(x, y, navigator.height_at(x, y));
        }

        position
    }

    fn compare_paths(
        &self,
        avatar: &AvatarSnapshot,
        position: Vec3,
        navigator: &dyn Navigator,
    ) -> PathComparison {
        let deviation = &self.config.deviation;
        let current = avatar.path.as_slice();
        if current.len() < 2 || path_length(current) <= deviation.min_path_length {
            return PathComparison::NoPath;
        }
        let proposed = navigator.path_to(avatar.position, position);
        let (Some(v1), Some(v2)) = (first_segment(current), first_segment(&proposed)) else {
            return PathComparison::NoPath;
        };
        let (Some(end_now), Some(end_new)) = (current.last(), proposed.last()) else {
            return PathComparison::NoPath;
        };

        let angle = v1.angle_between(v2);
        let endpoint_gap = end_new.distance_squared(*end_now);
        let converge = deviation.converge_distance * deviation.converge_distance;
        let endpoint = deviation.endpoint_distance * deviation.endpoint_distance;
        if (angle < deviation.angle && endpoint_gap < converge) || endpoint_gap < endpoint {
            PathComparison::Redundant
        } else {
            PathComparison::Redirect(angle)
        }
    }
}

enum PathComparison {
    /// No significant current path, or no path to the new destination.
    NoPath,
    /// The new order would not change the trajectory.
    Redundant,
    /// A genuine redirect by this many degrees.
    Redirect(f32),
}

fn first_segment(path: &[Vec3]) -> Option<Vec3> {
    match path {
        [a, b, ..] => Some(*b - *a),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use orbwalk_types::{EntityId, Target};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::config::TimingConfig;
    use crate::windup::WindupOverrides;

    /// Straight-line navigation on flat ground.
    struct FlatGround;

    impl Navigator for FlatGround {
        fn path_to(&self, from: Vec3, to: Vec3) -> Vec<Vec3> {
            vec![from, to]
        }

        fn height_at(&self, _x: f32, _y: f32) -> f32 {
            12.5
        }
    }

    fn avatar() -> AvatarSnapshot {
        AvatarSnapshot {
            identity: "Vayne".to_owned(),
            position: Vec3::ZERO,
            server_position: Vec3::ZERO,
            bounding_radius: 50.0,
            attack_delay: 1.0,
            attack_cast_delay: 0.3,
            attack_range: 550.0,
            can_cancel_attack: true,
            path: Vec::new(),
            buffs: Vec::new(),
        }
    }

    fn config() -> OrbwalkConfig {
        let mut config = OrbwalkConfig::default();
        config.movement.randomize = false;
        config
    }

    fn gate() -> ActionGate {
        ActionGate::new(TimingConfig::default(), WindupOverrides::new())
    }

    fn view(avatar: &AvatarSnapshot) -> GateView<'_> {
        GateView {
            tick: 10_000,
            ping_ms: 40,
            avatar,
            last_target_valid: false,
        }
    }

    fn plan_with(config: &OrbwalkConfig, gate: &ActionGate, avatar: &AvatarSnapshot, to: Vec3, seed: u64) -> MovePlan {
        let mut rng = SmallRng::seed_from_u64(seed);
        MovementPlanner::new(config, gate).plan(&view(avatar), to, &FlatGround, &mut rng)
    }

    fn moved_to(plan: MovePlan) -> Vec3 {
        match plan {
            MovePlan::Move { position, .. } => position,
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[test]
    fn destination_inside_hold_radius_stops() {
        let mut config = config();
        config.movement.extra_hold = 20;
        let mut a = avatar();
        a.server_position = Vec3::flat(3.0, 0.0);
        a.path = vec![Vec3::ZERO, Vec3::flat(300.0, 0.0)];
        let plan = plan_with(&config, &gate(), &a, Vec3::flat(60.0, 0.0), 1);
        assert_eq!(plan, MovePlan::Stop(Vec3::flat(3.0, 0.0)));
    }

    #[test]
    fn hold_radius_while_standing_still_does_nothing() {
        let mut config = config();
        config.movement.extra_hold = 20;
        let plan = plan_with(&config, &gate(), &avatar(), Vec3::flat(60.0, 0.0), 1);
        assert_eq!(plan, MovePlan::Suppressed(SuppressReason::Holding));
    }

    #[test]
    fn near_server_destination_is_extended_along_ray() {
        let config = config();
        let mut a = avatar();
        // client prediction has run ahead of the server
        a.position = Vec3::flat(200.0, 0.0);
        for seed in 0..32 {
            let out = moved_to(plan_with(&config, &gate(), &a, Vec3::flat(10.0, 0.0), seed));
            let dist = out.distance(a.server_position);
            assert!((50.0..=100.0).contains(&dist), "seed {seed}: {dist}");
            assert!(out.y.abs() < 1e-3, "left the ray: {out:?}");
            assert!(out.x > 0.0);
        }
    }

    #[test]
    fn far_destination_is_clamped() {
        let config = config();
        for seed in 0..32 {
            let out = moved_to(plan_with(&config, &gate(), &avatar(), Vec3::flat(2000.0, 0.0), seed));
            let dist = out.distance(Vec3::ZERO);
            assert!((1475.0..=1525.0).contains(&dist), "seed {seed}: {dist}");
        }
    }

    #[test]
    fn randomization_stays_within_half_radius() {
        let mut config = config();
        config.movement.randomize = true;
        let target = Vec3::flat(800.0, 0.0);
        let mut saw_offset = false;
        for seed in 0..16 {
            let out = moved_to(plan_with(&config, &gate(), &avatar(), target, seed));
            assert!(out.distance(target) <= 25.0 + 1e-3);
            assert!((out.z - 12.5).abs() < f32::EPSILON);
            saw_offset |= out.distance(target) > 1.0;
        }
        assert!(saw_offset);
    }

    #[test]
    fn short_orders_are_not_randomized() {
        let mut config = config();
        config.movement.randomize = true;
        let target = Vec3::flat(300.0, 0.0);
        let out = moved_to(plan_with(&config, &gate(), &avatar(), target, 9));
        assert_eq!(out, target);
    }

    #[test]
    fn same_trajectory_is_suppressed() {
        let config = config();
        let mut a = avatar();
        a.path = vec![Vec3::ZERO, Vec3::flat(600.0, 0.0)];
        // parallel, endpoints 300 apart: inside 500
        let plan = plan_with(&config, &gate(), &a, Vec3::flat(900.0, 0.0), 1);
        assert_eq!(plan, MovePlan::Suppressed(SuppressReason::PathDeviation));
    }

    #[test]
    fn nearby_endpoint_is_suppressed_regardless_of_angle() {
        let config = config();
        let mut a = avatar();
        a.path = vec![Vec3::ZERO, Vec3::flat(0.0, 200.0), Vec3::flat(400.0, 200.0)];
        let plan = plan_with(&config, &gate(), &a, Vec3::flat(420.0, 210.0), 1);
        assert_eq!(plan, MovePlan::Suppressed(SuppressReason::PathDeviation));
    }

    #[test]
    fn real_redirect_passes_with_angle() {
        let config = config();
        let mut a = avatar();
        a.path = vec![Vec3::ZERO, Vec3::flat(600.0, 0.0)];
        match plan_with(&config, &gate(), &a, Vec3::flat(0.0, 600.0), 1) {
            MovePlan::Move { redirect_angle, .. } => assert!((redirect_angle - 90.0).abs() < 1e-3),
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[test]
    fn short_current_path_is_ignored() {
        let config = config();
        let mut a = avatar();
        a.path = vec![Vec3::ZERO, Vec3::flat(80.0, 0.0)];
        let out = moved_to(plan_with(&config, &gate(), &a, Vec3::flat(120.0, 0.0), 1));
        assert_eq!(out, Vec3::flat(120.0, 0.0));
    }

    #[test]
    fn small_redirect_waits_for_lockout() {
        let config = config();
        let mut g = gate();
        // lockout = 70 + min(60, 40) = 110
        g.commit_move(9_900);
        let plan = plan_with(&config, &g, &avatar(), Vec3::flat(400.0, 0.0), 1);
        assert_eq!(plan, MovePlan::Suppressed(SuppressReason::Throttled));

        let mut g = gate();
        g.commit_move(9_890);
        assert!(matches!(
            plan_with(&config, &g, &avatar(), Vec3::flat(400.0, 0.0), 1),
            MovePlan::Move { .. }
        ));
    }

    #[test]
    fn large_redirect_only_waits_short_interval() {
        let config = config();
        let mut a = avatar();
        a.path = vec![Vec3::ZERO, Vec3::flat(600.0, 0.0)];
        let mut g = gate();
        // 70ms since the last move: inside the 110ms lockout but past 60ms
        g.commit_move(9_930);
        assert!(matches!(
            plan_with(&config, &g, &a, Vec3::flat(-400.0, 0.0), 1),
            MovePlan::Move { .. }
        ));
        let mut g = gate();
        g.commit_move(9_970);
        assert_eq!(
            plan_with(&config, &g, &a, Vec3::flat(-400.0, 0.0), 1),
            MovePlan::Suppressed(SuppressReason::Throttled)
        );
    }

    #[test]
    fn movement_delay_applies_first() {
        let mut config = config();
        config.delay.movement = 300;
        let mut g = gate();
        g.commit_move(9_800);
        assert_eq!(
            plan_with(&config, &g, &avatar(), Vec3::flat(400.0, 0.0), 1),
            MovePlan::Suppressed(SuppressReason::MovementDelay)
        );
    }

    #[test]
    fn attack_speed_guard_skips_off_cycles() {
        let config = config();
        let mut a = avatar();
        a.attack_delay = 0.35;
        let mut g = gate();
        let t = Target {
            id: EntityId::new(),
            position: Vec3::flat(300.0, 0.0),
            bounding_radius: 30.0,
        };
        let early = GateView {
            tick: 9_000,
            ping_ms: 0,
            avatar: &a,
            last_target_valid: true,
        };
        g.commit_attack(&early, &t);
        g.observe_attack_cast(9_950);
        // one attack issued: 1 % 3 != 0 and the guard's 500ms windup is not over
        assert_eq!(
            plan_with(&config, &g, &a, Vec3::flat(400.0, 0.0), 1),
            MovePlan::Suppressed(SuppressReason::AttackSpeedGuard)
        );

        let mut relaxed = config.clone();
        relaxed.misc.attack_speed_guard = false;
        assert!(matches!(
            plan_with(&relaxed, &g, &a, Vec3::flat(400.0, 0.0), 1),
            MovePlan::Move { .. }
        ));
    }

    #[test]
    fn attack_speed_guard_adds_windup_delay() {
        let config = config();
        let mut a = avatar();
        a.attack_delay = 0.35;
        let mut g = gate();
        let t = Target {
            id: EntityId::new(),
            position: Vec3::flat(300.0, 0.0),
            bounding_radius: 30.0,
        };
        let early = GateView {
            tick: 9_000,
            ping_ms: 0,
            avatar: &a,
            last_target_valid: true,
        };
        g.commit_attack(&early, &t);
        g.observe_attack_cast(9_200);
        // 10_020 clears cast + 300 + 500 but not the extra 80ms windup delay
        assert_eq!(
            plan_with(&config, &g, &a, Vec3::flat(400.0, 0.0), 1),
            MovePlan::Suppressed(SuppressReason::AttackSpeedGuard)
        );

        let mut no_windup = config.clone();
        no_windup.delay.windup = 0;
        assert!(matches!(
            plan_with(&no_windup, &g, &a, Vec3::flat(400.0, 0.0), 1),
            MovePlan::Move { .. }
        ));
    }
}
