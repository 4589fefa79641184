//! End-to-end arbitration tests for `orbwalk-core`.
//!
//! Every test drives an [`Orchestrator`] through the public API against a
//! hand-written host: a manually advanced clock, a scripted target
//! provider, a straight-line navigator, and an issuer that records orders.

#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::missing_panics_doc,
    clippy::too_many_lines
)]

use orbwalk_core::clock::SessionClock;
use orbwalk_core::config::OrbwalkConfig;
use orbwalk_core::gate::GateState;
use orbwalk_core::host::{AvatarSource, CommandIssuer, Navigator, Session, TargetProvider};
use orbwalk_core::orchestrator::{AttackOutcome, MoveOutcome, Orchestrator};
use orbwalk_core::pipeline::Verdict;
use orbwalk_core::planner::SuppressReason;
use orbwalk_types::{ActionIntent, AvatarSnapshot, EntityId, OperatingMode, Target, Vec3};
use rand::SeedableRng;
use rand::rngs::SmallRng;

// =============================================================================
// Host fakes
// =============================================================================

struct FixedAvatar(AvatarSnapshot);

impl AvatarSource for FixedAvatar {
    fn snapshot(&self) -> Option<AvatarSnapshot> {
        Some(self.0.clone())
    }
}

#[derive(Default)]
struct ScriptedTargets {
    live: Vec<Target>,
}

impl TargetProvider for ScriptedTargets {
    fn target(&self, _mode: OperatingMode) -> Option<Target> {
        self.live.first().cloned()
    }

    fn should_wait(&self) -> bool {
        !self.live.is_empty()
    }

    fn nearby_minions(&self, radius: f32) -> Vec<Target> {
        self.live
            .iter()
            .filter(|t| t.position.distance(Vec3::ZERO) <= radius)
            .cloned()
            .collect()
    }

    fn resolve(&self, id: EntityId) -> Option<Target> {
        self.live.iter().find(|t| t.id == id).cloned()
    }
}

struct StraightLine;

impl Navigator for StraightLine {
    fn path_to(&self, from: Vec3, to: Vec3) -> Vec<Vec3> {
        vec![from, to]
    }

    fn height_at(&self, _x: f32, _y: f32) -> f32 {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Order {
    Attack(EntityId),
    Move(Vec3),
    Stop(Vec3),
}

struct RecordingIssuer {
    accept: bool,
    orders: Vec<Order>,
}

impl CommandIssuer for RecordingIssuer {
    fn issue_attack(&mut self, target: &Target) -> bool {
        self.orders.push(Order::Attack(target.id));
        self.accept
    }

    fn issue_move(&mut self, position: Vec3) -> bool {
        self.orders.push(Order::Move(position));
        self.accept
    }

    fn issue_stop(&mut self, position: Vec3) -> bool {
        self.orders.push(Order::Stop(position));
        self.accept
    }
}

struct Host {
    clock: SessionClock,
    avatar: FixedAvatar,
    targets: ScriptedTargets,
    issuer: RecordingIssuer,
}

impl Host {
    fn new(ping_ms: u32) -> Self {
        Self {
            clock: SessionClock::new(50_000, ping_ms),
            avatar: FixedAvatar(AvatarSnapshot {
                identity: "Ezreal".to_owned(),
                position: Vec3::ZERO,
                server_position: Vec3::ZERO,
                bounding_radius: 50.0,
                attack_delay: 1.2,
                attack_cast_delay: 0.3,
                attack_range: 550.0,
                can_cancel_attack: true,
                path: Vec::new(),
                buffs: Vec::new(),
            }),
            targets: ScriptedTargets::default(),
            issuer: RecordingIssuer {
                accept: true,
                orders: Vec::new(),
            },
        }
    }

    fn session(&mut self) -> Session<'_> {
        Session {
            clock: &self.clock,
            avatar: &self.avatar,
            targets: &self.targets,
            navigator: &StraightLine,
            issuer: &mut self.issuer,
        }
    }

    fn spawn_minion(&mut self, x: f32) -> Target {
        let minion = Target {
            id: EntityId::new(),
            position: Vec3::flat(x, 0.0),
            bounding_radius: 48.0,
        };
        self.targets.live.push(minion.clone());
        minion
    }
}

fn orbwalker(seed: u64) -> Orchestrator<SmallRng> {
    let mut config = OrbwalkConfig::default();
    config.movement.randomize = false;
    Orchestrator::new(config, SmallRng::seed_from_u64(seed))
}

// =============================================================================
// Gate properties
// =============================================================================

#[test]
fn lockout_round_trip_uses_capped_latency() {
    for (ping, expected) in [(0, 50_070), (35, 50_105), (60, 50_130), (250, 50_130)] {
        let mut host = Host::new(ping);
        host.spawn_minion(300.0);
        let mut orb = orbwalker(1);
        assert!(matches!(orb.attack(&mut host.session(), None), AttackOutcome::Issued(_)));
        assert_eq!(orb.gate_state().block_orders_until_tick, expected, "ping {ping}");
    }
}

#[test]
fn blocked_ticks_issue_nothing_and_mutate_nothing() {
    let mut host = Host::new(40);
    host.spawn_minion(300.0);
    let mut orb = orbwalker(1);
    orb.toggle_mode(OperatingMode::Combo, true);
    orb.attack(&mut host.session(), None);
    let committed = orb.gate_state().clone();
    let orders = host.issuer.orders.len();

    for _ in 0..10 {
        host.clock.advance(10).unwrap();
        assert_eq!(orb.attack(&mut host.session(), None), AttackOutcome::Blocked);
        assert_eq!(
            orb.move_to(&mut host.session(), Vec3::flat(900.0, 0.0)),
            MoveOutcome::Blocked
        );
        let _ = orb.update(&mut host.session(), Vec3::flat(900.0, 0.0));
    }
    assert_eq!(orb.gate_state(), &committed);
    assert_eq!(host.issuer.orders.len(), orders);
}

#[test]
fn missile_launch_releases_movement_early() {
    let mut host = Host::new(0);
    host.spawn_minion(300.0);
    let mut orb = orbwalker(3);
    orb.toggle_mode(OperatingMode::Combo, true);
    orb.update(&mut host.session(), Vec3::flat(800.0, 0.0));
    orb.observe_attack_cast(50_000);

    host.clock.advance(150).unwrap();
    assert_eq!(orb.update(&mut host.session(), Vec3::flat(800.0, 0.0)).movement, None);

    orb.observe_missile_launched();
    let outcome = orb.update(&mut host.session(), Vec3::flat(800.0, 0.0));
    assert_eq!(outcome.movement, Some(MoveOutcome::Moved(Vec3::flat(800.0, 0.0))));
}

#[test]
fn attack_speed_guard_waits_for_windup_delay() {
    let mut host = Host::new(0);
    host.avatar.0.attack_delay = 0.35;
    host.spawn_minion(300.0);
    let mut orb = orbwalker(4);
    assert!(matches!(orb.attack(&mut host.session(), None), AttackOutcome::Issued(_)));
    orb.observe_attack_cast(50_000);

    // cast 300 + guard 500 + windup delay 80
    host.clock.advance(850).unwrap();
    assert_eq!(
        orb.move_to(&mut host.session(), Vec3::flat(900.0, 0.0)),
        MoveOutcome::Suppressed(SuppressReason::AttackSpeedGuard)
    );

    host.clock.advance(30).unwrap();
    assert_eq!(
        orb.move_to(&mut host.session(), Vec3::flat(900.0, 0.0)),
        MoveOutcome::Moved(Vec3::flat(900.0, 0.0))
    );
}

// =============================================================================
// Pipeline properties
// =============================================================================

#[test]
fn veto_means_no_command_and_no_mutation() {
    let mut host = Host::new(30);
    host.spawn_minion(300.0);
    let mut orb = orbwalker(1);
    orb.subscribe(|_: &ActionIntent| Verdict::Veto);

    assert_eq!(orb.attack(&mut host.session(), None), AttackOutcome::Vetoed);
    assert_eq!(
        orb.move_to(&mut host.session(), Vec3::flat(900.0, 0.0)),
        MoveOutcome::Vetoed
    );
    assert!(host.issuer.orders.is_empty());
    assert_eq!(orb.gate_state(), &GateState::default());
}

#[test]
fn attack_rejection_leaves_ticks_untouched() {
    let mut host = Host::new(30);
    host.spawn_minion(300.0);
    host.issuer.accept = false;
    let mut orb = orbwalker(1);
    assert_eq!(orb.attack(&mut host.session(), None), AttackOutcome::Rejected);
    assert_eq!(
        orb.move_to(&mut host.session(), Vec3::flat(900.0, 0.0)),
        MoveOutcome::Rejected
    );
    assert_eq!(orb.gate_state(), &GateState::default());
    assert_eq!(host.issuer.orders.len(), 2);
}

// =============================================================================
// Movement scenarios
// =============================================================================

#[test]
fn hold_radius_produces_stop() {
    let mut host = Host::new(30);
    host.avatar.0.path = vec![Vec3::ZERO, Vec3::flat(500.0, 0.0)];
    let mut config = OrbwalkConfig::default();
    config.movement.extra_hold = 20;
    let mut orb = Orchestrator::new(config, SmallRng::seed_from_u64(5));

    let outcome = orb.move_to(&mut host.session(), Vec3::flat(60.0, 0.0));
    assert_eq!(outcome, MoveOutcome::Stopped(Vec3::ZERO));
    assert_eq!(host.issuer.orders, vec![Order::Stop(Vec3::ZERO)]);
}

#[test]
fn hold_radius_without_path_is_silent() {
    let mut host = Host::new(30);
    let mut config = OrbwalkConfig::default();
    config.movement.extra_hold = 20;
    let mut orb = Orchestrator::new(config, SmallRng::seed_from_u64(5));

    let outcome = orb.move_to(&mut host.session(), Vec3::flat(60.0, 0.0));
    assert_eq!(outcome, MoveOutcome::Suppressed(SuppressReason::Holding));
    assert!(host.issuer.orders.is_empty());
}

#[test]
fn near_destination_is_extended() {
    for seed in 0..20 {
        let mut host = Host::new(30);
        host.avatar.0.position = Vec3::flat(0.0, 150.0);
        let mut orb = orbwalker(seed);
        let MoveOutcome::Moved(at) = orb.move_to(&mut host.session(), Vec3::flat(10.0, 0.0)) else {
            panic!("seed {seed}: expected a move");
        };
        let reach = at.distance(Vec3::ZERO);
        assert!((50.0..=100.0).contains(&reach), "seed {seed}: {reach}");
        assert!(at.y.abs() < 1e-3);
    }
}

#[test]
fn far_destination_is_clamped() {
    for seed in 0..20 {
        let mut host = Host::new(30);
        let mut orb = orbwalker(seed);
        let MoveOutcome::Moved(at) = orb.move_to(&mut host.session(), Vec3::flat(2_000.0, 0.0))
        else {
            panic!("seed {seed}: expected a move");
        };
        let reach = at.distance(Vec3::ZERO);
        assert!((1_475.0..=1_525.0).contains(&reach), "seed {seed}: {reach}");
    }
}

#[test]
fn same_seed_same_orders() {
    let run = |seed| {
        let mut host = Host::new(30);
        let mut config = OrbwalkConfig::default();
        config.movement.randomize = true;
        let mut orb = Orchestrator::new(config, SmallRng::seed_from_u64(seed));
        for step in 0..5_u8 {
            host.clock.advance(200).unwrap();
            let x = 400.0 + f32::from(step) * 300.0;
            orb.move_to(&mut host.session(), Vec3::flat(x, 0.0));
        }
        host.issuer.orders
    };
    assert_eq!(run(42), run(42));
}

// =============================================================================
// Modes and delegation
// =============================================================================

#[test]
fn mode_fallback_combo_to_lasthit() {
    let mut orb = orbwalker(1);
    orb.toggle_mode(OperatingMode::LastHit, true);
    orb.toggle_mode(OperatingMode::Combo, true);
    assert_eq!(orb.active_mode(), OperatingMode::Combo);
    orb.toggle_mode(OperatingMode::Combo, false);
    assert_eq!(orb.active_mode(), OperatingMode::LastHit);
}

#[test]
fn farming_modes_wait_for_farm_delay() {
    let mut host = Host::new(0);
    host.spawn_minion(300.0);
    let mut orb = orbwalker(1);
    orb.observe_attack_cast(48_800);
    // 50_000 + 25 >= 48_800 + 1_200 passes in combo but not with +30ms farm delay
    orb.toggle_mode(OperatingMode::LaneClear, true);
    assert_eq!(orb.update(&mut host.session(), Vec3::flat(900.0, 0.0)).attack, None);

    orb.toggle_mode(OperatingMode::Combo, true);
    assert!(matches!(
        orb.update(&mut host.session(), Vec3::flat(900.0, 0.0)).attack,
        Some(AttackOutcome::Issued(_))
    ));
}

#[test]
fn delegation_reaches_the_provider() {
    let mut host = Host::new(0);
    let orb = orbwalker(1);
    assert!(!orb.should_wait(&host.session()));
    let near = host.spawn_minion(300.0);
    host.spawn_minion(1_200.0);
    assert!(orb.should_wait(&host.session()));
    let minions = orb.nearby_minions(&host.session(), 500.0);
    assert_eq!(minions.len(), 1);
    assert_eq!(minions[0].id, near.id);
    assert_eq!(orb.target(&host.session()).map(|t| t.id), Some(near.id));
}
