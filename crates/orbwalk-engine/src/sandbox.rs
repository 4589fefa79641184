//! Scripted sandbox: a minimal lane the engine drives the orbwalker in.
//!
//! The sandbox stands in for a live game session. It owns a
//! [`SessionClock`], one avatar, a wave of minions, flat terrain, and an
//! order log, and exposes them to the orchestrator as a [`Session`]. After
//! each decision, [`Sandbox::step`] advances time, applies the orders the
//! orchestrator issued, plays out attack animations, and reports the
//! animation events the host must forward.
//!
//! Nothing here models real game rules beyond what the decision core
//! needs to see: attacks land after their windup, minions die after a few
//! hits, and the avatar walks its path at a fixed speed.

use orbwalk_core::clock::{Clock, ClockError, SessionClock};
use orbwalk_core::host::{AvatarSource, CommandIssuer, Navigator, Session, TargetProvider};
use orbwalk_types::{AvatarSnapshot, EntityId, OperatingMode, Target, Tick, Vec3};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::config::SessionConfig;

/// Avatar walking speed in units per second.
const MOVE_SPEED: f32 = 330.0;

/// How often the simulated cursor picks a new spot, in milliseconds.
const CURSOR_PERIOD_MS: u64 = 1_500;

/// Animation notifications the host forwards to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    /// The server started the attack animation at this tick.
    AttackCast(Tick),
    /// The attack's projectile left.
    MissileLaunched,
}

/// An order as recorded by the sandbox issuer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Order {
    /// Attack the entity.
    Attack(EntityId),
    /// Walk to the position.
    Move(Vec3),
    /// Stop in place.
    Stop,
}

/// The controlled avatar.
#[derive(Debug, Clone)]
pub struct SandboxAvatar {
    state: AvatarSnapshot,
}

impl SandboxAvatar {
    fn new() -> Self {
        Self {
            state: AvatarSnapshot {
                identity: "Ashe".to_owned(),
                position: Vec3::ZERO,
                server_position: Vec3::ZERO,
                bounding_radius: 65.0,
                attack_delay: 1.45,
                attack_cast_delay: 0.22,
                attack_range: 600.0,
                can_cancel_attack: true,
                path: Vec::new(),
                buffs: Vec::new(),
            },
        }
    }

    fn walk(&mut self, dt_ms: u64) {
        let Some(&destination) = self.state.path.last() else {
            return;
        };
        let stride = MOVE_SPEED * ms_to_secs(dt_ms);
        let here = self.state.position;
        let next = if here.distance(destination) <= stride {
            self.state.path.clear();
            destination
        } else {
            let next = here.extend(destination, stride);
            self.state.path = vec![next, destination];
            next
        };
        self.state.position = next;
        self.state.server_position = next;
    }
}

impl AvatarSource for SandboxAvatar {
    fn snapshot(&self) -> Option<AvatarSnapshot> {
        Some(self.state.clone())
    }
}

#[derive(Debug, Clone)]
struct Minion {
    target: Target,
    health: u8,
}

/// The minions in the lane, as seen by target selection.
#[derive(Debug, Clone, Default)]
pub struct MinionWave {
    minions: Vec<Minion>,
    /// Avatar position as of the last step.
    origin: Vec3,
    /// Attack reach as of the last step, center to center minus the
    /// target's radius.
    reach: f32,
}

impl MinionWave {
    fn in_reach(&self, minion: &Minion) -> bool {
        minion.target.position.distance(self.origin) <= self.reach + minion.target.bounding_radius
    }

    fn nearest<'a, I>(&self, candidates: I) -> Option<Target>
    where
        I: Iterator<Item = &'a Minion>,
    {
        candidates
            .filter(|m| self.in_reach(m))
            .min_by(|a, b| {
                let da = a.target.position.distance_squared(self.origin);
                let db = b.target.position.distance_squared(self.origin);
                da.total_cmp(&db)
            })
            .map(|m| m.target.clone())
    }

    /// Apply one hit. Returns `true` if the minion died.
    fn hit(&mut self, id: EntityId) -> bool {
        let Some(index) = self.minions.iter().position(|m| m.target.id == id) else {
            return false;
        };
        let Some(minion) = self.minions.get_mut(index) else {
            return false;
        };
        minion.health = minion.health.saturating_sub(1);
        if minion.health == 0 {
            self.minions.swap_remove(index);
            true
        } else {
            false
        }
    }

    fn spawn(&mut self, rng: &mut impl Rng) {
        let angle = rng.random_range(0.0..core::f32::consts::TAU);
        let distance = rng.random_range(300.0..750.0_f32);
        self.minions.push(Minion {
            target: Target {
                id: EntityId::new(),
                position: Vec3::flat(distance * angle.cos(), distance * angle.sin()),
                bounding_radius: 48.0,
            },
            health: rng.random_range(1..=4),
        });
    }
}

impl TargetProvider for MinionWave {
    fn target(&self, mode: OperatingMode) -> Option<Target> {
        match mode {
            OperatingMode::None => None,
            OperatingMode::LastHit | OperatingMode::Hybrid => {
                self.nearest(self.minions.iter().filter(|m| m.health == 1))
            }
            OperatingMode::LaneClear | OperatingMode::Combo => self.nearest(self.minions.iter()),
        }
    }

    fn should_wait(&self) -> bool {
        self.minions.iter().any(|m| m.health == 2 && self.in_reach(m))
    }

    fn nearby_minions(&self, radius: f32) -> Vec<Target> {
        self.minions
            .iter()
            .filter(|m| m.target.position.distance(self.origin) <= radius)
            .map(|m| m.target.clone())
            .collect()
    }

    fn resolve(&self, id: EntityId) -> Option<Target> {
        self.minions
            .iter()
            .find(|m| m.target.id == id)
            .map(|m| m.target.clone())
    }
}

/// Straight-line pathing on flat ground.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTerrain;

impl Navigator for FlatTerrain {
    fn path_to(&self, from: Vec3, to: Vec3) -> Vec<Vec3> {
        vec![from, to]
    }

    fn height_at(&self, _x: f32, _y: f32) -> f32 {
        0.0
    }
}

/// Issuer that queues orders for the next [`Sandbox::step`].
#[derive(Debug, Clone, Default)]
pub struct OrderLog {
    pending: Vec<Order>,
}

impl CommandIssuer for OrderLog {
    fn issue_attack(&mut self, target: &Target) -> bool {
        self.pending.push(Order::Attack(target.id));
        true
    }

    fn issue_move(&mut self, position: Vec3) -> bool {
        self.pending.push(Order::Move(position));
        true
    }

    fn issue_stop(&mut self, _position: Vec3) -> bool {
        self.pending.push(Order::Stop);
        true
    }
}

#[derive(Debug, Clone, Copy)]
struct Swing {
    target: EntityId,
    cast_at: Tick,
    launch_at: Tick,
    cast_reported: bool,
}

/// A complete scripted session.
#[derive(Debug)]
pub struct Sandbox {
    clock: SessionClock,
    avatar: SandboxAvatar,
    wave: MinionWave,
    terrain: FlatTerrain,
    orders: OrderLog,
    swing: Option<Swing>,
    cursor: Vec3,
    next_cursor_at: Tick,
    minion_count: usize,
    minions_killed: u64,
    rng: SmallRng,
}

impl Sandbox {
    /// Build the lane described by `config`.
    pub fn new(config: &SessionConfig) -> Self {
        let mut sandbox = Self {
            clock: SessionClock::new(0, config.ping_ms),
            avatar: SandboxAvatar::new(),
            wave: MinionWave::default(),
            terrain: FlatTerrain,
            orders: OrderLog::default(),
            swing: None,
            cursor: Vec3::ZERO,
            next_cursor_at: 0,
            minion_count: usize::from(config.minion_count),
            minions_killed: 0,
            rng: SmallRng::seed_from_u64(config.seed.rotate_left(17)),
        };
        sandbox.refresh_wave();
        sandbox
    }

    /// Borrow the sandbox as a [`Session`] for one orchestrator call.
    pub fn session(&mut self) -> Session<'_> {
        Session {
            clock: &self.clock,
            avatar: &self.avatar,
            targets: &self.wave,
            navigator: &self.terrain,
            issuer: &mut self.orders,
        }
    }

    /// The current tick.
    pub fn tick(&self) -> Tick {
        self.clock.current_tick()
    }

    /// Where the simulated player is pointing.
    pub const fn cursor(&self) -> Vec3 {
        self.cursor
    }

    /// Minions killed so far.
    pub const fn minions_killed(&self) -> u64 {
        self.minions_killed
    }

    /// Advance the session by `dt_ms` and play out pending orders.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the clock cannot advance.
    pub fn step(&mut self, dt_ms: u64) -> Result<Vec<AnimationEvent>, ClockError> {
        let issued_at = self.clock.current_tick();
        let now = self.clock.advance(dt_ms)?;
        let half_ping = u64::from(self.clock.ping_ms() / 2);

        for order in std::mem::take(&mut self.orders.pending) {
            match order {
                Order::Attack(target) => {
                    self.avatar.state.path.clear();
                    let cast_at = issued_at.saturating_add(half_ping);
                    let windup = secs_to_ms(self.avatar.state.attack_cast_delay);
                    self.swing = Some(Swing {
                        target,
                        cast_at,
                        launch_at: cast_at.saturating_add(windup),
                        cast_reported: false,
                    });
                }
                Order::Move(to) => {
                    self.avatar.state.path = vec![self.avatar.state.position, to];
                    self.cancel_unlaunched_swing(now);
                }
                Order::Stop => {
                    self.avatar.state.path.clear();
                    self.cancel_unlaunched_swing(now);
                }
            }
        }

        let mut events = Vec::new();
        if let Some(mut swing) = self.swing.take() {
            if !swing.cast_reported && now >= swing.cast_at {
                events.push(AnimationEvent::AttackCast(swing.cast_at));
                swing.cast_reported = true;
            }
            if now >= swing.launch_at {
                events.push(AnimationEvent::MissileLaunched);
                if self.wave.hit(swing.target) {
                    self.minions_killed = self.minions_killed.saturating_add(1);
                    debug!(tick = now, minion = %swing.target, "Minion killed");
                }
            } else {
                self.swing = Some(swing);
            }
        }

        self.avatar.walk(dt_ms);
        self.refresh_wave();
        if now >= self.next_cursor_at {
            self.wander_cursor();
            self.next_cursor_at = now.saturating_add(CURSOR_PERIOD_MS);
        }
        Ok(events)
    }

    fn cancel_unlaunched_swing(&mut self, now: Tick) {
        if self.avatar.state.can_cancel_attack
            && self.swing.is_some_and(|s| now < s.launch_at)
        {
            debug!(tick = now, "Attack animation cancelled");
            self.swing = None;
        }
    }

    fn refresh_wave(&mut self) {
        while self.wave.minions.len() < self.minion_count {
            self.wave.spawn(&mut self.rng);
        }
        let avatar = &self.avatar.state;
        self.wave.origin = avatar.server_position;
        self.wave.reach = avatar.attack_range + avatar.bounding_radius;
    }

    fn wander_cursor(&mut self) {
        let angle = self.rng.random_range(0.0..core::f32::consts::TAU);
        let distance = self.rng.random_range(0.0..900.0_f32);
        self.cursor = Vec3::flat(distance * angle.cos(), distance * angle.sin());
    }
}

#[allow(clippy::cast_precision_loss)]
fn ms_to_secs(ms: u64) -> f32 {
    ms as f32 / 1000.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn secs_to_ms(secs: f32) -> u64 {
    (secs.max(0.0) * 1000.0).round() as u64
}
