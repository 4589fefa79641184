//! Interfaces to the live session the orbwalker acts in.
//!
//! Everything the core consumes from outside (the avatar, target
//! selection, navigation, and the order channel) is reached through the
//! traits in this module. A [`Session`] bundles one borrowed implementation
//! of each for the duration of a single call into the orchestrator.

use orbwalk_types::{AvatarSnapshot, EntityId, OperatingMode, Target, Vec3};

use crate::clock::Clock;

/// Provides a fresh view of the controlled avatar.
pub trait AvatarSource {
    /// Snapshot the avatar, or `None` if it is dead, not spawned, or
    /// otherwise not controllable right now.
    fn snapshot(&self) -> Option<AvatarSnapshot>;
}

/// Target selection, owned by the host.
pub trait TargetProvider {
    /// Pick the best target for the given mode, if any.
    fn target(&self, mode: OperatingMode) -> Option<Target>;

    /// Whether dependent logic should hold off (e.g. a minion is about to
    /// become last-hittable).
    fn should_wait(&self) -> bool;

    /// Enemy minions within `radius` of the avatar.
    fn nearby_minions(&self, radius: f32) -> Vec<Target>;

    /// Look an entity up again by identity. `None` once it has died,
    /// become untargetable, or left vision.
    fn resolve(&self, id: EntityId) -> Option<Target>;

    /// Whether the entity is still a valid target.
    fn is_valid(&self, id: EntityId) -> bool {
        self.resolve(id).is_some()
    }
}

/// Navigation queries against the map.
pub trait Navigator {
    /// The path the avatar would take from `from` to `to`, starting at
    /// `from`. A one-point path means no movement is possible.
    fn path_to(&self, from: Vec3, to: Vec3) -> Vec<Vec3>;

    /// Terrain height at a ground-plane position.
    fn height_at(&self, x: f32, y: f32) -> f32;
}

/// The order channel. Each call returns whether the order was accepted
/// locally; server confirmation is not awaited.
pub trait CommandIssuer {
    /// Issue a basic attack against `target`.
    fn issue_attack(&mut self, target: &Target) -> bool;

    /// Issue a move to `position`.
    fn issue_move(&mut self, position: Vec3) -> bool;

    /// Issue a stop at `position`.
    fn issue_stop(&mut self, position: Vec3) -> bool;
}

/// Borrowed collaborators for one orchestrator call.
pub struct Session<'a> {
    /// Tick and latency source.
    pub clock: &'a dyn Clock,
    /// The controlled avatar.
    pub avatar: &'a dyn AvatarSource,
    /// Target selection.
    pub targets: &'a dyn TargetProvider,
    /// Pathing and terrain.
    pub navigator: &'a dyn Navigator,
    /// Where orders go.
    pub issuer: &'a mut dyn CommandIssuer,
}

impl core::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("tick", &self.clock.current_tick())
            .field("ping_ms", &self.clock.ping_ms())
            .finish_non_exhaustive()
    }
}
