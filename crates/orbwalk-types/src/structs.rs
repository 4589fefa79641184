//! Entity snapshots and the per-attempt action intent.

use serde::{Deserialize, Serialize};

use crate::enums::ActionKind;
use crate::geometry::Vec3;
use crate::ids::EntityId;

/// An attackable entity as reported by the host at the moment of a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Entity identity, used to re-check validity on later ticks.
    pub id: EntityId,
    /// Current position.
    pub position: Vec3,
    /// Collision radius of the entity.
    pub bounding_radius: f32,
}

impl Target {
    /// Reduce to the identity + position pair kept across ticks.
    pub const fn snapshot(&self) -> TargetSnapshot {
        TargetSnapshot {
            id: self.id,
            position: self.position,
        }
    }
}

/// What the core remembers about the last attacked entity.
///
/// Only identity and the position at the time of the attack are kept; the
/// entity itself is never held, so a dead or despawned target cannot be
/// reached through this value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSnapshot {
    /// Entity identity.
    pub id: EntityId,
    /// Position when the attack order was committed.
    pub position: Vec3,
}

/// Read-only view of the controlled avatar for the duration of one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarSnapshot {
    /// Character identity (e.g. champion name); keys the windup override table.
    pub identity: String,
    /// Client-side (predicted) position.
    pub position: Vec3,
    /// Last server-authoritative position.
    pub server_position: Vec3,
    /// Collision radius.
    pub bounding_radius: f32,
    /// Full attack cycle duration in seconds.
    pub attack_delay: f32,
    /// Attack windup (cast) duration in seconds.
    pub attack_cast_delay: f32,
    /// Basic attack range, edge to edge.
    pub attack_range: f32,
    /// Whether issuing a new order cancels the attack animation.
    pub can_cancel_attack: bool,
    /// Current waypoints, starting at the avatar. Empty when standing still.
    pub path: Vec<Vec3>,
    /// Names of active buffs.
    pub buffs: Vec<String>,
}

impl AvatarSnapshot {
    /// Whether a buff with the given name is active (case-insensitive).
    pub fn has_buff(&self, name: &str) -> bool {
        self.buffs.iter().any(|b| b.eq_ignore_ascii_case(name))
    }

    /// Whether `target` is inside basic attack range, edge to edge.
    pub fn in_attack_range(&self, target: &Target) -> bool {
        let reach = self.attack_range + self.bounding_radius + target.bounding_radius;
        self.server_position.distance_squared(target.position) <= reach * reach
    }
}

/// A proposed order, threaded through the cancellation pipeline before it
/// is committed.
///
/// Intents are created fresh per arbitration attempt and never stored.
/// Pipeline listeners may return a rewritten copy (new position or target)
/// but never mutate the one they were handed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionIntent {
    /// What kind of order this is.
    pub kind: ActionKind,
    /// The entity to attack (attack intents only).
    pub target: Option<Target>,
    /// Where the order is aimed.
    pub position: Vec3,
}

impl ActionIntent {
    /// An attack against `target`, aimed at its current position.
    pub fn attack(target: Target) -> Self {
        Self {
            kind: ActionKind::Attack,
            position: target.position,
            target: Some(target),
        }
    }

    /// A move to `position`.
    pub const fn movement(position: Vec3) -> Self {
        Self {
            kind: ActionKind::Move,
            target: None,
            position,
        }
    }

    /// A stop at `position` (normally the server position).
    pub const fn stop(position: Vec3) -> Self {
        Self {
            kind: ActionKind::StopMovement,
            target: None,
            position,
        }
    }

    /// Return a copy aimed at a different position.
    #[must_use]
    pub fn with_position(&self, position: Vec3) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    /// Return a copy retargeted at `target`, aimed at its position.
    #[must_use]
    pub fn with_target(&self, target: Target) -> Self {
        Self {
            kind: self.kind,
            position: target.position,
            target: Some(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avatar() -> AvatarSnapshot {
        AvatarSnapshot {
            identity: "Ashe".to_owned(),
            position: Vec3::ZERO,
            server_position: Vec3::ZERO,
            bounding_radius: 65.0,
            attack_delay: 1.2,
            attack_cast_delay: 0.25,
            attack_range: 600.0,
            can_cancel_attack: true,
            path: Vec::new(),
            buffs: vec!["AsheQ".to_owned()],
        }
    }

    fn target_at(x: f32) -> Target {
        Target {
            id: EntityId::new(),
            position: Vec3::flat(x, 0.0),
            bounding_radius: 35.0,
        }
    }

    #[test]
    fn buff_lookup_ignores_case() {
        let a = avatar();
        assert!(a.has_buff("asheq"));
        assert!(!a.has_buff("AsheR"));
    }

    #[test]
    fn attack_range_is_edge_to_edge() {
        let a = avatar();
        assert!(a.in_attack_range(&target_at(700.0)));
        assert!(!a.in_attack_range(&target_at(701.0)));
    }

    #[test]
    fn attack_intent_aims_at_target() {
        let t = target_at(300.0);
        let intent = ActionIntent::attack(t.clone());
        assert_eq!(intent.kind, ActionKind::Attack);
        assert_eq!(intent.position, t.position);
        assert_eq!(intent.target, Some(t));
    }

    #[test]
    fn with_target_keeps_kind_and_follows_position() {
        let original = ActionIntent::attack(target_at(100.0));
        let other = target_at(250.0);
        let rewritten = original.with_target(other.clone());
        assert_eq!(rewritten.kind, ActionKind::Attack);
        assert_eq!(rewritten.position, other.position);
        assert_eq!(original.position, Vec3::flat(100.0, 0.0));
    }
}
