//! Per-identity windup adjustments.
//!
//! Some avatars do not follow the standard attack timing: their attack
//! needs an ammo buff, or a pre-attack buff locks them in place for longer
//! than the animation suggests. Instead of branching on identity inside the
//! gate, adjustments are registered in a [`WindupOverrides`] table keyed by
//! identity (case-insensitive) and evaluated at the gate's override points.

use std::collections::HashMap;

use orbwalk_types::AvatarSnapshot;

/// Result of an attack override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindupAdjustment {
    /// Add this many milliseconds to the attack readiness check.
    Extra(f32),
    /// The avatar cannot attack right now, whatever the timing says.
    Block,
}

/// Adjusts the attack readiness check for one identity.
pub type AttackOverride = Box<dyn Fn(&AvatarSnapshot) -> WindupAdjustment>;

/// Returns extra milliseconds for the movement readiness check.
pub type MoveOverride = Box<dyn Fn(&AvatarSnapshot) -> f32>;

/// Identity-keyed windup adjustments.
#[derive(Default)]
pub struct WindupOverrides {
    attack: HashMap<String, AttackOverride>,
    movement: HashMap<String, MoveOverride>,
}

impl WindupOverrides {
    /// An empty table: every avatar uses the standard timing.
    pub fn new() -> Self {
        Self::default()
    }

    /// The adjustments known for stock characters.
    ///
    /// - `Graves` can only attack with a shell loaded, and his attack
    ///   cadence follows a linear fit of his attack delay.
    /// - `Rengar` is locked in place for an extra 200ms while his
    ///   empowered-attack buff is up.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register_attack("Graves", |avatar| {
            if !avatar.has_buff("GravesBasicAttackAmmo1") {
                return WindupAdjustment::Block;
            }
            let attack_delay = avatar.attack_delay * 1000.0;
            WindupAdjustment::Extra(attack_delay.mul_add(1.074_03, -716.238_1) - attack_delay)
        });
        table.register_movement("Rengar", |avatar| {
            if avatar.has_buff("rengarqbase") || avatar.has_buff("rengarqemp") {
                200.0
            } else {
                0.0
            }
        });
        table
    }

    /// Register (or replace) the attack override for `identity`.
    pub fn register_attack<F>(&mut self, identity: &str, adjust: F)
    where
        F: Fn(&AvatarSnapshot) -> WindupAdjustment + 'static,
    {
        self.attack.insert(identity.to_lowercase(), Box::new(adjust));
    }

    /// Register (or replace) the movement override for `identity`.
    pub fn register_movement<F>(&mut self, identity: &str, adjust: F)
    where
        F: Fn(&AvatarSnapshot) -> f32 + 'static,
    {
        self.movement.insert(identity.to_lowercase(), Box::new(adjust));
    }

    /// Evaluate the attack override for this avatar.
    pub fn attack_adjustment(&self, avatar: &AvatarSnapshot) -> WindupAdjustment {
        self.attack
            .get(&avatar.identity.to_lowercase())
            .map_or(WindupAdjustment::Extra(0.0), |adjust| adjust(avatar))
    }

    /// Evaluate the movement override for this avatar.
    pub fn movement_extra(&self, avatar: &AvatarSnapshot) -> f32 {
        self.movement
            .get(&avatar.identity.to_lowercase())
            .map_or(0.0, |adjust| adjust(avatar))
    }
}

impl core::fmt::Debug for WindupOverrides {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut attack: Vec<&String> = self.attack.keys().collect();
        let mut movement: Vec<&String> = self.movement.keys().collect();
        attack.sort();
        movement.sort();
        f.debug_struct("WindupOverrides")
            .field("attack", &attack)
            .field("movement", &movement)
            .finish()
    }
}
