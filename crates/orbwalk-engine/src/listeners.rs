//! Cancellation pipeline listeners the engine installs.

use orbwalk_core::pipeline::{IntentListener, ListenerError, Verdict};
use orbwalk_types::{ActionIntent, ActionKind, Vec3};

/// Keeps the avatar near an anchor point.
///
/// Move orders beyond the leash are pulled back onto it; attacks against
/// targets beyond the leash are vetoed. Stops always pass.
#[derive(Debug, Clone, Copy)]
pub struct Leash {
    anchor: Vec3,
    radius: f32,
}

impl Leash {
    /// A leash of `radius` around `anchor`.
    pub const fn new(anchor: Vec3, radius: f32) -> Self {
        Self { anchor, radius }
    }
}

impl IntentListener for Leash {
    fn on_intent(&mut self, intent: &ActionIntent) -> Result<Verdict, ListenerError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ListenerError::Fault {
                message: format!("leash radius must be positive, got {}", self.radius),
            });
        }
        let verdict = match intent.kind {
            ActionKind::StopMovement => Verdict::Proceed(intent.clone()),
            ActionKind::Attack => {
                let outside = intent
                    .target
                    .as_ref()
                    .is_some_and(|t| t.position.distance(self.anchor) > self.radius);
                if outside {
                    Verdict::Veto
                } else {
                    Verdict::Proceed(intent.clone())
                }
            }
            ActionKind::Move => {
                if intent.position.distance(self.anchor) > self.radius {
                    let pulled = self.anchor.extend(intent.position, self.radius);
                    Verdict::Proceed(intent.with_position(pulled))
                } else {
                    Verdict::Proceed(intent.clone())
                }
            }
        };
        Ok(verdict)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use orbwalk_types::{EntityId, Target};

    use super::*;

    fn leash() -> Leash {
        Leash::new(Vec3::ZERO, 1_000.0)
    }

    #[test]
    fn far_moves_are_pulled_in() {
        let verdict = leash()
            .on_intent(&ActionIntent::movement(Vec3::flat(0.0, 3_000.0)))
            .unwrap();
        let Verdict::Proceed(out) = verdict else {
            panic!("expected proceed");
        };
        assert!((out.position.y - 1_000.0).abs() < 1e-3);
        assert_eq!(out.kind, ActionKind::Move);
    }

    #[test]
    fn near_moves_pass_unchanged() {
        let intent = ActionIntent::movement(Vec3::flat(300.0, 300.0));
        assert_eq!(leash().on_intent(&intent).unwrap(), Verdict::Proceed(intent));
    }

    #[test]
    fn attacks_outside_are_vetoed() {
        let target = Target {
            id: EntityId::new(),
            position: Vec3::flat(1_500.0, 0.0),
            bounding_radius: 48.0,
        };
        assert_eq!(
            leash().on_intent(&ActionIntent::attack(target)).unwrap(),
            Verdict::Veto
        );
    }

    #[test]
    fn broken_radius_is_a_fault() {
        let mut bad = Leash::new(Vec3::ZERO, f32::NAN);
        assert!(bad.on_intent(&ActionIntent::stop(Vec3::ZERO)).is_err());
    }
}
