//! Creature hit points

use serde::{Deserialize, Serialize};

use crate::events::DamageOutcome;

/// Current and maximum hit points.
///
/// # Invariants
///
/// - `0 <= current <= max` after construction and after every mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    current: i32,
    max: i32,
}

impl HitPoints {
    /// Full health at `max`; a negative maximum is floored at 0.
    pub fn full(max: i32) -> Self {
        let max = max.max(0);
        Self { current: max, max }
    }

    #[inline]
    pub fn current(&self) -> i32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Subtract `delta` (negative heals), clamping into `[0, max]`.
    pub fn apply_damage(&mut self, delta: i32) -> DamageOutcome {
        let before = self.current;
        self.current = before.saturating_sub(delta).clamp(0, self.max);
        let change = before - self.current;

        if change > 0 && self.current == 0 {
            DamageOutcome::Downed {
                damage_dealt: change,
            }
        } else if change > 0 {
            DamageOutcome::Wounded {
                damage_dealt: change,
                remaining_hp: self.current,
            }
        } else if change < 0 {
            DamageOutcome::Healed {
                amount_healed: -change,
                remaining_hp: self.current,
            }
        } else {
            DamageOutcome::Unchanged {
                remaining_hp: self.current,
            }
        }
    }
}
