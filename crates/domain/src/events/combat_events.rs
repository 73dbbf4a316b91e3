//! Combat-related domain events

/// Outcome of applying a hit point delta to a creature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Creature took damage and still stands
    Wounded { damage_dealt: i32, remaining_hp: i32 },
    /// Creature dropped to 0 hit points
    Downed { damage_dealt: i32 },
    /// Negative delta restored hit points
    Healed { amount_healed: i32, remaining_hp: i32 },
    /// Clamping absorbed the whole delta
    Unchanged { remaining_hp: i32 },
}

impl DamageOutcome {
    /// Hit points left after the change.
    pub fn remaining_hp(&self) -> i32 {
        match self {
            Self::Wounded { remaining_hp, .. }
            | Self::Healed { remaining_hp, .. }
            | Self::Unchanged { remaining_hp } => *remaining_hp,
            Self::Downed { .. } => 0,
        }
    }
}

/// Result of advancing the turn pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnAdvance {
    /// Index of the participant now acting
    pub turn: usize,
    /// Current round after the advance
    pub round: u32,
    /// True when the pointer wrapped and a new round began
    pub new_round: bool,
}
