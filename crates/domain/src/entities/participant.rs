//! Participant entity - one entry in the turn order

use serde::{Deserialize, Serialize};

use crate::value_objects::{HitPoints, UserId};
use crate::ParticipantId;

/// Default display name for a player character with a blank name
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Default display name for a creature with a blank name
pub const DEFAULT_CREATURE_NAME: &str = "Monster";

/// Kind of participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantKind {
    /// A player's character, added by any participant
    PlayerCharacter,
    /// A DM-controlled creature with tracked hit points
    Creature,
}

/// A player character or creature tracked in the turn sequence.
///
/// # Invariants
///
/// - `initiative >= 0`
/// - `hit_points` is `Some` exactly when `kind` is `Creature`
/// - `owner` is `Some` exactly when `kind` is `PlayerCharacter`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    id: ParticipantId,
    name: String,
    kind: ParticipantKind,
    initiative: i32,
    bonus: i32,
    hit_points: Option<HitPoints>,
    owner: Option<UserId>,
}

impl Participant {
    /// Create a player character owned by `owner`.
    ///
    /// Initiative is floored at 0; a blank name becomes `"Player"`.
    pub fn player(name: &str, initiative: i32, bonus: i32, owner: UserId) -> Self {
        Self {
            id: ParticipantId::new(),
            name: display_name(name, DEFAULT_PLAYER_NAME),
            kind: ParticipantKind::PlayerCharacter,
            initiative: initiative.max(0),
            bonus,
            hit_points: None,
            owner: Some(owner),
        }
    }

    /// Create a creature at full health.
    ///
    /// Initiative and hit points are floored at 0; a blank name becomes `"Monster"`.
    pub fn creature(name: &str, hp: i32, initiative: i32, bonus: i32) -> Self {
        Self {
            id: ParticipantId::new(),
            name: display_name(name, DEFAULT_CREATURE_NAME),
            kind: ParticipantKind::Creature,
            initiative: initiative.max(0),
            bonus,
            hit_points: Some(HitPoints::full(hp)),
            owner: None,
        }
    }

    #[inline]
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> ParticipantKind {
        self.kind
    }

    #[inline]
    pub fn initiative(&self) -> i32 {
        self.initiative
    }

    #[inline]
    pub fn bonus(&self) -> i32 {
        self.bonus
    }

    #[inline]
    pub fn hit_points(&self) -> Option<HitPoints> {
        self.hit_points
    }

    #[inline]
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    pub fn is_creature(&self) -> bool {
        matches!(self.kind, ParticipantKind::Creature)
    }

    pub(crate) fn hit_points_mut(&mut self) -> Option<&mut HitPoints> {
        self.hit_points.as_mut()
    }
}

fn display_name(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
