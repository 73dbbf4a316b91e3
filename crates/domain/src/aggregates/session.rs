//! Session aggregate - one shared combat tracker
//!
//! # Turn order
//!
//! The participant list *is* the turn order: descending by initiative, ties
//! kept in insertion order (stable sort). `turn` indexes the active
//! participant and `round` counts completed passes through the list.
//!
//! The active participant's identity is frozen across re-sorts: inserting a
//! participant ahead of the active one, or reordering the list, moves `turn`
//! so that the same participant keeps acting.
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: mutations go through methods that keep invariants
//! - **Authorization in the aggregate**: owner-only mutations take the requester
//! - **Domain events**: mutations return outcome values (`DamageOutcome`, `TurnAdvance`)

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::entities::Participant;
use crate::error::DomainError;
use crate::events::{DamageOutcome, TurnAdvance};
use crate::value_objects::{SessionCode, UserId};
use crate::ParticipantId;

/// A shared tracking room identified by a short code.
///
/// # Invariants
///
/// - `participants` is sorted by descending initiative after every insertion
/// - `round >= 1` and never decreases
/// - `owner` is written at most once
/// - `turn < participants.len()` whenever the list is non-empty, otherwise 0
/// - `version` increases by one on every state change
#[derive(Debug, Clone)]
pub struct Session {
    code: SessionCode,
    created_at: DateTime<Utc>,
    owner: Option<UserId>,
    round: u32,
    turn: usize,
    version: u64,
    participants: Vec<Participant>,
}

impl Session {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create an empty session without an owner, at round 1.
    pub fn new(code: SessionCode, created_at: DateTime<Utc>) -> Self {
        Self {
            code,
            created_at,
            owner: None,
            round: 1,
            turn: 0,
            version: 0,
            participants: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors (read-only)
    // =========================================================================

    #[inline]
    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Identity of the DM, once claimed.
    #[inline]
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    #[inline]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Index of the participant whose turn it is.
    #[inline]
    pub fn turn(&self) -> usize {
        self.turn
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn active_participant(&self) -> Option<&Participant> {
        self.participants.get(self.turn)
    }

    pub fn is_owner(&self, user: &UserId) -> bool {
        self.owner.as_ref() == Some(user)
    }

    // =========================================================================
    // Ownership
    // =========================================================================

    /// Claim the owner slot for `user` if nobody holds it yet.
    ///
    /// Returns `true` when the slot was empty and is now assigned.
    pub fn claim_ownership(&mut self, user: &UserId) -> bool {
        if self.owner.is_some() {
            return false;
        }
        self.owner = Some(user.clone());
        self.touch();
        true
    }

    fn require_owner(&self, user: &UserId, action: &'static str) -> Result<(), DomainError> {
        if self.is_owner(user) {
            Ok(())
        } else {
            Err(DomainError::not_authorized(action))
        }
    }

    // =========================================================================
    // Participants
    // =========================================================================

    /// Add a player character. Any identity may do this.
    pub fn add_player(
        &mut self,
        requester: &UserId,
        name: &str,
        initiative: i32,
        bonus: i32,
    ) -> Participant {
        let player = Participant::player(name, initiative, bonus, requester.clone());
        self.insert(player.clone());
        player
    }

    /// Add a creature at full health.
    ///
    /// # Errors
    ///
    /// `DomainError::NotAuthorized` unless `requester` owns the session.
    pub fn add_creature(
        &mut self,
        requester: &UserId,
        name: &str,
        hp: i32,
        initiative: i32,
        bonus: i32,
    ) -> Result<Participant, DomainError> {
        self.require_owner(requester, "add creatures")?;
        let creature = Participant::creature(name, hp, initiative, bonus);
        self.insert(creature.clone());
        Ok(creature)
    }

    /// Subtract `delta` from a creature's hit points (negative heals).
    ///
    /// # Errors
    ///
    /// - `DomainError::NotAuthorized` unless `requester` owns the session
    /// - `DomainError::NotFound` if `id` is absent or not a creature
    pub fn damage_creature(
        &mut self,
        requester: &UserId,
        id: ParticipantId,
        delta: i32,
    ) -> Result<DamageOutcome, DomainError> {
        self.require_owner(requester, "deal damage")?;
        let hit_points = self
            .participants
            .iter_mut()
            .find(|p| p.id() == id)
            .and_then(Participant::hit_points_mut)
            .ok_or_else(|| DomainError::not_found("Creature", id.to_string()))?;
        let outcome = hit_points.apply_damage(delta);
        self.touch();
        Ok(outcome)
    }

    /// Rebuild the turn order following `order`.
    ///
    /// Unknown and repeated ids are ignored. Participants missing from `order`
    /// are appended afterwards in their previous relative order.
    ///
    /// # Errors
    ///
    /// `DomainError::NotAuthorized` unless `requester` owns the session.
    pub fn reorder(
        &mut self,
        requester: &UserId,
        order: &[ParticipantId],
    ) -> Result<(), DomainError> {
        self.require_owner(requester, "reorder participants")?;

        let active = self.active_id();
        let positions: HashMap<ParticipantId, usize> = self
            .participants
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id(), idx))
            .collect();

        let mut slots: Vec<Option<Participant>> = std::mem::take(&mut self.participants)
            .into_iter()
            .map(Some)
            .collect();
        let mut reordered = Vec::with_capacity(slots.len());
        for id in order {
            if let Some(slot) = positions.get(id).and_then(|&idx| slots[idx].take()) {
                reordered.push(slot);
            }
        }
        reordered.extend(slots.into_iter().flatten());

        self.participants = reordered;
        self.reanchor(active);
        self.touch();
        Ok(())
    }

    // =========================================================================
    // Turn order
    // =========================================================================

    /// Advance to the next participant, starting a new round on wrap-around.
    ///
    /// With no participants this is a no-op.
    pub fn next_turn(&mut self) -> TurnAdvance {
        if self.participants.is_empty() {
            return TurnAdvance {
                turn: self.turn,
                round: self.round,
                new_round: false,
            };
        }

        self.turn = (self.turn + 1) % self.participants.len();
        let new_round = self.turn == 0;
        if new_round {
            self.round = self.round.saturating_add(1);
        }
        self.touch();

        TurnAdvance {
            turn: self.turn,
            round: self.round,
            new_round,
        }
    }

    fn insert(&mut self, participant: Participant) {
        let active = self.active_id();
        self.participants.push(participant);
        // Stable: equal initiative keeps insertion order.
        self.participants
            .sort_by(|a, b| b.initiative().cmp(&a.initiative()));
        self.reanchor(active);
        self.touch();
    }

    fn active_id(&self) -> Option<ParticipantId> {
        self.active_participant().map(Participant::id)
    }

    fn reanchor(&mut self, active: Option<ParticipantId>) {
        self.turn = active
            .and_then(|id| self.participants.iter().position(|p| p.id() == id))
            .unwrap_or(0);
    }

    fn touch(&mut self) {
        self.version += 1;
    }
}
