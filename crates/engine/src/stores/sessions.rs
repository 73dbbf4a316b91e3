//! Session registry - owns every live session.
//!
//! Sharded: the map from code to session is a `DashMap`, and each session sits
//! behind its own `RwLock`. Mutations take that session's write lock, so
//! commands on one session are linearizable while different sessions never
//! wait on each other. Snapshots are taken under the lock; callers broadcast
//! them after it is released.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::RwLock;

use initrack_domain::{
    DamageOutcome, DomainError, Participant, ParticipantId, ParticipantKind, Session, SessionCode,
    TurnAdvance, UserId,
};
use initrack_shared::{EntryKind, ErrorCode, ParticipantEntry, SessionSnapshot};

use crate::infrastructure::ports::{ClockPort, RandomPort};

/// Faces on the initiative die.
const INITIATIVE_DIE: i32 = 20;

/// Errors returned by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionCode),

    #[error("No free session code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl SessionError {
    /// Error kind reported to the client that issued the command.
    ///
    /// `None` for failures that only session creation can hit.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::NotFound(_) => Some(ErrorCode::SessionNotFound),
            Self::Domain(DomainError::NotAuthorized { .. }) => Some(ErrorCode::NotAuthorized),
            Self::Domain(DomainError::NotFound { .. }) => Some(ErrorCode::EntityNotFound),
            Self::Domain(DomainError::Validation(_) | DomainError::InvalidSessionCode(_))
            | Self::CodeSpaceExhausted { .. } => None,
        }
    }
}

/// Result of a mutation together with the snapshot taken right after it.
#[derive(Debug, Clone)]
pub struct Applied<T> {
    pub value: T,
    pub snapshot: SessionSnapshot,
}

/// Concurrent registry of all sessions in this process.
pub struct SessionRegistry {
    sessions: DashMap<SessionCode, Arc<RwLock<Session>>>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    code_generation_attempts: usize,
}

impl SessionRegistry {
    pub fn new(
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        code_generation_attempts: usize,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            clock,
            random,
            code_generation_attempts: code_generation_attempts.max(1),
        }
    }

    /// Join the session under `code`, creating it if needed.
    ///
    /// A missing or blank code creates a session under a freshly generated
    /// code. Whoever finds the owner slot empty becomes the DM.
    pub async fn create_or_get(
        &self,
        code: Option<&str>,
        requester: &UserId,
    ) -> Result<SessionSnapshot, SessionError> {
        let requested = code.map(str::trim).filter(|c| !c.is_empty());
        let Some(raw) = requested else {
            return self.create_with_generated_code(requester);
        };

        let code = SessionCode::parse(raw)?;
        let session = self
            .sessions
            .entry(code.clone())
            .or_insert_with(|| {
                tracing::info!(session_code = %code, "Session created");
                Arc::new(RwLock::new(Session::new(code.clone(), self.clock.now())))
            })
            .clone();

        let mut guard = session.write().await;
        if guard.claim_ownership(requester) {
            tracing::info!(session_code = %code, user_id = %requester, "Session owner assigned");
        }
        Ok(snapshot_of(&guard))
    }

    fn create_with_generated_code(
        &self,
        requester: &UserId,
    ) -> Result<SessionSnapshot, SessionError> {
        for attempt in 1..=self.code_generation_attempts {
            let code = SessionCode::generate(|len| {
                let max = i32::try_from(len).unwrap_or(i32::MAX) - 1;
                usize::try_from(self.random.gen_range(0, max)).unwrap_or(0)
            });

            match self.sessions.entry(code.clone()) {
                Entry::Occupied(_) => {
                    tracing::debug!(session_code = %code, attempt, "Generated code collided");
                }
                Entry::Vacant(slot) => {
                    let mut session = Session::new(code.clone(), self.clock.now());
                    session.claim_ownership(requester);
                    let snapshot = snapshot_of(&session);
                    slot.insert(Arc::new(RwLock::new(session)));
                    tracing::info!(
                        session_code = %code,
                        user_id = %requester,
                        "Session created with generated code"
                    );
                    return Ok(snapshot);
                }
            }
        }

        tracing::warn!(
            attempts = self.code_generation_attempts,
            "Could not find a free session code"
        );
        Err(SessionError::CodeSpaceExhausted {
            attempts: self.code_generation_attempts,
        })
    }

    /// Snapshot of one session.
    pub async fn get(&self, code: &SessionCode) -> Result<SessionSnapshot, SessionError> {
        let session = self.lookup(code)?;
        let guard = session.read().await;
        Ok(snapshot_of(&guard))
    }

    /// When the session under `code` was created.
    pub async fn created_at(&self, code: &SessionCode) -> Result<DateTime<Utc>, SessionError> {
        let session = self.lookup(code)?;
        let guard = session.read().await;
        Ok(guard.created_at())
    }

    /// Whether `user` owns the session under `code`.
    pub async fn is_owner(&self, code: &SessionCode, user: &UserId) -> Result<bool, SessionError> {
        let session = self.lookup(code)?;
        let guard = session.read().await;
        Ok(guard.is_owner(user))
    }

    pub fn contains(&self, code: &SessionCode) -> bool {
        self.sessions.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Add a player character with a known initiative (floored at 0).
    pub async fn add_player(
        &self,
        code: &SessionCode,
        requester: &UserId,
        name: &str,
        initiative: i32,
        bonus: i32,
    ) -> Result<Applied<Participant>, SessionError> {
        self.mutate(code, |session| {
            Ok(session.add_player(requester, name, initiative, bonus))
        })
        .await
    }

    /// Add a player character with initiative `d20 + bonus`.
    pub async fn add_player_with_roll(
        &self,
        code: &SessionCode,
        requester: &UserId,
        name: &str,
        bonus: i32,
    ) -> Result<Applied<Participant>, SessionError> {
        let roll = self.random.gen_range(1, INITIATIVE_DIE);
        tracing::debug!(session_code = %code, roll, bonus, "Rolled initiative");
        self.add_player(code, requester, name, roll.saturating_add(bonus), bonus)
            .await
    }

    /// Add a creature. Owner only.
    pub async fn add_monster(
        &self,
        code: &SessionCode,
        requester: &UserId,
        name: &str,
        hp: i32,
        bonus: i32,
        initiative: i32,
    ) -> Result<Applied<Participant>, SessionError> {
        self.mutate(code, |session| {
            session.add_creature(requester, name, hp, initiative, bonus)
        })
        .await
    }

    /// Apply `delta` damage to a creature (negative heals). Owner only.
    pub async fn damage_monster(
        &self,
        code: &SessionCode,
        requester: &UserId,
        participant_id: ParticipantId,
        delta: i32,
    ) -> Result<Applied<DamageOutcome>, SessionError> {
        self.mutate(code, |session| {
            session.damage_creature(requester, participant_id, delta)
        })
        .await
    }

    /// Rebuild the turn order. Owner only.
    pub async fn reorder(
        &self,
        code: &SessionCode,
        requester: &UserId,
        ordered_ids: &[ParticipantId],
    ) -> Result<Applied<()>, SessionError> {
        self.mutate(code, |session| session.reorder(requester, ordered_ids))
            .await
    }

    /// Advance the turn pointer. Open to every identity.
    pub async fn next_turn(&self, code: &SessionCode) -> Result<Applied<TurnAdvance>, SessionError> {
        self.mutate(code, |session| Ok(session.next_turn())).await
    }

    async fn mutate<T>(
        &self,
        code: &SessionCode,
        apply: impl FnOnce(&mut Session) -> Result<T, DomainError>,
    ) -> Result<Applied<T>, SessionError> {
        let session = self.lookup(code)?;
        let mut guard = session.write().await;
        let value = apply(&mut guard)?;
        Ok(Applied {
            value,
            snapshot: snapshot_of(&guard),
        })
    }

    /// Hold a session's write lock so commands queue up behind it.
    #[cfg(test)]
    pub(crate) async fn hold_session(
        &self,
        code: &SessionCode,
    ) -> Result<tokio::sync::OwnedRwLockWriteGuard<Session>, SessionError> {
        Ok(self.lookup(code)?.write_owned().await)
    }

    fn lookup(&self, code: &SessionCode) -> Result<Arc<RwLock<Session>>, SessionError> {
        self.sessions
            .get(code)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SessionError::NotFound(code.clone()))
    }
}

/// Wire snapshot of a session.
pub fn snapshot_of(session: &Session) -> SessionSnapshot {
    SessionSnapshot {
        code: session.code().to_string(),
        round: session.round(),
        turn: session.turn(),
        version: session.version(),
        dm_uid: session.owner().map(ToString::to_string),
        entries: session.participants().iter().map(entry_of).collect(),
    }
}

fn entry_of(participant: &Participant) -> ParticipantEntry {
    let hit_points = participant.hit_points();
    ParticipantEntry {
        id: participant.id().to_string(),
        name: participant.name().to_string(),
        kind: match participant.kind() {
            ParticipantKind::PlayerCharacter => EntryKind::Player,
            ParticipantKind::Creature => EntryKind::Monster,
        },
        initiative: participant.initiative(),
        bonus: participant.bonus(),
        hp: hit_points.map(|hp| hp.current()),
        max_hp: hit_points.map(|hp| hp.max()),
        owner_uid: participant.owner().map(ToString::to_string),
    }
}
