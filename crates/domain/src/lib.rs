//! Initrack Domain - core types and invariants for shared combat trackers.
//!
//! Pure domain logic: no I/O, no locking, no randomness of its own (the
//! engine injects clocks and RNG).

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod value_objects;

pub use aggregates::Session;
pub use entities::{Participant, ParticipantKind};
pub use error::DomainError;
pub use events::{DamageOutcome, TurnAdvance};

// Re-export ID types
pub use ids::{ConnectionId, ParticipantId};

// Re-export value objects
pub use value_objects::{HitPoints, SessionCode, UserId, CODE_ALPHABET, GENERATED_CODE_LENGTH};
