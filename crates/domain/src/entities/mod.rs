//! Domain entities

mod participant;

pub use participant::{Participant, ParticipantKind};
