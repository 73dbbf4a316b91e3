//! Domain events
//!
//! Mutations on the session aggregate return these outcome values so callers
//! can log or react to what actually happened.

mod combat_events;

pub use combat_events::{DamageOutcome, TurnAdvance};
