//! Initrack Protocol - shared types for the engine and browser clients
//!
//! This crate contains the wire format only:
//! - WebSocket message types (`ClientMessage`, `ServerMessage`)
//! - Session snapshots pushed to every client
//! - HTTP request/response bodies
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde and serde_json
//! 2. **No business logic** - Pure data types and serialization
//! 3. **No domain IDs** - ids travel as strings

mod lenient;
pub mod messages;
pub mod requests;
pub mod responses;

pub use messages::{
    AddMonsterData, AddPlayerData, AddPlayerRollData, ClientMessage, CommandAck, DamageData,
    EntryKind, ErrorCode, ParticipantEntry, ReorderData, ServerMessage, SessionSnapshot,
};
pub use requests::JoinSessionRequest;
pub use responses::{JoinSessionResponse, SessionView};
