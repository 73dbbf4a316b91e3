//! In-memory state storage modules.
//!
//! Stores manage runtime state that lives only as long as the process:
//! - `SessionRegistry` - every tracker session, keyed by code

pub mod sessions;

pub use sessions::{snapshot_of, Applied, SessionError, SessionRegistry};
