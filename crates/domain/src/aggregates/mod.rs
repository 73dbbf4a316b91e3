//! Aggregates - consistency boundaries for mutable domain state

mod session;

pub use session::Session;
