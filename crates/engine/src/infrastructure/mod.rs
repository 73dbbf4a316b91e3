//! Infrastructure - ports and their process-local implementations.

pub mod clock;
pub mod config;
pub mod ports;
