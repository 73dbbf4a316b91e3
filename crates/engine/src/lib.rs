//! Initrack Engine library.
//!
//! Server side of the shared initiative tracker.
//!
//! ## Structure
//!
//! - `stores/` - In-memory session registry
//! - `infrastructure/` - Ports, their implementations, and configuration
//! - `api/` - HTTP and WebSocket entry points, connection fan-out
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;

pub use app::App;
