//! Application state and composition.

use std::sync::Arc;

use crate::api::connections::BroadcastHub;
use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    config::AppConfig,
    ports::{ClockPort, RandomPort},
};
use crate::stores::SessionRegistry;

/// Main application state.
///
/// Passed to HTTP/WebSocket handlers via Axum state.
pub struct App {
    pub sessions: Arc<SessionRegistry>,
    pub hub: Arc<BroadcastHub>,
    pub config: AppConfig,
}

impl App {
    /// Create a new App backed by the system clock and randomness.
    pub fn new(config: AppConfig) -> Self {
        let clock_port: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let random_port: Arc<dyn RandomPort> = Arc::new(SystemRandom::new());
        Self::with_ports(config, clock_port, random_port)
    }

    /// Create an App with explicit ports (tests script the dice this way).
    pub fn with_ports(
        config: AppConfig,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new(
            clock,
            random,
            config.code_generation_attempts,
        ));
        let hub = Arc::new(BroadcastHub::new(config.client_queue_capacity));
        Self {
            sessions,
            hub,
            config,
        }
    }
}
