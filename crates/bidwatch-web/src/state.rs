use std::sync::Arc;

use bidwatch_core::{AppConfig, AssetMultiplexer, UtcDateTime};

/// Shared handler state. Cloned per request; everything inside is read-only.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub multiplexer: Arc<AssetMultiplexer>,
    /// Time source for cutoff checks.
    pub clock: fn() -> UtcDateTime,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, multiplexer: Arc<AssetMultiplexer>) -> Self {
        Self {
            config,
            multiplexer,
            clock: UtcDateTime::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> UtcDateTime) -> Self {
        self.clock = clock;
        self
    }
}
