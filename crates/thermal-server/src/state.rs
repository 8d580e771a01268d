use chrono::{DateTime, Utc};
use std::sync::Arc;
use thermal_core::config::AppConfig;
use thermal_core::store::{build_source, SessionSource};

/// Shared application state for the server.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub source: Arc<dyn SessionSource>,
    /// Evaluation instant for dashboard requests.
    pub clock: fn() -> DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let source = build_source(&config.store)?;
        Ok(Self::with_source(config, source))
    }

    pub fn with_source(config: AppConfig, source: Arc<dyn SessionSource>) -> Self {
        Self {
            config,
            source,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock, e.g. to pin "today" in tests.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}
