use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::{BackendResult, SynthesisRouter};

/// Read-only state shared by every request.
pub struct AppState {
    pub config: ServerConfig,
    pub router: SynthesisRouter,
}

impl AppState {
    /// Build the router from configuration and wrap everything in an `Arc`.
    pub fn new(config: ServerConfig) -> BackendResult<Arc<Self>> {
        let router = SynthesisRouter::from_config(&config)?;
        Ok(Self::with_router(config, router))
    }

    /// Use a preassembled router, e.g. one wired to mock backends.
    pub fn with_router(config: ServerConfig, router: SynthesisRouter) -> Arc<Self> {
        Arc::new(Self { config, router })
    }
}
