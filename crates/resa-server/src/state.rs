use std::sync::Arc;

use resa_relay::{HttpUpstream, RelayConfig};

use crate::config::ServerConfig;

/// Shared by all requests; read-only once the server is up.
pub struct AppState {
    pub relay: RelayConfig,
    pub upstream: HttpUpstream,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Self::with_upstream(config.relay, HttpUpstream::new())
    }

    pub fn with_upstream(relay: RelayConfig, upstream: HttpUpstream) -> Arc<Self> {
        Arc::new(Self { relay, upstream })
    }
}
