use std::sync::Arc;

use snapbox_core::ingest::Ingestor;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Ingest coordinator, which also owns the media store handle.
    pub ingestor: Arc<Ingestor>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let ingestor = Ingestor::from_config(config.media.clone());
        Self {
            config: Arc::new(config),
            ingestor: Arc::new(ingestor),
        }
    }
}
