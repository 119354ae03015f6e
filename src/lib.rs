pub mod config;
pub mod errors;
pub mod models;
pub mod parsers;
pub mod routes;
pub mod services;

use std::sync::Arc;

use tokio::sync::Mutex;

use services::collection::RuleCollection;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    /// The operator's working set. Every mutation runs to completion under this lock.
    pub workspace: Arc<Mutex<RuleCollection>>,
}

impl AppState {
    pub fn new(config: config::AppConfig) -> Self {
        Self {
            config,
            workspace: Arc::new(Mutex::new(RuleCollection::new())),
        }
    }
}
