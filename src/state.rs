//! Shared application state for request handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, HEALTH_PROBE_TIMEOUT_SECS};
use crate::health::HealthReporter;
use crate::store::DeploymentStore;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// The store holds the process-wide connection pool; handlers borrow a
/// connection for a single query and never keep one between requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DeploymentStore>,
    pub health: HealthReporter,
}

impl AppState {
    /// Creates a new application state from the given configuration and store.
    pub fn new(config: AppConfig, store: Arc<dyn DeploymentStore>) -> Self {
        let health = HealthReporter::new(
            Arc::clone(&store),
            Arc::new(config.app.clone()),
            Duration::from_secs(HEALTH_PROBE_TIMEOUT_SECS),
        );

        Self {
            config: Arc::new(config),
            store,
            health,
        }
    }
}
