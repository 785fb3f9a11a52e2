//! Startup schema bootstrap.
//!
//! Runs once after the listener is bound. A failure leaves the service up in a
//! degraded state: requests touching the store fail until the database
//! recovers and the table exists.

use crate::store::DeploymentStore;

/// Ensure the deployments table exists, logging the outcome.
///
/// Returns whether the schema is in place. Never fails.
pub async fn ensure_schema(store: &dyn DeploymentStore) -> bool {
    tracing::info!("Ensuring deployment schema");

    match store.ensure_schema().await {
        Ok(()) => {
            tracing::info!("Database initialized successfully");
            true
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                "Database initialization failed; continuing without schema"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_bootstrap_twice_is_harmless() {
        let store = Arc::new(MemoryStore::new());

        assert!(ensure_schema(store.as_ref()).await);
        assert!(ensure_schema(store.as_ref()).await);
        assert_eq!(store.row_count(), Some(0));
    }

    #[tokio::test]
    async fn test_bootstrap_failure_is_not_fatal() {
        let store = Arc::new(MemoryStore::new());
        store.set_online(false);

        assert!(!ensure_schema(store.as_ref()).await);
        assert_eq!(store.row_count(), None);

        // Recovery: a later bootstrap succeeds once the backend is back.
        store.set_online(true);
        assert!(ensure_schema(store.as_ref()).await);
        assert_eq!(store.row_count(), Some(0));
    }
}
