//! Composite health reporting.
//!
//! Health is backend reachability plus static build metadata. A failed probe is
//! a reported condition: [`HealthReporter::check`] always returns a status and
//! never an error, leaving the HTTP layer to choose the status code.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::AppInfo;
use crate::store::DeploymentStore;

/// Outcome of a health check, serialized with a `status` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy {
        version: String,
        timestamp: DateTime<Utc>,
        environment: String,
    },
    Unhealthy {
        error: String,
    },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy { .. })
    }
}

/// Probes the deployment store and combines the result with build metadata.
#[derive(Clone)]
pub struct HealthReporter {
    store: Arc<dyn DeploymentStore>,
    info: Arc<AppInfo>,
    probe_timeout: Duration,
}

impl HealthReporter {
    pub fn new(
        store: Arc<dyn DeploymentStore>,
        info: Arc<AppInfo>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            store,
            info,
            probe_timeout,
        }
    }

    /// Run the liveness probe once.
    pub async fn check(&self) -> HealthStatus {
        let probe = tokio::time::timeout(self.probe_timeout, self.store.ping()).await;

        match probe {
            Ok(Ok(())) => HealthStatus::Healthy {
                version: self.info.version.clone(),
                timestamp: Utc::now(),
                environment: self.info.environment.clone(),
            },
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Health probe failed");
                HealthStatus::Unhealthy {
                    error: e.to_string(),
                }
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.probe_timeout.as_millis() as u64,
                    "Health probe timed out"
                );
                HealthStatus::Unhealthy {
                    error: format!(
                        "health probe timed out after {}ms",
                        self.probe_timeout.as_millis()
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DeploymentRecord, MemoryStore, NewDeployment, StoreResult};
    use async_trait::async_trait;

    fn reporter(store: Arc<dyn DeploymentStore>) -> HealthReporter {
        HealthReporter::new(store, Arc::new(AppInfo::default()), Duration::from_millis(200))
    }

    /// Store whose probe never completes.
    struct HangingStore;

    #[async_trait]
    impl DeploymentStore for HangingStore {
        async fn ensure_schema(&self) -> StoreResult<()> {
            Ok(())
        }

        async fn insert(&self, _deployment: &NewDeployment) -> StoreResult<DeploymentRecord> {
            std::future::pending().await
        }

        async fn list_recent(&self, _limit: u32) -> StoreResult<Vec<DeploymentRecord>> {
            Ok(Vec::new())
        }

        async fn ping(&self) -> StoreResult<()> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_healthy_when_probe_succeeds() {
        let status = reporter(Arc::new(MemoryStore::new())).check().await;

        assert!(status.is_healthy());
        match status {
            HealthStatus::Healthy {
                version,
                environment,
                ..
            } => {
                assert_eq!(version, "1.0.0");
                assert_eq!(environment, "development");
            }
            other => panic!("expected healthy, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unhealthy_when_backend_down() {
        let store = Arc::new(MemoryStore::new());
        store.set_online(false);

        let status = reporter(store).check().await;
        assert_eq!(
            status,
            HealthStatus::Unhealthy {
                error: "connection refused: database is unreachable".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unhealthy_when_probe_hangs() {
        let status = reporter(Arc::new(HangingStore)).check().await;
        match status {
            HealthStatus::Unhealthy { error } => assert!(error.contains("timed out")),
            other => panic!("expected unhealthy, got {:?}", other),
        }
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(HealthStatus::Unhealthy {
            error: "boom".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"status": "unhealthy", "error": "boom"}));
    }
}
