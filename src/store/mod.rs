//! Deployment record storage.
//!
//! The deployment log is append-only: records are created once by
//! [`DeploymentStore::record`] and read back newest-first by
//! [`DeploymentStore::list_recent`]. Nothing updates or deletes them.
//!
//! PostgreSQL is the production backend. [`MemoryStore`] implements the same
//! contract in process for tests and database-less local runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{MAX_ENVIRONMENT_LEN, MAX_VERSION_LEN};

/// Result type alias using [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by deployment stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Input rejected before reaching the backend.
    #[error("{0}")]
    Validation(String),

    /// Database error.
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// Backend not reachable.
    #[error("{0}")]
    Unavailable(String),
}

impl StoreError {
    /// True for failures caused by the backend rather than the caller.
    pub fn is_backend(&self) -> bool {
        !matches!(self, StoreError::Validation(_))
    }
}

/// One immutable entry in the deployment log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentRecord {
    pub id: i32,
    pub version: String,
    pub environment: String,
    pub deployed_at: DateTime<Utc>,
    pub status: String,
}

/// Validated input for a new deployment record.
///
/// Only constructible through [`NewDeployment::new`], so every insert has
/// passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeployment {
    version: String,
    environment: String,
}

impl NewDeployment {
    /// Trims both fields and checks they are present and fit their columns.
    pub fn new(version: &str, environment: &str) -> StoreResult<Self> {
        let version = version.trim();
        let environment = environment.trim();

        check_field("version", version, MAX_VERSION_LEN)?;
        check_field("environment", environment, MAX_ENVIRONMENT_LEN)?;

        Ok(Self {
            version: version.to_string(),
            environment: environment.to_string(),
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }
}

fn check_field(name: &str, value: &str, max_len: usize) -> StoreResult<()> {
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{name} is required")));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(StoreError::Validation(format!(
            "{name} must be at most {max_len} characters (got {len})"
        )));
    }
    Ok(())
}

/// Backend for the deployment log.
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    /// Create the deployments table if it does not exist. Safe to call repeatedly.
    async fn ensure_schema(&self) -> StoreResult<()>;

    /// Persist a validated deployment with the current time and `active` status.
    async fn insert(&self, deployment: &NewDeployment) -> StoreResult<DeploymentRecord>;

    /// Up to `limit` records, newest first (`deployed_at` then `id`, both descending).
    async fn list_recent(&self, limit: u32) -> StoreResult<Vec<DeploymentRecord>>;

    /// Trivial round trip proving the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Validate `version` and `environment`, then insert.
    ///
    /// Invalid input fails with [`StoreError::Validation`] and writes nothing.
    async fn record(&self, version: &str, environment: &str) -> StoreResult<DeploymentRecord> {
        let deployment = NewDeployment::new(version, environment)?;
        self.insert(&deployment).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_deployment_trims_fields() {
        let new = NewDeployment::new("  v1.2.0 ", "\tstaging\n").unwrap();
        assert_eq!(new.version(), "v1.2.0");
        assert_eq!(new.environment(), "staging");
    }

    #[test]
    fn test_new_deployment_requires_version() {
        let err = NewDeployment::new("", "production").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(err.to_string(), "version is required");

        let err = NewDeployment::new("   ", "production").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_new_deployment_requires_environment() {
        let err = NewDeployment::new("1.0.0", "").unwrap_err();
        assert_eq!(err.to_string(), "environment is required");
    }

    #[test]
    fn test_new_deployment_length_limits() {
        let version = "v".repeat(MAX_VERSION_LEN);
        assert!(NewDeployment::new(&version, "production").is_ok());

        let version = "v".repeat(MAX_VERSION_LEN + 1);
        assert!(matches!(
            NewDeployment::new(&version, "production"),
            Err(StoreError::Validation(_))
        ));

        let environment = "e".repeat(MAX_ENVIRONMENT_LEN + 1);
        assert!(matches!(
            NewDeployment::new("1.0.0", &environment),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_is_backend() {
        assert!(!StoreError::Validation("x".into()).is_backend());
        assert!(StoreError::Unavailable("down".into()).is_backend());
        assert!(StoreError::Database(sqlx::Error::PoolTimedOut).is_backend());
    }

    #[test]
    fn test_record_serializes_rfc3339() {
        let record = DeploymentRecord {
            id: 7,
            version: "1.0.0".into(),
            environment: "production".into(),
            deployed_at: DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            status: "active".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["deployed_at"], "2024-05-01T12:00:00Z");
        assert_eq!(json["status"], "active");
    }
}
