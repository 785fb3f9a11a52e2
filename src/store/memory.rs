//! In-memory deployment store.
//!
//! Mirrors the PostgreSQL backend closely enough for handler tests: the table
//! does not exist until [`DeploymentStore::ensure_schema`] runs, ids are
//! assigned sequentially, and the backend can be switched offline to exercise
//! failure paths. Data is lost when the process exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::config::DEFAULT_DEPLOYMENT_STATUS;

use super::{DeploymentRecord, DeploymentStore, NewDeployment, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Table {
    created: bool,
    last_id: i32,
    rows: Vec<DeploymentRecord>,
}

/// Process-local deployment store.
#[derive(Debug)]
pub struct MemoryStore {
    table: RwLock<Table>,
    online: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            table: RwLock::new(Table::default()),
            online: AtomicBool::new(true),
        }
    }
}

impl MemoryStore {
    /// Create an empty store with no table yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backend becoming unreachable (`false`) or recovering (`true`).
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of persisted rows, or `None` if the table does not exist.
    pub fn row_count(&self) -> Option<usize> {
        let table = self.table.read().ok()?;
        table.created.then_some(table.rows.len())
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(
                "connection refused: database is unreachable".to_string(),
            ))
        }
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

fn missing_table() -> StoreError {
    StoreError::Unavailable(r#"relation "deployments" does not exist"#.to_string())
}

#[async_trait]
impl DeploymentStore for MemoryStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        self.check_online()?;
        let mut table = self.table.write().map_err(poisoned)?;
        table.created = true;
        Ok(())
    }

    async fn insert(&self, deployment: &NewDeployment) -> StoreResult<DeploymentRecord> {
        self.check_online()?;
        let mut table = self.table.write().map_err(poisoned)?;
        if !table.created {
            return Err(missing_table());
        }

        table.last_id += 1;
        let record = DeploymentRecord {
            id: table.last_id,
            version: deployment.version().to_string(),
            environment: deployment.environment().to_string(),
            deployed_at: Utc::now(),
            status: DEFAULT_DEPLOYMENT_STATUS.to_string(),
        };
        table.rows.push(record.clone());

        Ok(record)
    }

    async fn list_recent(&self, limit: u32) -> StoreResult<Vec<DeploymentRecord>> {
        self.check_online()?;
        let table = self.table.read().map_err(poisoned)?;
        if !table.created {
            return Err(missing_table());
        }

        let mut records = table.rows.clone();
        records.sort_by(|a, b| {
            b.deployed_at
                .cmp(&a.deployed_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        records.truncate(limit as usize);

        Ok(records)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_online()
    }
}
