//! PostgreSQL deployment store implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};

use crate::config::{DatabaseConfig, DEFAULT_DEPLOYMENT_STATUS};

use super::{DeploymentRecord, DeploymentStore, NewDeployment, StoreResult};

/// PostgreSQL-backed deployment store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

/// Row shape of the `deployments` table.
///
/// `deployed_at` is a zone-less TIMESTAMP holding UTC.
#[derive(sqlx::FromRow)]
struct DeploymentRow {
    id: i32,
    version: String,
    environment: String,
    deployed_at: NaiveDateTime,
    status: String,
}

impl From<DeploymentRow> for DeploymentRecord {
    fn from(row: DeploymentRow) -> Self {
        Self {
            id: row.id,
            version: row.version,
            environment: row.environment,
            deployed_at: row.deployed_at.and_utc(),
            status: row.status,
        }
    }
}

impl PostgresStore {
    /// Build a store whose pool connects on first use.
    ///
    /// No connection is attempted here, so an unreachable database at startup
    /// surfaces as request failures instead of a failed boot.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect_lazy_with(connect_options(config));

        Self { pool }
    }
}

fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let ssl_mode = if config.ssl {
        PgSslMode::Require
    } else {
        PgSslMode::Disable
    };

    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user)
        .password(&config.password)
        .ssl_mode(ssl_mode)
}

#[async_trait]
impl DeploymentStore for PostgresStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS deployments (
                id SERIAL PRIMARY KEY,
                version VARCHAR(50) NOT NULL,
                environment VARCHAR(20) NOT NULL,
                deployed_at TIMESTAMP NOT NULL DEFAULT (NOW() AT TIME ZONE 'UTC'),
                status VARCHAR(20) NOT NULL DEFAULT 'active'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_deployments_deployed_at
            ON deployments (deployed_at DESC, id DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert(&self, deployment: &NewDeployment) -> StoreResult<DeploymentRecord> {
        let row = sqlx::query_as::<_, DeploymentRow>(
            r#"
            INSERT INTO deployments (version, environment, deployed_at, status)
            VALUES ($1, $2, NOW() AT TIME ZONE 'UTC', $3)
            RETURNING id, version, environment, deployed_at, status
            "#,
        )
        .bind(deployment.version())
        .bind(deployment.environment())
        .bind(DEFAULT_DEPLOYMENT_STATUS)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_recent(&self, limit: u32) -> StoreResult<Vec<DeploymentRecord>> {
        let rows = sqlx::query_as::<_, DeploymentRow>(
            r#"
            SELECT id, version, environment, deployed_at, status
            FROM deployments
            ORDER BY deployed_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DeploymentRecord::from).collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
