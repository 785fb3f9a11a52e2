//! gitops-demo entry point.
//!
//! Initializes configuration and tracing, builds the lazily-connected database
//! pool, starts the HTTP server, and bootstraps the schema once the listener
//! is up.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gitops_demo::config::{AppConfig, DEFAULT_LOG_FILTER};
use gitops_demo::store::{DeploymentStore, MemoryStore, PostgresStore};
use gitops_demo::{bootstrap, create_router, http, AppState};

/// Health, version and deployment-history service for GitOps rollouts
#[derive(Parser, Debug)]
#[command(name = "gitops-demo", version, about)]
struct Args {
    /// Optional TOML configuration file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level filter (e.g., "gitops_demo=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Keep deployments in memory instead of PostgreSQL
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref())?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        version = %config.app.version,
        environment = %config.app.environment,
        deployment_id = %config.app.deployment_id,
        "Loaded configuration"
    );

    let store: Arc<dyn DeploymentStore> = if args.memory {
        tracing::warn!("Using in-memory deployment store; records are lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        tracing::info!(
            host = %config.database.host,
            port = config.database.port,
            database = %config.database.name,
            ssl = config.database.ssl,
            max_connections = config.database.max_connections,
            "Database pool configured"
        );
        Arc::new(PostgresStore::connect_lazy(&config.database))
    };

    let state = AppState::new(config.clone(), Arc::clone(&store));
    let app = create_router(state);

    http::start_server(app, &config.http, move |_addr| async move {
        bootstrap::ensure_schema(store.as_ref()).await;
    })
    .await?;

    Ok(())
}
