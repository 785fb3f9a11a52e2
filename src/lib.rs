//! gitops-demo: health, version and deployment-history service.
//!
//! The deployment log is an append-only PostgreSQL table that a delivery
//! pipeline writes to after each rollout and reads back to verify it.
//! `/health` reports database reachability so blue-green switches can wait
//! for a release that can actually serve.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
