//! HTTP server plumbing.
//!
//! - Plain HTTP listener (TLS terminates at the load balancer)
//! - Graceful shutdown on SIGTERM/SIGINT
//! - Static file serving for the landing page assets

mod server;
mod shutdown;
pub mod static_files;

pub use server::{start_server, ServerError};
