//! Solver daemon library
//!
//! This module provides the components of the expression evaluation
//! service:
//! - REST API handlers for `/solve`, `/health`, and `/`
//! - Configuration loading
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use api::{create_router, AppState};
pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError};
pub use server::Server;
