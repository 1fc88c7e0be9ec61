//! Jobboard REST API
//!
//! This crate provides the Axum-based HTTP API for the job board:
//! authentication, user management, job postings and applications.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
