//! HTTP API server for the trust center content service.
//!
//! This crate provides:
//! - Content reads for teams, trust controls and FAQs
//! - A read-through TTL cache in front of Postgres
//! - Cache administration and health endpoints
//! - Prometheus metrics

pub mod cache;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use cache::{CacheService, CacheStats, Fetched, Source};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
