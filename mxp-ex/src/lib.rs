//! mxp-ex: media metadata export service
//!
//! Turns media items from a [`source::MediaSource`] into JSON or CSV files.
//! A detail level picks which fields of the per-type schema are exported;
//! each export runs as a background job whose status is kept in SQLite.
//!
//! Library API: [`runner::ExportRunner`]. HTTP API: [`build_router`].

pub mod api;
pub mod artifacts;
pub mod db;
pub mod error;
pub mod extractor;
pub mod filename;
pub mod flatten;
pub mod models;
pub mod output;
pub mod pagination;
pub mod resolver;
pub mod runner;
pub mod schema;
pub mod source;

pub use crate::error::{ApiError, ApiResult, ExportError};
pub use crate::runner::{ExportRunner, RunnerSettings};

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runner: ExportRunner,
    /// Default page size for job listings
    pub page_size: i64,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(runner: ExportRunner, page_size: i64) -> Self {
        Self {
            runner,
            page_size,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::export_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
