//! HTTP API handlers for mxp-ex

pub mod exports;
pub mod health;

pub use exports::export_routes;
pub use health::health_routes;
