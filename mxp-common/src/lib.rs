//! # MXP Common Library
//!
//! Shared code for the MXP export service including:
//! - Error type used across crates
//! - Configuration loading and root folder resolution
//! - SQLite connection initialization
//! - Timestamp helpers
//! - Human-readable duration and file size formatting

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod human;
pub mod time;

pub use error::{Error, Result};
