//! Equipment Status Server
//!
//! Serves factory equipment operating status over a REST JSON API. Reads
//! come from a Cosmos DB container when one is configured and reachable,
//! and fall back to a built-in sample catalog otherwise.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

/// Current UTC time as ISO-8601 with a `Z` suffix
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
