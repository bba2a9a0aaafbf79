//! `AgroClim` - climate and weather dashboard for agricultural extension work
//!
//! This library provides the client core behind the dashboard CLI: backend
//! API access, historical weather aggregation, response-shape normalization,
//! and CSV export.

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod view;

// Re-export core types for public API
pub use aggregate::{
    AnnualBucket, MonthlyBucket, Season, SeasonBucket, aggregate_by_month, aggregate_by_season,
    aggregate_by_year,
};
pub use api::{BackendClient, HistoricalQuery, ListPage, Pagination, WeatherHistoryProvider};
pub use config::AgroClimConfig;
pub use error::{AgroClimError, ErrorCode};
pub use models::{Alert, Farmer, HistoricalRecord, Location};
pub use view::{DataOrigin, HistoricalEvent, HistoricalView, ViewMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AgroClimError>;
