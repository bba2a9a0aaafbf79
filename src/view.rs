//! Dashboard page view-models.
//!
//! Each page's state is an explicit immutable struct updated by discrete
//! reducer-style events, so fetch/aggregate behavior is testable without any
//! rendering. The renderer in `main.rs` only reads the resulting state.
//!
//! When a fetch fails the historical page can fall back to bundled sample
//! records so the dashboard stays populated, but never silently: the data
//! origin is tracked and rendered as a banner.

use std::fmt;
use std::str::FromStr;

use crate::aggregate::{AnnualBucket, MonthlyBucket, SeasonBucket, aggregate_by_month,
    aggregate_by_season, aggregate_by_year};
use crate::models::HistoricalRecord;
use crate::models::weather::{Conditions, Farming, Precipitation, Temperature};

/// Where the currently displayed records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    /// Fetched from the backend for this view
    Live,
    /// Bundled sample data substituted after a fetch failure
    Sample,
}

/// Which aggregation the historical page is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Monthly,
    Seasonal,
    Annual,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monthly" => Ok(ViewMode::Monthly),
            "seasonal" => Ok(ViewMode::Seasonal),
            "annual" | "yearly" => Ok(ViewMode::Annual),
            other => Err(format!(
                "Unknown view '{other}'. Expected monthly, seasonal, or annual."
            )),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Monthly => write!(f, "monthly"),
            ViewMode::Seasonal => write!(f, "seasonal"),
            ViewMode::Annual => write!(f, "annual"),
        }
    }
}

/// Lifecycle of a page's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Events driving the historical page.
#[derive(Debug, Clone)]
pub enum HistoricalEvent {
    FetchStarted { location_id: String },
    FetchSucceeded(Vec<HistoricalRecord>),
    /// Fetch failed; when `use_sample` is set the page falls back to
    /// bundled sample records instead of showing an empty table.
    FetchFailed { message: String, use_sample: bool },
    ModeChanged(ViewMode),
}

/// State of the historical weather page.
#[derive(Debug, Clone)]
pub struct HistoricalView {
    pub location_id: Option<String>,
    pub status: ViewStatus,
    pub records: Vec<HistoricalRecord>,
    pub origin: DataOrigin,
    pub mode: ViewMode,
}

impl Default for HistoricalView {
    fn default() -> Self {
        Self {
            location_id: None,
            status: ViewStatus::Idle,
            records: Vec::new(),
            origin: DataOrigin::Live,
            mode: ViewMode::default(),
        }
    }
}

impl HistoricalView {
    /// Apply one event, producing the next state.
    #[must_use]
    pub fn apply(mut self, event: HistoricalEvent) -> Self {
        match event {
            HistoricalEvent::FetchStarted { location_id } => {
                self.location_id = Some(location_id);
                self.status = ViewStatus::Loading;
                self.records.clear();
                self.origin = DataOrigin::Live;
            }
            HistoricalEvent::FetchSucceeded(records) => {
                self.records = records;
                self.origin = DataOrigin::Live;
                self.status = ViewStatus::Ready;
            }
            HistoricalEvent::FetchFailed {
                message,
                use_sample,
            } => {
                if use_sample {
                    self.records = sample_records();
                    self.origin = DataOrigin::Sample;
                    self.status = ViewStatus::Ready;
                    tracing::warn!("Backend fetch failed, showing sample data: {}", message);
                } else {
                    self.records.clear();
                    self.status = ViewStatus::Failed(message);
                }
            }
            HistoricalEvent::ModeChanged(mode) => {
                self.mode = mode;
            }
        }
        self
    }

    /// Whether the page is showing substituted sample data.
    #[must_use]
    pub fn is_sample(&self) -> bool {
        self.origin == DataOrigin::Sample
    }

    #[must_use]
    pub fn monthly(&self) -> Vec<MonthlyBucket> {
        aggregate_by_month(&self.records)
    }

    #[must_use]
    pub fn seasonal(&self) -> [SeasonBucket; 3] {
        aggregate_by_season(&self.records)
    }

    #[must_use]
    pub fn annual(&self) -> Vec<AnnualBucket> {
        aggregate_by_year(&self.records)
    }
}

/// Bundled sample records: one plausible day per month of 2024 for a
/// highland location. Used only as a tagged fallback when the backend is
/// unreachable.
#[must_use]
pub fn sample_records() -> Vec<HistoricalRecord> {
    const DAYS: [(&str, f64, f64, f64, &str); 12] = [
        ("2024-01-15", 14.0, 26.0, 20.0, "Scattered showers"),
        ("2024-02-15", 14.5, 27.0, 21.0, "Partly cloudy"),
        ("2024-03-15", 14.0, 25.5, 20.0, "Rain"),
        ("2024-04-15", 14.5, 24.5, 19.5, "Heavy rain"),
        ("2024-05-15", 14.0, 25.0, 19.5, "Rain"),
        ("2024-06-15", 12.5, 26.5, 19.5, "Sunny"),
        ("2024-07-15", 12.0, 27.0, 20.0, "Sunny"),
        ("2024-08-15", 13.0, 27.5, 20.5, "Partly cloudy"),
        ("2024-09-15", 14.0, 26.5, 20.5, "Scattered showers"),
        ("2024-10-15", 14.5, 25.5, 20.0, "Rain"),
        ("2024-11-15", 14.5, 25.0, 19.5, "Rain"),
        ("2024-12-15", 14.0, 25.5, 19.5, "Scattered showers"),
    ];
    const RAIN_MM: [f64; 12] = [
        60.0, 75.0, 110.0, 150.0, 95.0, 20.0, 10.0, 25.0, 70.0, 100.0, 115.0, 80.0,
    ];

    DAYS.iter()
        .zip(RAIN_MM.iter())
        .map(|(&(date, min, max, current, description), &rain)| {
            let mut record = HistoricalRecord {
                date: date.to_string(),
                ..Default::default()
            };
            record.weather_summary.temperature = Temperature {
                min: Some(min),
                max: Some(max),
                current: Some(current),
            };
            record.weather_summary.precipitation = Precipitation {
                rain_amount: Some(rain),
                rain_chance: None,
            };
            record.weather_summary.conditions = Conditions {
                description: Some(description.to_string()),
            };
            record.weather_summary.farming = Farming {
                soil_condition: None,
                farming_recommendation: None,
            };
            record
        })
        .collect()
}
