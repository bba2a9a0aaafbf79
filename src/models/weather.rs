//! Historical weather record model and display methods

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of weather for a location, as returned by
/// `GET /weather/historical/location/{id}`.
///
/// Every numeric field is optional: the backend's sourcing pipeline has gaps
/// and the aggregation layer decides how missing values are treated.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRecord {
    /// Calendar date (ISO string), the grouping key for all aggregation
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub weather_summary: WeatherSummary,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSummary {
    #[serde(default)]
    pub temperature: Temperature,
    #[serde(default)]
    pub precipitation: Precipitation,
    #[serde(default)]
    pub atmospheric: Atmospheric,
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default)]
    pub farming: Farming,
}

/// Daily temperatures in degrees Celsius
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Temperature {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub current: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Precipitation {
    /// Rain amount in mm
    pub rain_amount: Option<f64>,
    /// Chance of rain in percent
    pub rain_chance: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Atmospheric {
    /// Relative humidity in percent
    pub humidity: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Wind {
    /// Wind speed in km/h
    pub speed: Option<f64>,
    /// Wind direction as reported (cardinal or descriptive)
    pub direction: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    /// Human-readable description of weather conditions
    pub description: Option<String>,
}

/// Farming guidance attached by the backend, passed through for display
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Farming {
    pub soil_condition: Option<String>,
    pub farming_recommendation: Option<String>,
}

impl HistoricalRecord {
    /// Parse the record's date. Accepts plain ISO dates and full RFC 3339
    /// timestamps (only the date part is used for bucketing).
    #[must_use]
    pub fn naive_date(&self) -> Option<NaiveDate> {
        let date_part = self.date.get(..10).unwrap_or(&self.date);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    /// Format the temperature range for table display
    #[must_use]
    pub fn format_temperature(&self) -> String {
        let t = &self.weather_summary.temperature;
        match (t.min, t.max) {
            (Some(min), Some(max)) => format!("{min:.1}–{max:.1}°C"),
            (None, Some(max)) => format!("max {max:.1}°C"),
            (Some(min), None) => format!("min {min:.1}°C"),
            (None, None) => "–".to_string(),
        }
    }

    /// Format rainfall for table display
    #[must_use]
    pub fn format_rainfall(&self) -> String {
        match self.weather_summary.precipitation.rain_amount {
            Some(mm) => format!("{mm:.1} mm"),
            None => "–".to_string(),
        }
    }

    /// Conditions description, or a placeholder when absent
    #[must_use]
    pub fn description(&self) -> &str {
        self.weather_summary
            .conditions
            .description
            .as_deref()
            .unwrap_or("–")
    }
}
