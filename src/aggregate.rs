//! Historical weather aggregation.
//!
//! Transforms a flat, chronologically unordered list of daily records into
//! monthly, annual, and seasonal buckets for the dashboard's time-series
//! views. All functions are pure: same records in, same buckets out.
//!
//! Missing-data policy: a record whose date fails to parse is skipped
//! entirely; a record missing one numeric field is skipped for that field
//! only (per-field denominators), so a sparse temperature feed never drags
//! an average toward zero and NaN is never produced. A mean over zero
//! contributing values reports `0.0`.

use chrono::Datelike;
use serde::Serialize;

use crate::models::HistoricalRecord;

/// Short calendar month names in display order.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Aggregate for one calendar month.
///
/// The monthly view merges the same calendar month across years (a
/// multi-year climatology), so a two-year range shows one "Mar" bar covering
/// both Marches. Per-year series use [`aggregate_by_year`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    pub month: &'static str,
    /// Mean of daily minimum temperatures, °C
    pub temp_min: f64,
    /// Mean of daily maximum temperatures, °C
    pub temp_max: f64,
    /// Mean of daily current temperatures, °C
    pub temp_avg: f64,
    /// Total rainfall, mm
    pub rainfall: f64,
}

/// Aggregate for one calendar year, same field semantics as [`MonthlyBucket`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualBucket {
    pub year: i32,
    pub temp_min: f64,
    pub temp_max: f64,
    pub temp_avg: f64,
    pub rainfall: f64,
}

/// Aggregate for one agricultural season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonBucket {
    pub name: &'static str,
    /// Total rainfall, mm
    pub rainfall: f64,
    /// Mean of daily current temperatures, °C
    pub temperature: f64,
    /// Number of contributing records
    pub days: usize,
}

/// Rwanda-style agricultural seasons. Fixed, non-overlapping calendar-month
/// ranges covering all 12 months; membership depends only on the month, not
/// the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    /// Season A: September through January
    A,
    /// Season B: February through May
    B,
    /// Season C: June through August
    C,
}

impl Season {
    /// Season for a calendar month (1-based).
    #[must_use]
    pub fn from_month(month: u32) -> Self {
        match month {
            2..=5 => Season::B,
            6..=8 => Season::C,
            // 9..=12 and 1
            _ => Season::A,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Season::A => "Season A",
            Season::B => "Season B",
            Season::C => "Season C",
        }
    }

    fn index(self) -> usize {
        match self {
            Season::A => 0,
            Season::B => 1,
            Season::C => 2,
        }
    }
}

/// Running sums with per-field denominators.
#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    records: usize,
    min_sum: f64,
    min_count: usize,
    max_sum: f64,
    max_count: usize,
    current_sum: f64,
    current_count: usize,
    rainfall: f64,
}

impl Accumulator {
    fn add(&mut self, record: &HistoricalRecord) {
        self.records += 1;

        let temp = &record.weather_summary.temperature;
        if let Some(min) = temp.min {
            self.min_sum += min;
            self.min_count += 1;
        }
        if let Some(max) = temp.max {
            self.max_sum += max;
            self.max_count += 1;
        }
        if let Some(current) = temp.current {
            self.current_sum += current;
            self.current_count += 1;
        }
        if let Some(rain) = record.weather_summary.precipitation.rain_amount {
            self.rainfall += rain;
        }
    }

    fn temp_min(&self) -> f64 {
        mean(self.min_sum, self.min_count)
    }

    fn temp_max(&self) -> f64 {
        mean(self.max_sum, self.max_count)
    }

    fn temp_avg(&self) -> f64 {
        mean(self.current_sum, self.current_count)
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Bucket records by calendar month.
///
/// Output is in calendar order (Jan..Dec), filtered to months with at least
/// one contributing record. Empty input returns an empty list.
#[must_use]
pub fn aggregate_by_month(records: &[HistoricalRecord]) -> Vec<MonthlyBucket> {
    let mut months = [Accumulator::default(); 12];

    for record in records {
        let Some(date) = record.naive_date() else {
            continue;
        };
        months[date.month0() as usize].add(record);
    }

    months
        .iter()
        .enumerate()
        .filter(|(_, acc)| acc.records > 0)
        .map(|(i, acc)| MonthlyBucket {
            month: MONTH_NAMES[i],
            temp_min: acc.temp_min(),
            temp_max: acc.temp_max(),
            temp_avg: acc.temp_avg(),
            rainfall: acc.rainfall,
        })
        .collect()
}

/// Bucket records by calendar year, ascending.
#[must_use]
pub fn aggregate_by_year(records: &[HistoricalRecord]) -> Vec<AnnualBucket> {
    let mut years = std::collections::BTreeMap::<i32, Accumulator>::new();

    for record in records {
        let Some(date) = record.naive_date() else {
            continue;
        };
        years.entry(date.year()).or_default().add(record);
    }

    years
        .iter()
        .map(|(&year, acc)| AnnualBucket {
            year,
            temp_min: acc.temp_min(),
            temp_max: acc.temp_max(),
            temp_avg: acc.temp_avg(),
            rainfall: acc.rainfall,
        })
        .collect()
}

/// Bucket records into the three fixed agricultural seasons.
///
/// Always returns exactly three buckets in A, B, C order, zero-filled when
/// no records contribute (including empty input).
#[must_use]
pub fn aggregate_by_season(records: &[HistoricalRecord]) -> [SeasonBucket; 3] {
    let mut accs = [Accumulator::default(); 3];

    for record in records {
        let Some(date) = record.naive_date() else {
            continue;
        };
        accs[Season::from_month(date.month()).index()].add(record);
    }

    [Season::A, Season::B, Season::C].map(|season| {
        let acc = &accs[season.index()];
        SeasonBucket {
            name: season.name(),
            rainfall: acc.rainfall,
            temperature: acc.temp_avg(),
            days: acc.records,
        }
    })
}
