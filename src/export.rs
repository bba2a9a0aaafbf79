//! CSV export for dashboard datasets.
//!
//! Pure client-side formatting: a header row plus one row per record. The
//! `csv` writer handles RFC 4180 quoting so commas, quotes, and newlines
//! inside field values survive a round-trip through spreadsheet tools.

use std::path::Path;

use crate::AgroClimError;
use crate::models::{Alert, Farmer, HistoricalRecord};

/// Column headers for the historical weather export.
pub const HISTORICAL_HEADERS: [&str; 10] = [
    "date",
    "temp_min_c",
    "temp_max_c",
    "temp_current_c",
    "rain_mm",
    "rain_chance_pct",
    "humidity_pct",
    "wind",
    "conditions",
    "recommendation",
];

/// Column headers for the farmer list export.
pub const FARMER_HEADERS: [&str; 5] = ["id", "name", "phone", "location", "crop"];

/// Column headers for the alert list export.
pub const ALERT_HEADERS: [&str; 6] = ["id", "title", "message", "priority", "location_id", "created_at"];

/// Render a header row and data rows as CSV text.
pub fn to_csv(headers: &[&str], rows: &[Vec<String>]) -> crate::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(headers)
        .map_err(|e| AgroClimError::general(format!("CSV serialization error: {e}")))?;
    for row in rows {
        wtr.write_record(row)
            .map_err(|e| AgroClimError::general(format!("CSV serialization error: {e}")))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AgroClimError::general(format!("CSV writer error: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| AgroClimError::general(format!("UTF-8 conversion error: {e}")))
}

fn opt_num(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_default()
}

/// Flatten historical records into export rows matching
/// [`HISTORICAL_HEADERS`].
#[must_use]
pub fn historical_rows(records: &[HistoricalRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            let s = &r.weather_summary;
            let wind = match (&s.wind.speed, &s.wind.direction) {
                (Some(speed), Some(dir)) => format!("{speed:.1} km/h {dir}"),
                (Some(speed), None) => format!("{speed:.1} km/h"),
                (None, Some(dir)) => dir.clone(),
                (None, None) => String::new(),
            };
            vec![
                r.date.clone(),
                opt_num(s.temperature.min),
                opt_num(s.temperature.max),
                opt_num(s.temperature.current),
                opt_num(s.precipitation.rain_amount),
                opt_num(s.precipitation.rain_chance),
                opt_num(s.atmospheric.humidity),
                wind,
                s.conditions.description.clone().unwrap_or_default(),
                s.farming.farming_recommendation.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

/// Flatten farmers into export rows matching [`FARMER_HEADERS`].
#[must_use]
pub fn farmer_rows(farmers: &[Farmer]) -> Vec<Vec<String>> {
    farmers
        .iter()
        .map(|f| {
            vec![
                f.id.clone().unwrap_or_default(),
                f.name.clone(),
                f.phone.clone().unwrap_or_default(),
                f.location.clone().unwrap_or_default(),
                f.crop.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

/// Flatten alerts into export rows matching [`ALERT_HEADERS`].
#[must_use]
pub fn alert_rows(alerts: &[Alert]) -> Vec<Vec<String>> {
    alerts
        .iter()
        .map(|a| {
            vec![
                a.id.clone().unwrap_or_default(),
                a.title.clone(),
                a.message.clone(),
                a.priority.clone(),
                a.location_id.clone().unwrap_or_default(),
                a.created_at.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

/// Write CSV text to a file.
pub fn write_csv_file(path: impl AsRef<Path>, csv: &str) -> crate::Result<()> {
    std::fs::write(path, csv)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Re-parse generated CSV so tests assert on fields, not on quoting.
    fn parse_csv(text: &str) -> Vec<Vec<String>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes());
        rdr.records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_plain_fields_stay_unquoted() {
        let rows = vec![vec!["Musanze".to_string(), "12".to_string()]];
        let csv = to_csv(&["name", "value"], &rows).unwrap();
        assert_eq!(csv.lines().nth(1), Some("Musanze,12"));
    }

    #[test]
    fn test_comma_survives_round_trip() {
        // The quoting gap from the original dashboard: a value containing a
        // comma must re-parse as one field.
        let rows = vec![vec!["A,B".to_string(), "1".to_string()]];
        let csv = to_csv(&["name", "value"], &rows).unwrap();
        let parsed = parse_csv(&csv);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1], vec!["A,B".to_string(), "1".to_string()]);
    }

    #[test]
    fn test_quotes_escaped() {
        let rows = vec![vec!["say \"maize\"".to_string()]];
        let csv = to_csv(&["note"], &rows).unwrap();
        let parsed = parse_csv(&csv);
        assert_eq!(parsed[1], vec!["say \"maize\"".to_string()]);
    }

    #[test]
    fn test_newline_survives_round_trip() {
        let rows = vec![vec!["line1\nline2".to_string(), "x".to_string()]];
        let csv = to_csv(&["note", "other"], &rows).unwrap();
        let parsed = parse_csv(&csv);
        assert_eq!(parsed[1][0], "line1\nline2");
        assert_eq!(parsed[1][1], "x");
    }

    #[test]
    fn test_historical_rows_shape() {
        let mut record = HistoricalRecord {
            date: "2024-01-10".to_string(),
            ..Default::default()
        };
        record.weather_summary.temperature.current = Some(20.0);
        record.weather_summary.precipitation.rain_amount = Some(5.0);
        record.weather_summary.farming.farming_recommendation =
            Some("Plant beans, maize".to_string());

        let rows = historical_rows(&[record]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), HISTORICAL_HEADERS.len());
        assert_eq!(rows[0][0], "2024-01-10");
        assert_eq!(rows[0][3], "20.0");
        assert_eq!(rows[0][4], "5.0");

        // The comma inside the recommendation must not add a column.
        let csv = to_csv(&HISTORICAL_HEADERS, &rows).unwrap();
        let parsed = parse_csv(&csv);
        assert_eq!(parsed[1].len(), HISTORICAL_HEADERS.len());
        assert_eq!(parsed[1][9], "Plant beans, maize");
    }

    #[test]
    fn test_alert_rows_shape() {
        let alert = Alert {
            id: Some("42".into()),
            title: "Heavy rain".into(),
            message: "Expect flooding, move stored grain".into(),
            priority: "high".into(),
            location_id: None,
            created_at: Some("2024-04-02".into()),
        };
        let rows = alert_rows(&[alert]);
        assert_eq!(rows[0].len(), ALERT_HEADERS.len());
        assert_eq!(rows[0][0], "42");
        assert_eq!(rows[0][3], "high");
        assert_eq!(rows[0][4], "");
    }

    #[test]
    fn test_empty_records_export_headers_only() {
        let csv = to_csv(&HISTORICAL_HEADERS, &historical_rows(&[])).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
