//! Data models for the `AgroClim` dashboard
//!
//! This module contains the transfer shapes mirrored from the backend,
//! organized by concern:
//! - Weather: historical daily records and their nested summary
//! - Location: managed locations weather is reported for
//! - Farmer: registered farmers reachable by broadcast
//! - Alert: weather alerts shown on and sent from the dashboard
//! - Message: SMS-style broadcast messages
//!
//! Validation, uniqueness and lifecycle of these entities are entirely the
//! backend's responsibility; the client only fills in display defaults.

pub mod alert;
pub mod farmer;
pub mod location;
pub mod message;
pub mod weather;

// Re-export all public types for convenient access
pub use alert::{Alert, NewAlert};
pub use farmer::{Farmer, NewFarmer};
pub use location::Location;
pub use message::{BroadcastMessage, MessageReceipt};
pub use weather::{HistoricalRecord, WeatherSummary};

use serde::{Deserialize, Deserializer};

/// Deserialize an identifier the backend sometimes sends as a number and
/// sometimes as a string.
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
        StringOrNumber::String(s) => s,
        StringOrNumber::Int(n) => n.to_string(),
        StringOrNumber::Float(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "id_string")]
        id: Option<String>,
    }

    #[test]
    fn test_id_string_accepts_both_shapes() {
        let from_string: Probe = serde_json::from_str(r#"{"id": "loc-3"}"#).unwrap();
        assert_eq!(from_string.id.as_deref(), Some("loc-3"));

        let from_number: Probe = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert_eq!(from_number.id.as_deref(), Some("3"));

        let missing: Probe = serde_json::from_str(r#"{}"#).unwrap();
        assert!(missing.id.is_none());
    }
}
