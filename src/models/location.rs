//! Location model for managed dashboard locations

use serde::{Deserialize, Serialize};

/// A location weather is tracked for, as returned by
/// `GET /users/locations/all` and `GET /admin/locations`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, deserialize_with = "super::id_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Administrative district (Rwanda-style), when the backend provides it
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Location {
    /// Display label: "name (district)" when a district is known
    #[must_use]
    pub fn label(&self) -> String {
        match &self.district {
            Some(district) if !district.is_empty() => format!("{} ({district})", self.name),
            _ => self.name.clone(),
        }
    }

    /// Format location as coordinates string, when coordinates are present
    #[must_use]
    pub fn format_coordinates(&self) -> Option<String> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(format!("{lat:.4}, {lon:.4}")),
            _ => None,
        }
    }
}
