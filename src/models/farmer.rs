//! Farmer models for the admin pages

use serde::{Deserialize, Serialize};

/// A registered farmer, as returned by `GET /admin/farmers`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    #[serde(default, deserialize_with = "super::id_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Phone number broadcasts are delivered to
    pub phone: Option<String>,
    /// Name of the farmer's location (denormalized by the backend)
    pub location: Option<String>,
    /// Primary crop, free text
    pub crop: Option<String>,
    pub registered_at: Option<String>,
}

impl Farmer {
    /// Phone for display, or a placeholder when the farmer has none on file
    #[must_use]
    pub fn phone_display(&self) -> &str {
        self.phone.as_deref().unwrap_or("no phone")
    }
}

/// Payload for `POST /admin/farmers`.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewFarmer {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_farmer() {
        let farmer: Farmer = serde_json::from_str(r#"{"name": "A. Uwimana"}"#).unwrap();
        assert_eq!(farmer.name, "A. Uwimana");
        assert_eq!(farmer.phone_display(), "no phone");
    }

    #[test]
    fn test_full_farmer() {
        let json = r#"{
            "id": 8,
            "name": "J. Mukamana",
            "phone": "+250780000000",
            "location": "Musanze",
            "crop": "Maize",
            "registeredAt": "2024-02-01"
        }"#;
        let farmer: Farmer = serde_json::from_str(json).unwrap();
        assert_eq!(farmer.id.as_deref(), Some("8"));
        assert_eq!(farmer.phone_display(), "+250780000000");
        assert_eq!(farmer.location.as_deref(), Some("Musanze"));
    }
}
