//! Weather alert models

use serde::{Deserialize, Serialize};

fn default_priority() -> String {
    "medium".to_string()
}

/// A weather alert as returned by `GET /weather/alerts`.
///
/// The backend omits fields freely; defaults keep the dashboard rendering.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(default, deserialize_with = "super::id_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// low | medium | high; absent values display as "medium"
    #[serde(default = "default_priority")]
    pub priority: String,
    /// Location the alert targets, when scoped
    #[serde(default, deserialize_with = "super::id_string")]
    pub location_id: Option<String>,
    pub created_at: Option<String>,
}

impl Default for Alert {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            message: String::new(),
            priority: default_priority(),
            location_id: None,
            created_at: None,
        }
    }
}

/// Payload for `POST /weather/alerts`.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    pub title: String,
    pub message: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}
