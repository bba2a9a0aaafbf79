//! SMS-style broadcast message models

use serde::{Deserialize, Serialize};

/// Payload for `POST /messages/broadcast`. Delivery (SMS gateway, per-farmer
/// fan-out) is entirely the backend's job; this is fire-and-forget.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastMessage {
    /// Message body sent to every recipient
    pub body: String,
    /// Farmer ids to deliver to; empty means "all farmers"
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipient_ids: Vec<String>,
    /// Restrict the broadcast to one location's farmers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

/// The backend's acknowledgement of an accepted write: a 2xx with an
/// optional `{message}` body.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageReceipt {
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageReceipt {
    /// Acknowledgement text, or a generic fallback
    #[must_use]
    pub fn text(&self) -> &str {
        self.message.as_deref().unwrap_or("Request accepted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_serialization() {
        let msg = BroadcastMessage {
            body: "Rain expected Thursday; delay fertilizer application.".into(),
            recipient_ids: vec!["8".into(), "9".into()],
            location_id: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("recipientIds"));
        assert!(!json.contains("locationId"));
    }

    #[test]
    fn test_broadcast_to_all_omits_recipients() {
        let msg = BroadcastMessage {
            body: "Season B planting window opens next week.".into(),
            recipient_ids: vec![],
            location_id: Some("3".into()),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("recipientIds"));
        assert!(json.contains("locationId"));
    }

    #[test]
    fn test_receipt_fallback_text() {
        let empty = MessageReceipt::default();
        assert_eq!(empty.text(), "Request accepted");

        let receipt: MessageReceipt =
            serde_json::from_str(r#"{"message": "Broadcast queued"}"#).unwrap();
        assert_eq!(receipt.text(), "Broadcast queued");
    }
}
