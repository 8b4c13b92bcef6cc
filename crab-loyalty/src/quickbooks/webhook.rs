//! QuickBooks webhook payload and signature verification

use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

/// Header carrying base64(HMAC-SHA256(verifier token, raw body))
pub const SIGNATURE_HEADER: &str = "intuit-signature";

/// Verify the `intuit-signature` header against the raw request body.
///
/// Comparison goes through `Mac::verify_slice` (constant-time).
pub fn verify_webhook_signature(
    payload: &[u8],
    signature: &str,
    verifier_token: &str,
) -> Result<(), &'static str> {
    if verifier_token.is_empty() {
        return Err("Webhook verifier token not configured");
    }
    if signature.trim().is_empty() {
        return Err("Empty webhook signature");
    }

    let sig_bytes = base64::engine::general_purpose::STANDARD
        .decode(signature.trim())
        .map_err(|_| "Invalid signature base64")?;

    let mut mac =
        Hmac::<Sha256>::new_from_slice(verifier_token.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(payload);
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Webhook signature mismatch")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub event_notifications: Vec<EventNotification>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventNotification {
    pub realm_id: Option<String>,
    pub data_change_event: Option<DataChangeEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataChangeEvent {
    #[serde(default)]
    pub entities: Vec<ChangedEntity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedEntity {
    /// `Invoice`, `Payment`, `Customer`, ...
    pub name: String,
    pub id: String,
    /// `Create`, `Update`, `Delete`, `Merge`, `Void`
    pub operation: String,
    pub last_updated: Option<String>,
}

impl WebhookPayload {
    /// Every (realm, entity) pair in payload order
    pub fn entities(&self) -> impl Iterator<Item = (Option<&str>, &ChangedEntity)> {
        self.event_notifications.iter().flat_map(|n| {
            n.data_change_event
                .iter()
                .flat_map(|e| e.entities.iter())
                .map(move |entity| (n.realm_id.as_deref(), entity))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(body: &[u8], key: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes()).unwrap();
        mac.update(body);
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_valid_signature() {
        let body = br#"{"eventNotifications":[]}"#;
        let sig = sign(body, "verifier");
        assert!(verify_webhook_signature(body, &sig, "verifier").is_ok());
    }

    #[test]
    fn rejects_tampered_body_and_wrong_key() {
        let body = br#"{"eventNotifications":[]}"#;
        let sig = sign(body, "verifier");
        assert_eq!(
            verify_webhook_signature(b"{}", &sig, "verifier"),
            Err("Webhook signature mismatch")
        );
        assert_eq!(
            verify_webhook_signature(body, &sig, "other"),
            Err("Webhook signature mismatch")
        );
    }

    #[test]
    fn rejects_malformed_or_missing_inputs() {
        let body = b"{}";
        assert_eq!(
            verify_webhook_signature(body, "not base64!!", "verifier"),
            Err("Invalid signature base64")
        );
        assert_eq!(
            verify_webhook_signature(body, "", "verifier"),
            Err("Empty webhook signature")
        );
        let sig = sign(body, "");
        assert!(verify_webhook_signature(body, &sig, "").is_err());
    }

    #[test]
    fn flattens_entities_across_notifications() {
        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "eventNotifications": [
                {
                    "realmId": "9130",
                    "dataChangeEvent": {
                        "entities": [
                            { "name": "Invoice", "id": "130", "operation": "Update",
                              "lastUpdated": "2024-05-01T10:00:00.000Z" },
                            { "name": "Payment", "id": "301", "operation": "Create" }
                        ]
                    }
                },
                { "realmId": "9130" },
                {
                    "realmId": "9131",
                    "dataChangeEvent": {
                        "entities": [{ "name": "Customer", "id": "58", "operation": "Create" }]
                    }
                }
            ]
        }))
        .unwrap();

        let pairs: Vec<_> = payload
            .entities()
            .map(|(realm, e)| (realm.unwrap_or(""), e.name.as_str(), e.id.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("9130", "Invoice", "130"),
                ("9130", "Payment", "301"),
                ("9131", "Customer", "58"),
            ]
        );
    }
}
