//! Bodies answered to webhook senders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `400` body for a subscription whose handshake has not completed.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookRejected {
    /// Always `false`.
    pub success: bool,
    /// Names the unverified subscription.
    pub message: String,
}

impl WebhookRejected {
    /// Rejection for the subscription `name`.
    pub fn no_secret(name: &str) -> Self {
        Self {
            success: false,
            message: format!(
                "Webhook '{name}' has no secret established; send X-Hook-Secret to verify"
            ),
        }
    }
}

/// `201` body for a completed handshake.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookVerified {
    /// Always `true`.
    pub success: bool,
    /// Names the verified subscription.
    pub message: String,
}

impl WebhookVerified {
    /// Confirmation for the subscription `name`.
    pub fn established(name: &str) -> Self {
        Self {
            success: true,
            message: format!("Secret established for webhook '{name}'"),
        }
    }
}

/// `200` body for an accepted delivery.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAccepted {
    /// Always `true`.
    pub success: bool,
    /// HTTP method of the request.
    pub method: String,
    /// Request headers as received.
    pub headers: BTreeMap<String, String>,
}

impl WebhookAccepted {
    /// Echoes the method and headers of the accepted request.
    pub fn new(method: impl Into<String>, headers: BTreeMap<String, String>) -> Self {
        Self {
            success: true,
            method: method.into(),
            headers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_names_subscription() -> anyhow::Result<()> {
        let body = serde_json::to_value(WebhookRejected::no_secret("name"))?;
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "message": "Webhook 'name' has no secret established; send X-Hook-Secret to verify",
            })
        );
        Ok(())
    }
}
