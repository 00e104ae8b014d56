//! Webhook subscriptions.

use std::collections::BTreeSet;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named webhook endpoint bound to one upstream resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique name used in the delivery URL.
    pub name: String,
    /// Identifier of the upstream resource.
    pub resource_id: String,
    /// Kind of the upstream resource (project, portfolio, ...).
    pub resource_type: String,
    /// Handshake secret; set once and never rotated.
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    /// Names of the handlers assigned to this subscription.
    pub handler_names: BTreeSet<String>,
    /// Creation timestamp.
    pub created_at: Timestamp,
}

impl Subscription {
    /// Returns the established secret, treating an empty string as unset.
    pub fn established_secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|secret| !secret.is_empty())
    }

    /// Returns whether the handshake has completed.
    #[inline]
    pub fn has_secret(&self) -> bool {
        self.established_secret().is_some()
    }

    /// Returns whether any handler is assigned.
    #[inline]
    pub fn has_handlers(&self) -> bool {
        !self.handler_names.is_empty()
    }
}

/// Data for creating a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscription {
    /// Unique name used in the delivery URL.
    pub name: String,
    /// Identifier of the upstream resource.
    pub resource_id: String,
    /// Kind of the upstream resource.
    pub resource_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(secret: Option<&str>) -> Subscription {
        Subscription {
            id: Uuid::now_v7(),
            name: "name".into(),
            resource_id: "123".into(),
            resource_type: "project".into(),
            secret: secret.map(str::to_owned),
            handler_names: BTreeSet::new(),
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn test_empty_secret_is_not_established() {
        assert!(!subscription(None).has_secret());
        assert!(!subscription(Some("")).has_secret());
        assert_eq!(subscription(Some("abc")).established_secret(), Some("abc"));
    }

    #[test]
    fn test_secret_is_not_serialized() -> anyhow::Result<()> {
        let value = serde_json::to_value(subscription(Some("abc")))?;
        assert!(value.get("secret").is_none());
        assert_eq!(value["name"], "name");
        Ok(())
    }
}
