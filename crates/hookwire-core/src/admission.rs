//! One-time secret handshake guarding delivery acceptance.

use std::sync::Arc;

use crate::store::SubscriptionStore;
use crate::types::Subscription;
use crate::{Error, Result, TRACING_TARGET_ADMISSION};

/// Decision taken for one inbound delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// No subscription carries the requested name.
    NotFound,
    /// The presented secret was stored; the sender must get it echoed back.
    Established {
        /// The subscription whose secret was stored.
        subscription: Subscription,
        /// The stored secret.
        secret: String,
    },
    /// No secret is stored yet and none was presented.
    RejectedNoSecret {
        /// Name of the unverified subscription.
        name: String,
    },
    /// A secret is stored; the delivery is accepted.
    Accept {
        /// The subscription the delivery belongs to.
        subscription: Subscription,
        /// The stored secret to echo back.
        secret: String,
    },
}

impl AdmissionOutcome {
    /// Returns the secret the response must echo, if any.
    pub fn secret(&self) -> Option<&str> {
        match self {
            Self::Established { secret, .. } | Self::Accept { secret, .. } => Some(secret),
            Self::NotFound | Self::RejectedNoSecret { .. } => None,
        }
    }

    /// Returns a short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Established { .. } => "established",
            Self::RejectedNoSecret { .. } => "rejected_no_secret",
            Self::Accept { .. } => "accept",
        }
    }
}

/// Implements the handshake for named subscriptions.
///
/// Only the `Established` branch writes; every other branch is read-only.
/// Storage failures are returned as errors and never mapped to an outcome.
#[derive(Clone)]
pub struct AdmissionGate {
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl AdmissionGate {
    /// Creates a new gate over the given subscription store.
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        Self { subscriptions }
    }

    /// Decides whether a delivery for `name` is admitted.
    ///
    /// `presented` is the value of the sender's secret header. An empty
    /// value counts as not presented.
    pub async fn admit(&self, name: &str, presented: Option<&str>) -> Result<AdmissionOutcome> {
        let Some(subscription) = self.subscriptions.find_subscription_by_name(name).await? else {
            tracing::debug!(
                target: TRACING_TARGET_ADMISSION,
                subscription = %name,
                "unknown subscription"
            );
            return Ok(AdmissionOutcome::NotFound);
        };

        if let Some(secret) = subscription.established_secret() {
            let secret = secret.to_owned();
            return Ok(AdmissionOutcome::Accept {
                subscription,
                secret,
            });
        }

        let Some(presented) = presented.filter(|value| !value.is_empty()) else {
            tracing::info!(
                target: TRACING_TARGET_ADMISSION,
                subscription = %name,
                "rejected delivery for unverified subscription"
            );
            return Ok(AdmissionOutcome::RejectedNoSecret {
                name: subscription.name,
            });
        };

        if self
            .subscriptions
            .establish_secret(subscription.id, presented)
            .await?
        {
            tracing::info!(
                target: TRACING_TARGET_ADMISSION,
                subscription = %name,
                subscription_id = %subscription.id,
                "established subscription secret"
            );

            let mut subscription = subscription;
            subscription.secret = Some(presented.to_owned());
            return Ok(AdmissionOutcome::Established {
                subscription,
                secret: presented.to_owned(),
            });
        }

        // Another request stored a secret between the read and the write.
        let subscription = self
            .subscriptions
            .find_subscription(subscription.id)
            .await?
            .ok_or_else(|| Error::not_found(format!("subscription '{name}' disappeared")))?;

        let secret = subscription
            .established_secret()
            .map(str::to_owned)
            .ok_or_else(|| Error::internal("secret write was refused but no secret is stored"))?;

        tracing::debug!(
            target: TRACING_TARGET_ADMISSION,
            subscription = %name,
            "secret was established concurrently"
        );

        Ok(AdmissionOutcome::Accept {
            subscription,
            secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemoryStore;
    use crate::types::NewSubscription;

    async fn gate_with(name: &str) -> anyhow::Result<(AdmissionGate, Arc<MemoryStore>)> {
        let store = Arc::new(MemoryStore::new());
        store
            .create_subscription(NewSubscription {
                name: name.into(),
                resource_id: "123".into(),
                resource_type: "project".into(),
            })
            .await?;
        Ok((AdmissionGate::new(store.clone()), store))
    }

    #[tokio::test]
    async fn test_unknown_subscription() -> anyhow::Result<()> {
        let (gate, _) = gate_with("name").await?;
        let outcome = gate.admit("other", Some("abc")).await?;
        assert_eq!(outcome, AdmissionOutcome::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_without_secret() -> anyhow::Result<()> {
        let (gate, store) = gate_with("name").await?;

        let outcome = gate.admit("name", None).await?;
        assert_eq!(outcome, AdmissionOutcome::RejectedNoSecret { name: "name".into() });

        let outcome = gate.admit("name", Some("")).await?;
        assert_eq!(outcome.as_str(), "rejected_no_secret");

        let stored = store.find_subscription_by_name("name").await?;
        assert_eq!(stored.and_then(|s| s.secret), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_handshake_then_accept() -> anyhow::Result<()> {
        let (gate, store) = gate_with("name").await?;

        let outcome = gate.admit("name", Some("abc")).await?;
        assert_eq!(outcome.as_str(), "established");
        assert_eq!(outcome.secret(), Some("abc"));

        let stored = store.find_subscription_by_name("name").await?;
        assert_eq!(stored.and_then(|s| s.secret).as_deref(), Some("abc"));

        let outcome = gate.admit("name", None).await?;
        assert_eq!(outcome.as_str(), "accept");
        assert_eq!(outcome.secret(), Some("abc"));
        Ok(())
    }

    #[tokio::test]
    async fn test_established_secret_is_never_replaced() -> anyhow::Result<()> {
        let (gate, store) = gate_with("name").await?;
        gate.admit("name", Some("abc")).await?;

        let outcome = gate.admit("name", Some("other")).await?;
        assert_eq!(outcome.as_str(), "accept");
        assert_eq!(outcome.secret(), Some("abc"));

        let stored = store.find_subscription_by_name("name").await?;
        assert_eq!(stored.and_then(|s| s.secret).as_deref(), Some("abc"));
        Ok(())
    }
}
