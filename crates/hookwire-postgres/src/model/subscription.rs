//! Subscription model for PostgreSQL database operations.

use diesel::prelude::*;
use hookwire_core::types;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::subscriptions;

/// A named webhook endpoint.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Subscription {
    /// Unique subscription identifier.
    pub id: Uuid,
    /// Unique name used in the webhook URL.
    pub name: String,
    /// Identifier of the external resource being watched.
    pub resource_id: String,
    /// Kind of the external resource being watched.
    pub resource_type: String,
    /// Handshake secret, once established.
    pub secret: Option<String>,
    /// Names of the handlers assigned to this subscription.
    pub handler_names: Vec<Option<String>>,
    /// Timestamp when this subscription was created.
    pub created_at: Timestamp,
}

/// Data structure for creating a new subscription.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSubscription {
    /// Unique name used in the webhook URL.
    pub name: String,
    /// Identifier of the external resource being watched.
    pub resource_id: String,
    /// Kind of the external resource being watched.
    pub resource_type: String,
}

impl From<types::NewSubscription> for NewSubscription {
    fn from(subscription: types::NewSubscription) -> Self {
        Self {
            name: subscription.name,
            resource_id: subscription.resource_id,
            resource_type: subscription.resource_type,
        }
    }
}

impl From<Subscription> for types::Subscription {
    fn from(subscription: Subscription) -> Self {
        Self {
            id: subscription.id,
            name: subscription.name,
            resource_id: subscription.resource_id,
            resource_type: subscription.resource_type,
            secret: subscription.secret,
            handler_names: subscription.handler_names.into_iter().flatten().collect(),
            created_at: subscription.created_at.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handler_names_are_dropped() {
        let row = Subscription {
            id: Uuid::now_v7(),
            name: "github-main".to_owned(),
            resource_id: "repo-1".to_owned(),
            resource_type: "repository".to_owned(),
            secret: None,
            handler_names: vec![Some("noop".to_owned()), None, Some("log-events".to_owned())],
            created_at: jiff::Timestamp::UNIX_EPOCH.into(),
        };

        let subscription = types::Subscription::from(row);
        let names: Vec<_> = subscription.handler_names.iter().map(String::as_str).collect();
        assert_eq!(names, ["log-events", "noop"]);
        assert!(!subscription.has_secret());
    }
}
