//! Newsletter subscription.

use chrono::{DateTime, Utc};
use serde::Serialize;

use blended_core::{Email, SubscriptionId};

/// A newsletter subscription; one per e-mail address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: SubscriptionId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}
