use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /send-newsletter`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterRequest {
    pub email: String,
}

/// A recorded newsletter subscription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: Uuid,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

/// Result of a subscribe call. `email_sent` is false when the welcome email
/// could not be delivered; the subscription is kept either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterResponse {
    pub success: bool,
    pub email_sent: bool,
    pub subscribed_at: DateTime<Utc>,
}
