use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A newsletter subscriber and the one-shot personal discount code issued
/// with the welcome email.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct NewsletterSubscriber {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
    pub welcome_email_sent: bool,
    pub welcome_email_sent_at: Option<DateTime<Utc>>,
    pub personal_code: Option<String>,
    pub discount_used: bool,
    pub discount_used_at: Option<DateTime<Utc>>,
    pub discount_order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewsletterSubscriber {
    /// A subscriber may redeem a welcome discount only after the welcome
    /// email went out, and only while subscribed.
    pub fn can_use_discount(&self) -> bool {
        self.welcome_email_sent && !self.discount_used && self.is_active
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UnsubscribeRequest {
    pub email: String,
}

#[derive(Debug)]
pub enum SubscribeResult {
    Created(NewsletterSubscriber),
    Reactivated(NewsletterSubscriber),
    AlreadySubscribed(NewsletterSubscriber),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriberStatusResponse {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_subscribed: bool,
    pub subscribed_at: DateTime<Utc>,
    pub welcome_email_sent: bool,
    pub discount_used: bool,
    pub can_use_discount: bool,
}

impl From<NewsletterSubscriber> for SubscriberStatusResponse {
    fn from(sub: NewsletterSubscriber) -> Self {
        let can_use_discount = sub.can_use_discount();
        Self {
            email: sub.email,
            first_name: sub.first_name,
            last_name: sub.last_name,
            is_subscribed: sub.is_active,
            subscribed_at: sub.subscribed_at,
            welcome_email_sent: sub.welcome_email_sent,
            discount_used: sub.discount_used,
            can_use_discount,
        }
    }
}
