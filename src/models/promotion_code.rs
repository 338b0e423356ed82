use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "discount_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

impl std::fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountKind::Percentage => write!(f, "percentage"),
            DiscountKind::Fixed => write!(f, "fixed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CodeRestrictions {
    pub first_time_only: bool,
    pub new_customers_only: bool,
    pub one_time_per_customer: bool,
}

/// A shared promotion code, usable by many customers up to `usage_limit`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PromotionCode {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub discount_kind: DiscountKind,
    pub discount_value: f64,
    pub minimum_order_amount: f64,
    pub maximum_discount: Option<f64>,
    pub usage_limit: Option<i64>,
    pub used_count: i64,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    #[sqlx(flatten)]
    pub restrictions: CodeRestrictions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromotionCode {
    pub fn usage_exhausted(&self) -> bool {
        matches!(self.usage_limit, Some(limit) if self.used_count >= limit)
    }

    /// True when the code only applies per-customer at most once.
    pub fn restricted_to_single_customer_use(&self) -> bool {
        self.restrictions.first_time_only || self.restrictions.one_time_per_customer
    }
}
