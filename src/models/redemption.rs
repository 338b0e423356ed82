use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::promotion_code::{DiscountKind, PromotionCode};
use crate::models::subscriber::NewsletterSubscriber;

/// A submitted code resolved to its owning store's record. Personal codes
/// take precedence over shared codes during resolution.
#[derive(Debug, Clone)]
pub enum ResolvedCode {
    Shared(PromotionCode),
    Personal(NewsletterSubscriber),
}

/// The order-side context a redemption is evaluated against. The order
/// subtotal is computed upstream by the cart; it arrives here pre-discount.
#[derive(Debug, Clone)]
pub struct OrderContext {
    pub order_total: f64,
    pub customer_email: Option<String>,
}

/// Pre-resolved usage state of the requesting customer, looked up from the
/// subscriber ledger before evaluation for restricted shared codes.
#[derive(Debug, Clone, Copy)]
pub struct CustomerStanding {
    pub prior_redemption: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    InvalidInput,
    NotFound,
    Inactive,
    NotYetValid,
    Expired,
    UsageExhausted,
    AlreadyUsedByCustomer,
    BelowMinimumOrder,
}

impl RejectionReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::InvalidInput => "INVALID_INPUT",
            RejectionReason::NotFound => "NOT_FOUND",
            RejectionReason::Inactive => "INACTIVE",
            RejectionReason::NotYetValid => "NOT_YET_VALID",
            RejectionReason::Expired => "EXPIRED",
            RejectionReason::UsageExhausted => "USAGE_EXHAUSTED",
            RejectionReason::AlreadyUsedByCustomer => "ALREADY_USED",
            RejectionReason::BelowMinimumOrder => "BELOW_MINIMUM_ORDER",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::InvalidInput => {
                "A discount code and a positive order total are required"
            }
            RejectionReason::NotFound => "Invalid discount code",
            RejectionReason::Inactive => "This discount code is no longer active",
            RejectionReason::NotYetValid => "This discount code is not valid yet",
            RejectionReason::Expired => "This discount code has expired",
            RejectionReason::UsageExhausted => "This discount code has reached its usage limit",
            RejectionReason::AlreadyUsedByCustomer => "This discount code has already been used",
            RejectionReason::BelowMinimumOrder => {
                "Order total is below the minimum required for this discount code"
            }
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PreviewDiscountRequest {
    pub code: String,
    pub order_total: f64,
    pub customer_email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemCodeRequest {
    pub code: String,
    pub order_total: f64,
    pub customer_email: Option<String>,
    pub order_id: Uuid,
}

/// The accepted side of a redemption or preview: what the code is worth
/// against this order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiscountQuote {
    pub code: String,
    pub description: String,
    pub discount_kind: DiscountKind,
    pub discount_value: f64,
    pub discount_amount: f64,
    pub order_total: f64,
    pub final_total: f64,
    pub minimum_order_amount: f64,
    pub maximum_discount: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RedemptionReceipt {
    pub order_id: Uuid,
    pub quote: DiscountQuote,
}

/// Outcome of a preview or redeem call. Business-rule failures are data,
/// not errors; only infrastructure failures surface as `AppError`.
#[derive(Debug)]
pub enum RedemptionOutcome {
    Accepted(DiscountQuote),
    Rejected(RejectionReason),
}

impl RedemptionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RedemptionOutcome::Accepted(_))
    }
}
