//! Eligibility decisions for resolved codes. Pure: the clock and any
//! customer usage state are passed in, never fetched here.

use chrono::{DateTime, Utc};

use crate::models::{CustomerStanding, OrderContext, RejectionReason, ResolvedCode};
use crate::services::discount::PERSONAL_MINIMUM_ORDER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Rejected(RejectionReason),
}

/// Decide whether a resolved code may be applied to the order.
///
/// Checks run in a fixed order and the first failure wins, so a code that
/// is both expired and below-minimum always reports `Expired`:
/// active flag, date window, usage exhaustion, per-customer reuse,
/// minimum order amount. Existence and input validity are screened before
/// resolution, by the coordinator.
pub fn evaluate(
    code: &ResolvedCode,
    ctx: &OrderContext,
    standing: Option<&CustomerStanding>,
    now: DateTime<Utc>,
) -> Eligibility {
    match code {
        ResolvedCode::Shared(promotion) => {
            if !promotion.is_active {
                return Eligibility::Rejected(RejectionReason::Inactive);
            }

            if let Some(valid_from) = promotion.valid_from
                && now < valid_from
            {
                return Eligibility::Rejected(RejectionReason::NotYetValid);
            }

            if let Some(valid_until) = promotion.valid_until
                && now > valid_until
            {
                return Eligibility::Rejected(RejectionReason::Expired);
            }

            if promotion.usage_exhausted() {
                return Eligibility::Rejected(RejectionReason::UsageExhausted);
            }

            if promotion.restricted_to_single_customer_use()
                && let Some(standing) = standing
                && standing.prior_redemption
            {
                return Eligibility::Rejected(RejectionReason::AlreadyUsedByCustomer);
            }

            if ctx.order_total < promotion.minimum_order_amount {
                return Eligibility::Rejected(RejectionReason::BelowMinimumOrder);
            }

            Eligibility::Eligible
        }
        ResolvedCode::Personal(subscriber) => {
            if !subscriber.is_active {
                return Eligibility::Rejected(RejectionReason::Inactive);
            }

            if subscriber.discount_used {
                return Eligibility::Rejected(RejectionReason::AlreadyUsedByCustomer);
            }

            if ctx.order_total < PERSONAL_MINIMUM_ORDER {
                return Eligibility::Rejected(RejectionReason::BelowMinimumOrder);
            }

            Eligibility::Eligible
        }
    }
}
