//! Discount amount computation. Pure; all I/O happens before the rule and
//! order total reach this module.

use crate::models::{DiscountKind, ResolvedCode};

/// Personal welcome codes carry fixed terms: 15% off, capped at 1000.00,
/// on orders of at least 100.00. These are engine policy, not per-row data.
pub const PERSONAL_DISCOUNT_PERCENT: f64 = 15.0;
pub const PERSONAL_MAXIMUM_DISCOUNT: f64 = 1000.0;
pub const PERSONAL_MINIMUM_ORDER: f64 = 100.0;

pub const PERSONAL_CODE_DESCRIPTION: &str = "Personal welcome discount";

/// The discount terms of a resolved code, flattened to one shape so the
/// calculator never branches on where the code came from.
#[derive(Debug, Clone, Copy)]
pub struct DiscountRule {
    pub kind: DiscountKind,
    pub value: f64,
    pub minimum_order_amount: f64,
    pub maximum_discount: Option<f64>,
}

pub fn rule_of(code: &ResolvedCode) -> DiscountRule {
    match code {
        ResolvedCode::Shared(promotion) => DiscountRule {
            kind: promotion.discount_kind,
            value: promotion.discount_value,
            minimum_order_amount: promotion.minimum_order_amount,
            maximum_discount: promotion.maximum_discount,
        },
        ResolvedCode::Personal(_) => DiscountRule {
            kind: DiscountKind::Percentage,
            value: PERSONAL_DISCOUNT_PERCENT,
            minimum_order_amount: PERSONAL_MINIMUM_ORDER,
            maximum_discount: Some(PERSONAL_MAXIMUM_DISCOUNT),
        },
    }
}

/// Round to the currency's minor unit (2 decimals), half-up. Applied once,
/// after all clamping.
fn round_to_minor_unit(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Compute the monetary discount for an order total.
///
/// Orders below the rule's minimum yield zero; eligibility screens that
/// case earlier, but the calculator does not rely on it. The result never
/// exceeds the order total.
pub fn compute_discount(rule: &DiscountRule, order_total: f64) -> f64 {
    if order_total < rule.minimum_order_amount {
        return 0.0;
    }

    let mut amount = match rule.kind {
        DiscountKind::Percentage => {
            let raw = order_total * (rule.value / 100.0);
            match rule.maximum_discount {
                Some(cap) if raw > cap => cap,
                _ => raw,
            }
        }
        DiscountKind::Fixed => rule.value,
    };

    if amount > order_total {
        amount = order_total;
    }

    round_to_minor_unit(amount)
}
