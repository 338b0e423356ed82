use std::sync::Arc;

use chrono::Utc;

use crate::error::AppResult;
use crate::models::{
    CustomerStanding, DiscountQuote, OrderContext, PreviewDiscountRequest, RedeemCodeRequest,
    RedemptionOutcome, RejectionReason, ResolvedCode,
};
use crate::services::discount::{self, PERSONAL_CODE_DESCRIPTION};
use crate::services::eligibility::{self, Eligibility};
use crate::stores::{PromotionStore, SubscriberStore};
use crate::utils::{canonicalize_code, canonicalize_email};

/// Coordinates a redemption attempt: resolve the submitted code, evaluate
/// eligibility, compute the discount, and (for `redeem`) commit usage.
/// Stores are injected so the whole flow runs against in-memory fakes.
#[derive(Clone)]
pub struct RedemptionService {
    promotions: Arc<dyn PromotionStore>,
    subscribers: Arc<dyn SubscriberStore>,
}

impl RedemptionService {
    pub fn new(promotions: Arc<dyn PromotionStore>, subscribers: Arc<dyn SubscriberStore>) -> Self {
        Self {
            promotions,
            subscribers,
        }
    }

    /// Validate a code against an order without consuming it. Safe to call
    /// any number of times; never writes.
    pub async fn preview(&self, request: &PreviewDiscountRequest) -> AppResult<RedemptionOutcome> {
        let (resolved, ctx) = match self
            .resolve_and_evaluate(&request.code, request.order_total, &request.customer_email)
            .await?
        {
            Ok(accepted) => accepted,
            Err(reason) => return Ok(RedemptionOutcome::Rejected(reason)),
        };

        Ok(RedemptionOutcome::Accepted(quote(&resolved, ctx.order_total)))
    }

    /// Validate a code and durably consume one use of it. The commit is a
    /// conditional write; losing the race against the usage cap is an
    /// expected outcome and reported like any other rejection.
    pub async fn redeem(&self, request: &RedeemCodeRequest) -> AppResult<RedemptionOutcome> {
        let (resolved, ctx) = match self
            .resolve_and_evaluate(&request.code, request.order_total, &request.customer_email)
            .await?
        {
            Ok(accepted) => accepted,
            Err(reason) => return Ok(RedemptionOutcome::Rejected(reason)),
        };

        match &resolved {
            ResolvedCode::Personal(subscriber) => {
                if !self
                    .subscribers
                    .commit_redemption(subscriber.id, request.order_id)
                    .await?
                {
                    log::warn!(
                        "Personal code {} lost the single-use race",
                        subscriber.personal_code.as_deref().unwrap_or("<unset>")
                    );
                    return Ok(RedemptionOutcome::Rejected(
                        RejectionReason::AlreadyUsedByCustomer,
                    ));
                }
            }
            ResolvedCode::Shared(promotion) => {
                if !self.promotions.increment_usage(promotion.id).await? {
                    log::warn!("Code {} lost the usage-cap race", promotion.code);
                    return Ok(RedemptionOutcome::Rejected(RejectionReason::UsageExhausted));
                }

                // Restricted codes also record the customer's own usage in
                // the subscriber ledger, so the same customer is refused
                // next time.
                if promotion.restricted_to_single_customer_use() {
                    self.record_customer_usage(&promotion.code, &ctx, request.order_id)
                        .await?;
                }
            }
        }

        Ok(RedemptionOutcome::Accepted(quote(&resolved, ctx.order_total)))
    }

    /// Steps shared by preview and redeem: input screening, resolution
    /// (personal codes take precedence), and the eligibility decision.
    async fn resolve_and_evaluate(
        &self,
        raw_code: &str,
        order_total: f64,
        customer_email: &Option<String>,
    ) -> AppResult<Result<(ResolvedCode, OrderContext), RejectionReason>> {
        let code = canonicalize_code(raw_code);
        if code.is_empty() || !order_total.is_finite() || order_total <= 0.0 {
            return Ok(Err(RejectionReason::InvalidInput));
        }

        let ctx = OrderContext {
            order_total,
            customer_email: customer_email
                .as_deref()
                .map(canonicalize_email)
                .filter(|e| !e.is_empty()),
        };

        let Some(resolved) = self.resolve(&code).await? else {
            return Ok(Err(RejectionReason::NotFound));
        };

        let standing = self.customer_standing(&resolved, &ctx).await?;

        match eligibility::evaluate(&resolved, &ctx, standing.as_ref(), Utc::now()) {
            Eligibility::Eligible => Ok(Ok((resolved, ctx))),
            Eligibility::Rejected(reason) => Ok(Err(reason)),
        }
    }

    async fn resolve(&self, code: &str) -> AppResult<Option<ResolvedCode>> {
        if let Some(subscriber) = self.subscribers.find_by_personal_code(code).await? {
            return Ok(Some(ResolvedCode::Personal(subscriber)));
        }

        if let Some(promotion) = self.promotions.find_active_by_code(code).await? {
            return Ok(Some(ResolvedCode::Shared(promotion)));
        }

        Ok(None)
    }

    /// Stamp the requesting customer's ledger record after a restricted
    /// shared code committed. A customer without a ledger record carries
    /// no usage history, so there is nothing to stamp.
    async fn record_customer_usage(
        &self,
        code: &str,
        ctx: &OrderContext,
        order_id: uuid::Uuid,
    ) -> AppResult<()> {
        let Some(email) = &ctx.customer_email else {
            return Ok(());
        };

        let Some(subscriber) = self.subscribers.find_by_email(email).await? else {
            return Ok(());
        };

        if !subscriber.is_active {
            return Ok(());
        }

        if !self
            .subscribers
            .commit_redemption(subscriber.id, order_id)
            .await?
        {
            log::warn!("Customer {email} usage record for {code} was already stamped");
        }

        Ok(())
    }

    /// For shared codes restricted to one use per customer, look up the
    /// customer's ledger record ahead of evaluation. Customers without a
    /// record (or without a supplied identity) carry no usage history.
    async fn customer_standing(
        &self,
        resolved: &ResolvedCode,
        ctx: &OrderContext,
    ) -> AppResult<Option<CustomerStanding>> {
        let ResolvedCode::Shared(promotion) = resolved else {
            return Ok(None);
        };

        if !promotion.restricted_to_single_customer_use() {
            return Ok(None);
        }

        let Some(email) = &ctx.customer_email else {
            return Ok(None);
        };

        let Some(subscriber) = self.subscribers.find_by_email(email).await? else {
            return Ok(None);
        };

        if !subscriber.is_active {
            return Ok(None);
        }

        Ok(Some(CustomerStanding {
            prior_redemption: !subscriber.can_use_discount(),
        }))
    }
}

fn quote(resolved: &ResolvedCode, order_total: f64) -> DiscountQuote {
    let rule = discount::rule_of(resolved);
    let discount_amount = discount::compute_discount(&rule, order_total);
    let final_total = ((order_total - discount_amount) * 100.0).round() / 100.0;

    let (code, description) = match resolved {
        ResolvedCode::Shared(promotion) => (promotion.code.clone(), promotion.description.clone()),
        ResolvedCode::Personal(subscriber) => (
            subscriber.personal_code.clone().unwrap_or_default(),
            PERSONAL_CODE_DESCRIPTION.to_string(),
        ),
    };

    DiscountQuote {
        code,
        description,
        discount_kind: rule.kind,
        discount_value: rule.value,
        discount_amount,
        order_total,
        final_total,
        minimum_order_amount: rule.minimum_order_amount,
        maximum_discount: rule.maximum_discount,
    }
}
