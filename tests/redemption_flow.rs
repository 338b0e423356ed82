use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use abeni_backend::models::{
    CodeRestrictions, DiscountKind, PreviewDiscountRequest, PromotionCode, RedeemCodeRequest,
    RedemptionOutcome, RejectionReason,
};
use abeni_backend::services::RedemptionService;
use abeni_backend::stores::{MemoryPromotionStore, MemorySubscriberStore, SubscriberStore};

fn promo(id: i64, code: &str) -> PromotionCode {
    let now = Utc::now();
    PromotionCode {
        id,
        code: code.to_string(),
        description: "Test promotion".to_string(),
        discount_kind: DiscountKind::Percentage,
        discount_value: 15.0,
        minimum_order_amount: 0.0,
        maximum_discount: None,
        usage_limit: None,
        used_count: 0,
        valid_from: None,
        valid_until: None,
        is_active: true,
        restrictions: CodeRestrictions {
            first_time_only: false,
            new_customers_only: false,
            one_time_per_customer: false,
        },
        created_at: now,
        updated_at: now,
    }
}

fn setup() -> (
    Arc<MemoryPromotionStore>,
    Arc<MemorySubscriberStore>,
    RedemptionService,
) {
    let promotions = Arc::new(MemoryPromotionStore::new());
    let subscribers = Arc::new(MemorySubscriberStore::new());
    let service = RedemptionService::new(promotions.clone(), subscribers.clone());
    (promotions, subscribers, service)
}

fn preview_request(code: &str, order_total: f64) -> PreviewDiscountRequest {
    PreviewDiscountRequest {
        code: code.to_string(),
        order_total,
        customer_email: None,
    }
}

fn redeem_request(code: &str, order_total: f64) -> RedeemCodeRequest {
    RedeemCodeRequest {
        code: code.to_string(),
        order_total,
        customer_email: None,
        order_id: Uuid::new_v4(),
    }
}

fn rejection(outcome: RedemptionOutcome) -> RejectionReason {
    match outcome {
        RedemptionOutcome::Rejected(reason) => reason,
        RedemptionOutcome::Accepted(quote) => {
            panic!("expected rejection, got acceptance: {quote:?}")
        }
    }
}

#[tokio::test]
async fn welcome15_scenario() {
    let (promotions, _, service) = setup();
    let mut code = promo(1, "WELCOME15");
    code.minimum_order_amount = 500.0;
    code.maximum_discount = Some(1000.0);
    promotions.insert(code).await;

    let outcome = service
        .preview(&preview_request("WELCOME15", 4000.0))
        .await
        .unwrap();

    match outcome {
        RedemptionOutcome::Accepted(quote) => {
            assert_eq!(quote.discount_amount, 600.0);
            assert_eq!(quote.final_total, 3400.0);
            assert_eq!(quote.code, "WELCOME15");
        }
        RedemptionOutcome::Rejected(reason) => panic!("unexpected rejection: {reason:?}"),
    }
}

#[tokio::test]
async fn welcome15_below_minimum_order() {
    let (promotions, _, service) = setup();
    let mut code = promo(1, "WELCOME15");
    code.minimum_order_amount = 500.0;
    code.maximum_discount = Some(1000.0);
    promotions.insert(code).await;

    let outcome = service
        .preview(&preview_request("WELCOME15", 400.0))
        .await
        .unwrap();
    assert_eq!(rejection(outcome), RejectionReason::BelowMinimumOrder);
}

#[tokio::test]
async fn fixed_discount_clamped_to_order_total() {
    let (promotions, _, service) = setup();
    let mut code = promo(1, "FREESHIP");
    code.discount_kind = DiscountKind::Fixed;
    code.discount_value = 200.0;
    promotions.insert(code).await;

    let outcome = service
        .redeem(&redeem_request("FREESHIP", 150.0))
        .await
        .unwrap();

    match outcome {
        RedemptionOutcome::Accepted(quote) => {
            assert_eq!(quote.discount_amount, 150.0);
            assert_eq!(quote.final_total, 0.0);
        }
        RedemptionOutcome::Rejected(reason) => panic!("unexpected rejection: {reason:?}"),
    }
}

#[tokio::test]
async fn code_submission_is_canonicalized() {
    let (promotions, _, service) = setup();
    promotions.insert(promo(1, "WELCOME15")).await;

    let outcome = service
        .preview(&preview_request("  welcome15 ", 1000.0))
        .await
        .unwrap();
    assert!(outcome.is_accepted());
}

#[tokio::test]
async fn unknown_code_not_found() {
    let (_, _, service) = setup();

    let outcome = service
        .preview(&preview_request("NOSUCHCODE", 1000.0))
        .await
        .unwrap();
    assert_eq!(rejection(outcome), RejectionReason::NotFound);
}

#[tokio::test]
async fn malformed_input_rejected_before_resolution() {
    let (promotions, _, service) = setup();
    promotions.insert(promo(1, "WELCOME15")).await;

    let outcome = service.preview(&preview_request("   ", 1000.0)).await.unwrap();
    assert_eq!(rejection(outcome), RejectionReason::InvalidInput);

    let outcome = service
        .preview(&preview_request("WELCOME15", 0.0))
        .await
        .unwrap();
    assert_eq!(rejection(outcome), RejectionReason::InvalidInput);

    let outcome = service
        .redeem(&redeem_request("WELCOME15", -10.0))
        .await
        .unwrap();
    assert_eq!(rejection(outcome), RejectionReason::InvalidInput);
}

#[tokio::test]
async fn preview_never_consumes_usage() {
    let (promotions, _, service) = setup();
    let mut code = promo(1, "WELCOME15");
    code.usage_limit = Some(1);
    promotions.insert(code).await;

    for _ in 0..5 {
        let outcome = service
            .preview(&preview_request("WELCOME15", 1000.0))
            .await
            .unwrap();
        assert!(outcome.is_accepted());
    }

    assert_eq!(promotions.get(1).await.unwrap().used_count, 0);
}

#[tokio::test]
async fn redeem_increments_usage() {
    let (promotions, _, service) = setup();
    promotions.insert(promo(1, "WELCOME15")).await;

    let outcome = service
        .redeem(&redeem_request("WELCOME15", 1000.0))
        .await
        .unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(promotions.get(1).await.unwrap().used_count, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn usage_limit_holds_under_concurrent_redemptions() {
    let (promotions, _, service) = setup();
    let mut code = promo(1, "LIMITED3");
    code.usage_limit = Some(3);
    promotions.insert(code).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.redeem(&redeem_request("LIMITED3", 1000.0)).await
        }));
    }

    let mut accepted = 0;
    let mut exhausted = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            RedemptionOutcome::Accepted(_) => accepted += 1,
            RedemptionOutcome::Rejected(RejectionReason::UsageExhausted) => exhausted += 1,
            RedemptionOutcome::Rejected(reason) => panic!("unexpected rejection: {reason:?}"),
        }
    }

    assert_eq!(accepted, 3);
    assert_eq!(exhausted, 5);
    assert_eq!(promotions.get(1).await.unwrap().used_count, 3);
}

#[tokio::test]
async fn fourth_sequential_redemption_is_refused() {
    let (promotions, _, service) = setup();
    let mut code = promo(1, "LIMITED3");
    code.usage_limit = Some(3);
    promotions.insert(code).await;

    for _ in 0..3 {
        let outcome = service
            .redeem(&redeem_request("LIMITED3", 1000.0))
            .await
            .unwrap();
        assert!(outcome.is_accepted());
    }

    let outcome = service
        .redeem(&redeem_request("LIMITED3", 1000.0))
        .await
        .unwrap();
    assert_eq!(rejection(outcome), RejectionReason::UsageExhausted);
    assert_eq!(promotions.get(1).await.unwrap().used_count, 3);
}

async fn seed_subscriber(
    subscribers: &MemorySubscriberStore,
    email: &str,
    personal_code: &str,
) -> i64 {
    let subscriber = subscribers
        .insert(email, Some("Test"), None, personal_code)
        .await
        .unwrap();
    subscribers.mark_welcome_sent(subscriber.id).await.unwrap();
    subscriber.id
}

#[tokio::test]
async fn personal_code_applies_fixed_policy() {
    let (_, subscribers, service) = setup();
    seed_subscriber(&subscribers, "amara@example.com", "WELCOMEAMA1A2B3C4D").await;

    let outcome = service
        .preview(&preview_request("WELCOMEAMA1A2B3C4D", 4000.0))
        .await
        .unwrap();

    match outcome {
        RedemptionOutcome::Accepted(quote) => {
            assert_eq!(quote.discount_kind, DiscountKind::Percentage);
            assert_eq!(quote.discount_value, 15.0);
            assert_eq!(quote.discount_amount, 600.0);
            assert_eq!(quote.final_total, 3400.0);
        }
        RedemptionOutcome::Rejected(reason) => panic!("unexpected rejection: {reason:?}"),
    }
}

#[tokio::test]
async fn personal_code_single_use() {
    let (_, subscribers, service) = setup();
    let id = seed_subscriber(&subscribers, "amara@example.com", "WELCOMEAMA1A2B3C4D").await;

    let order_id = Uuid::new_v4();
    let request = RedeemCodeRequest {
        code: "WELCOMEAMA1A2B3C4D".to_string(),
        order_total: 2000.0,
        customer_email: Some("amara@example.com".to_string()),
        order_id,
    };

    let outcome = service.redeem(&request).await.unwrap();
    assert!(outcome.is_accepted());

    let subscriber = subscribers.get(id).await.unwrap();
    assert!(subscriber.discount_used);
    assert_eq!(subscriber.discount_order_id, Some(order_id));

    // A second attempt fails regardless of order total
    let outcome = service
        .redeem(&redeem_request("WELCOMEAMA1A2B3C4D", 99999.0))
        .await
        .unwrap();
    assert_eq!(rejection(outcome), RejectionReason::AlreadyUsedByCustomer);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_personal_redemptions_accept_exactly_one() {
    let (_, subscribers, service) = setup();
    seed_subscriber(&subscribers, "amara@example.com", "WELCOMEAMA1A2B3C4D").await;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .redeem(&redeem_request("WELCOMEAMA1A2B3C4D", 2000.0))
                .await
        }));
    }

    let mut accepted = 0;
    let mut already_used = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            RedemptionOutcome::Accepted(_) => accepted += 1,
            RedemptionOutcome::Rejected(RejectionReason::AlreadyUsedByCustomer) => {
                already_used += 1
            }
            RedemptionOutcome::Rejected(reason) => panic!("unexpected rejection: {reason:?}"),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(already_used, 1);
}

#[tokio::test]
async fn personal_code_takes_precedence_over_shared() {
    let (promotions, subscribers, service) = setup();
    // Same string registered as both a shared and a personal code
    let mut shared = promo(1, "WELCOMEAMA1A2B3C4D");
    shared.discount_value = 50.0;
    promotions.insert(shared).await;
    seed_subscriber(&subscribers, "amara@example.com", "WELCOMEAMA1A2B3C4D").await;

    let outcome = service
        .preview(&preview_request("WELCOMEAMA1A2B3C4D", 1000.0))
        .await
        .unwrap();

    match outcome {
        RedemptionOutcome::Accepted(quote) => {
            // The personal 15% policy wins, not the shared 50% rule
            assert_eq!(quote.discount_value, 15.0);
            assert_eq!(quote.description, "Personal welcome discount");
        }
        RedemptionOutcome::Rejected(reason) => panic!("unexpected rejection: {reason:?}"),
    }
}

#[tokio::test]
async fn restricted_shared_code_refuses_prior_customer() {
    let (promotions, subscribers, service) = setup();
    let mut code = promo(1, "FIRSTTIME");
    code.restrictions.first_time_only = true;
    promotions.insert(code).await;

    let id = seed_subscriber(&subscribers, "amara@example.com", "WELCOMEAMA1A2B3C4D").await;
    subscribers
        .commit_redemption(id, Uuid::new_v4())
        .await
        .unwrap();

    let request = PreviewDiscountRequest {
        code: "FIRSTTIME".to_string(),
        order_total: 1000.0,
        customer_email: Some("amara@example.com".to_string()),
    };

    let outcome = service.preview(&request).await.unwrap();
    assert_eq!(rejection(outcome), RejectionReason::AlreadyUsedByCustomer);
}

#[tokio::test]
async fn restricted_shared_code_stamps_customer_record() {
    let (promotions, subscribers, service) = setup();
    let mut code = promo(1, "FIRSTTIME");
    code.restrictions.one_time_per_customer = true;
    promotions.insert(code).await;

    let id = seed_subscriber(&subscribers, "amara@example.com", "WELCOMEAMA1A2B3C4D").await;

    let request = RedeemCodeRequest {
        code: "FIRSTTIME".to_string(),
        order_total: 1000.0,
        customer_email: Some("amara@example.com".to_string()),
        order_id: Uuid::new_v4(),
    };

    let outcome = service.redeem(&request).await.unwrap();
    assert!(outcome.is_accepted());
    assert!(subscribers.get(id).await.unwrap().discount_used);

    // The same customer is refused on the next attempt
    let outcome = service.redeem(&request).await.unwrap();
    assert_eq!(rejection(outcome), RejectionReason::AlreadyUsedByCustomer);
}

#[tokio::test]
async fn expired_code_reports_expired_over_minimum() {
    let (promotions, _, service) = setup();
    let mut code = promo(1, "OLDCODE");
    code.minimum_order_amount = 500.0;
    code.valid_until = Some(Utc::now() - chrono::Duration::days(1));
    promotions.insert(code).await;

    // Both expired and below minimum; the date window is checked first
    let outcome = service
        .preview(&preview_request("OLDCODE", 100.0))
        .await
        .unwrap();
    assert_eq!(rejection(outcome), RejectionReason::Expired);
}
