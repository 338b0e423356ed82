use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::promotion::preview_discount,
        handlers::promotion::redeem_code,
        handlers::newsletter::subscribe,
        handlers::newsletter::unsubscribe,
        handlers::newsletter::status,
    ),
    components(
        schemas(
            DiscountKind,
            CodeRestrictions,
            PromotionCode,
            NewsletterSubscriber,
            PreviewDiscountRequest,
            RedeemCodeRequest,
            DiscountQuote,
            RedemptionReceipt,
            SubscribeRequest,
            UnsubscribeRequest,
            SubscriberStatusResponse,
            ApiError,
        )
    ),
    tags(
        (name = "promotions", description = "Discount code preview and redemption API"),
        (name = "newsletter", description = "Newsletter subscription API"),
    ),
    info(
        title = "Abeni Backend API",
        version = "1.0.0",
        description = "Abeni e-commerce backend REST API documentation",
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
