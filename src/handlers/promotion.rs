use crate::models::*;
use crate::services::RedemptionService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn rejection_response(reason: RejectionReason) -> HttpResponse {
    let status = match reason {
        RejectionReason::NotFound => actix_web::http::StatusCode::NOT_FOUND,
        _ => actix_web::http::StatusCode::BAD_REQUEST,
    };

    HttpResponse::build(status).json(json!({
        "success": false,
        "error": ApiError::new(reason.code(), reason.message())
    }))
}

#[utoipa::path(
    post,
    path = "/promotions/preview",
    tag = "promotions",
    request_body = PreviewDiscountRequest,
    responses(
        (status = 200, description = "Code applies to this order", body = DiscountQuote),
        (status = 400, description = "Code rejected"),
        (status = 404, description = "Unknown code")
    )
)]
pub async fn preview_discount(
    redemption_service: web::Data<RedemptionService>,
    request: web::Json<PreviewDiscountRequest>,
) -> Result<HttpResponse> {
    match redemption_service.preview(&request).await {
        Ok(RedemptionOutcome::Accepted(quote)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": quote
        }))),
        Ok(RedemptionOutcome::Rejected(reason)) => Ok(rejection_response(reason)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/promotions/redeem",
    tag = "promotions",
    request_body = RedeemCodeRequest,
    responses(
        (status = 200, description = "Code redeemed against the order", body = RedemptionReceipt),
        (status = 400, description = "Code rejected"),
        (status = 404, description = "Unknown code")
    )
)]
pub async fn redeem_code(
    redemption_service: web::Data<RedemptionService>,
    request: web::Json<RedeemCodeRequest>,
) -> Result<HttpResponse> {
    match redemption_service.redeem(&request).await {
        Ok(RedemptionOutcome::Accepted(quote)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": RedemptionReceipt {
                order_id: request.order_id,
                quote
            }
        }))),
        Ok(RedemptionOutcome::Rejected(reason)) => Ok(rejection_response(reason)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn promotion_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/promotions")
            .route("/preview", web::post().to(preview_discount))
            .route("/redeem", web::post().to(redeem_code)),
    );
}
