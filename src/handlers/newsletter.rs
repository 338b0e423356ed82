use crate::models::*;
use crate::services::SubscriberService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/newsletter/subscribe",
    tag = "newsletter",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribed", body = SubscriberStatusResponse),
        (status = 400, description = "Invalid email address")
    )
)]
pub async fn subscribe(
    subscriber_service: web::Data<SubscriberService>,
    request: web::Json<SubscribeRequest>,
) -> Result<HttpResponse> {
    match subscriber_service.subscribe(request.into_inner()).await {
        Ok(SubscribeResult::Created(subscriber)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Successfully subscribed to newsletter",
            "data": SubscriberStatusResponse::from(subscriber)
        }))),
        Ok(SubscribeResult::Reactivated(subscriber)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Welcome back! Your subscription has been reactivated",
            "data": SubscriberStatusResponse::from(subscriber)
        }))),
        Ok(SubscribeResult::AlreadySubscribed(subscriber)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "You are already subscribed to our newsletter",
            "data": SubscriberStatusResponse::from(subscriber)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/newsletter/unsubscribe",
    tag = "newsletter",
    request_body = UnsubscribeRequest,
    responses(
        (status = 200, description = "Unsubscribed"),
        (status = 404, description = "Email not subscribed")
    )
)]
pub async fn unsubscribe(
    subscriber_service: web::Data<SubscriberService>,
    request: web::Json<UnsubscribeRequest>,
) -> Result<HttpResponse> {
    match subscriber_service.unsubscribe(&request.email).await {
        Ok(subscriber) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Successfully unsubscribed from newsletter",
            "data": {
                "email": subscriber.email
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/newsletter/status/{email}",
    tag = "newsletter",
    params(
        ("email" = String, Path, description = "Subscriber email address")
    ),
    responses(
        (status = 200, description = "Subscription status", body = SubscriberStatusResponse),
        (status = 404, description = "Email not subscribed")
    )
)]
pub async fn status(
    subscriber_service: web::Data<SubscriberService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match subscriber_service.status(&path.into_inner()).await {
        Ok(subscriber) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": SubscriberStatusResponse::from(subscriber)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn newsletter_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/newsletter")
            .route("/subscribe", web::post().to(subscribe))
            .route("/unsubscribe", web::post().to(unsubscribe))
            .route("/status/{email}", web::get().to(status)),
    );
}
