use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde_json::json;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::webhook::WebhookStatus;
use crate::dto::webhooks::WebhooksQuery;
use crate::repository::DieselRepository;
use crate::routes::{action_error, base_context, page_error, redirect, render_template};
use crate::services::{ServiceError, webhooks as webhooks_service};

/// Public endpoint Amplemarket posts events to.
#[post("/webhooks/amplemarket/{token}")]
pub async fn amplemarket_webhook(
    token: web::Path<String>,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    match webhooks_service::receive_amplemarket_event(repo.get_ref(), &token, body.as_ref()) {
        Ok(event) => HttpResponse::Ok().json(json!({
            "id": event.id,
            "status": event.status,
        })),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(ServiceError::Form(message)) => {
            HttpResponse::BadRequest().json(json!({ "error": message }))
        }
        Err(err) => {
            log::error!("Failed to receive Amplemarket webhook: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/settings/webhooks")]
pub async fn webhooks(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Query(query): web::Query<WebhooksQuery>,
) -> impl Responder {
    match webhooks_service::load_webhooks_page(repo.get_ref(), &user, query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "settings");
            context.insert("events", &data.events);
            context.insert("status", &data.status);
            context.insert("statuses", WebhookStatus::ALL);
            render_template(&tera, "settings/webhooks.html", &context)
        }
        Err(err) => page_error(err, "/", "webhook events"),
    }
}

#[post("/settings/webhooks/{event_id}/retry")]
pub async fn retry_webhook(
    event_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match webhooks_service::retry_webhook_event(repo.get_ref(), &user, event_id.into_inner()) {
        Ok(event) => {
            match event.status {
                WebhookStatus::Failed => FlashMessage::error(format!(
                    "Event failed again: {}",
                    event.error.as_deref().unwrap_or("unknown error")
                ))
                .send(),
                status => FlashMessage::success(format!("Event {status}.")).send(),
            }
            redirect("/settings/webhooks")
        }
        Err(err) => action_error(err, "/settings/webhooks", "retry the event"),
    }
}
