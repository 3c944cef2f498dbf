//! HTTP handlers and the helpers they share.

use actix_identity::Identity;
use actix_web::{HttpResponse, Responder, get, http::header, post};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::domain::auth::AuthenticatedUser;
use crate::services::ServiceError;

pub mod accounts;
pub mod api;
pub mod auth;
pub mod campaigns;
pub mod dashboard;
pub mod deals;
pub mod notes;
pub mod people;
pub mod sequences;
pub mod settings;
pub mod sync;
pub mod tags;
pub mod tasks;
pub mod team;
pub mod webhooks;

/// Flash message shown whenever a role check fails.
pub(crate) const NOT_ALLOWED: &str = "You are not allowed to do that.";

/// Bootstrap alert class of a flash message level.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info | Level::Debug => "info",
    }
}

fn alerts(flash_messages: &IncomingFlashMessages) -> Vec<(String, &'static str)> {
    flash_messages
        .iter()
        .map(|f| (f.content().to_string(), alert_level_to_str(&f.level())))
        .collect()
}

/// Context every page of the signed-in layout needs.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
) -> Context {
    let mut context = Context::new();
    context.insert("alerts", &alerts(flash_messages));
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context
}

/// Context of the public sign-in and sign-up pages.
pub fn anonymous_context(flash_messages: &IncomingFlashMessages) -> Context {
    let mut context = Context::new();
    context.insert("alerts", &alerts(flash_messages));
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Response for a page that could not be loaded.
pub(crate) fn page_error(err: ServiceError, back: &str, what: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/na")
        }
        ServiceError::NotFound => {
            FlashMessage::error("Not found.").send();
            redirect(back)
        }
        err => {
            log::error!("Failed to load {what}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Flashes why a form submission failed and sends the user back.
pub(crate) fn action_error(err: ServiceError, back: &str, what: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/na")
        }
        ServiceError::Form(message) | ServiceError::Conflict(message) => {
            FlashMessage::error(message).send();
            redirect(back)
        }
        ServiceError::TypeConstraint(message) => {
            FlashMessage::error(format!("Invalid value: {message}")).send();
            redirect(back)
        }
        ServiceError::NotFound => {
            FlashMessage::error("Not found.").send();
            redirect(back)
        }
        ServiceError::Integration(err) => {
            log::warn!("Failed to {what}: {err}");
            FlashMessage::error(format!("Failed to {what}: {err}.")).send();
            redirect(back)
        }
        err => {
            log::error!("Failed to {what}: {err}");
            FlashMessage::error(format!("Failed to {what}.")).send();
            redirect(back)
        }
    }
}

#[get("/na")]
pub async fn not_assigned(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    tera: actix_web::web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, &user, "na");
    render_template(&tera, "main/not_assigned.html", &context)
}

#[post("/auth/logout")]
pub async fn logout(identity: Identity) -> impl Responder {
    identity.logout();
    redirect("/auth/signin")
}
