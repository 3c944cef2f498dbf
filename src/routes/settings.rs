use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::settings::{
    AutomationRuleForm, IntegrationForm, ProviderForm, ScoringWeightsForm,
};
use crate::repository::DieselRepository;
use crate::routes::{action_error, base_context, page_error, redirect, render_template};
use crate::services::{
    automation as automation_service, integrations as integrations_service,
    scoring as scoring_service,
};

/// Public origin of this server as seen by the browser.
fn public_origin(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

#[get("/settings/integrations")]
pub async fn integrations(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let origin = public_origin(&req);
    match integrations_service::load_integrations_page(repo.get_ref(), &user, &origin) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "settings");
            context.insert("integrations", &data.integrations);
            render_template(&tera, "settings/integrations.html", &context)
        }
        Err(err) => page_error(err, "/", "integrations"),
    }
}

#[post("/settings/integrations")]
pub async fn save_integration(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<IntegrationForm>,
) -> impl Responder {
    match integrations_service::save_integration(repo.get_ref(), &user, form) {
        Ok(integration) => {
            FlashMessage::success(format!("{} connected.", integration.provider.label())).send();
            redirect("/settings/integrations")
        }
        Err(err) => action_error(err, "/settings/integrations", "save the integration"),
    }
}

#[post("/settings/integrations/disconnect")]
pub async fn disconnect_integration(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ProviderForm>,
) -> impl Responder {
    match integrations_service::disconnect_integration(repo.get_ref(), &user, form) {
        Ok(provider) => {
            FlashMessage::success(format!("{} disconnected.", provider.label())).send();
            redirect("/settings/integrations")
        }
        Err(err) => action_error(err, "/settings/integrations", "disconnect the integration"),
    }
}

#[get("/settings/automation")]
pub async fn automation(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match automation_service::load_automation_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "settings");
            context.insert("rules", &data.rules);
            render_template(&tera, "settings/automation.html", &context)
        }
        Err(err) => page_error(err, "/", "automation rules"),
    }
}

#[post("/settings/automation")]
pub async fn set_automation_rule(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AutomationRuleForm>,
) -> impl Responder {
    match automation_service::set_automation_rule(repo.get_ref(), &user, form) {
        Ok(rule) => {
            FlashMessage::success(format!("Rule {rule} saved.")).send();
            redirect("/settings/automation")
        }
        Err(err) => action_error(err, "/settings/automation", "save the rule"),
    }
}

#[get("/settings/scoring")]
pub async fn scoring(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match scoring_service::load_scoring_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "settings");
            context.insert("weights", &data.weights);
            render_template(&tera, "settings/scoring.html", &context)
        }
        Err(err) => page_error(err, "/", "scoring weights"),
    }
}

#[post("/settings/scoring")]
pub async fn update_scoring(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ScoringWeightsForm>,
) -> impl Responder {
    match scoring_service::update_scoring_weights(repo.get_ref(), &user, form) {
        Ok(rescored) => {
            FlashMessage::success(format!("Weights saved; {rescored} contact(s) rescored."))
                .send();
            redirect("/settings/scoring")
        }
        Err(err) => action_error(err, "/settings/scoring", "save the weights"),
    }
}
