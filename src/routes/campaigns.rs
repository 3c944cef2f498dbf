use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::campaigns::CampaignForm;
use crate::repository::DieselRepository;
use crate::routes::{action_error, base_context, page_error, redirect, render_template};
use crate::services::campaigns as campaigns_service;

#[get("/campaigns")]
pub async fn campaigns(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match campaigns_service::load_campaigns_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "campaigns");
            context.insert("campaigns", &data.campaigns);
            context.insert("sequences", &data.sequences);
            context.insert("tags", &data.tags);
            render_template(&tera, "campaigns/index.html", &context)
        }
        Err(err) => page_error(err, "/", "campaigns"),
    }
}

#[post("/campaigns/add")]
pub async fn add_campaign(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CampaignForm>,
) -> impl Responder {
    match campaigns_service::create_campaign(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("Campaign added.").send();
            redirect("/campaigns")
        }
        Err(err) => action_error(err, "/campaigns", "add the campaign"),
    }
}

#[post("/campaigns/{campaign_id}/save")]
pub async fn save_campaign(
    campaign_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CampaignForm>,
) -> impl Responder {
    match campaigns_service::update_campaign(repo.get_ref(), &user, campaign_id.into_inner(), form)
    {
        Ok(_) => {
            FlashMessage::success("Campaign saved.").send();
            redirect("/campaigns")
        }
        Err(err) => action_error(err, "/campaigns", "save the campaign"),
    }
}

#[post("/campaigns/{campaign_id}/launch")]
pub async fn launch_campaign(
    campaign_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match campaigns_service::launch_campaign(repo.get_ref(), &user, campaign_id.into_inner()) {
        Ok(enrolled) => {
            FlashMessage::success(format!("Campaign launched: {enrolled} contact(s) enrolled."))
                .send();
            redirect("/campaigns")
        }
        Err(err) => action_error(err, "/campaigns", "launch the campaign"),
    }
}

#[post("/campaigns/{campaign_id}/delete")]
pub async fn delete_campaign(
    campaign_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match campaigns_service::delete_campaign(repo.get_ref(), &user, campaign_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Campaign deleted.").send();
            redirect("/campaigns")
        }
        Err(err) => action_error(err, "/campaigns", "delete the campaign"),
    }
}
