use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::deal::DealStage;
use crate::dto::deals::DealsQuery;
use crate::forms::deals::{DealForm, MoveStageForm};
use crate::repository::DieselRepository;
use crate::routes::{action_error, base_context, page_error, redirect, render_template};
use crate::services::deals as deals_service;

#[get("/deals")]
pub async fn deals(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Query(query): web::Query<DealsQuery>,
) -> impl Responder {
    match deals_service::load_deals_page(repo.get_ref(), &user, query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "deals");
            context.insert("deals", &data.deals);
            context.insert("stage", &data.stage);
            context.insert("stages", DealStage::ALL);
            context.insert("people", &data.choices.people);
            context.insert("accounts", &data.choices.accounts);
            context.insert("team", &data.choices.team);
            render_template(&tera, "deals/index.html", &context)
        }
        Err(err) => page_error(err, "/", "deals"),
    }
}

#[get("/pipeline")]
pub async fn pipeline(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match deals_service::load_pipeline(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "pipeline");
            context.insert("columns", &data.columns);
            context.insert("stages", DealStage::ALL);
            render_template(&tera, "deals/pipeline.html", &context)
        }
        Err(err) => page_error(err, "/", "the pipeline"),
    }
}

#[post("/deals/add")]
pub async fn add_deal(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<DealForm>,
) -> impl Responder {
    match deals_service::create_deal(repo.get_ref(), &user, form) {
        Ok(deal) => {
            FlashMessage::success("Deal added.").send();
            redirect(&format!("/deals/{}", deal.id))
        }
        Err(err) => action_error(err, "/deals", "add the deal"),
    }
}

#[get("/deals/{deal_id}")]
pub async fn show_deal(
    deal_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match deals_service::load_deal_detail(repo.get_ref(), &user, deal_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "deals");
            context.insert("deal", &data.deal);
            context.insert("account", &data.account);
            context.insert("person", &data.person);
            context.insert("owner", &data.owner);
            context.insert("notes", &data.notes);
            context.insert("tasks", &data.tasks);
            context.insert("stages", DealStage::ALL);
            context.insert("people", &data.choices.people);
            context.insert("accounts", &data.choices.accounts);
            context.insert("team", &data.choices.team);
            render_template(&tera, "deals/show.html", &context)
        }
        Err(err) => page_error(err, "/deals", "the deal"),
    }
}

#[post("/deals/{deal_id}/save")]
pub async fn save_deal(
    deal_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<DealForm>,
) -> impl Responder {
    let deal_id = deal_id.into_inner();
    let back = format!("/deals/{deal_id}");
    match deals_service::update_deal(repo.get_ref(), &user, deal_id, form) {
        Ok(_) => {
            FlashMessage::success("Deal saved.").send();
            redirect(&back)
        }
        Err(err) => action_error(err, &back, "save the deal"),
    }
}

#[post("/deals/{deal_id}/stage")]
pub async fn move_stage(
    deal_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<MoveStageForm>,
) -> impl Responder {
    match deals_service::move_stage(repo.get_ref(), &user, deal_id.into_inner(), form) {
        Ok(deal) => {
            FlashMessage::success(format!("{} moved to {}.", deal.name, deal.stage)).send();
            redirect("/pipeline")
        }
        Err(err) => action_error(err, "/pipeline", "move the deal"),
    }
}

#[post("/deals/{deal_id}/delete")]
pub async fn delete_deal(
    deal_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match deals_service::delete_deal(repo.get_ref(), &user, deal_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Deal deleted.").send();
            redirect("/deals")
        }
        Err(err) => action_error(err, "/deals", "delete the deal"),
    }
}
