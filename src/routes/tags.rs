use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::tags::TagForm;
use crate::repository::DieselRepository;
use crate::routes::{action_error, base_context, page_error, redirect, render_template};
use crate::services::tags as tags_service;

#[get("/tags")]
pub async fn tags(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match tags_service::load_tags_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "tags");
            context.insert("tags", &data.tags);
            render_template(&tera, "tags/index.html", &context)
        }
        Err(err) => page_error(err, "/", "tags"),
    }
}

#[post("/tags/add")]
pub async fn add_tag(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TagForm>,
) -> impl Responder {
    match tags_service::create_tag(repo.get_ref(), &user, form) {
        Ok(tag) => {
            FlashMessage::success(format!("Tag {} added.", tag.name)).send();
            redirect("/tags")
        }
        Err(err) => action_error(err, "/tags", "add the tag"),
    }
}

#[post("/tags/{tag_id}/save")]
pub async fn save_tag(
    tag_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TagForm>,
) -> impl Responder {
    match tags_service::update_tag(repo.get_ref(), &user, tag_id.into_inner(), form) {
        Ok(_) => {
            FlashMessage::success("Tag saved.").send();
            redirect("/tags")
        }
        Err(err) => action_error(err, "/tags", "save the tag"),
    }
}

#[post("/tags/{tag_id}/delete")]
pub async fn delete_tag(
    tag_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match tags_service::delete_tag(repo.get_ref(), &user, tag_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Tag deleted.").send();
            redirect("/tags")
        }
        Err(err) => action_error(err, "/tags", "delete the tag"),
    }
}
