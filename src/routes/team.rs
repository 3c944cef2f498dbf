use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::user::Role;
use crate::forms::team::{ChangeRoleForm, InviteMemberForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{action_error, base_context, page_error, redirect, render_template};
use crate::services::team as team_service;

#[get("/team")]
pub async fn team(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match team_service::load_team_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "team");
            context.insert("members", &data.members);
            context.insert("roles", Role::ALL);
            render_template(&tera, "team/index.html", &context)
        }
        Err(err) => page_error(err, "/", "the team"),
    }
}

#[post("/team/invite")]
pub async fn invite_member(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<InviteMemberForm>,
) -> impl Responder {
    match team_service::invite_member(repo.get_ref(), &user, form, server_config.bcrypt_cost) {
        Ok(member) => {
            FlashMessage::success(format!("{} joined the team.", member.name)).send();
            redirect("/team")
        }
        Err(err) => action_error(err, "/team", "add the team member"),
    }
}

#[post("/team/role")]
pub async fn change_role(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ChangeRoleForm>,
) -> impl Responder {
    match team_service::change_role(repo.get_ref(), &user, form) {
        Ok(member) => {
            FlashMessage::success(format!("{} is now {}.", member.name, member.role)).send();
            redirect("/team")
        }
        Err(err) => action_error(err, "/team", "change the role"),
    }
}
