use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::dto::accounts::AccountsQuery;
use crate::forms::accounts::AccountForm;
use crate::repository::DieselRepository;
use crate::routes::{action_error, base_context, page_error, redirect, render_template};
use crate::services::accounts as accounts_service;

#[get("/accounts")]
pub async fn accounts(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Query(query): web::Query<AccountsQuery>,
) -> impl Responder {
    match accounts_service::load_accounts_page(repo.get_ref(), &user, query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "accounts");
            context.insert("accounts", &data.accounts);
            context.insert("search_query", &data.search_query);
            context.insert("team", &data.team);
            render_template(&tera, "accounts/index.html", &context)
        }
        Err(err) => page_error(err, "/", "accounts"),
    }
}

#[post("/accounts/add")]
pub async fn add_account(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AccountForm>,
) -> impl Responder {
    match accounts_service::create_account(repo.get_ref(), &user, form) {
        Ok(account) => {
            FlashMessage::success("Account added.").send();
            redirect(&format!("/accounts/{}", account.id))
        }
        Err(err) => action_error(err, "/accounts", "add the account"),
    }
}

#[get("/accounts/{account_id}")]
pub async fn show_account(
    account_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match accounts_service::load_account_detail(repo.get_ref(), &user, account_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "accounts");
            context.insert("account", &data.account);
            context.insert("owner", &data.owner);
            context.insert("people", &data.people);
            context.insert("deals", &data.deals);
            context.insert("notes", &data.notes);
            context.insert("team", &data.team);
            render_template(&tera, "accounts/show.html", &context)
        }
        Err(err) => page_error(err, "/accounts", "the account"),
    }
}

#[post("/accounts/{account_id}/save")]
pub async fn save_account(
    account_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AccountForm>,
) -> impl Responder {
    let account_id = account_id.into_inner();
    let back = format!("/accounts/{account_id}");
    match accounts_service::update_account(repo.get_ref(), &user, account_id, form) {
        Ok(_) => {
            FlashMessage::success("Account saved.").send();
            redirect(&back)
        }
        Err(err) => action_error(err, &back, "save the account"),
    }
}

#[post("/accounts/{account_id}/delete")]
pub async fn delete_account(
    account_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match accounts_service::delete_account(repo.get_ref(), &user, account_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Account deleted.").send();
            redirect("/accounts")
        }
        Err(err) => action_error(err, "/accounts", "delete the account"),
    }
}
