use actix_web::{HttpRequest, Responder, http::header, post, web};
use actix_web_flash_messages::FlashMessage;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::notes::NoteForm;
use crate::repository::DieselRepository;
use crate::routes::{action_error, redirect};
use crate::services::notes as notes_service;

/// Page the form was posted from, falling back to the dashboard.
fn referer(req: &HttpRequest) -> String {
    req.headers()
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "/".to_string())
}

#[post("/notes/add")]
pub async fn add_note(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<NoteForm>,
) -> impl Responder {
    match notes_service::add_note(repo.get_ref(), &user, form) {
        Ok(note) => {
            FlashMessage::success("Note added.").send();
            redirect(&note.target.url())
        }
        Err(err) => action_error(err, &referer(&req), "add the note"),
    }
}

#[post("/notes/{note_id}/delete")]
pub async fn delete_note(
    req: HttpRequest,
    note_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match notes_service::delete_note(repo.get_ref(), &user, note_id.into_inner()) {
        Ok(target) => {
            FlashMessage::success("Note deleted.").send();
            redirect(&target.url())
        }
        Err(err) => action_error(err, &referer(&req), "delete the note"),
    }
}
