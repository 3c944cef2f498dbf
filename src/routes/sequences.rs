use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::sequence::StepCondition;
use crate::forms::sequences::{SequenceForm, StepForm};
use crate::repository::DieselRepository;
use crate::routes::{action_error, base_context, page_error, redirect, render_template};
use crate::services::sequences as sequences_service;

#[get("/sequences")]
pub async fn sequences(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match sequences_service::load_sequences_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "sequences");
            context.insert("sequences", &data.sequences);
            render_template(&tera, "sequences/index.html", &context)
        }
        Err(err) => page_error(err, "/", "sequences"),
    }
}

#[post("/sequences/add")]
pub async fn add_sequence(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<SequenceForm>,
) -> impl Responder {
    match sequences_service::create_sequence(repo.get_ref(), &user, form) {
        Ok(sequence) => redirect(&format!("/sequences/{}", sequence.id)),
        Err(err) => action_error(err, "/sequences", "add the sequence"),
    }
}

#[get("/sequences/{sequence_id}")]
pub async fn show_sequence(
    sequence_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match sequences_service::load_sequence_detail(repo.get_ref(), &user, sequence_id.into_inner())
    {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "sequences");
            context.insert("sequence", &data.sequence);
            context.insert("steps", &data.steps);
            context.insert("enrollments", &data.enrollments);
            context.insert("candidates", &data.candidates);
            context.insert("conditions", StepCondition::ALL);
            render_template(&tera, "sequences/show.html", &context)
        }
        Err(err) => page_error(err, "/sequences", "the sequence"),
    }
}

#[post("/sequences/{sequence_id}/rename")]
pub async fn rename_sequence(
    sequence_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<SequenceForm>,
) -> impl Responder {
    let sequence_id = sequence_id.into_inner();
    let back = format!("/sequences/{sequence_id}");
    match sequences_service::rename_sequence(repo.get_ref(), &user, sequence_id, form) {
        Ok(_) => redirect(&back),
        Err(err) => action_error(err, &back, "rename the sequence"),
    }
}

#[post("/sequences/{sequence_id}/delete")]
pub async fn delete_sequence(
    sequence_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match sequences_service::delete_sequence(repo.get_ref(), &user, sequence_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Sequence deleted.").send();
            redirect("/sequences")
        }
        Err(err) => action_error(err, "/sequences", "delete the sequence"),
    }
}

#[post("/sequences/{sequence_id}/activate")]
pub async fn activate_sequence(
    sequence_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let sequence_id = sequence_id.into_inner();
    let back = format!("/sequences/{sequence_id}");
    match sequences_service::activate_sequence(repo.get_ref(), &user, sequence_id) {
        Ok(_) => {
            FlashMessage::success("Sequence activated.").send();
            redirect(&back)
        }
        Err(err) => action_error(err, &back, "activate the sequence"),
    }
}

#[post("/sequences/{sequence_id}/pause")]
pub async fn pause_sequence(
    sequence_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let sequence_id = sequence_id.into_inner();
    let back = format!("/sequences/{sequence_id}");
    match sequences_service::pause_sequence(repo.get_ref(), &user, sequence_id) {
        Ok(_) => {
            FlashMessage::success("Sequence paused.").send();
            redirect(&back)
        }
        Err(err) => action_error(err, &back, "pause the sequence"),
    }
}

#[post("/sequences/{sequence_id}/steps/add")]
pub async fn add_step(
    sequence_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<StepForm>,
) -> impl Responder {
    let sequence_id = sequence_id.into_inner();
    let back = format!("/sequences/{sequence_id}");
    match sequences_service::add_step(repo.get_ref(), &user, sequence_id, form) {
        Ok(_) => redirect(&back),
        Err(err) => action_error(err, &back, "add the step"),
    }
}

#[post("/sequences/{sequence_id}/steps/{step_id}/save")]
pub async fn save_step(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<StepForm>,
) -> impl Responder {
    let (sequence_id, step_id) = path.into_inner();
    let back = format!("/sequences/{sequence_id}");
    match sequences_service::update_step(repo.get_ref(), &user, sequence_id, step_id, form) {
        Ok(_) => {
            FlashMessage::success("Step saved.").send();
            redirect(&back)
        }
        Err(err) => action_error(err, &back, "save the step"),
    }
}

#[post("/sequences/{sequence_id}/steps/{step_id}/delete")]
pub async fn delete_step(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (sequence_id, step_id) = path.into_inner();
    let back = format!("/sequences/{sequence_id}");
    match sequences_service::delete_step(repo.get_ref(), &user, sequence_id, step_id) {
        Ok(()) => redirect(&back),
        Err(err) => action_error(err, &back, "delete the step"),
    }
}

#[post("/sequences/{sequence_id}/enroll")]
pub async fn enroll_people(
    sequence_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Bytes,
) -> impl Responder {
    let sequence_id = sequence_id.into_inner();
    let back = format!("/sequences/{sequence_id}");
    match sequences_service::enroll_people(repo.get_ref(), &user, sequence_id, form.as_ref()) {
        Ok(count) => {
            FlashMessage::success(format!("{count} contact(s) enrolled.")).send();
            redirect(&back)
        }
        Err(err) => action_error(err, &back, "enroll contacts"),
    }
}

#[post("/sequences/{sequence_id}/enrollments/{enrollment_id}/stop")]
pub async fn stop_enrollment(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (sequence_id, enrollment_id) = path.into_inner();
    let back = format!("/sequences/{sequence_id}");
    match sequences_service::stop_enrollment(repo.get_ref(), &user, sequence_id, enrollment_id) {
        Ok(()) => {
            FlashMessage::success("Enrollment stopped.").send();
            redirect(&back)
        }
        Err(err) => action_error(err, &back, "stop the enrollment"),
    }
}
