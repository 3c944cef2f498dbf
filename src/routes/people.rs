use actix_multipart::form::MultipartForm;
use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::person::PersonStatus;
use crate::dto::people::PeopleQuery;
use crate::forms::people::{AmplemarketPushForm, PersonForm, TagPersonForm, UploadPeopleForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{action_error, base_context, page_error, redirect, render_template};
use crate::services::{people as people_service, sync as sync_service};

#[get("/people")]
pub async fn people(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Query(query): web::Query<PeopleQuery>,
) -> impl Responder {
    match people_service::load_people_page(repo.get_ref(), &user, query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "people");
            context.insert("people", &data.people);
            context.insert("search_query", &data.search_query);
            context.insert("status", &data.status);
            context.insert("tag_id", &data.tag_id);
            context.insert("tags", &data.tags);
            context.insert("accounts", &data.accounts);
            context.insert("team", &data.team);
            context.insert("statuses", PersonStatus::ALL);
            render_template(&tera, "people/index.html", &context)
        }
        Err(err) => page_error(err, "/", "contacts"),
    }
}

#[post("/people/add")]
pub async fn add_person(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<PersonForm>,
) -> impl Responder {
    match people_service::create_person(repo.get_ref(), &user, form) {
        Ok(person) => {
            FlashMessage::success("Contact added.").send();
            redirect(&format!("/people/{}", person.id))
        }
        Err(err) => action_error(err, "/people", "add the contact"),
    }
}

#[post("/people/upload")]
pub async fn upload_people(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadPeopleForm>,
) -> impl Responder {
    match people_service::upload_people(repo.get_ref(), &user, &form) {
        Ok(count) => {
            FlashMessage::success(format!("{count} contact(s) imported.")).send();
            redirect("/people")
        }
        Err(err) => action_error(err, "/people", "import contacts"),
    }
}

#[post("/people/assign")]
pub async fn assign_people(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Bytes,
) -> impl Responder {
    match people_service::assign_people(repo.get_ref(), &user, form.as_ref()) {
        Ok(count) => {
            FlashMessage::success(format!("{count} contact(s) assigned.")).send();
            redirect("/people")
        }
        Err(err) => action_error(err, "/people", "assign contacts"),
    }
}

#[get("/people/{person_id}")]
pub async fn show_person(
    person_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match people_service::load_person_detail(repo.get_ref(), &user, person_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "people");
            context.insert("person", &data.person);
            context.insert("account", &data.account);
            context.insert("owner", &data.owner);
            context.insert("tags", &data.tags);
            context.insert("available_tags", &data.available_tags);
            context.insert("notes", &data.notes);
            context.insert("tasks", &data.tasks);
            context.insert("deals", &data.deals);
            context.insert("activities", &data.activities);
            context.insert("enrollments", &data.enrollments);
            context.insert("sequences", &data.sequences);
            context.insert("accounts", &data.accounts);
            context.insert("team", &data.team);
            context.insert("statuses", PersonStatus::ALL);
            render_template(&tera, "people/show.html", &context)
        }
        Err(err) => page_error(err, "/people", "the contact"),
    }
}

#[post("/people/{person_id}/save")]
pub async fn save_person(
    person_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<PersonForm>,
) -> impl Responder {
    let person_id = person_id.into_inner();
    let back = format!("/people/{person_id}");
    match people_service::update_person(repo.get_ref(), &user, person_id, form) {
        Ok(_) => {
            FlashMessage::success("Contact saved.").send();
            redirect(&back)
        }
        Err(err) => action_error(err, &back, "save the contact"),
    }
}

#[post("/people/{person_id}/delete")]
pub async fn delete_person(
    person_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match people_service::delete_person(repo.get_ref(), &user, person_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Contact deleted.").send();
            redirect("/people")
        }
        Err(err) => action_error(err, "/people", "delete the contact"),
    }
}

#[post("/people/{person_id}/tags")]
pub async fn tag_person(
    person_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TagPersonForm>,
) -> impl Responder {
    let person_id = person_id.into_inner();
    let back = format!("/people/{person_id}");
    match people_service::tag_person(repo.get_ref(), &user, person_id, form.tag_id) {
        Ok(()) => redirect(&back),
        Err(err) => action_error(err, &back, "tag the contact"),
    }
}

#[post("/people/{person_id}/tags/{tag_id}/remove")]
pub async fn untag_person(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (person_id, tag_id) = path.into_inner();
    let back = format!("/people/{person_id}");
    match people_service::untag_person(repo.get_ref(), &user, person_id, tag_id) {
        Ok(()) => redirect(&back),
        Err(err) => action_error(err, &back, "remove the tag"),
    }
}

#[post("/people/{person_id}/enrich")]
pub async fn enrich_person(
    person_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let person_id = person_id.into_inner();
    let back = format!("/people/{person_id}");
    match sync_service::enrich_person(
        repo.get_ref(),
        &user,
        person_id,
        &server_config.integrations,
    )
    .await
    {
        Ok(person) => {
            FlashMessage::success(format!("Contact enriched. Score is now {}.", person.score))
                .send();
            redirect(&back)
        }
        Err(err) => action_error(err, &back, "enrich the contact"),
    }
}

#[get("/people/{person_id}/amplemarket")]
pub async fn amplemarket_sequences(
    person_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let person_id = person_id.into_inner();
    let back = format!("/people/{person_id}");
    let person = match people_service::load_person_detail(repo.get_ref(), &user, person_id) {
        Ok(data) => data.person,
        Err(err) => return page_error(err, "/people", "the contact"),
    };

    match sync_service::load_amplemarket_sequences(
        repo.get_ref(),
        &user,
        &server_config.integrations,
    )
    .await
    {
        Ok(sequences) => {
            let mut context = base_context(&flash_messages, &user, "people");
            context.insert("person", &person);
            context.insert("sequences", &sequences);
            render_template(&tera, "people/amplemarket.html", &context)
        }
        Err(err) => action_error(err, &back, "load Amplemarket sequences"),
    }
}

#[post("/people/{person_id}/amplemarket")]
pub async fn push_to_amplemarket(
    person_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<AmplemarketPushForm>,
) -> impl Responder {
    let person_id = person_id.into_inner();
    let back = format!("/people/{person_id}");
    match sync_service::push_to_amplemarket_sequence(
        repo.get_ref(),
        &user,
        person_id,
        &form.sequence_id,
        &server_config.integrations,
    )
    .await
    {
        Ok(()) => {
            FlashMessage::success("Contact added to the Amplemarket sequence.").send();
            redirect(&back)
        }
        Err(err) => action_error(err, &back, "push the contact to Amplemarket"),
    }
}
