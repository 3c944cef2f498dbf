use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::task::{TaskFilter, TaskPriority};
use crate::dto::tasks::TasksQuery;
use crate::forms::tasks::TaskForm;
use crate::repository::DieselRepository;
use crate::routes::{action_error, base_context, page_error, redirect, render_template};
use crate::services::tasks as tasks_service;

#[get("/tasks")]
pub async fn tasks(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Query(query): web::Query<TasksQuery>,
) -> impl Responder {
    match tasks_service::load_tasks_page(repo.get_ref(), &user, query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "tasks");
            context.insert("tasks", &data.tasks);
            context.insert("filter", &data.filter);
            context.insert("filters", TaskFilter::ALL);
            context.insert("priorities", TaskPriority::ALL);
            context.insert("assignee_id", &data.assignee_id);
            context.insert("team", &data.team);
            context.insert("now", &data.now);
            render_template(&tera, "tasks/index.html", &context)
        }
        Err(err) => page_error(err, "/", "tasks"),
    }
}

#[post("/tasks/add")]
pub async fn add_task(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TaskForm>,
) -> impl Responder {
    match tasks_service::create_task(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("Task added.").send();
            redirect("/tasks")
        }
        Err(err) => action_error(err, "/tasks", "add the task"),
    }
}

#[post("/tasks/{task_id}/save")]
pub async fn save_task(
    task_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TaskForm>,
) -> impl Responder {
    match tasks_service::update_task(repo.get_ref(), &user, task_id.into_inner(), form) {
        Ok(_) => {
            FlashMessage::success("Task saved.").send();
            redirect("/tasks")
        }
        Err(err) => action_error(err, "/tasks", "save the task"),
    }
}

#[post("/tasks/{task_id}/complete")]
pub async fn complete_task(
    task_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match tasks_service::complete_task(repo.get_ref(), &user, task_id.into_inner()) {
        Ok(task) => {
            FlashMessage::success(format!("Completed \"{}\".", task.title)).send();
            redirect("/tasks")
        }
        Err(err) => action_error(err, "/tasks", "complete the task"),
    }
}

#[post("/tasks/{task_id}/reopen")]
pub async fn reopen_task(
    task_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match tasks_service::reopen_task(repo.get_ref(), &user, task_id.into_inner()) {
        Ok(_) => redirect("/tasks?filter=open"),
        Err(err) => action_error(err, "/tasks", "reopen the task"),
    }
}

#[post("/tasks/{task_id}/delete")]
pub async fn delete_task(
    task_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match tasks_service::delete_task(repo.get_ref(), &user, task_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Task deleted.").send();
            redirect("/tasks")
        }
        Err(err) => action_error(err, "/tasks", "delete the task"),
    }
}
