use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::integration::Provider;
use crate::domain::sync::{SyncRun, SyncStatus};
use crate::dto::sync::SyncHistoryQuery;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{action_error, base_context, page_error, redirect, render_template};
use crate::services::sync as sync_service;

const SYNC_PAGE: &str = "/sync";

/// Flashes how a recorded run ended.
fn report_run(run: &SyncRun) -> HttpResponse {
    match run.status {
        SyncStatus::Failed => {
            let error = run.error.as_deref().unwrap_or("unknown error");
            FlashMessage::error(format!("{} sync failed: {error}", run.provider.label())).send();
        }
        _ => {
            FlashMessage::success(format!(
                "{} sync finished: {} record(s).",
                run.provider.label(),
                run.records
            ))
            .send();
        }
    }
    redirect(SYNC_PAGE)
}

#[get("/sync")]
pub async fn sync_history(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Query(query): web::Query<SyncHistoryQuery>,
) -> impl Responder {
    match sync_service::load_sync_history(repo.get_ref(), &user, query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "sync");
            context.insert("runs", &data.runs);
            context.insert("provider", &data.provider);
            context.insert("providers", Provider::ALL);
            render_template(&tera, "sync/index.html", &context)
        }
        Err(err) => page_error(err, "/", "sync history"),
    }
}

#[post("/sync/amplemarket")]
pub async fn import_amplemarket(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    match sync_service::import_amplemarket(repo.get_ref(), &user, &server_config.integrations).await
    {
        Ok(run) => report_run(&run),
        Err(err) => action_error(err, SYNC_PAGE, "import from Amplemarket"),
    }
}

#[post("/sync/calendar")]
pub async fn push_tasks_to_calendar(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    match sync_service::push_tasks_to_calendar(repo.get_ref(), &user, &server_config.integrations)
        .await
    {
        Ok(run) => report_run(&run),
        Err(err) => action_error(err, SYNC_PAGE, "push tasks to Google Calendar"),
    }
}

#[post("/sync/enrich")]
pub async fn enrich_batch(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    match sync_service::enrich_batch(repo.get_ref(), &user, &server_config.integrations).await {
        Ok(summary) => {
            if summary.failed > 0 {
                FlashMessage::warning(format!(
                    "Enriched {} contact(s); {} failed.",
                    summary.enriched, summary.failed
                ))
                .send();
            } else {
                FlashMessage::success(format!("Enriched {} contact(s).", summary.enriched))
                    .send();
            }
            redirect(SYNC_PAGE)
        }
        Err(err) => action_error(err, SYNC_PAGE, "enrich contacts"),
    }
}
