#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware as actix_middleware, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::middleware::RedirectUnauthorized;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;
#[cfg(feature = "server")]
use crate::routes::{
    accounts as accounts_routes, api as api_routes, auth as auth_routes,
    campaigns as campaigns_routes, dashboard as dashboard_routes, deals as deals_routes, logout,
    not_assigned, notes as notes_routes, people as people_routes,
    sequences as sequences_routes, settings as settings_routes, sync as sync_routes,
    tags as tags_routes, tasks as tasks_routes, team as team_routes,
    webhooks as webhooks_routes,
};

#[cfg(feature = "server")]
pub mod auth;
pub mod db;
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod integrations;
#[cfg(feature = "server")]
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

/// Serves the CRM until the process is stopped.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // One pool shared by every worker.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    if server_config.secret.len() < 64 {
        return Err(std::io::Error::other("secret must be at least 64 bytes"));
    }

    // Session, identity and flash cookies are all signed with the app secret.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let cookie_domain = (server_config.domain != "localhost")
        .then(|| format!(".{}", server_config.domain));
    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false)
                    .cookie_domain(cookie_domain.clone())
                    .build(),
            )
            .wrap(actix_middleware::Compress::default())
            .wrap(actix_middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(auth_routes::signin_page)
            .service(auth_routes::signin)
            .service(auth_routes::two_factor_page)
            .service(auth_routes::two_factor)
            .service(auth_routes::signup_page)
            .service(auth_routes::signup)
            .service(webhooks_routes::amplemarket_webhook)
            .service(web::scope("/api").service(api_routes::api_v1_people))
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(not_assigned)
                    .service(logout)
                    .service(dashboard_routes::show_dashboard)
                    .service(people_routes::people)
                    .service(people_routes::add_person)
                    .service(people_routes::upload_people)
                    .service(people_routes::assign_people)
                    .service(people_routes::show_person)
                    .service(people_routes::save_person)
                    .service(people_routes::delete_person)
                    .service(people_routes::tag_person)
                    .service(people_routes::untag_person)
                    .service(people_routes::enrich_person)
                    .service(people_routes::amplemarket_sequences)
                    .service(people_routes::push_to_amplemarket)
                    .service(accounts_routes::accounts)
                    .service(accounts_routes::add_account)
                    .service(accounts_routes::show_account)
                    .service(accounts_routes::save_account)
                    .service(accounts_routes::delete_account)
                    .service(deals_routes::deals)
                    .service(deals_routes::pipeline)
                    .service(deals_routes::add_deal)
                    .service(deals_routes::show_deal)
                    .service(deals_routes::save_deal)
                    .service(deals_routes::move_stage)
                    .service(deals_routes::delete_deal)
                    .service(tasks_routes::tasks)
                    .service(tasks_routes::add_task)
                    .service(tasks_routes::save_task)
                    .service(tasks_routes::complete_task)
                    .service(tasks_routes::reopen_task)
                    .service(tasks_routes::delete_task)
                    .service(notes_routes::add_note)
                    .service(notes_routes::delete_note)
                    .service(tags_routes::tags)
                    .service(tags_routes::add_tag)
                    .service(tags_routes::save_tag)
                    .service(tags_routes::delete_tag)
                    .service(team_routes::team)
                    .service(team_routes::invite_member)
                    .service(team_routes::change_role)
                    .service(sequences_routes::sequences)
                    .service(sequences_routes::add_sequence)
                    .service(sequences_routes::show_sequence)
                    .service(sequences_routes::rename_sequence)
                    .service(sequences_routes::delete_sequence)
                    .service(sequences_routes::activate_sequence)
                    .service(sequences_routes::pause_sequence)
                    .service(sequences_routes::add_step)
                    .service(sequences_routes::save_step)
                    .service(sequences_routes::delete_step)
                    .service(sequences_routes::enroll_people)
                    .service(sequences_routes::stop_enrollment)
                    .service(campaigns_routes::campaigns)
                    .service(campaigns_routes::add_campaign)
                    .service(campaigns_routes::save_campaign)
                    .service(campaigns_routes::launch_campaign)
                    .service(campaigns_routes::delete_campaign)
                    .service(settings_routes::integrations)
                    .service(settings_routes::save_integration)
                    .service(settings_routes::disconnect_integration)
                    .service(settings_routes::automation)
                    .service(settings_routes::set_automation_rule)
                    .service(settings_routes::scoring)
                    .service(settings_routes::update_scoring)
                    .service(auth_routes::security_page)
                    .service(auth_routes::begin_totp_setup)
                    .service(auth_routes::confirm_totp_setup)
                    .service(auth_routes::regenerate_backup_codes)
                    .service(auth_routes::disable_totp)
                    .service(webhooks_routes::webhooks)
                    .service(webhooks_routes::retry_webhook)
                    .service(sync_routes::sync_history)
                    .service(sync_routes::import_amplemarket)
                    .service(sync_routes::push_tasks_to_calendar)
                    .service(sync_routes::enrich_batch),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
