//! Sends every sequence step that is due, then exits.
//!
//! Meant to be invoked periodically by an external scheduler such as cron.

use chrono::Utc;
use dotenvy::dotenv;

use onetwenty_crm::db::establish_connection_pool;
use onetwenty_crm::integrations::SmtpMailer;
use onetwenty_crm::models::config::ServerConfig;
use onetwenty_crm::repository::DieselRepository;
use onetwenty_crm::services::runner::run_due_enrollments;

#[actix_web::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let repo = DieselRepository::new(pool);

    let mailer = match SmtpMailer::new(&server_config.smtp) {
        Ok(mailer) => mailer,
        Err(e) => {
            log::error!("Failed to configure SMTP: {e}");
            std::process::exit(1);
        }
    };

    log::info!("Starting sequence run");

    match run_due_enrollments(&repo, &mailer, Utc::now().naive_utc()).await {
        Ok(summary) if summary.failed > 0 => {
            log::warn!("{} enrollment(s) could not be processed", summary.failed);
        }
        Ok(_) => {}
        Err(e) => {
            log::error!("Sequence run aborted: {e}");
            std::process::exit(1);
        }
    }
}
