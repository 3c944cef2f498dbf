//! HTTP clients for third-party services and outbound email.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use thiserror::Error;

use crate::domain::integration::Provider;

pub mod amplemarket;
pub mod google_calendar;
pub mod hunter;
pub mod mailer;

pub use amplemarket::AmplemarketClient;
pub use google_calendar::GoogleCalendarClient;
pub use hunter::HunterClient;
pub use mailer::{Mailer, OutgoingEmail, SmtpMailer};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const BODY_EXCERPT_LEN: usize = 300;

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("credentials were rejected")]
    Unauthorized,

    #[error("resource not found")]
    NotFound,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("{} is not connected", .0.label())]
    NotConfigured(Provider),

    #[error("failed to send email: {0}")]
    Smtp(String),
}

pub type IntegrationResult<T> = Result<T, IntegrationError>;

impl IntegrationError {
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => IntegrationError::Unauthorized,
            StatusCode::NOT_FOUND => IntegrationError::NotFound,
            StatusCode::TOO_MANY_REQUESTS => IntegrationError::RateLimited,
            other => IntegrationError::Status {
                status: other.as_u16(),
                body,
            },
        }
    }
}

pub(crate) fn http_client() -> IntegrationResult<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LEN).collect()
}

/// Passes successful responses through and maps everything else to an error.
pub(crate) async fn check_status(service: &str, response: Response) -> IntegrationResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body = excerpt(&body);
    log::error!("{service} responded with {status}: {body}");
    Err(IntegrationError::from_status(status, body))
}

pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    response: Response,
) -> IntegrationResult<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|err| IntegrationError::Decode(err.to_string()))
}
