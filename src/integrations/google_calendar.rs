//! Google Calendar v3 client (bearer OAuth access token).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::integrations::{IntegrationResult, check_status, decode_json, http_client, join_url};

const SERVICE: &str = "Google Calendar";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
}

#[derive(Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GoogleCalendarClient {
    pub fn new(base_url: &str, access_token: &str) -> IntegrationResult<Self> {
        Ok(Self {
            http: http_client()?,
            base_url: base_url.to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn events_path(calendar_id: &str) -> String {
        format!("/calendars/{}/events", urlencoding::encode(calendar_id))
    }

    pub async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> IntegrationResult<Vec<CalendarEvent>> {
        let path = Self::events_path(calendar_id);
        log::debug!("{SERVICE}: GET {path}");
        let response = self
            .http
            .get(join_url(&self.base_url, &path))
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
            ])
            .send()
            .await?;

        let body: EventsResponse = decode_json(check_status(SERVICE, response).await?).await?;
        Ok(body.items)
    }

    pub async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> IntegrationResult<CalendarEvent> {
        let path = Self::events_path(calendar_id);
        log::debug!("{SERVICE}: POST {path}");
        let response = self
            .http
            .post(join_url(&self.base_url, &path))
            .bearer_auth(&self.access_token)
            .json(event)
            .send()
            .await?;

        decode_json(check_status(SERVICE, response).await?).await
    }

    pub async fn delete_event(&self, calendar_id: &str, event_id: &str) -> IntegrationResult<()> {
        let path = format!(
            "{}/{}",
            Self::events_path(calendar_id),
            urlencoding::encode(event_id)
        );
        log::debug!("{SERVICE}: DELETE {path}");
        let response = self
            .http
            .delete(join_url(&self.base_url, &path))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        check_status(SERVICE, response).await?;
        Ok(())
    }
}
