use serde::Deserialize;

use crate::domain::webhook::WebhookEvent;
use crate::pagination::Paginated;

#[derive(Debug, Default, Deserialize)]
pub struct WebhooksQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

pub struct WebhooksPageData {
    pub events: Paginated<WebhookEvent>,
    pub status: Option<String>,
}
