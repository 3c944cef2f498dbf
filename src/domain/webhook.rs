use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{TenantId, WebhookEventId, text_enum};

text_enum! {
    WebhookStatus {
        Received => "received",
        Processed => "processed",
        Failed => "failed",
        Ignored => "ignored",
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WebhookEvent {
    pub id: WebhookEventId,
    pub tenant_id: TenantId,
    pub source: String,
    pub event_type: String,
    /// Raw JSON body as received.
    pub payload: String,
    pub status: WebhookStatus,
    pub error: Option<String>,
    pub received_at: NaiveDateTime,
    pub processed_at: Option<NaiveDateTime>,
}

#[derive(Clone, Debug)]
pub struct NewWebhookEvent {
    pub tenant_id: TenantId,
    pub source: String,
    pub event_type: String,
    pub payload: String,
}
