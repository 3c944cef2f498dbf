use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{TenantId, TypeConstraintError, WebhookEventId};
use crate::domain::webhook::{
    NewWebhookEvent as DomainNewWebhookEvent, WebhookEvent as DomainWebhookEvent, WebhookStatus,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::webhook_events)]
pub struct WebhookEvent {
    pub id: i32,
    pub tenant_id: i32,
    pub source: String,
    pub event_type: String,
    pub payload: String,
    pub status: String,
    pub error: Option<String>,
    pub received_at: NaiveDateTime,
    pub processed_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::webhook_events)]
pub struct NewWebhookEvent<'a> {
    pub tenant_id: i32,
    pub source: &'a str,
    pub event_type: &'a str,
    pub payload: &'a str,
}

impl TryFrom<WebhookEvent> for DomainWebhookEvent {
    type Error = TypeConstraintError;

    fn try_from(event: WebhookEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WebhookEventId::new(event.id)?,
            tenant_id: TenantId::new(event.tenant_id)?,
            source: event.source,
            event_type: event.event_type,
            payload: event.payload,
            status: WebhookStatus::try_from(event.status)?,
            error: event.error,
            received_at: event.received_at,
            processed_at: event.processed_at,
        })
    }
}

impl<'a> From<&'a DomainNewWebhookEvent> for NewWebhookEvent<'a> {
    fn from(event: &'a DomainNewWebhookEvent) -> Self {
        Self {
            tenant_id: event.tenant_id.get(),
            source: event.source.as_str(),
            event_type: event.event_type.as_str(),
            payload: event.payload.as_str(),
        }
    }
}
