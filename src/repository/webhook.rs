//! Repository implementation for the inbound webhook log.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::types::{TenantId, WebhookEventId};
use crate::domain::webhook::{NewWebhookEvent, WebhookEvent, WebhookStatus};
use crate::models::webhook_event::{
    NewWebhookEvent as DbNewWebhookEvent, WebhookEvent as DbWebhookEvent,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, WebhookListQuery, WebhookReader, WebhookWriter};
use crate::schema::webhook_events;

fn filtered(query: &WebhookListQuery) -> webhook_events::BoxedQuery<'static, Sqlite> {
    let mut items = webhook_events::table
        .filter(webhook_events::tenant_id.eq(query.tenant_id.get()))
        .into_boxed();

    if let Some(status) = query.status {
        items = items.filter(webhook_events::status.eq(status.as_str()));
    }

    items
}

impl WebhookReader for DieselRepository {
    fn get_webhook_event(
        &self,
        id: WebhookEventId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<WebhookEvent>> {
        let mut conn = self.conn()?;
        let db_event = webhook_events::table
            .filter(webhook_events::id.eq(id.get()))
            .filter(webhook_events::tenant_id.eq(tenant_id.get()))
            .first::<DbWebhookEvent>(&mut conn)
            .optional()?;

        db_event
            .map(WebhookEvent::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_webhook_events(
        &self,
        query: WebhookListQuery,
    ) -> RepositoryResult<(usize, Vec<WebhookEvent>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = filtered(&query).order((
            webhook_events::received_at.desc(),
            webhook_events::id.desc(),
        ));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let events = items
            .load::<DbWebhookEvent>(&mut conn)?
            .into_iter()
            .map(|e| WebhookEvent::try_from(e).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, events))
    }
}

impl WebhookWriter for DieselRepository {
    fn create_webhook_event(&self, event: &NewWebhookEvent) -> RepositoryResult<WebhookEvent> {
        let mut conn = self.conn()?;
        let db_event = diesel::insert_into(webhook_events::table)
            .values(&DbNewWebhookEvent::from(event))
            .get_result::<DbWebhookEvent>(&mut conn)?;

        Ok(WebhookEvent::try_from(db_event)?)
    }

    fn set_webhook_status(
        &self,
        id: WebhookEventId,
        status: WebhookStatus,
        error: Option<String>,
        processed_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<WebhookEvent> {
        let mut conn = self.conn()?;
        let db_event = diesel::update(webhook_events::table.find(id.get()))
            .set((
                webhook_events::status.eq(status.as_str()),
                webhook_events::error.eq(error),
                webhook_events::processed_at.eq(processed_at),
            ))
            .get_result::<DbWebhookEvent>(&mut conn)?;

        Ok(WebhookEvent::try_from(db_event)?)
    }
}
