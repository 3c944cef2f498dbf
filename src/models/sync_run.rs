use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::integration::Provider;
use crate::domain::sync::{SyncRun as DomainSyncRun, SyncStatus};
use crate::domain::types::{SyncRunId, TenantId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::sync_runs)]
pub struct SyncRun {
    pub id: i32,
    pub tenant_id: i32,
    pub provider: String,
    pub status: String,
    pub records: i32,
    pub error: Option<String>,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sync_runs)]
pub struct NewSyncRun<'a> {
    pub tenant_id: i32,
    pub provider: &'a str,
}

impl TryFrom<SyncRun> for DomainSyncRun {
    type Error = TypeConstraintError;

    fn try_from(run: SyncRun) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SyncRunId::new(run.id)?,
            tenant_id: TenantId::new(run.tenant_id)?,
            provider: Provider::try_from(run.provider)?,
            status: SyncStatus::try_from(run.status)?,
            records: run.records,
            error: run.error,
            started_at: run.started_at,
            finished_at: run.finished_at,
        })
    }
}
