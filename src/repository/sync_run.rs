use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::integration::Provider;
use crate::domain::sync::{SyncOutcome, SyncRun};
use crate::domain::types::{SyncRunId, TenantId};
use crate::models::sync_run::{NewSyncRun as DbNewSyncRun, SyncRun as DbSyncRun};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, SyncRunListQuery, SyncRunReader, SyncRunWriter};
use crate::schema::sync_runs;

fn filtered(query: &SyncRunListQuery) -> sync_runs::BoxedQuery<'static, Sqlite> {
    let mut items = sync_runs::table
        .filter(sync_runs::tenant_id.eq(query.tenant_id.get()))
        .into_boxed();

    if let Some(provider) = query.provider {
        items = items.filter(sync_runs::provider.eq(provider.as_str()));
    }

    items
}

impl SyncRunReader for DieselRepository {
    fn list_sync_runs(&self, query: SyncRunListQuery) -> RepositoryResult<(usize, Vec<SyncRun>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items =
            filtered(&query).order((sync_runs::started_at.desc(), sync_runs::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let runs = items
            .load::<DbSyncRun>(&mut conn)?
            .into_iter()
            .map(|r| SyncRun::try_from(r).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, runs))
    }
}

impl SyncRunWriter for DieselRepository {
    fn start_sync_run(&self, tenant_id: TenantId, provider: Provider) -> RepositoryResult<SyncRun> {
        let mut conn = self.conn()?;
        let db_run = diesel::insert_into(sync_runs::table)
            .values(&DbNewSyncRun {
                tenant_id: tenant_id.get(),
                provider: provider.as_str(),
            })
            .get_result::<DbSyncRun>(&mut conn)?;

        Ok(SyncRun::try_from(db_run)?)
    }

    fn finish_sync_run(
        &self,
        id: SyncRunId,
        outcome: &SyncOutcome,
        finished_at: NaiveDateTime,
    ) -> RepositoryResult<SyncRun> {
        let mut conn = self.conn()?;
        let db_run = diesel::update(sync_runs::table.find(id.get()))
            .set((
                sync_runs::status.eq(outcome.status().as_str()),
                sync_runs::records.eq(outcome.records()),
                sync_runs::error.eq(outcome.error()),
                sync_runs::finished_at.eq(Some(finished_at)),
            ))
            .get_result::<DbSyncRun>(&mut conn)?;

        Ok(SyncRun::try_from(db_run)?)
    }
}
