//! Repository implementation for deals.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::deal::{Deal, DealStage, NewDeal, UpdateDeal};
use crate::domain::types::{DealId, TenantId};
use crate::models::deal::{Deal as DbDeal, NewDeal as DbNewDeal, UpdateDeal as DbUpdateDeal};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DealListQuery, DealReader, DealWriter, DieselRepository};
use crate::schema::deals;

fn filtered(query: &DealListQuery) -> deals::BoxedQuery<'static, Sqlite> {
    let mut items = deals::table
        .filter(deals::tenant_id.eq(query.tenant_id.get()))
        .into_boxed();

    if let Some(stage) = query.stage {
        items = items.filter(deals::stage.eq(stage.as_str()));
    }

    if query.open_only {
        let open: Vec<&'static str> = DealStage::OPEN.iter().map(|s| s.as_str()).collect();
        items = items.filter(deals::stage.eq_any(open));
    }

    if let Some(account_id) = query.account_id {
        items = items.filter(deals::account_id.eq(account_id.get()));
    }

    if let Some(person_id) = query.person_id {
        items = items.filter(deals::person_id.eq(person_id.get()));
    }

    items
}

impl DealReader for DieselRepository {
    fn get_deal_by_id(&self, id: DealId, tenant_id: TenantId) -> RepositoryResult<Option<Deal>> {
        let mut conn = self.conn()?;
        let db_deal = deals::table
            .filter(deals::id.eq(id.get()))
            .filter(deals::tenant_id.eq(tenant_id.get()))
            .first::<DbDeal>(&mut conn)
            .optional()?;

        db_deal
            .map(Deal::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_deals(&self, query: DealListQuery) -> RepositoryResult<(usize, Vec<Deal>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = filtered(&query).order((deals::updated_at.desc(), deals::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let deals = items
            .load::<DbDeal>(&mut conn)?
            .into_iter()
            .map(|d| Deal::try_from(d).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, deals))
    }
}

impl DealWriter for DieselRepository {
    fn create_deal(&self, new_deal: &NewDeal) -> RepositoryResult<Deal> {
        let mut conn = self.conn()?;
        let db_deal = diesel::insert_into(deals::table)
            .values(&DbNewDeal::from(new_deal))
            .get_result::<DbDeal>(&mut conn)?;

        Ok(Deal::try_from(db_deal)?)
    }

    fn update_deal(
        &self,
        id: DealId,
        tenant_id: TenantId,
        updates: &UpdateDeal,
    ) -> RepositoryResult<Deal> {
        let mut conn = self.conn()?;
        let changes = DbUpdateDeal::new(updates, Utc::now().naive_utc());

        let db_deal = diesel::update(
            deals::table
                .filter(deals::id.eq(id.get()))
                .filter(deals::tenant_id.eq(tenant_id.get())),
        )
        .set(&changes)
        .get_result::<DbDeal>(&mut conn)?;

        Ok(Deal::try_from(db_deal)?)
    }

    fn set_deal_stage(
        &self,
        id: DealId,
        tenant_id: TenantId,
        stage: DealStage,
    ) -> RepositoryResult<Deal> {
        let mut conn = self.conn()?;
        let db_deal = diesel::update(
            deals::table
                .filter(deals::id.eq(id.get()))
                .filter(deals::tenant_id.eq(tenant_id.get())),
        )
        .set((
            deals::stage.eq(stage.as_str()),
            deals::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbDeal>(&mut conn)?;

        Ok(Deal::try_from(db_deal)?)
    }

    fn delete_deal(&self, id: DealId, tenant_id: TenantId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(
            deals::table
                .filter(deals::id.eq(id.get()))
                .filter(deals::tenant_id.eq(tenant_id.get())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
