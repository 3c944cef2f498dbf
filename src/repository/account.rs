//! Repository implementation for company accounts.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::account::{Account, NewAccount, UpdateAccount};
use crate::domain::types::{AccountId, CompanyDomain, TenantId};
use crate::models::account::{
    Account as DbAccount, NewAccount as DbNewAccount, UpdateAccount as DbUpdateAccount,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AccountListQuery, AccountReader, AccountWriter, DieselRepository};
use crate::schema::accounts;

fn filtered(query: &AccountListQuery) -> accounts::BoxedQuery<'static, Sqlite> {
    let mut items = accounts::table
        .filter(accounts::tenant_id.eq(query.tenant_id.get()))
        .into_boxed();

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        items = items.filter(
            accounts::name
                .like(pattern.clone())
                .or(accounts::domain.like(pattern.clone()))
                .or(accounts::industry.like(pattern)),
        );
    }

    items
}

impl AccountReader for DieselRepository {
    fn get_account_by_id(
        &self,
        id: AccountId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Account>> {
        let mut conn = self.conn()?;
        let db_account = accounts::table
            .filter(accounts::id.eq(id.get()))
            .filter(accounts::tenant_id.eq(tenant_id.get()))
            .first::<DbAccount>(&mut conn)
            .optional()?;

        db_account
            .map(Account::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_account_by_domain(
        &self,
        domain: &CompanyDomain,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Account>> {
        let mut conn = self.conn()?;
        let db_account = accounts::table
            .filter(accounts::domain.eq(domain.as_str()))
            .filter(accounts::tenant_id.eq(tenant_id.get()))
            .order(accounts::id.asc())
            .first::<DbAccount>(&mut conn)
            .optional()?;

        db_account
            .map(Account::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_accounts(&self, query: AccountListQuery) -> RepositoryResult<(usize, Vec<Account>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = filtered(&query).order(accounts::name.asc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let accounts = items
            .load::<DbAccount>(&mut conn)?
            .into_iter()
            .map(|a| Account::try_from(a).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, accounts))
    }
}

impl AccountWriter for DieselRepository {
    fn create_account(&self, new_account: &NewAccount) -> RepositoryResult<Account> {
        let mut conn = self.conn()?;
        let db_account = diesel::insert_into(accounts::table)
            .values(&DbNewAccount::from(new_account))
            .get_result::<DbAccount>(&mut conn)?;

        Ok(Account::try_from(db_account)?)
    }

    fn update_account(
        &self,
        id: AccountId,
        tenant_id: TenantId,
        updates: &UpdateAccount,
    ) -> RepositoryResult<Account> {
        let mut conn = self.conn()?;
        let changes = DbUpdateAccount::new(updates, Utc::now().naive_utc());

        let db_account = diesel::update(
            accounts::table
                .filter(accounts::id.eq(id.get()))
                .filter(accounts::tenant_id.eq(tenant_id.get())),
        )
        .set(&changes)
        .get_result::<DbAccount>(&mut conn)?;

        Ok(Account::try_from(db_account)?)
    }

    fn delete_account(&self, id: AccountId, tenant_id: TenantId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(
            accounts::table
                .filter(accounts::id.eq(id.get()))
                .filter(accounts::tenant_id.eq(tenant_id.get())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
