use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::account::{
    Account as DomainAccount, NewAccount as DomainNewAccount, UpdateAccount as DomainUpdateAccount,
};
use crate::domain::types::{
    AccountId, AccountName, CompanyDomain, TenantId, TypeConstraintError, UserId, WebUrl,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::accounts)]
/// Diesel model for [`crate::domain::account::Account`].
pub struct Account {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub domain: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub employees: Option<i32>,
    pub owner_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::accounts)]
pub struct NewAccount<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
    pub domain: Option<&'a str>,
    pub industry: Option<&'a str>,
    pub website: Option<&'a str>,
    pub employees: Option<i32>,
    pub owner_id: Option<i32>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateAccount<'a> {
    pub name: &'a str,
    pub domain: Option<&'a str>,
    pub industry: Option<&'a str>,
    pub website: Option<&'a str>,
    pub employees: Option<i32>,
    pub owner_id: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Account> for DomainAccount {
    type Error = TypeConstraintError;

    fn try_from(account: Account) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AccountId::new(account.id)?,
            tenant_id: TenantId::new(account.tenant_id)?,
            name: AccountName::new(account.name)?,
            domain: account.domain.map(CompanyDomain::new).transpose()?,
            industry: account.industry,
            website: account.website.map(WebUrl::new).transpose()?,
            employees: account.employees,
            owner_id: account.owner_id.map(UserId::new).transpose()?,
            created_at: account.created_at,
            updated_at: account.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewAccount> for NewAccount<'a> {
    fn from(account: &'a DomainNewAccount) -> Self {
        Self {
            tenant_id: account.tenant_id.get(),
            name: account.name.as_str(),
            domain: account.domain.as_ref().map(|d| d.as_str()),
            industry: account.industry.as_deref(),
            website: account.website.as_ref().map(|w| w.as_str()),
            employees: account.employees,
            owner_id: account.owner_id.map(UserId::get),
        }
    }
}

impl<'a> UpdateAccount<'a> {
    pub fn new(account: &'a DomainUpdateAccount, updated_at: NaiveDateTime) -> Self {
        Self {
            name: account.name.as_str(),
            domain: account.domain.as_ref().map(|d| d.as_str()),
            industry: account.industry.as_deref(),
            website: account.website.as_ref().map(|w| w.as_str()),
            employees: account.employees,
            owner_id: account.owner_id.map(UserId::get),
            updated_at,
        }
    }
}
