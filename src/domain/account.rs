use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{AccountId, AccountName, CompanyDomain, TenantId, UserId, WebUrl};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub tenant_id: TenantId,
    pub name: AccountName,
    pub domain: Option<CompanyDomain>,
    pub industry: Option<String>,
    pub website: Option<WebUrl>,
    pub employees: Option<i32>,
    pub owner_id: Option<UserId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewAccount {
    pub tenant_id: TenantId,
    pub name: AccountName,
    pub domain: Option<CompanyDomain>,
    pub industry: Option<String>,
    pub website: Option<WebUrl>,
    pub employees: Option<i32>,
    pub owner_id: Option<UserId>,
}

impl NewAccount {
    /// Minimal account known only by its name and domain, as created by imports.
    #[must_use]
    pub fn from_domain(tenant_id: TenantId, name: AccountName, domain: CompanyDomain) -> Self {
        Self {
            tenant_id,
            name,
            domain: Some(domain),
            industry: None,
            website: None,
            employees: None,
            owner_id: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct UpdateAccount {
    pub name: AccountName,
    pub domain: Option<CompanyDomain>,
    pub industry: Option<String>,
    pub website: Option<WebUrl>,
    pub employees: Option<i32>,
    pub owner_id: Option<UserId>,
}
