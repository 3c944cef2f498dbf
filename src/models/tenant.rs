use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::tenant::{NewTenant as DomainNewTenant, Tenant as DomainTenant};
use crate::domain::types::{TenantId, TenantName, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::tenants)]
pub struct Tenant {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tenants)]
pub struct NewTenant<'a> {
    pub name: &'a str,
    pub slug: &'a str,
}

impl TryFrom<Tenant> for DomainTenant {
    type Error = TypeConstraintError;

    fn try_from(tenant: Tenant) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TenantId::new(tenant.id)?,
            name: TenantName::new(tenant.name)?,
            slug: tenant.slug,
            created_at: tenant.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewTenant> for NewTenant<'a> {
    fn from(tenant: &'a DomainNewTenant) -> Self {
        Self {
            name: tenant.name.as_str(),
            slug: tenant.slug.as_str(),
        }
    }
}
