use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::integration::{
    Integration as DomainIntegration, NewIntegration as DomainNewIntegration, Provider,
};
use crate::domain::types::{TenantId, TypeConstraintError};

#[derive(Debug, Clone, Queryable)]
pub struct Integration {
    pub tenant_id: i32,
    pub provider: String,
    pub credential: String,
    pub webhook_token: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::integrations)]
pub struct NewIntegration<'a> {
    pub tenant_id: i32,
    pub provider: &'a str,
    pub credential: &'a str,
    pub webhook_token: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Integration> for DomainIntegration {
    type Error = TypeConstraintError;

    fn try_from(integration: Integration) -> Result<Self, Self::Error> {
        Ok(Self {
            tenant_id: TenantId::new(integration.tenant_id)?,
            provider: Provider::try_from(integration.provider)?,
            credential: integration.credential,
            webhook_token: integration.webhook_token,
            updated_at: integration.updated_at,
        })
    }
}

impl<'a> NewIntegration<'a> {
    pub fn new(integration: &'a DomainNewIntegration, updated_at: NaiveDateTime) -> Self {
        Self {
            tenant_id: integration.tenant_id.get(),
            provider: integration.provider.as_str(),
            credential: integration.credential.as_str(),
            webhook_token: integration.webhook_token.as_deref(),
            updated_at,
        }
    }
}
