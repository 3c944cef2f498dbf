use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;

use crate::domain::integration::{Integration, NewIntegration, Provider};
use crate::domain::types::TenantId;
use crate::models::integration::{
    Integration as DbIntegration, NewIntegration as DbNewIntegration,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, IntegrationReader, IntegrationWriter};
use crate::schema::integrations;

impl IntegrationReader for DieselRepository {
    fn get_integration(
        &self,
        tenant_id: TenantId,
        provider: Provider,
    ) -> RepositoryResult<Option<Integration>> {
        let mut conn = self.conn()?;
        let db_integration = integrations::table
            .filter(integrations::tenant_id.eq(tenant_id.get()))
            .filter(integrations::provider.eq(provider.as_str()))
            .first::<DbIntegration>(&mut conn)
            .optional()?;

        db_integration
            .map(Integration::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_integration_by_webhook_token(
        &self,
        token: &str,
    ) -> RepositoryResult<Option<Integration>> {
        let mut conn = self.conn()?;
        let db_integration = integrations::table
            .filter(integrations::webhook_token.eq(token))
            .first::<DbIntegration>(&mut conn)
            .optional()?;

        db_integration
            .map(Integration::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_integrations(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Integration>> {
        let mut conn = self.conn()?;
        integrations::table
            .filter(integrations::tenant_id.eq(tenant_id.get()))
            .order(integrations::provider.asc())
            .load::<DbIntegration>(&mut conn)?
            .into_iter()
            .map(|i| Integration::try_from(i).map_err(RepositoryError::from))
            .collect()
    }
}

impl IntegrationWriter for DieselRepository {
    fn save_integration(&self, integration: &NewIntegration) -> RepositoryResult<Integration> {
        let mut conn = self.conn()?;
        let db_integration = diesel::insert_into(integrations::table)
            .values(&DbNewIntegration::new(integration, Utc::now().naive_utc()))
            .on_conflict((integrations::tenant_id, integrations::provider))
            .do_update()
            .set((
                integrations::credential.eq(excluded(integrations::credential)),
                integrations::webhook_token.eq(excluded(integrations::webhook_token)),
                integrations::updated_at.eq(excluded(integrations::updated_at)),
            ))
            .get_result::<DbIntegration>(&mut conn)?;

        Ok(Integration::try_from(db_integration)?)
    }

    fn delete_integration(&self, tenant_id: TenantId, provider: Provider) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(
            integrations::table
                .filter(integrations::tenant_id.eq(tenant_id.get()))
                .filter(integrations::provider.eq(provider.as_str())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
