//! Repository implementation for tenants.

use diesel::prelude::*;

use crate::domain::tenant::{NewTenant, NewTenantAdmin, Tenant};
use crate::domain::types::TenantId;
use crate::domain::user::{Role, User};
use crate::models::tenant::{NewTenant as DbNewTenant, Tenant as DbTenant};
use crate::models::user::{NewUser as DbNewUser, User as DbUser};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, TenantReader, TenantWriter};

impl TenantReader for DieselRepository {
    fn get_tenant_by_id(&self, id: TenantId) -> RepositoryResult<Option<Tenant>> {
        use crate::schema::tenants;

        let mut conn = self.conn()?;
        let db_tenant = tenants::table
            .find(id.get())
            .first::<DbTenant>(&mut conn)
            .optional()?;

        db_tenant
            .map(Tenant::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn tenant_slug_exists(&self, slug: &str) -> RepositoryResult<bool> {
        use crate::schema::tenants;

        let mut conn = self.conn()?;
        let exists = diesel::select(diesel::dsl::exists(
            tenants::table.filter(tenants::slug.eq(slug)),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(exists)
    }
}

impl TenantWriter for DieselRepository {
    fn create_tenant_with_admin(
        &self,
        tenant: &NewTenant,
        admin: &NewTenantAdmin,
    ) -> RepositoryResult<(Tenant, User)> {
        use crate::schema::{tenants, users};

        let mut conn = self.conn()?;

        let (db_tenant, db_user) = conn.transaction::<_, RepositoryError, _>(|conn| {
            let db_tenant = diesel::insert_into(tenants::table)
                .values(&DbNewTenant::from(tenant))
                .get_result::<DbTenant>(conn)?;

            let db_user = diesel::insert_into(users::table)
                .values(&DbNewUser {
                    tenant_id: db_tenant.id,
                    email: admin.email.as_str(),
                    name: admin.name.as_str(),
                    password_hash: admin.password_hash.as_str(),
                    role: Role::Admin.as_str(),
                })
                .get_result::<DbUser>(conn)?;

            Ok((db_tenant, db_user))
        })?;

        Ok((Tenant::try_from(db_tenant)?, User::try_from(db_user)?))
    }
}
