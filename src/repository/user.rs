//! Repository implementation for team members and their backup codes.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::domain::types::{EmailAddress, TenantId, UserId};
use crate::domain::user::{BackupCode, NewUser, Role, User};
use crate::models::user::{
    BackupCode as DbBackupCode, NewBackupCode as DbNewBackupCode, NewUser as DbNewUser,
    User as DbUser,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, UserReader, UserWriter};

fn into_domain(db_user: Option<DbUser>) -> RepositoryResult<Option<User>> {
    db_user
        .map(User::try_from)
        .transpose()
        .map_err(RepositoryError::from)
}

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .find(id.get())
            .first::<DbUser>(&mut conn)
            .optional()?;

        into_domain(db_user)
    }

    fn get_user_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::email.eq(email.as_str()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        into_domain(db_user)
    }

    fn get_team_member(&self, id: UserId, tenant_id: TenantId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::id.eq(id.get()))
            .filter(users::tenant_id.eq(tenant_id.get()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        into_domain(db_user)
    }

    fn list_team_members(&self, tenant_id: TenantId) -> RepositoryResult<Vec<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_users = users::table
            .filter(users::tenant_id.eq(tenant_id.get()))
            .order(users::name.asc())
            .load::<DbUser>(&mut conn)?;

        db_users
            .into_iter()
            .map(|u| User::try_from(u).map_err(RepositoryError::from))
            .collect()
    }

    fn list_unused_backup_codes(&self, user_id: UserId) -> RepositoryResult<Vec<BackupCode>> {
        use crate::schema::backup_codes;

        let mut conn = self.conn()?;
        let codes = backup_codes::table
            .filter(backup_codes::user_id.eq(user_id.get()))
            .filter(backup_codes::used_at.is_null())
            .order(backup_codes::id.asc())
            .load::<DbBackupCode>(&mut conn)?;

        codes
            .into_iter()
            .map(|c| BackupCode::try_from(c).map_err(RepositoryError::from))
            .collect()
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = diesel::insert_into(users::table)
            .values(&DbNewUser::from(new_user))
            .get_result::<DbUser>(&mut conn)?;

        Ok(User::try_from(db_user)?)
    }

    fn update_user_role(
        &self,
        id: UserId,
        tenant_id: TenantId,
        role: Role,
    ) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = diesel::update(
            users::table
                .filter(users::id.eq(id.get()))
                .filter(users::tenant_id.eq(tenant_id.get())),
        )
        .set((
            users::role.eq(role.as_str()),
            users::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbUser>(&mut conn)?;

        Ok(User::try_from(db_user)?)
    }

    fn set_totp(
        &self,
        id: UserId,
        secret: Option<String>,
        enabled: bool,
    ) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = diesel::update(users::table.find(id.get()))
            .set((
                users::totp_secret.eq(secret),
                users::totp_enabled.eq(enabled),
                users::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbUser>(&mut conn)?;

        Ok(User::try_from(db_user)?)
    }

    fn replace_backup_codes(
        &self,
        user_id: UserId,
        code_hashes: &[String],
    ) -> RepositoryResult<usize> {
        use crate::schema::backup_codes;

        let mut conn = self.conn()?;
        let rows: Vec<DbNewBackupCode> = code_hashes
            .iter()
            .map(|hash| DbNewBackupCode {
                user_id: user_id.get(),
                code_hash: hash.as_str(),
            })
            .collect();

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            diesel::delete(backup_codes::table.filter(backup_codes::user_id.eq(user_id.get())))
                .execute(conn)?;

            let mut inserted = 0;
            for row in &rows {
                inserted += diesel::insert_into(backup_codes::table)
                    .values(row)
                    .execute(conn)?;
            }
            Ok(inserted)
        })
    }

    fn mark_backup_code_used(&self, code_id: i32, used_at: NaiveDateTime) -> RepositoryResult<()> {
        use crate::schema::backup_codes;

        let mut conn = self.conn()?;
        let affected = diesel::update(
            backup_codes::table
                .filter(backup_codes::id.eq(code_id))
                .filter(backup_codes::used_at.is_null()),
        )
        .set(backup_codes::used_at.eq(Some(used_at)))
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
