//! Diesel models for team members and their backup codes.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{EmailAddress, TenantId, TypeConstraintError, UserId, UserName};
use crate::domain::user::{
    BackupCode as DomainBackupCode, NewUser as DomainNewUser, Role, User as DomainUser,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::users)]
/// Diesel model for [`crate::domain::user::User`].
pub struct User {
    pub id: i32,
    pub tenant_id: i32,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub totp_secret: Option<String>,
    pub totp_enabled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub tenant_id: i32,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::backup_codes)]
pub struct BackupCode {
    pub id: i32,
    pub user_id: i32,
    pub code_hash: String,
    pub used_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::backup_codes)]
pub struct NewBackupCode<'a> {
    pub user_id: i32,
    pub code_hash: &'a str,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(user.id)?,
            tenant_id: TenantId::new(user.tenant_id)?,
            email: EmailAddress::new(user.email)?,
            name: UserName::new(user.name)?,
            role: Role::try_from(user.role)?,
            password_hash: user.password_hash,
            totp_secret: user.totp_secret,
            totp_enabled: user.totp_enabled,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            tenant_id: user.tenant_id.get(),
            email: user.email.as_str(),
            name: user.name.as_str(),
            password_hash: user.password_hash.as_str(),
            role: user.role.as_str(),
        }
    }
}

impl TryFrom<BackupCode> for DomainBackupCode {
    type Error = TypeConstraintError;

    fn try_from(code: BackupCode) -> Result<Self, Self::Error> {
        Ok(Self {
            id: code.id,
            user_id: UserId::new(code.user_id)?,
            code_hash: code.code_hash,
            used_at: code.used_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn user_into_domain() {
        let now = Utc::now().naive_utc();
        let db = User {
            id: 1,
            tenant_id: 2,
            email: "Ann@Example.com".into(),
            name: "Ann".into(),
            password_hash: "hash".into(),
            role: "admin".into(),
            totp_secret: None,
            totp_enabled: false,
            created_at: now,
            updated_at: now,
        };
        let domain = DomainUser::try_from(db).expect("valid user");
        assert_eq!(domain.email.as_str(), "ann@example.com");
        assert_eq!(domain.role, Role::Admin);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let now = Utc::now().naive_utc();
        let db = User {
            id: 1,
            tenant_id: 2,
            email: "ann@example.com".into(),
            name: "Ann".into(),
            password_hash: "hash".into(),
            role: "owner".into(),
            totp_secret: None,
            totp_enabled: false,
            created_at: now,
            updated_at: now,
        };
        assert!(DomainUser::try_from(db).is_err());
    }
}
