use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{EmailAddress, TenantId, UserId, UserName, text_enum};

text_enum! {
    /// Permission level of a team member inside a tenant.
    Role {
        Admin => "admin",
        Member => "member",
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub email: EmailAddress,
    pub name: UserName,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub totp_secret: Option<String>,
    pub totp_enabled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub tenant_id: TenantId,
    pub email: EmailAddress,
    pub name: UserName,
    pub password_hash: String,
    pub role: Role,
}

/// Hashed one-time recovery code for two-factor login.
#[derive(Clone, Debug, PartialEq)]
pub struct BackupCode {
    pub id: i32,
    pub user_id: UserId,
    pub code_hash: String,
    pub used_at: Option<NaiveDateTime>,
}
