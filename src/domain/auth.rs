//! Identity of the signed-in team member carried in the session token.

use serde::{Deserialize, Serialize};

use crate::domain::types::{TenantId, TypeConstraintError, UserId};
use crate::domain::user::{Role, User};

/// Role every signed-in team member has.
pub const ACCESS_ROLE: &str = "crm";
/// Role granting tenant administration.
pub const ADMIN_ROLE: &str = "crm_admin";
/// Role of regular team members; restricts contact visibility to owned contacts.
pub const MEMBER_ROLE: &str = "crm_member";

/// JWT claims identifying the current user.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub tenant_id: i32,
    pub roles: Vec<String>,
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Builds claims for `user` expiring at the unix timestamp `exp`.
    pub fn from_user(user: &User, exp: usize) -> Self {
        let mut roles = vec![ACCESS_ROLE.to_string()];
        roles.push(match user.role {
            Role::Admin => ADMIN_ROLE.to_string(),
            Role::Member => MEMBER_ROLE.to_string(),
        });
        Self {
            sub: user.id.to_string(),
            email: user.email.as_str().to_string(),
            name: user.name.as_str().to_string(),
            tenant_id: user.tenant_id.get(),
            roles,
            exp,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    pub fn user_id(&self) -> Result<UserId, TypeConstraintError> {
        let raw: i32 = self
            .sub
            .parse()
            .map_err(|_| TypeConstraintError::InvalidValue(format!("invalid subject {}", self.sub)))?;
        UserId::new(raw)
    }

    pub fn tenant_id(&self) -> Result<TenantId, TypeConstraintError> {
        TenantId::new(self.tenant_id)
    }

    /// Owner filter applied to contact queries; `None` for admins.
    pub fn visibility_owner(&self) -> Result<Option<UserId>, TypeConstraintError> {
        if self.is_admin() {
            Ok(None)
        } else {
            self.user_id().map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::types::{EmailAddress, UserName};

    fn user(role: Role) -> User {
        let now = Utc::now().naive_utc();
        User {
            id: UserId::new(5).unwrap(),
            tenant_id: TenantId::new(2).unwrap(),
            email: EmailAddress::new("ann@example.com").unwrap(),
            name: UserName::new("Ann").unwrap(),
            role,
            password_hash: String::new(),
            totp_secret: None,
            totp_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn admin_claims_carry_admin_role() {
        let claims = AuthenticatedUser::from_user(&user(Role::Admin), 0);
        assert!(claims.has_role(ACCESS_ROLE));
        assert!(claims.is_admin());
        assert_eq!(claims.visibility_owner(), Ok(None));
    }

    #[test]
    fn member_claims_restrict_visibility() {
        let claims = AuthenticatedUser::from_user(&user(Role::Member), 0);
        assert!(claims.has_role(MEMBER_ROLE));
        assert!(!claims.is_admin());
        assert_eq!(claims.user_id().unwrap().get(), 5);
        assert_eq!(claims.tenant_id().unwrap().get(), 2);
        assert_eq!(claims.visibility_owner().unwrap().map(UserId::get), Some(5));
    }
}
