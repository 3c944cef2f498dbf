//! Team administration forms.

use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{EmailAddress, TenantId, UserId, UserName};
use crate::domain::user::{NewUser, Role};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct InviteMemberForm {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

pub struct InviteMemberPayload {
    pub name: UserName,
    pub email: EmailAddress,
    pub password: String,
    pub role: Role,
}

impl TryFrom<InviteMemberForm> for InviteMemberPayload {
    type Error = FormError;

    fn try_from(form: InviteMemberForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let role = match form.role.as_deref().map(str::trim) {
            None | Some("") => Role::Member,
            Some(raw) => raw.parse::<Role>()?,
        };
        Ok(Self {
            name: UserName::new(form.name).map_err(|_| FormError::InvalidName)?,
            email: EmailAddress::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            password: form.password,
            role,
        })
    }
}

impl InviteMemberPayload {
    pub fn into_domain(self, tenant_id: TenantId, password_hash: String) -> NewUser {
        NewUser {
            tenant_id,
            email: self.email,
            name: self.name,
            password_hash,
            role: self.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleForm {
    pub user_id: i32,
    pub role: String,
}

pub struct ChangeRolePayload {
    pub user_id: UserId,
    pub role: Role,
}

impl TryFrom<ChangeRoleForm> for ChangeRolePayload {
    type Error = FormError;

    fn try_from(form: ChangeRoleForm) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(form.user_id).map_err(|_| FormError::InvalidId)?,
            role: form.role.parse::<Role>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_defaults_to_member() {
        let payload = InviteMemberPayload::try_from(InviteMemberForm {
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            password: "long enough".to_string(),
            role: None,
        })
        .unwrap();
        assert_eq!(payload.role, Role::Member);

        let user = payload.into_domain(TenantId::new(1).unwrap(), "hash".to_string());
        assert_eq!(user.password_hash, "hash");
    }

    #[test]
    fn change_role_rejects_unknown_roles() {
        assert!(
            ChangeRolePayload::try_from(ChangeRoleForm {
                user_id: 2,
                role: "owner".to_string(),
            })
            .is_err()
        );
    }
}
