//! Team administration workflows.

use crate::auth::password::hash_password;
use crate::domain::auth::{ACCESS_ROLE, ADMIN_ROLE, AuthenticatedUser};
use crate::domain::user::{Role, User};
use crate::dto::team::TeamPageData;
use crate::forms::team::{ChangeRoleForm, ChangeRolePayload, InviteMemberForm, InviteMemberPayload};
use crate::repository::{UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult, conflict_on_violation, ensure_role};

pub fn load_team_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<TeamPageData>
where
    R: UserReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    Ok(TeamPageData {
        members: repo.list_team_members(user.tenant_id()?)?,
    })
}

/// Creates a team member with the initial password chosen by the admin.
pub fn invite_member<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: InviteMemberForm,
    bcrypt_cost: u32,
) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let payload = InviteMemberPayload::try_from(form)?;
    let password_hash = hash_password(&payload.password, bcrypt_cost)?;
    let new_user = payload.into_domain(user.tenant_id()?, password_hash);

    let member = repo
        .create_user(&new_user)
        .map_err(conflict_on_violation("A user with this email already exists."))?;

    log::info!("User {} invited {} as {}", user.sub, member.email, member.role);
    Ok(member)
}

pub fn change_role<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ChangeRoleForm,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let payload = ChangeRolePayload::try_from(form)?;
    let tenant_id = user.tenant_id()?;

    if payload.user_id == user.user_id()? && payload.role != Role::Admin {
        return Err(ServiceError::Form("You cannot remove your own admin role.".to_string()));
    }

    let member = repo
        .get_team_member(payload.user_id, tenant_id)?
        .ok_or(ServiceError::NotFound)?;

    Ok(repo.update_user_role(member.id, tenant_id, payload.role)?)
}

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::types::{EmailAddress, TenantId, UserId, UserName};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{admin_user, member_user};

    pub(crate) fn user(id: i32, role: Role) -> User {
        let now = Utc::now().naive_utc();
        User {
            id: UserId::new(id).unwrap(),
            tenant_id: TenantId::new(10).unwrap(),
            email: EmailAddress::new(format!("user{id}@example.com")).unwrap(),
            name: UserName::new(format!("User {id}")).unwrap(),
            role,
            password_hash: String::new(),
            totp_secret: None,
            totp_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn invite_form() -> InviteMemberForm {
        InviteMemberForm {
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            password: "long-enough".to_string(),
            role: None,
        }
    }

    #[test]
    fn members_cannot_invite() {
        let repo = MockRepository::new();
        assert!(matches!(
            invite_member(&repo, &member_user(), invite_form(), 4),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn invite_hashes_password() {
        let mut repo = MockRepository::new();
        repo.expect_create_user()
            .withf(|new| {
                new.role == Role::Member
                    && new.password_hash != "long-enough"
                    && crate::auth::password::verify_password("long-enough", &new.password_hash)
            })
            .times(1)
            .returning(|_| Ok(user(5, Role::Member)));

        let member = invite_member(&repo, &admin_user(), invite_form(), 4).unwrap();
        assert_eq!(member.id.get(), 5);
    }

    #[test]
    fn admin_cannot_demote_themself() {
        let repo = MockRepository::new();
        let form = ChangeRoleForm {
            user_id: 1,
            role: "member".to_string(),
        };
        assert!(matches!(
            change_role(&repo, &admin_user(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn admin_promotes_member() {
        let mut repo = MockRepository::new();
        repo.expect_get_team_member()
            .returning(|id, _| Ok(Some(user(id.get(), Role::Member))));
        repo.expect_update_user_role()
            .withf(|id, _, role| id.get() == 5 && *role == Role::Admin)
            .times(1)
            .returning(|id, _, role| Ok(user(id.get(), role)));

        let form = ChangeRoleForm {
            user_id: 5,
            role: "admin".to_string(),
        };
        assert!(change_role(&repo, &admin_user(), form).unwrap().is_admin());
    }
}
