//! Tenant tag catalogue.

use crate::domain::auth::{ACCESS_ROLE, AuthenticatedUser};
use crate::domain::tag::Tag;
use crate::domain::types::TagId;
use crate::dto::tags::TagsPageData;
use crate::forms::tags::{TagForm, TagPayload};
use crate::repository::{TagReader, TagWriter};
use crate::services::{ServiceError, ServiceResult, conflict_on_violation, ensure_role};

const DUPLICATE_TAG: &str = "A tag with this name already exists.";

pub fn load_tags_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<TagsPageData>
where
    R: TagReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    Ok(TagsPageData {
        tags: repo.list_tags(user.tenant_id()?)?,
    })
}

pub fn create_tag<R>(repo: &R, user: &AuthenticatedUser, form: TagForm) -> ServiceResult<Tag>
where
    R: TagWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let new_tag = TagPayload::try_from(form)?.into_domain(user.tenant_id()?);

    repo.create_tag(&new_tag)
        .map_err(conflict_on_violation(DUPLICATE_TAG))
}

pub fn update_tag<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tag_id: i32,
    form: TagForm,
) -> ServiceResult<Tag>
where
    R: TagReader + TagWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let tag = repo
        .get_tag_by_id(TagId::new(tag_id)?, tenant_id)?
        .ok_or(ServiceError::NotFound)?;
    let updates = TagPayload::try_from(form)?.into_domain(tenant_id);

    repo.update_tag(tag.id, tenant_id, &updates)
        .map_err(conflict_on_violation(DUPLICATE_TAG))
}

/// Deletes the tag and detaches it from every contact.
pub fn delete_tag<R>(repo: &R, user: &AuthenticatedUser, tag_id: i32) -> ServiceResult<()>
where
    R: TagWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    repo.delete_tag(TagId::new(tag_id)?, user.tenant_id()?)
        .map_err(|err| {
            log::error!("Failed to delete tag {tag_id}: {err}");
            err
        })?;

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::member_user;

    #[test]
    fn duplicate_name_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_create_tag()
            .returning(|_| Err(RepositoryError::ConstraintViolation("UNIQUE".to_string())));

        let form = TagForm {
            name: "VIP".to_string(),
            color: Some("#ff0000".to_string()),
        };
        match create_tag(&repo, &member_user(), form) {
            Err(ServiceError::Conflict(message)) => assert_eq!(message, DUPLICATE_TAG),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn invalid_colour_is_a_form_error() {
        let repo = MockRepository::new();
        let form = TagForm {
            name: "VIP".to_string(),
            color: Some("red".to_string()),
        };
        assert!(matches!(
            create_tag(&repo, &member_user(), form),
            Err(ServiceError::Form(_))
        ));
    }
}
