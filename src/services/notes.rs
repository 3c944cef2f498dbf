//! Notes attached to contacts, accounts and deals.

use crate::domain::auth::{ACCESS_ROLE, AuthenticatedUser};
use crate::domain::note::{Note, NoteTarget};
use crate::domain::types::NoteId;
use crate::forms::notes::{NoteForm, NotePayload};
use crate::repository::{
    AccountReader, DealReader, NoteReader, NoteWriter, PersonReader,
};
use crate::services::people::load_visible_person;
use crate::services::{ServiceError, ServiceResult, ensure_role};

/// Checks that the record a note points at exists in the caller's tenant.
fn ensure_target_visible<R>(
    repo: &R,
    user: &AuthenticatedUser,
    target: NoteTarget,
) -> ServiceResult<()>
where
    R: PersonReader + AccountReader + DealReader + ?Sized,
{
    let tenant_id = user.tenant_id()?;
    let found = match target {
        NoteTarget::Person(id) => {
            load_visible_person(repo, user, id.get())?;
            true
        }
        NoteTarget::Account(id) => repo.get_account_by_id(id, tenant_id)?.is_some(),
        NoteTarget::Deal(id) => repo.get_deal_by_id(id, tenant_id)?.is_some(),
    };

    if found {
        Ok(())
    } else {
        Err(ServiceError::NotFound)
    }
}

pub fn add_note<R>(repo: &R, user: &AuthenticatedUser, form: NoteForm) -> ServiceResult<Note>
where
    R: PersonReader + AccountReader + DealReader + NoteWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let payload = NotePayload::try_from(form)?;
    ensure_target_visible(repo, user, payload.target)?;

    let new_note = payload.into_domain(user.tenant_id()?, user.user_id()?);
    let note = repo.create_note(&new_note).map_err(|err| {
        log::error!("Failed to create note: {err}");
        err
    })?;

    Ok(note)
}

/// Deletes a note and returns the record it belonged to.
pub fn delete_note<R>(repo: &R, user: &AuthenticatedUser, note_id: i32) -> ServiceResult<NoteTarget>
where
    R: NoteReader + NoteWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let note = repo
        .get_note_by_id(NoteId::new(note_id)?, tenant_id)?
        .ok_or(ServiceError::NotFound)?;

    if !user.is_admin() && note.author_id != user.user_id()? {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_note(note.id, tenant_id)?;

    Ok(note.target)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::types::{DealId, RichText, TenantId, UserId};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{admin_user, member_user};

    fn note(author: i32) -> Note {
        Note {
            id: NoteId::new(8).unwrap(),
            tenant_id: TenantId::new(10).unwrap(),
            author_id: UserId::new(author).unwrap(),
            body: RichText::new("<p>Met at the fair</p>").unwrap(),
            target: NoteTarget::Deal(DealId::new(3).unwrap()),
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn note_on_missing_deal_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_deal_by_id().returning(|_, _| Ok(None));
        repo.expect_create_note().never();

        let form = NoteForm {
            body: "Hello".to_string(),
            deal_id: Some("3".to_string()),
            ..NoteForm::default()
        };
        assert!(matches!(
            add_note(&repo, &member_user(), form),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn members_delete_only_their_notes() {
        let mut repo = MockRepository::new();
        repo.expect_get_note_by_id().returning(|_, _| Ok(Some(note(1))));
        repo.expect_delete_note().never();

        assert!(matches!(
            delete_note(&repo, &member_user(), 8),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn admins_delete_any_note() {
        let mut repo = MockRepository::new();
        repo.expect_get_note_by_id().returning(|_, _| Ok(Some(note(2))));
        repo.expect_delete_note().times(1).returning(|_, _| Ok(()));

        let target = delete_note(&repo, &admin_user(), 8).unwrap();
        assert_eq!(target.url(), "/deals/3");
    }
}
