//! Lookups for ids submitted through forms.
//!
//! A form may only point at records of the caller's tenant. A miss is reported
//! as a form error so nothing is written.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::{AccountId, DealId, PersonId, UserId};
use crate::repository::{AccountReader, DealReader, PersonReader, UserReader};
use crate::services::people::load_visible_person;
use crate::services::{ServiceError, ServiceResult};

/// Contacts must also be visible to the caller; members only link their own.
pub(crate) fn ensure_person<R>(
    repo: &R,
    user: &AuthenticatedUser,
    person_id: Option<PersonId>,
) -> ServiceResult<()>
where
    R: PersonReader + ?Sized,
{
    let Some(person_id) = person_id else {
        return Ok(());
    };
    match load_visible_person(repo, user, person_id.get()) {
        Ok(_) => Ok(()),
        Err(ServiceError::NotFound) => Err(ServiceError::Form("Unknown contact.".to_string())),
        Err(err) => Err(err),
    }
}

pub(crate) fn ensure_account<R>(
    repo: &R,
    user: &AuthenticatedUser,
    account_id: Option<AccountId>,
) -> ServiceResult<()>
where
    R: AccountReader + ?Sized,
{
    match account_id {
        Some(id) if repo.get_account_by_id(id, user.tenant_id()?)?.is_none() => {
            Err(ServiceError::Form("Unknown account.".to_string()))
        }
        _ => Ok(()),
    }
}

pub(crate) fn ensure_deal<R>(
    repo: &R,
    user: &AuthenticatedUser,
    deal_id: Option<DealId>,
) -> ServiceResult<()>
where
    R: DealReader + ?Sized,
{
    match deal_id {
        Some(id) if repo.get_deal_by_id(id, user.tenant_id()?)?.is_none() => {
            Err(ServiceError::Form("Unknown deal.".to_string()))
        }
        _ => Ok(()),
    }
}

pub(crate) fn ensure_team_member<R>(
    repo: &R,
    user: &AuthenticatedUser,
    user_id: Option<UserId>,
) -> ServiceResult<()>
where
    R: UserReader + ?Sized,
{
    match user_id {
        Some(id) if repo.get_team_member(id, user.tenant_id()?)?.is_none() => {
            Err(ServiceError::Form("Unknown team member.".to_string()))
        }
        _ => Ok(()),
    }
}
