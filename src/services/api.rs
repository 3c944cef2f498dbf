use crate::domain::auth::{ACCESS_ROLE, AuthenticatedUser};
use crate::dto::api::{PeopleApiQuery, PeopleResponse};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::{PersonListQuery, PersonReader};
use crate::services::{ServiceResult, ensure_role, normalize_search};

/// Returns the filtered list of contacts visible to the authenticated user.
pub fn list_people<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: PeopleApiQuery,
) -> ServiceResult<PeopleResponse>
where
    R: PersonReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let mut query = PersonListQuery::new(user.tenant_id()?);

    if let Some(owner) = user.visibility_owner()? {
        query = query.owner(owner);
    }

    if let Some(page) = params.page {
        query = query.paginate(page, DEFAULT_ITEMS_PER_PAGE);
    }

    if let Some(term) = normalize_search(params.search) {
        query = query.search(term);
    }

    let (total, people) = repo.list_people(query).map_err(|err| {
        log::error!("Failed to list people for API: {err}");
        err
    })?;

    Ok(PeopleResponse { total, people })
}
