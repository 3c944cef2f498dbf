//! Lead score recomputation and the scoring settings page.

use crate::domain::auth::{ADMIN_ROLE, AuthenticatedUser};
use crate::domain::types::{PersonId, TenantId};
use crate::dto::settings::ScoringPageData;
use crate::forms::settings::{ScoringWeightsForm, ScoringWeightsPayload};
use crate::repository::{
    PersonListQuery, PersonReader, PersonWriter, SettingsReader, SettingsWriter,
};
use crate::services::{ServiceResult, ensure_role};

/// Recomputes and stores the score of one contact.
pub fn recompute_score<R>(repo: &R, tenant_id: TenantId, person_id: PersonId) -> ServiceResult<i32>
where
    R: SettingsReader + PersonReader + PersonWriter + ?Sized,
{
    let weights = repo.load_scoring_weights(tenant_id)?;
    let input = repo.load_score_input(person_id, tenant_id)?;
    let score = weights.score(&input);

    repo.set_person_score(person_id, tenant_id, score)
        .map_err(|err| {
            log::error!("Failed to store score of person {person_id}: {err}");
            err
        })?;

    Ok(score)
}

pub fn load_scoring_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<ScoringPageData>
where
    R: SettingsReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let weights = repo.load_scoring_weights(user.tenant_id()?)?;

    Ok(ScoringPageData {
        weights: weights.list(),
    })
}

/// Saves the submitted points and rescores every contact of the tenant.
///
/// Returns the number of rescored contacts.
pub fn update_scoring_weights<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ScoringWeightsForm,
) -> ServiceResult<usize>
where
    R: SettingsReader + SettingsWriter + PersonReader + PersonWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let payload = ScoringWeightsPayload::try_from(form)?;
    let tenant_id = user.tenant_id()?;

    for (criterion, points) in &payload.weights {
        repo.set_scoring_points(tenant_id, *criterion, *points)?;
    }

    rescore_tenant(repo, tenant_id)
}

/// Recomputes the score of every contact of the tenant.
pub fn rescore_tenant<R>(repo: &R, tenant_id: TenantId) -> ServiceResult<usize>
where
    R: SettingsReader + PersonReader + PersonWriter + ?Sized,
{
    let (_, people) = repo.list_people(PersonListQuery::new(tenant_id))?;
    for person in &people {
        recompute_score(repo, tenant_id, person.id)?;
    }

    Ok(people.len())
}
