//! Deal pipeline workflows.

use chrono::Utc;
use serde_json::json;

use crate::domain::activity::{ActivityType, NewActivity};
use crate::domain::auth::{ACCESS_ROLE, AuthenticatedUser};
use crate::domain::deal::{Deal, DealStage, UpdateDeal, build_pipeline};
use crate::domain::note::NoteTarget;
use crate::domain::types::{DealId, TenantId};
use crate::dto::deals::{DealChoices, DealDetailData, DealsPageData, DealsQuery, PipelineData};
use crate::forms::deals::{DealForm, DealPayload, MoveStageForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    AccountListQuery, AccountReader, ActivityWriter, DealListQuery, DealReader, DealWriter,
    NoteReader, PersonListQuery, PersonReader, PersonWriter, SettingsReader, TaskListQuery,
    TaskReader, TaskWriter, UserReader,
};
use crate::services::references::{ensure_account, ensure_person, ensure_team_member};
use crate::services::{ServiceError, ServiceResult, automation, ensure_role, scoring};

fn load_choices<R>(repo: &R, user: &AuthenticatedUser, tenant_id: TenantId) -> ServiceResult<DealChoices>
where
    R: PersonReader + AccountReader + UserReader + ?Sized,
{
    let mut people_query = PersonListQuery::new(tenant_id);
    if let Some(owner) = user.visibility_owner()? {
        people_query = people_query.owner(owner);
    }
    let (_, people) = repo.list_people(people_query)?;
    let (_, accounts) = repo.list_accounts(AccountListQuery::new(tenant_id))?;

    Ok(DealChoices {
        people,
        accounts,
        team: repo.list_team_members(tenant_id)?,
    })
}

fn load_deal<R>(repo: &R, user: &AuthenticatedUser, deal_id: i32) -> ServiceResult<Deal>
where
    R: DealReader + ?Sized,
{
    repo.get_deal_by_id(DealId::new(deal_id)?, user.tenant_id()?)?
        .ok_or(ServiceError::NotFound)
}

pub fn load_deals_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: DealsQuery,
) -> ServiceResult<DealsPageData>
where
    R: DealReader + PersonReader + AccountReader + UserReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let page = query.page.unwrap_or(1).max(1);

    let mut list_query = DealListQuery::new(tenant_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    let stage = query.stage.filter(|s| !s.trim().is_empty());
    if let Some(raw) = &stage {
        list_query = list_query.stage(raw.parse::<DealStage>()?);
    }

    let (total, deals) = repo.list_deals(list_query).map_err(|err| {
        log::error!("Failed to list deals: {err}");
        err
    })?;

    Ok(DealsPageData {
        deals: Paginated::from_total(deals, page, total),
        stage,
        choices: load_choices(repo, user, tenant_id)?,
    })
}

/// Groups the open deals of the tenant into pipeline columns.
pub fn load_pipeline<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<PipelineData>
where
    R: DealReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let (_, deals) = repo.list_deals(DealListQuery::new(user.tenant_id()?).open_only())?;

    Ok(PipelineData {
        columns: build_pipeline(deals),
    })
}

pub fn load_deal_detail<R>(
    repo: &R,
    user: &AuthenticatedUser,
    deal_id: i32,
) -> ServiceResult<DealDetailData>
where
    R: DealReader
        + PersonReader
        + AccountReader
        + UserReader
        + NoteReader
        + TaskReader
        + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let deal = load_deal(repo, user, deal_id)?;
    let tenant_id = deal.tenant_id;

    let account = match deal.account_id {
        Some(id) => repo.get_account_by_id(id, tenant_id)?,
        None => None,
    };
    let person = match deal.person_id {
        Some(id) => repo.get_person_by_id(id, tenant_id)?,
        None => None,
    };
    let owner = match deal.owner_id {
        Some(id) => repo.get_team_member(id, tenant_id)?,
        None => None,
    };
    let (_, tasks) =
        repo.list_tasks(TaskListQuery::new(tenant_id, Utc::now().naive_utc()).deal(deal.id))?;

    Ok(DealDetailData {
        notes: repo.list_notes(tenant_id, NoteTarget::Deal(deal.id))?,
        choices: load_choices(repo, user, tenant_id)?,
        deal,
        account,
        person,
        owner,
        tasks,
    })
}

/// Creates a deal; a deal created as `won` runs the won-deal automation.
pub fn create_deal<R>(repo: &R, user: &AuthenticatedUser, form: DealForm) -> ServiceResult<Deal>
where
    R: DealWriter
        + AccountReader
        + UserReader
        + SettingsReader
        + TaskWriter
        + PersonReader
        + PersonWriter
        + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let payload = DealPayload::try_from(form)?;
    ensure_references(repo, user, &payload)?;
    let new_deal = payload.into_new_deal(user.tenant_id()?, Some(user.user_id()?));

    let deal = repo.create_deal(&new_deal).map_err(|err| {
        log::error!("Failed to create deal: {err}");
        err
    })?;

    if deal.stage == DealStage::Won {
        automation::on_deal_won(repo, &deal, Utc::now().naive_utc())?;
    }
    if let Some(person_id) = deal.person_id {
        scoring::recompute_score(repo, deal.tenant_id, person_id)?;
    }

    Ok(deal)
}

/// Saves the edit form. A changed stage goes through the same transition as
/// the pipeline board.
pub fn update_deal<R>(
    repo: &R,
    user: &AuthenticatedUser,
    deal_id: i32,
    form: DealForm,
) -> ServiceResult<Deal>
where
    R: DealReader
        + DealWriter
        + AccountReader
        + UserReader
        + ActivityWriter
        + SettingsReader
        + TaskWriter
        + PersonReader
        + PersonWriter
        + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let deal = load_deal(repo, user, deal_id)?;
    let payload = DealPayload::try_from(form)?;
    ensure_references(repo, user, &payload)?;

    let stage = payload.stage;
    let updates = UpdateDeal {
        stage: deal.stage,
        ..payload.into_update()
    };
    let updated = repo.update_deal(deal.id, deal.tenant_id, &updates)?;
    let updated = transition_stage(repo, user, updated, stage)?;

    if let Some(person_id) = updated.person_id {
        scoring::recompute_score(repo, updated.tenant_id, person_id)?;
    }
    if let Some(person_id) = deal.person_id
        && deal.person_id != updated.person_id
    {
        scoring::recompute_score(repo, updated.tenant_id, person_id)?;
    }

    Ok(updated)
}

/// Moves a deal to another stage from the pipeline board.
pub fn move_stage<R>(
    repo: &R,
    user: &AuthenticatedUser,
    deal_id: i32,
    form: MoveStageForm,
) -> ServiceResult<Deal>
where
    R: DealReader
        + DealWriter
        + ActivityWriter
        + SettingsReader
        + TaskWriter
        + PersonReader
        + PersonWriter
        + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let stage = DealStage::try_from(form)?;
    let deal = load_deal(repo, user, deal_id)?;
    if deal.stage == stage {
        return Ok(deal);
    }

    let moved = transition_stage(repo, user, deal, stage)?;
    if let Some(person_id) = moved.person_id {
        scoring::recompute_score(repo, moved.tenant_id, person_id)?;
    }

    Ok(moved)
}

fn ensure_references<R>(repo: &R, user: &AuthenticatedUser, payload: &DealPayload) -> ServiceResult<()>
where
    R: AccountReader + PersonReader + UserReader + ?Sized,
{
    ensure_account(repo, user, payload.account_id)?;
    ensure_person(repo, user, payload.person_id)?;
    ensure_team_member(repo, user, payload.owner_id)
}

/// Records a `stage_changed` activity on the linked contact and runs the
/// won-deal automation when the deal enters `won`. Scoring is left to the
/// caller.
fn transition_stage<R>(
    repo: &R,
    user: &AuthenticatedUser,
    deal: Deal,
    stage: DealStage,
) -> ServiceResult<Deal>
where
    R: DealWriter + ActivityWriter + SettingsReader + TaskWriter + PersonWriter + ?Sized,
{
    if deal.stage == stage {
        return Ok(deal);
    }

    let previous = deal.stage;
    let moved = repo
        .set_deal_stage(deal.id, deal.tenant_id, stage)
        .map_err(|err| {
            log::error!("Failed to move deal {} to {stage}: {err}", deal.id);
            err
        })?;

    if let Some(person_id) = moved.person_id {
        let activity = NewActivity::new(
            moved.tenant_id,
            person_id,
            ActivityType::StageChanged,
            json!({
                "deal_id": moved.id.get(),
                "deal": moved.name.as_str(),
                "from": previous.as_str(),
                "to": stage.as_str(),
            }),
        )
        .by(user.user_id()?);
        repo.create_activity(&activity)?;
    }

    if stage == DealStage::Won {
        automation::on_deal_won(repo, &moved, Utc::now().naive_utc())?;
    }

    Ok(moved)
}

pub fn delete_deal<R>(repo: &R, user: &AuthenticatedUser, deal_id: i32) -> ServiceResult<()>
where
    R: DealWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    repo.delete_deal(DealId::new(deal_id)?, user.tenant_id()?)
        .map_err(|err| {
            log::error!("Failed to delete deal {deal_id}: {err}");
            err
        })?;

    Ok(())
}
