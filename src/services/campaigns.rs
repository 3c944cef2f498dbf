//! Tag-targeted campaigns that feed a sequence.

use chrono::Utc;

use crate::domain::auth::{ACCESS_ROLE, AuthenticatedUser};
use crate::domain::campaign::{Campaign, CampaignStatus, NewCampaign};
use crate::domain::types::{CampaignId, TenantId};
use crate::dto::campaigns::CampaignsPageData;
use crate::forms::campaigns::{CampaignForm, CampaignPayload};
use crate::repository::{
    ActivityWriter, CampaignReader, CampaignWriter, PersonListQuery, PersonReader,
    SequenceReader, SequenceWriter, TagReader,
};
use crate::services::sequences::enroll_people_into;
use crate::services::{ServiceError, ServiceResult, ensure_role};

fn load_campaign<R>(repo: &R, user: &AuthenticatedUser, campaign_id: i32) -> ServiceResult<Campaign>
where
    R: CampaignReader + ?Sized,
{
    repo.get_campaign_by_id(CampaignId::new(campaign_id)?, user.tenant_id()?)?
        .ok_or(ServiceError::NotFound)
}

/// Rejects targets that belong to another tenant.
fn check_targets<R>(repo: &R, tenant_id: TenantId, campaign: &NewCampaign) -> ServiceResult<()>
where
    R: SequenceReader + TagReader + ?Sized,
{
    if let Some(sequence_id) = campaign.sequence_id
        && repo.get_sequence_by_id(sequence_id, tenant_id)?.is_none()
    {
        return Err(ServiceError::Form("Unknown sequence.".to_string()));
    }
    if let Some(tag_id) = campaign.tag_id
        && repo.get_tag_by_id(tag_id, tenant_id)?.is_none()
    {
        return Err(ServiceError::Form("Unknown tag.".to_string()));
    }
    Ok(())
}

pub fn load_campaigns_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<CampaignsPageData>
where
    R: CampaignReader + SequenceReader + TagReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let tenant_id = user.tenant_id()?;

    Ok(CampaignsPageData {
        campaigns: repo.list_campaigns(tenant_id)?,
        sequences: repo.list_sequences(tenant_id)?,
        tags: repo.list_tags(tenant_id)?,
    })
}

pub fn create_campaign<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CampaignForm,
) -> ServiceResult<Campaign>
where
    R: CampaignWriter + SequenceReader + TagReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let new_campaign = CampaignPayload::try_from(form)?.into_domain(tenant_id);
    check_targets(repo, tenant_id, &new_campaign)?;

    let campaign = repo.create_campaign(&new_campaign).map_err(|err| {
        log::error!("Failed to create campaign: {err}");
        err
    })?;

    Ok(campaign)
}

/// Edits a draft campaign; launched campaigns are frozen.
pub fn update_campaign<R>(
    repo: &R,
    user: &AuthenticatedUser,
    campaign_id: i32,
    form: CampaignForm,
) -> ServiceResult<Campaign>
where
    R: CampaignReader + CampaignWriter + SequenceReader + TagReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let campaign = load_campaign(repo, user, campaign_id)?;
    if campaign.status == CampaignStatus::Launched {
        return Err(ServiceError::Conflict(
            "A launched campaign cannot be edited.".to_string(),
        ));
    }

    let updates = CampaignPayload::try_from(form)?.into_domain(campaign.tenant_id);
    check_targets(repo, campaign.tenant_id, &updates)?;

    Ok(repo.update_campaign(campaign.id, &updates)?)
}

pub fn delete_campaign<R>(repo: &R, user: &AuthenticatedUser, campaign_id: i32) -> ServiceResult<()>
where
    R: CampaignWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    repo.delete_campaign(CampaignId::new(campaign_id)?, user.tenant_id()?)
        .map_err(|err| {
            log::error!("Failed to delete campaign {campaign_id}: {err}");
            err
        })?;

    Ok(())
}

/// Enrolls every visible contact carrying the campaign tag into its sequence.
///
/// Returns the number of new enrollments.
pub fn launch_campaign<R>(
    repo: &R,
    user: &AuthenticatedUser,
    campaign_id: i32,
) -> ServiceResult<usize>
where
    R: CampaignReader
        + CampaignWriter
        + SequenceReader
        + SequenceWriter
        + PersonReader
        + ActivityWriter
        + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let campaign = load_campaign(repo, user, campaign_id)?;
    if campaign.status == CampaignStatus::Launched {
        return Err(ServiceError::Conflict(
            "This campaign has already been launched.".to_string(),
        ));
    }

    let (Some(sequence_id), Some(tag_id)) = (campaign.sequence_id, campaign.tag_id) else {
        return Err(ServiceError::Form(
            "Choose a sequence and a tag before launching.".to_string(),
        ));
    };

    let sequence = repo
        .get_sequence_by_id(sequence_id, campaign.tenant_id)?
        .ok_or_else(|| ServiceError::Form("Unknown sequence.".to_string()))?;

    let mut query = PersonListQuery::new(campaign.tenant_id).tag(tag_id);
    if let Some(owner) = user.visibility_owner()? {
        query = query.owner(owner);
    }
    let (_, people) = repo.list_people(query)?;

    let now = Utc::now().naive_utc();
    let enrolled = enroll_people_into(repo, &sequence, &people, Some(user.user_id()?), now)?;
    repo.mark_campaign_launched(campaign.id, campaign.tenant_id, now)
        .map_err(|err| {
            log::error!("Failed to mark campaign {} launched: {err}", campaign.id);
            err
        })?;

    log::info!("Campaign {} launched with {enrolled} enrollment(s)", campaign.id);
    Ok(enrolled)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::person::Person;
    use crate::domain::sequence::SequenceStatus;
    use crate::domain::types::{CampaignName, EmailAddress, SequenceId, TagId};
    use crate::repository::mock::MockRepository;
    use crate::services::people::tests::person;
    use crate::services::sequences::tests::{activity_from, sequence, step};
    use crate::services::test_support::admin_user;

    fn campaign(status: CampaignStatus, targets: bool) -> Campaign {
        Campaign {
            id: CampaignId::new(4).unwrap(),
            tenant_id: TenantId::new(10).unwrap(),
            name: CampaignName::new("Q3 outreach").unwrap(),
            status,
            sequence_id: targets.then(|| SequenceId::new(1).unwrap()),
            tag_id: targets.then(|| TagId::new(2).unwrap()),
            launched_at: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn launching_twice_conflicts() {
        let mut repo = MockRepository::new();
        repo.expect_get_campaign_by_id()
            .returning(|_, _| Ok(Some(campaign(CampaignStatus::Launched, true))));
        repo.expect_mark_campaign_launched().never();

        assert!(matches!(
            launch_campaign(&repo, &admin_user(), 4),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn launch_requires_targets() {
        let mut repo = MockRepository::new();
        repo.expect_get_campaign_by_id()
            .returning(|_, _| Ok(Some(campaign(CampaignStatus::Draft, false))));

        assert!(matches!(
            launch_campaign(&repo, &admin_user(), 4),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn launch_enrolls_tagged_people() {
        let mut repo = MockRepository::new();
        repo.expect_get_campaign_by_id()
            .returning(|_, _| Ok(Some(campaign(CampaignStatus::Draft, true))));
        repo.expect_get_sequence_by_id()
            .returning(|_, _| Ok(Some(sequence(SequenceStatus::Active))));
        repo.expect_list_people()
            .withf(|query| query.tag_id.map(|t| t.get()) == Some(2) && query.owner_id.is_none())
            .times(1)
            .returning(|_| {
                let tagged = Person {
                    email: Some(EmailAddress::new("ada@example.com").unwrap()),
                    ..person(1, None)
                };
                Ok((2, vec![tagged, person(2, None)]))
            });
        repo.expect_list_steps().returning(|_| Ok(vec![step(1, 0)]));
        repo.expect_list_enrolled_person_ids().returning(|_| Ok(Vec::new()));
        repo.expect_create_enrollments()
            .times(1)
            .returning(|new| Ok(new.len()));
        repo.expect_create_activity()
            .times(1)
            .returning(|new| Ok(activity_from(new)));
        repo.expect_mark_campaign_launched()
            .times(1)
            .returning(|_, _, at| {
                Ok(Campaign {
                    status: CampaignStatus::Launched,
                    launched_at: Some(at),
                    ..campaign(CampaignStatus::Draft, true)
                })
            });

        assert_eq!(launch_campaign(&repo, &admin_user(), 4).unwrap(), 1);
    }

    #[test]
    fn launched_campaign_is_frozen() {
        let mut repo = MockRepository::new();
        repo.expect_get_campaign_by_id()
            .returning(|_, _| Ok(Some(campaign(CampaignStatus::Launched, true))));
        repo.expect_update_campaign().never();

        let form = CampaignForm {
            name: "Renamed".to_string(),
            ..CampaignForm::default()
        };
        assert!(matches!(
            update_campaign(&repo, &admin_user(), 4, form),
            Err(ServiceError::Conflict(_))
        ));
    }
}
