//! Built-in automation rules and their settings page.
//!
//! Hooks are called by the services that own the triggering event. Each hook
//! loads the tenant's switches and does nothing when its rule is disabled.

use chrono::{Duration, NaiveDateTime};

use crate::domain::auth::{ADMIN_ROLE, AuthenticatedUser};
use crate::domain::automation::AutomationRule;
use crate::domain::deal::Deal;
use crate::domain::person::{Person, PersonStatus};
use crate::domain::sequence::EnrollmentStatus;
use crate::domain::task::{NewTask, Task, TaskPriority};
use crate::domain::types::TaskTitle;
use crate::dto::settings::AutomationPageData;
use crate::forms::settings::{AutomationRuleForm, AutomationRulePayload};
use crate::repository::{PersonWriter, SequenceWriter, SettingsReader, SettingsWriter, TaskWriter};
use crate::services::{ServiceResult, ensure_role};

const FOLLOW_UP_DELAY_DAYS: i64 = 1;
const ONBOARDING_DELAY_DAYS: i64 = 3;

/// Adds an intro call task for a freshly created contact.
pub fn on_person_created<R>(repo: &R, person: &Person, now: NaiveDateTime) -> ServiceResult<Option<Task>>
where
    R: SettingsReader + TaskWriter + ?Sized,
{
    let settings = repo.load_automation_settings(person.tenant_id)?;
    if !settings.is_enabled(AutomationRule::NewLeadFollowUp) {
        return Ok(None);
    }

    let task = NewTask {
        tenant_id: person.tenant_id,
        title: TaskTitle::new(format!("Intro call with {}", person.full_name()))?,
        description: None,
        priority: TaskPriority::Medium,
        due_at: Some(now + Duration::days(FOLLOW_UP_DELAY_DAYS)),
        person_id: Some(person.id),
        deal_id: None,
        assignee_id: person.owner_id,
    };

    let task = repo.create_task(&task).map_err(|err| {
        log::error!("Failed to create follow-up task for person {}: {err}", person.id);
        err
    })?;
    Ok(Some(task))
}

/// Stops the contact's active sequences and promotes a lead to contacted.
///
/// Returns the number of stopped enrollments.
pub fn on_reply<R>(repo: &R, person: &Person) -> ServiceResult<usize>
where
    R: SettingsReader + SequenceWriter + PersonWriter + ?Sized,
{
    let settings = repo.load_automation_settings(person.tenant_id)?;
    if !settings.is_enabled(AutomationRule::ReplyStopsSequences) {
        return Ok(0);
    }

    let stopped = repo.finish_person_enrollments(person.id, EnrollmentStatus::Replied)?;
    if person.status == PersonStatus::Lead {
        repo.set_person_status(person.id, person.tenant_id, PersonStatus::Contacted)?;
    }
    if stopped > 0 {
        log::info!("Stopped {stopped} enrollment(s) of person {} after reply", person.id);
    }
    Ok(stopped)
}

/// Adds an onboarding task for a won deal and marks its contact as a customer.
pub fn on_deal_won<R>(repo: &R, deal: &Deal, now: NaiveDateTime) -> ServiceResult<Option<Task>>
where
    R: SettingsReader + TaskWriter + PersonWriter + ?Sized,
{
    let settings = repo.load_automation_settings(deal.tenant_id)?;
    if !settings.is_enabled(AutomationRule::DealWonOnboarding) {
        return Ok(None);
    }

    let task = NewTask {
        tenant_id: deal.tenant_id,
        title: TaskTitle::new(format!("Kick off onboarding for {}", deal.name))?,
        description: None,
        priority: TaskPriority::High,
        due_at: Some(now + Duration::days(ONBOARDING_DELAY_DAYS)),
        person_id: deal.person_id,
        deal_id: Some(deal.id),
        assignee_id: deal.owner_id,
    };
    let task = repo.create_task(&task)?;

    if let Some(person_id) = deal.person_id {
        repo.set_person_status(person_id, deal.tenant_id, PersonStatus::Customer)?;
    }

    Ok(Some(task))
}

pub fn load_automation_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<AutomationPageData>
where
    R: SettingsReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let settings = repo.load_automation_settings(user.tenant_id()?)?;

    Ok(AutomationPageData {
        rules: settings.list(),
    })
}

pub fn set_automation_rule<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AutomationRuleForm,
) -> ServiceResult<AutomationRule>
where
    R: SettingsWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let payload = AutomationRulePayload::try_from(form)?;

    repo.set_automation_rule(user.tenant_id()?, payload.rule, payload.enabled)
        .map_err(|err| {
            log::error!("Failed to save automation rule {}: {err}", payload.rule);
            err
        })?;

    Ok(payload.rule)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::automation::AutomationSettings;
    use crate::domain::types::{
        AmountCents, DealId, DealName, PersonId, PersonName, TaskId, TenantId, UserId,
    };
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;
    use crate::services::test_support::{admin_user, member_user};

    fn person(status: PersonStatus) -> Person {
        let now = Utc::now().naive_utc();
        Person {
            id: PersonId::new(7).unwrap(),
            tenant_id: TenantId::new(10).unwrap(),
            account_id: None,
            owner_id: Some(UserId::new(2).unwrap()),
            first_name: PersonName::new("Ada").unwrap(),
            last_name: PersonName::new("Lovelace").unwrap(),
            email: None,
            phone: None,
            title: None,
            linkedin_url: None,
            status,
            score: 0,
            email_status: None,
            enriched_at: None,
            amplemarket_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn task_from(new: &NewTask) -> Task {
        Task {
            id: TaskId::new(1).unwrap(),
            tenant_id: new.tenant_id,
            title: new.title.clone(),
            description: new.description.clone(),
            priority: new.priority,
            due_at: new.due_at,
            completed_at: None,
            person_id: new.person_id,
            deal_id: new.deal_id,
            assignee_id: new.assignee_id,
            calendar_event_id: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn new_person_gets_follow_up_task() {
        let now = Utc::now().naive_utc();
        let mut repo = MockRepository::new();
        repo.expect_load_automation_settings()
            .returning(|_| Ok(AutomationSettings::default()));
        repo.expect_create_task()
            .withf(move |task| {
                task.title.as_str() == "Intro call with Ada Lovelace"
                    && task.assignee_id == Some(UserId::new(2).unwrap())
                    && task.due_at == Some(now + Duration::days(1))
            })
            .times(1)
            .returning(|task| Ok(task_from(task)));

        let task = on_person_created(&repo, &person(PersonStatus::Lead), now).unwrap();
        assert!(task.is_some());
    }

    #[test]
    fn disabled_rule_creates_nothing() {
        let mut repo = MockRepository::new();
        repo.expect_load_automation_settings().returning(|_| {
            Ok(AutomationSettings::new([(AutomationRule::NewLeadFollowUp, false)]))
        });
        repo.expect_create_task().never();

        let task = on_person_created(&repo, &person(PersonStatus::Lead), Utc::now().naive_utc())
            .unwrap();
        assert!(task.is_none());
    }

    #[test]
    fn reply_stops_sequences_and_promotes_lead() {
        let mut repo = MockRepository::new();
        repo.expect_load_automation_settings()
            .returning(|_| Ok(AutomationSettings::default()));
        repo.expect_finish_person_enrollments()
            .withf(|_, status| *status == EnrollmentStatus::Replied)
            .times(1)
            .returning(|_, _| Ok(2));
        repo.expect_set_person_status()
            .withf(|_, _, status| *status == PersonStatus::Contacted)
            .times(1)
            .returning(|_, _, _| Ok(()));

        assert_eq!(on_reply(&repo, &person(PersonStatus::Lead)).unwrap(), 2);
    }

    #[test]
    fn reply_keeps_status_of_qualified_contact() {
        let mut repo = MockRepository::new();
        repo.expect_load_automation_settings()
            .returning(|_| Ok(AutomationSettings::default()));
        repo.expect_finish_person_enrollments()
            .returning(|_, _| Ok(0));
        repo.expect_set_person_status().never();

        assert_eq!(on_reply(&repo, &person(PersonStatus::Qualified)).unwrap(), 0);
    }

    #[test]
    fn won_deal_creates_onboarding_task_and_customer() {
        let now = Utc::now().naive_utc();
        let deal = Deal {
            id: DealId::new(3).unwrap(),
            tenant_id: TenantId::new(10).unwrap(),
            name: DealName::new("Acme renewal").unwrap(),
            stage: crate::domain::deal::DealStage::Won,
            amount: AmountCents::new(100).unwrap(),
            currency: "USD".to_string(),
            account_id: None,
            person_id: Some(PersonId::new(7).unwrap()),
            owner_id: None,
            expected_close: None,
            created_at: now,
            updated_at: now,
        };

        let mut repo = MockRepository::new();
        repo.expect_load_automation_settings()
            .returning(|_| Ok(AutomationSettings::default()));
        repo.expect_create_task()
            .withf(|task| task.title.as_str() == "Kick off onboarding for Acme renewal")
            .times(1)
            .returning(|task| Ok(task_from(task)));
        repo.expect_set_person_status()
            .withf(|id, _, status| id.get() == 7 && *status == PersonStatus::Customer)
            .times(1)
            .returning(|_, _, _| Ok(()));

        assert!(on_deal_won(&repo, &deal, now).unwrap().is_some());
    }

    #[test]
    fn only_admins_toggle_rules() {
        let repo = MockRepository::new();
        let form = AutomationRuleForm {
            rule: "deal_won_onboarding".to_string(),
            enabled: None,
        };
        assert!(matches!(
            set_automation_rule(&repo, &member_user(), form),
            Err(ServiceError::Unauthorized)
        ));

        let mut repo = MockRepository::new();
        repo.expect_set_automation_rule()
            .withf(|_, rule, enabled| *rule == AutomationRule::DealWonOnboarding && !enabled)
            .times(1)
            .returning(|_, _, _| Ok(()));
        let form = AutomationRuleForm {
            rule: "deal_won_onboarding".to_string(),
            enabled: None,
        };
        assert_eq!(
            set_automation_rule(&repo, &admin_user(), form).unwrap(),
            AutomationRule::DealWonOnboarding
        );
    }
}
