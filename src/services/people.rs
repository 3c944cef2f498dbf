//! Contact management workflows.

use chrono::Utc;

use crate::domain::auth::{ACCESS_ROLE, ADMIN_ROLE, AuthenticatedUser};
use crate::domain::note::NoteTarget;
use crate::domain::person::{Person, PersonStatus};
use crate::domain::types::{PersonId, TagId};
use crate::dto::people::{PeoplePageData, PeopleQuery, PersonDetailData};
use crate::forms::people::{AssignPeoplePayload, PersonForm, PersonPayload, UploadPeopleForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    AccountListQuery, AccountReader, ActivityListQuery, ActivityReader, DealListQuery,
    DealReader, NoteReader, PersonListQuery, PersonReader, PersonWriter, SequenceReader,
    SettingsReader, TagReader, TaskListQuery, TaskReader, TaskWriter, UserReader,
};
use crate::services::references::{ensure_account, ensure_team_member};
use crate::services::{
    ServiceError, ServiceResult, automation, conflict_on_violation, ensure_role, normalize_search,
    scoring,
};

const DUPLICATE_EMAIL: &str = "A contact with this email already exists.";
const TIMELINE_LEN: usize = 50;

/// Loads a contact the user may see; members only see contacts they own.
pub(crate) fn load_visible_person<R>(
    repo: &R,
    user: &AuthenticatedUser,
    person_id: i32,
) -> ServiceResult<Person>
where
    R: PersonReader + ?Sized,
{
    let tenant_id = user.tenant_id()?;
    let person = repo
        .get_person_by_id(PersonId::new(person_id)?, tenant_id)?
        .ok_or(ServiceError::NotFound)?;

    if let Some(owner) = user.visibility_owner()?
        && person.owner_id != Some(owner)
    {
        return Err(ServiceError::NotFound);
    }

    Ok(person)
}

pub fn load_people_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: PeopleQuery,
) -> ServiceResult<PeoplePageData>
where
    R: PersonReader + TagReader + AccountReader + UserReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let page = query.page.unwrap_or(1).max(1);
    let search_query = normalize_search(query.q);

    let mut list_query = PersonListQuery::new(tenant_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = &search_query {
        list_query = list_query.search(term.clone());
    }
    let status = normalize_search(query.status);
    if let Some(raw) = &status {
        list_query = list_query.status(raw.parse::<PersonStatus>()?);
    }
    if let Some(tag) = query.tag {
        list_query = list_query.tag(TagId::new(tag)?);
    }
    if let Some(owner) = user.visibility_owner()? {
        list_query = list_query.owner(owner);
    }

    let (total, people) = repo.list_people(list_query).map_err(|err| {
        log::error!("Failed to list people: {err}");
        err
    })?;
    let people = Paginated::from_total(people, page, total);

    let team = if user.is_admin() {
        repo.list_team_members(tenant_id)?
    } else {
        Vec::new()
    };
    let (_, accounts) = repo.list_accounts(AccountListQuery::new(tenant_id))?;

    Ok(PeoplePageData {
        people,
        search_query,
        status,
        tag_id: query.tag,
        tags: repo.list_tags(tenant_id)?,
        accounts,
        team,
    })
}

pub fn load_person_detail<R>(
    repo: &R,
    user: &AuthenticatedUser,
    person_id: i32,
) -> ServiceResult<PersonDetailData>
where
    R: PersonReader
        + AccountReader
        + UserReader
        + TagReader
        + NoteReader
        + TaskReader
        + DealReader
        + ActivityReader
        + SequenceReader
        + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let person = load_visible_person(repo, user, person_id)?;
    let tenant_id = person.tenant_id;
    let now = Utc::now().naive_utc();

    let account = match person.account_id {
        Some(account_id) => repo.get_account_by_id(account_id, tenant_id)?,
        None => None,
    };
    let owner = match person.owner_id {
        Some(owner_id) => repo.get_team_member(owner_id, tenant_id)?,
        None => None,
    };

    let tags = repo.list_person_tags(person.id)?;
    let available_tags = repo
        .list_tags(tenant_id)?
        .into_iter()
        .filter(|tag| !tags.iter().any(|t| t.id == tag.id))
        .collect();

    let (_, tasks) = repo.list_tasks(TaskListQuery::new(tenant_id, now).person(person.id))?;
    let (_, deals) = repo.list_deals(DealListQuery::new(tenant_id).person(person.id))?;
    let (_, activities) = repo.list_activities(
        ActivityListQuery::new(tenant_id)
            .person(person.id)
            .paginate(1, TIMELINE_LEN),
    )?;
    let (_, accounts) = repo.list_accounts(AccountListQuery::new(tenant_id))?;

    Ok(PersonDetailData {
        notes: repo.list_notes(tenant_id, NoteTarget::Person(person.id))?,
        enrollments: repo.list_person_enrollments(person.id)?,
        sequences: repo.list_sequences(tenant_id)?,
        team: repo.list_team_members(tenant_id)?,
        person,
        account,
        owner,
        tags,
        available_tags,
        tasks,
        deals,
        activities,
        accounts,
    })
}

/// Creates a contact, runs the new-lead automation and scores it.
pub fn create_person<R>(repo: &R, user: &AuthenticatedUser, form: PersonForm) -> ServiceResult<Person>
where
    R: PersonReader
        + PersonWriter
        + AccountReader
        + UserReader
        + SettingsReader
        + TaskWriter
        + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let payload = PersonPayload::try_from(form)?;
    let tenant_id = user.tenant_id()?;
    ensure_account(repo, user, payload.account_id)?;

    let mut new_person = payload.into_new_person(tenant_id, Some(user.user_id()?));
    match user.visibility_owner()? {
        Some(owner) => new_person.owner_id = Some(owner),
        None => ensure_team_member(repo, user, new_person.owner_id)?,
    }

    let person = repo
        .create_person(&new_person)
        .map_err(conflict_on_violation(DUPLICATE_EMAIL))?;

    automation::on_person_created(repo, &person, Utc::now().naive_utc())?;
    let score = scoring::recompute_score(repo, tenant_id, person.id)?;

    Ok(Person { score, ..person })
}

pub fn update_person<R>(
    repo: &R,
    user: &AuthenticatedUser,
    person_id: i32,
    form: PersonForm,
) -> ServiceResult<Person>
where
    R: PersonReader + PersonWriter + AccountReader + UserReader + SettingsReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let person = load_visible_person(repo, user, person_id)?;
    let mut updates = PersonPayload::try_from(form)?.into_update();
    ensure_account(repo, user, updates.account_id)?;
    match user.visibility_owner()? {
        Some(_) => updates.owner_id = person.owner_id,
        None => ensure_team_member(repo, user, updates.owner_id)?,
    }

    let updated = repo
        .update_person(person.id, person.tenant_id, &updates)
        .map_err(conflict_on_violation(DUPLICATE_EMAIL))?;
    let score = scoring::recompute_score(repo, updated.tenant_id, updated.id)?;

    Ok(Person { score, ..updated })
}

pub fn delete_person<R>(repo: &R, user: &AuthenticatedUser, person_id: i32) -> ServiceResult<()>
where
    R: PersonReader + PersonWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let person = load_visible_person(repo, user, person_id)?;

    repo.delete_person(person.id, person.tenant_id).map_err(|err| {
        log::error!("Failed to delete person {}: {err}", person.id);
        err
    })?;

    Ok(())
}

/// Imports contacts from the uploaded CSV and rescores the tenant.
///
/// Returns the number of inserted contacts; rows whose email already exists
/// are skipped.
pub fn upload_people<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &UploadPeopleForm,
) -> ServiceResult<usize>
where
    R: PersonReader + PersonWriter + SettingsReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let people = form
        .parse(tenant_id, user.visibility_owner()?)
        .map_err(|err| {
            log::error!("Failed to parse people CSV: {err}");
            err
        })?;

    let inserted = repo.create_people(&people).map_err(|err| {
        log::error!("Failed to import people: {err}");
        err
    })?;

    scoring::rescore_tenant(repo, tenant_id)?;

    Ok(inserted)
}

/// Hands the selected contacts over to one team member.
pub fn assign_people<R>(repo: &R, user: &AuthenticatedUser, body: &[u8]) -> ServiceResult<usize>
where
    R: UserReader + PersonWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let payload = AssignPeoplePayload::from_body(body)?;
    let tenant_id = user.tenant_id()?;

    if repo.get_team_member(payload.owner_id, tenant_id)?.is_none() {
        return Err(ServiceError::Form("Unknown team member.".to_string()));
    }

    let assigned = repo.assign_people(tenant_id, &payload.person_ids, payload.owner_id)?;
    log::info!(
        "Assigned {assigned} of {} contact(s) to user {}",
        payload.person_ids.len(),
        payload.owner_id
    );

    Ok(assigned)
}

pub fn tag_person<R>(
    repo: &R,
    user: &AuthenticatedUser,
    person_id: i32,
    tag_id: i32,
) -> ServiceResult<()>
where
    R: PersonReader + PersonWriter + TagReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let person = load_visible_person(repo, user, person_id)?;
    let tag = repo
        .get_tag_by_id(TagId::new(tag_id)?, person.tenant_id)?
        .ok_or(ServiceError::NotFound)?;

    repo.tag_person(person.id, tag.id)?;
    Ok(())
}

pub fn untag_person<R>(
    repo: &R,
    user: &AuthenticatedUser,
    person_id: i32,
    tag_id: i32,
) -> ServiceResult<()>
where
    R: PersonReader + PersonWriter + TagReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let person = load_visible_person(repo, user, person_id)?;
    let tag = repo
        .get_tag_by_id(TagId::new(tag_id)?, person.tenant_id)?
        .ok_or(ServiceError::NotFound)?;

    repo.untag_person(person.id, tag.id)?;
    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::automation::AutomationSettings;
    use crate::domain::person::NewPerson;
    use crate::domain::scoring::{ScoreInput, ScoringWeights};
    use crate::domain::types::{PersonName, TenantId, UserId};
    use crate::domain::user::{Role, User};
    use crate::repository::mock::MockRepository;
    use crate::services::team::tests::user as team_member;
    use crate::services::test_support::{admin_user, member_user, outsider_user};

    pub(crate) fn person(id: i32, owner: Option<i32>) -> Person {
        let now = Utc::now().naive_utc();
        Person {
            id: PersonId::new(id).unwrap(),
            tenant_id: TenantId::new(10).unwrap(),
            account_id: None,
            owner_id: owner.map(|o| UserId::new(o).unwrap()),
            first_name: PersonName::new("Ada").unwrap(),
            last_name: PersonName::new("Lovelace").unwrap(),
            email: None,
            phone: None,
            title: None,
            linkedin_url: None,
            status: PersonStatus::Lead,
            score: 0,
            email_status: None,
            enriched_at: None,
            amplemarket_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn person_from(new: &NewPerson) -> Person {
        Person {
            owner_id: new.owner_id,
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            ..person(1, None)
        }
    }

    fn form() -> PersonForm {
        PersonForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            owner_id: Some("1".to_string()),
            ..PersonForm::default()
        }
    }

    fn expect_scoring(repo: &mut MockRepository, score: i32) {
        repo.expect_load_scoring_weights()
            .returning(|_| Ok(ScoringWeights::default()));
        repo.expect_load_score_input().returning(|_, _| {
            Ok(ScoreInput {
                has_email: true,
                ..ScoreInput::default()
            })
        });
        repo.expect_set_person_score()
            .withf(move |_, _, s| *s == score)
            .returning(|_, _, _| Ok(()));
    }

    #[test]
    fn outsiders_cannot_list_people() {
        let repo = MockRepository::new();
        let result = load_people_page(&repo, &outsider_user(), PeopleQuery::default());
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn members_list_only_their_contacts() {
        let mut repo = MockRepository::new();
        repo.expect_list_people()
            .withf(|query| {
                query.owner_id == Some(UserId::new(2).unwrap())
                    && query.search.as_deref() == Some("ada")
                    && query.pagination.as_ref().map(|p| p.page) == Some(2)
            })
            .times(1)
            .returning(|_| Ok((21, vec![person(1, Some(2))])));
        repo.expect_list_team_members().never();
        repo.expect_list_accounts().returning(|_| Ok((0, Vec::new())));
        repo.expect_list_tags().returning(|_| Ok(Vec::new()));

        let data = load_people_page(
            &repo,
            &member_user(),
            PeopleQuery {
                q: Some(" ada ".to_string()),
                page: Some(2),
                ..PeopleQuery::default()
            },
        )
        .unwrap();

        assert_eq!(data.people.items.len(), 1);
        assert_eq!(data.people.page, 2);
        assert_eq!(data.search_query.as_deref(), Some("ada"));
    }

    #[test]
    fn members_cannot_open_foreign_contacts() {
        let mut repo = MockRepository::new();
        repo.expect_get_person_by_id()
            .returning(|id, _| Ok(Some(person(id.get(), Some(99)))));

        let result = load_visible_person(&repo, &member_user(), 5);
        assert!(matches!(result, Err(ServiceError::NotFound)));

        assert!(load_visible_person(&repo, &admin_user(), 5).is_ok());
    }

    #[test]
    fn member_creates_contacts_for_themself() {
        let mut repo = MockRepository::new();
        repo.expect_create_person()
            .withf(|new| new.owner_id == Some(UserId::new(2).unwrap()))
            .times(1)
            .returning(|new| Ok(person_from(new)));
        repo.expect_load_automation_settings()
            .returning(|_| Ok(AutomationSettings::new([(
                crate::domain::automation::AutomationRule::NewLeadFollowUp,
                false,
            )])));
        expect_scoring(&mut repo, 10);

        let created = create_person(&repo, &member_user(), form()).unwrap();
        assert_eq!(created.score, 10);
        assert_eq!(created.owner_id, Some(UserId::new(2).unwrap()));
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_team_member()
            .returning(|id, _| Ok(Some(team_member(id.get(), Role::Admin))));
        repo.expect_create_person().returning(|_| {
            Err(crate::repository::errors::RepositoryError::ConstraintViolation(
                "UNIQUE".to_string(),
            ))
        });

        let result = create_person(&repo, &admin_user(), form());
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn owner_from_another_tenant_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_team_member().returning(|_, _| Ok(None));
        repo.expect_create_person().never();

        let result = create_person(&repo, &admin_user(), form());
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn unknown_account_is_rejected_before_update() {
        let mut repo = MockRepository::new();
        repo.expect_get_person_by_id()
            .returning(|id, _| Ok(Some(person(id.get(), Some(2)))));
        repo.expect_get_account_by_id().returning(|_, _| Ok(None));
        repo.expect_update_person().never();

        let result = update_person(
            &repo,
            &member_user(),
            4,
            PersonForm {
                account_id: Some("77".to_string()),
                ..form()
            },
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn assigning_to_unknown_member_fails() {
        let mut repo = MockRepository::new();
        repo.expect_get_team_member().returning(|_, _| Ok(None));
        repo.expect_assign_people().never();

        let result = assign_people(&repo, &admin_user(), b"person_ids=1&user_id=5");
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn assignment_updates_owner() {
        let mut repo = MockRepository::new();
        repo.expect_get_team_member().returning(|id, tenant_id| {
            let now = Utc::now().naive_utc();
            Ok(Some(User {
                id,
                tenant_id,
                email: crate::domain::types::EmailAddress::new("m@example.com").unwrap(),
                name: crate::domain::types::UserName::new("M").unwrap(),
                role: Role::Member,
                password_hash: String::new(),
                totp_secret: None,
                totp_enabled: false,
                created_at: now,
                updated_at: now,
            }))
        });
        repo.expect_assign_people()
            .withf(|_, ids, owner| ids.len() == 2 && owner.get() == 5)
            .times(1)
            .returning(|_, ids, _| Ok(ids.len()));

        let assigned =
            assign_people(&repo, &admin_user(), b"person_ids=1&person_ids=2&user_id=5").unwrap();
        assert_eq!(assigned, 2);

        let repo = MockRepository::new();
        assert!(matches!(
            assign_people(&repo, &member_user(), b"person_ids=1&user_id=5"),
            Err(ServiceError::Unauthorized)
        ));
    }
}
