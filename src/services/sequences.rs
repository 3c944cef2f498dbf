//! Email sequences, their steps and enrollments.

use std::collections::HashSet;

use chrono::{NaiveDateTime, Utc};
use serde_json::json;

use crate::domain::activity::{ActivityType, NewActivity};
use crate::domain::auth::{ACCESS_ROLE, AuthenticatedUser};
use crate::domain::person::Person;
use crate::domain::sequence::{
    EnrollmentProgress, EnrollmentStatus, NewEnrollment, Sequence, SequenceStatus, SequenceStep,
};
use crate::domain::types::{EnrollmentId, SequenceId, SequenceName, SequenceStepId, UserId};
use crate::dto::sequences::{SequenceDetailData, SequencesPageData};
use crate::forms::sequences::{EnrollForm, SequenceForm, StepForm, StepPayload};
use crate::repository::{
    ActivityWriter, PersonListQuery, PersonReader, SequenceReader, SequenceWriter,
};
use crate::services::people::load_visible_person;
use crate::services::{ServiceError, ServiceResult, ensure_role};

fn load_sequence<R>(repo: &R, user: &AuthenticatedUser, sequence_id: i32) -> ServiceResult<Sequence>
where
    R: SequenceReader + ?Sized,
{
    repo.get_sequence_by_id(SequenceId::new(sequence_id)?, user.tenant_id()?)?
        .ok_or(ServiceError::NotFound)
}

fn load_step<R>(repo: &R, sequence: &Sequence, step_id: i32) -> ServiceResult<SequenceStep>
where
    R: SequenceReader + ?Sized,
{
    let step_id = SequenceStepId::new(step_id)?;
    repo.list_steps(sequence.id)?
        .into_iter()
        .find(|step| step.id == step_id)
        .ok_or(ServiceError::NotFound)
}

pub fn load_sequences_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<SequencesPageData>
where
    R: SequenceReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    Ok(SequencesPageData {
        sequences: repo.list_sequences(user.tenant_id()?)?,
    })
}

pub fn load_sequence_detail<R>(
    repo: &R,
    user: &AuthenticatedUser,
    sequence_id: i32,
) -> ServiceResult<SequenceDetailData>
where
    R: SequenceReader + PersonReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let sequence = load_sequence(repo, user, sequence_id)?;
    let enrollments = repo.list_enrollments(sequence.id)?;
    let enrolled: HashSet<_> = enrollments.iter().map(|(e, _)| e.person_id).collect();

    let mut people_query = PersonListQuery::new(sequence.tenant_id);
    if let Some(owner) = user.visibility_owner()? {
        people_query = people_query.owner(owner);
    }
    let (_, people) = repo.list_people(people_query)?;
    let candidates = people
        .into_iter()
        .filter(|p| p.email.is_some() && !enrolled.contains(&p.id))
        .collect();

    Ok(SequenceDetailData {
        steps: repo.list_steps(sequence.id)?,
        sequence,
        enrollments,
        candidates,
    })
}

pub fn create_sequence<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SequenceForm,
) -> ServiceResult<Sequence>
where
    R: SequenceWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let new_sequence = form.into_domain(user.tenant_id()?)?;

    let sequence = repo.create_sequence(&new_sequence).map_err(|err| {
        log::error!("Failed to create sequence: {err}");
        err
    })?;

    Ok(sequence)
}

pub fn rename_sequence<R>(
    repo: &R,
    user: &AuthenticatedUser,
    sequence_id: i32,
    form: SequenceForm,
) -> ServiceResult<Sequence>
where
    R: SequenceReader + SequenceWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let sequence = load_sequence(repo, user, sequence_id)?;
    let name = SequenceName::try_from(form)?;

    Ok(repo.rename_sequence(sequence.id, sequence.tenant_id, &name)?)
}

pub fn delete_sequence<R>(repo: &R, user: &AuthenticatedUser, sequence_id: i32) -> ServiceResult<()>
where
    R: SequenceWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    repo.delete_sequence(SequenceId::new(sequence_id)?, user.tenant_id()?)
        .map_err(|err| {
            log::error!("Failed to delete sequence {sequence_id}: {err}");
            err
        })?;

    Ok(())
}

pub fn add_step<R>(
    repo: &R,
    user: &AuthenticatedUser,
    sequence_id: i32,
    form: StepForm,
) -> ServiceResult<SequenceStep>
where
    R: SequenceReader + SequenceWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let sequence = load_sequence(repo, user, sequence_id)?;
    let new_step = StepPayload::try_from(form)?.into_domain(sequence.id);

    Ok(repo.add_step(&new_step)?)
}

pub fn update_step<R>(
    repo: &R,
    user: &AuthenticatedUser,
    sequence_id: i32,
    step_id: i32,
    form: StepForm,
) -> ServiceResult<SequenceStep>
where
    R: SequenceReader + SequenceWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let sequence = load_sequence(repo, user, sequence_id)?;
    let step = load_step(repo, &sequence, step_id)?;
    let updates = StepPayload::try_from(form)?.into_domain(sequence.id);

    Ok(repo.update_step(step.id, &updates)?)
}

pub fn delete_step<R>(
    repo: &R,
    user: &AuthenticatedUser,
    sequence_id: i32,
    step_id: i32,
) -> ServiceResult<()>
where
    R: SequenceReader + SequenceWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let sequence = load_sequence(repo, user, sequence_id)?;
    let step = load_step(repo, &sequence, step_id)?;

    repo.delete_step(step.id, sequence.id)?;
    Ok(())
}

/// Starts sending; a sequence without steps cannot be activated.
pub fn activate_sequence<R>(
    repo: &R,
    user: &AuthenticatedUser,
    sequence_id: i32,
) -> ServiceResult<Sequence>
where
    R: SequenceReader + SequenceWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let sequence = load_sequence(repo, user, sequence_id)?;
    if repo.list_steps(sequence.id)?.is_empty() {
        return Err(ServiceError::Form(
            "Add at least one step before activating the sequence.".to_string(),
        ));
    }

    Ok(repo.set_sequence_status(sequence.id, sequence.tenant_id, SequenceStatus::Active)?)
}

pub fn pause_sequence<R>(
    repo: &R,
    user: &AuthenticatedUser,
    sequence_id: i32,
) -> ServiceResult<Sequence>
where
    R: SequenceReader + SequenceWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let sequence = load_sequence(repo, user, sequence_id)?;

    Ok(repo.set_sequence_status(sequence.id, sequence.tenant_id, SequenceStatus::Paused)?)
}

/// Enrolls `people` into `sequence`, skipping contacts without an email and
/// contacts that are already enrolled. Returns the number of new enrollments.
pub(crate) fn enroll_people_into<R>(
    repo: &R,
    sequence: &Sequence,
    people: &[Person],
    actor: Option<UserId>,
    now: NaiveDateTime,
) -> ServiceResult<usize>
where
    R: SequenceReader + SequenceWriter + ActivityWriter + ?Sized,
{
    let steps = repo.list_steps(sequence.id)?;
    if steps.is_empty() {
        return Err(ServiceError::Form(
            "The sequence has no steps yet.".to_string(),
        ));
    }

    let enrolled: HashSet<_> = repo.list_enrolled_person_ids(sequence.id)?.into_iter().collect();
    let targets: Vec<&Person> = people
        .iter()
        .filter(|p| p.email.is_some() && !enrolled.contains(&p.id))
        .collect();

    let skipped = people.len() - targets.len();
    if skipped > 0 {
        log::info!("Skipped {skipped} contact(s) without email or already in sequence {}", sequence.id);
    }
    if targets.is_empty() {
        return Ok(0);
    }

    let enrollments: Vec<NewEnrollment> = targets
        .iter()
        .map(|p| NewEnrollment::schedule(sequence.id, p.id, &steps, now))
        .collect();
    let created = repo.create_enrollments(&enrollments).map_err(|err| {
        log::error!("Failed to enroll contacts into sequence {}: {err}", sequence.id);
        err
    })?;

    for person in targets {
        let mut activity = NewActivity::new(
            sequence.tenant_id,
            person.id,
            ActivityType::Enrolled,
            json!({
                "sequence_id": sequence.id.get(),
                "sequence": sequence.name.as_str(),
            }),
        );
        if let Some(actor) = actor {
            activity = activity.by(actor);
        }
        repo.create_activity(&activity)?;
    }

    Ok(created)
}

/// Enrolls the contacts selected on the sequence page.
pub fn enroll_people<R>(
    repo: &R,
    user: &AuthenticatedUser,
    sequence_id: i32,
    body: &[u8],
) -> ServiceResult<usize>
where
    R: SequenceReader + SequenceWriter + PersonReader + ActivityWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let sequence = load_sequence(repo, user, sequence_id)?;
    let person_ids = EnrollForm::person_ids_from_body(body)?;

    let people = person_ids
        .into_iter()
        .map(|id| load_visible_person(repo, user, id.get()))
        .collect::<ServiceResult<Vec<_>>>()?;

    enroll_people_into(
        repo,
        &sequence,
        &people,
        Some(user.user_id()?),
        Utc::now().naive_utc(),
    )
}

/// Stops one active enrollment by hand.
pub fn stop_enrollment<R>(
    repo: &R,
    user: &AuthenticatedUser,
    sequence_id: i32,
    enrollment_id: i32,
) -> ServiceResult<()>
where
    R: SequenceReader + SequenceWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let sequence = load_sequence(repo, user, sequence_id)?;
    let enrollment = repo
        .get_enrollment_by_id(EnrollmentId::new(enrollment_id)?, sequence.tenant_id)?
        .filter(|e| e.sequence_id == sequence.id)
        .ok_or(ServiceError::NotFound)?;

    if enrollment.status != EnrollmentStatus::Active {
        return Err(ServiceError::Form("This enrollment is no longer active.".to_string()));
    }

    repo.update_enrollment_progress(
        enrollment.id,
        &EnrollmentProgress::finished(enrollment.current_step, EnrollmentStatus::Stopped),
    )?;

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::activity::Activity;
    use crate::domain::sequence::{DelayDays, Enrollment, StepCondition};
    use crate::domain::types::{
        ActivityId, EmailAddress, EmailSubject, PersonId, RichText, TenantId,
    };
    use crate::repository::mock::MockRepository;
    use crate::services::people::tests::person;
    use crate::services::test_support::{admin_user, member_user};

    pub(crate) fn sequence(status: SequenceStatus) -> Sequence {
        let now = Utc::now().naive_utc();
        Sequence {
            id: SequenceId::new(1).unwrap(),
            tenant_id: TenantId::new(10).unwrap(),
            name: SequenceName::new("Onboarding").unwrap(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn step(id: i32, delay: i32) -> SequenceStep {
        SequenceStep {
            id: SequenceStepId::new(id).unwrap(),
            sequence_id: SequenceId::new(1).unwrap(),
            position: id,
            delay: DelayDays::new(delay).unwrap(),
            subject: EmailSubject::new("Hi {{ first_name }}").unwrap(),
            body: RichText::new("<p>Hello {{ first_name }} at {{ account }}</p>").unwrap(),
            condition: StepCondition::Always,
        }
    }

    pub(crate) fn activity_from(new: &NewActivity) -> Activity {
        Activity {
            id: ActivityId::new(1).unwrap(),
            tenant_id: new.tenant_id,
            person_id: new.person_id,
            user_id: new.user_id,
            activity_type: new.activity_type,
            data: new.data.clone(),
            created_at: Utc::now().naive_utc(),
        }
    }

    fn with_email(id: i32, owner: Option<i32>) -> Person {
        Person {
            email: Some(EmailAddress::new(format!("p{id}@example.com")).unwrap()),
            ..person(id, owner)
        }
    }

    #[test]
    fn enrollment_skips_enrolled_and_emailless_people() {
        let now = Utc::now().naive_utc();
        let mut repo = MockRepository::new();
        repo.expect_list_steps()
            .returning(|_| Ok(vec![step(1, 2), step(2, 3)]));
        repo.expect_list_enrolled_person_ids()
            .returning(|_| Ok(vec![PersonId::new(2).unwrap()]));
        repo.expect_create_enrollments()
            .withf(move |new| {
                new.len() == 1
                    && new[0].person_id.get() == 1
                    && new[0].next_send_at == Some(now + chrono::Duration::days(2))
            })
            .times(1)
            .returning(|new| Ok(new.len()));
        repo.expect_create_activity()
            .withf(|a| a.activity_type == ActivityType::Enrolled)
            .times(1)
            .returning(|new| Ok(activity_from(new)));

        let people = vec![with_email(1, None), with_email(2, None), person(3, None)];
        let created =
            enroll_people_into(&repo, &sequence(SequenceStatus::Active), &people, None, now)
                .unwrap();
        assert_eq!(created, 1);
    }

    #[test]
    fn enrolling_into_empty_sequence_fails() {
        let mut repo = MockRepository::new();
        repo.expect_list_steps().returning(|_| Ok(Vec::new()));
        repo.expect_create_enrollments().never();

        let result = enroll_people_into(
            &repo,
            &sequence(SequenceStatus::Draft),
            &[with_email(1, None)],
            None,
            Utc::now().naive_utc(),
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn members_cannot_enroll_foreign_contacts() {
        let mut repo = MockRepository::new();
        repo.expect_get_sequence_by_id()
            .returning(|_, _| Ok(Some(sequence(SequenceStatus::Active))));
        repo.expect_get_person_by_id()
            .returning(|id, _| Ok(Some(with_email(id.get(), Some(99)))));
        repo.expect_create_enrollments().never();

        assert!(matches!(
            enroll_people(&repo, &member_user(), 1, b"person_ids=4"),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn activation_requires_steps() {
        let mut repo = MockRepository::new();
        repo.expect_get_sequence_by_id()
            .returning(|_, _| Ok(Some(sequence(SequenceStatus::Draft))));
        repo.expect_list_steps().returning(|_| Ok(Vec::new()));
        repo.expect_set_sequence_status().never();

        assert!(matches!(
            activate_sequence(&repo, &admin_user(), 1),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn stopping_marks_enrollment_stopped() {
        let now = Utc::now().naive_utc();
        let mut repo = MockRepository::new();
        repo.expect_get_sequence_by_id()
            .returning(|_, _| Ok(Some(sequence(SequenceStatus::Active))));
        repo.expect_get_enrollment_by_id().returning(move |id, _| {
            Ok(Some(Enrollment {
                id,
                sequence_id: SequenceId::new(1).unwrap(),
                person_id: PersonId::new(1).unwrap(),
                current_step: 1,
                status: EnrollmentStatus::Active,
                next_send_at: Some(now),
                enrolled_at: now,
                updated_at: now,
            }))
        });
        repo.expect_update_enrollment_progress()
            .withf(|_, progress| {
                progress.status == EnrollmentStatus::Stopped
                    && progress.current_step == 1
                    && progress.next_send_at.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        stop_enrollment(&repo, &admin_user(), 1, 6).unwrap();
    }

    #[test]
    fn step_of_other_sequence_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_sequence_by_id()
            .returning(|_, _| Ok(Some(sequence(SequenceStatus::Draft))));
        repo.expect_list_steps().returning(|_| Ok(vec![step(1, 0)]));
        repo.expect_delete_step().never();

        assert!(matches!(
            delete_step(&repo, &admin_user(), 1, 42),
            Err(ServiceError::NotFound)
        ));
    }
}
