//! Task list and task lifecycle workflows.

use chrono::Utc;
use serde_json::json;

use crate::domain::activity::{ActivityType, NewActivity};
use crate::domain::auth::{ACCESS_ROLE, AuthenticatedUser};
use crate::domain::task::{Task, TaskFilter};
use crate::domain::types::{TaskId, UserId};
use crate::dto::tasks::{TasksPageData, TasksQuery};
use crate::forms::tasks::{TaskForm, TaskPayload};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ActivityWriter, DealReader, PersonReader, TaskListQuery, TaskReader, TaskWriter, UserReader,
};
use crate::services::references::{ensure_deal, ensure_person, ensure_team_member};
use crate::services::{ServiceError, ServiceResult, ensure_role};

fn load_task<R>(repo: &R, user: &AuthenticatedUser, task_id: i32) -> ServiceResult<Task>
where
    R: TaskReader + ?Sized,
{
    repo.get_task_by_id(TaskId::new(task_id)?, user.tenant_id()?)?
        .ok_or(ServiceError::NotFound)
}

fn ensure_references<R>(repo: &R, user: &AuthenticatedUser, payload: &TaskPayload) -> ServiceResult<()>
where
    R: PersonReader + DealReader + UserReader + ?Sized,
{
    ensure_person(repo, user, payload.person_id)?;
    ensure_deal(repo, user, payload.deal_id)?;
    ensure_team_member(repo, user, payload.assignee_id)
}

pub fn load_tasks_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: TasksQuery,
) -> ServiceResult<TasksPageData>
where
    R: TaskReader + UserReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let now = Utc::now().naive_utc();
    let page = query.page.unwrap_or(1).max(1);
    let filter = match query.filter.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw.parse::<TaskFilter>()?,
        _ => TaskFilter::Open,
    };

    let mut list_query = TaskListQuery::new(tenant_id, now)
        .filter(filter)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(assignee) = query.assignee {
        list_query = list_query.assignee(UserId::new(assignee)?);
    }

    let (total, tasks) = repo.list_tasks(list_query).map_err(|err| {
        log::error!("Failed to list tasks: {err}");
        err
    })?;

    Ok(TasksPageData {
        tasks: Paginated::from_total(tasks, page, total),
        filter,
        assignee_id: query.assignee,
        team: repo.list_team_members(tenant_id)?,
        now,
    })
}

/// Creates a task assigned to the caller unless the form names an assignee.
pub fn create_task<R>(repo: &R, user: &AuthenticatedUser, form: TaskForm) -> ServiceResult<Task>
where
    R: TaskWriter + PersonReader + DealReader + UserReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let payload = TaskPayload::try_from(form)?;
    ensure_references(repo, user, &payload)?;
    let new_task = payload.into_new_task(user.tenant_id()?, Some(user.user_id()?));

    let task = repo.create_task(&new_task).map_err(|err| {
        log::error!("Failed to create task: {err}");
        err
    })?;

    Ok(task)
}

pub fn update_task<R>(
    repo: &R,
    user: &AuthenticatedUser,
    task_id: i32,
    form: TaskForm,
) -> ServiceResult<Task>
where
    R: TaskReader + TaskWriter + PersonReader + DealReader + UserReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let task = load_task(repo, user, task_id)?;
    let payload = TaskPayload::try_from(form)?;
    ensure_references(repo, user, &payload)?;
    let updates = payload.into_update();

    Ok(repo.update_task(task.id, task.tenant_id, &updates)?)
}

/// Marks a task done and records it on the linked contact's timeline.
pub fn complete_task<R>(repo: &R, user: &AuthenticatedUser, task_id: i32) -> ServiceResult<Task>
where
    R: TaskReader + TaskWriter + ActivityWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let task = load_task(repo, user, task_id)?;
    if task.is_completed() {
        return Ok(task);
    }

    let completed =
        repo.set_task_completed(task.id, task.tenant_id, Some(Utc::now().naive_utc()))?;

    if let Some(person_id) = completed.person_id {
        let activity = NewActivity::new(
            completed.tenant_id,
            person_id,
            ActivityType::TaskCompleted,
            json!({
                "task_id": completed.id.get(),
                "title": completed.title.as_str(),
            }),
        )
        .by(user.user_id()?);
        repo.create_activity(&activity)?;
    }

    Ok(completed)
}

pub fn reopen_task<R>(repo: &R, user: &AuthenticatedUser, task_id: i32) -> ServiceResult<Task>
where
    R: TaskReader + TaskWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let task = load_task(repo, user, task_id)?;

    Ok(repo.set_task_completed(task.id, task.tenant_id, None)?)
}

pub fn delete_task<R>(repo: &R, user: &AuthenticatedUser, task_id: i32) -> ServiceResult<()>
where
    R: TaskWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    repo.delete_task(TaskId::new(task_id)?, user.tenant_id()?)
        .map_err(|err| {
            log::error!("Failed to delete task {task_id}: {err}");
            err
        })?;

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod tests {
    use chrono::{NaiveDateTime, Utc};

    use super::*;
    use crate::domain::task::{NewTask, TaskPriority};
    use crate::domain::types::{PersonId, TaskTitle, TenantId};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::member_user;

    pub(crate) fn task(completed_at: Option<NaiveDateTime>, person: Option<i32>) -> Task {
        Task {
            id: TaskId::new(5).unwrap(),
            tenant_id: TenantId::new(10).unwrap(),
            title: TaskTitle::new("Call Ada").unwrap(),
            description: None,
            priority: TaskPriority::Medium,
            due_at: None,
            completed_at,
            person_id: person.map(|p| PersonId::new(p).unwrap()),
            deal_id: None,
            assignee_id: None,
            calendar_event_id: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub(crate) fn task_from(new: &NewTask) -> Task {
        Task {
            title: new.title.clone(),
            priority: new.priority,
            due_at: new.due_at,
            person_id: new.person_id,
            deal_id: new.deal_id,
            assignee_id: new.assignee_id,
            ..task(None, None)
        }
    }

    #[test]
    fn list_defaults_to_open_tasks() {
        let mut repo = MockRepository::new();
        repo.expect_list_tasks()
            .withf(|query| query.filter == TaskFilter::Open && query.assignee_id.is_none())
            .times(1)
            .returning(|_| Ok((0, Vec::new())));
        repo.expect_list_team_members().returning(|_| Ok(Vec::new()));

        let data = load_tasks_page(&repo, &member_user(), TasksQuery::default()).unwrap();
        assert_eq!(data.filter, TaskFilter::Open);
    }

    #[test]
    fn new_task_is_assigned_to_creator() {
        let mut repo = MockRepository::new();
        repo.expect_create_task()
            .withf(|new| new.assignee_id.map(|id| id.get()) == Some(2))
            .times(1)
            .returning(|new| Ok(task_from(new)));

        let form = TaskForm {
            title: "Send proposal".to_string(),
            ..TaskForm::default()
        };
        let created = create_task(&repo, &member_user(), form).unwrap();
        assert_eq!(created.title.as_str(), "Send proposal");
    }

    #[test]
    fn assignee_from_another_tenant_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_team_member().returning(|_, _| Ok(None));
        repo.expect_create_task().never();

        let form = TaskForm {
            title: "Send proposal".to_string(),
            assignee_id: Some("41".to_string()),
            ..TaskForm::default()
        };
        assert!(matches!(
            create_task(&repo, &member_user(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn unknown_deal_is_rejected_on_update() {
        let mut repo = MockRepository::new();
        repo.expect_get_task_by_id()
            .returning(|_, _| Ok(Some(task(None, None))));
        repo.expect_get_deal_by_id().returning(|_, _| Ok(None));
        repo.expect_update_task().never();

        let form = TaskForm {
            title: "Call Ada".to_string(),
            deal_id: Some("12".to_string()),
            ..TaskForm::default()
        };
        assert!(matches!(
            update_task(&repo, &member_user(), 5, form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn completing_task_records_activity() {
        let mut repo = MockRepository::new();
        repo.expect_get_task_by_id()
            .returning(|_, _| Ok(Some(task(None, Some(7)))));
        repo.expect_set_task_completed()
            .withf(|_, _, at| at.is_some())
            .times(1)
            .returning(|_, _, at| Ok(task(at, Some(7))));
        repo.expect_create_activity()
            .withf(|activity| {
                activity.activity_type == ActivityType::TaskCompleted
                    && activity.person_id.get() == 7
            })
            .times(1)
            .returning(|new| {
                Ok(crate::domain::activity::Activity {
                    id: crate::domain::types::ActivityId::new(1).unwrap(),
                    tenant_id: new.tenant_id,
                    person_id: new.person_id,
                    user_id: new.user_id,
                    activity_type: new.activity_type,
                    data: new.data.clone(),
                    created_at: Utc::now().naive_utc(),
                })
            });

        let completed = complete_task(&repo, &member_user(), 5).unwrap();
        assert!(completed.is_completed());
    }

    #[test]
    fn completing_done_task_changes_nothing() {
        let mut repo = MockRepository::new();
        repo.expect_get_task_by_id()
            .returning(|_, _| Ok(Some(task(Some(Utc::now().naive_utc()), Some(7)))));
        repo.expect_set_task_completed().never();
        repo.expect_create_activity().never();

        assert!(complete_task(&repo, &member_user(), 5).unwrap().is_completed());
    }

    #[test]
    fn reopen_clears_completion() {
        let mut repo = MockRepository::new();
        repo.expect_get_task_by_id()
            .returning(|_, _| Ok(Some(task(Some(Utc::now().naive_utc()), None))));
        repo.expect_set_task_completed()
            .withf(|_, _, at| at.is_none())
            .times(1)
            .returning(|_, _, _| Ok(task(None, None)));

        assert!(!reopen_task(&repo, &member_user(), 5).unwrap().is_completed());
    }
}
