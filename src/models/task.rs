use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::task::{
    NewTask as DomainNewTask, Task as DomainTask, TaskPriority, UpdateTask as DomainUpdateTask,
};
use crate::domain::types::{DealId, PersonId, TaskId, TaskTitle, TenantId, TypeConstraintError, UserId};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::tasks)]
pub struct Task {
    pub id: i32,
    pub tenant_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub due_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub person_id: Option<i32>,
    pub deal_id: Option<i32>,
    pub assignee_id: Option<i32>,
    pub calendar_event_id: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tasks)]
pub struct NewTask<'a> {
    pub tenant_id: i32,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub priority: &'a str,
    pub due_at: Option<NaiveDateTime>,
    pub person_id: Option<i32>,
    pub deal_id: Option<i32>,
    pub assignee_id: Option<i32>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::tasks)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateTask<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub priority: &'a str,
    pub due_at: Option<NaiveDateTime>,
    pub assignee_id: Option<i32>,
}

impl TryFrom<Task> for DomainTask {
    type Error = TypeConstraintError;

    fn try_from(task: Task) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TaskId::new(task.id)?,
            tenant_id: TenantId::new(task.tenant_id)?,
            title: TaskTitle::new(task.title)?,
            description: task.description,
            priority: TaskPriority::try_from(task.priority)?,
            due_at: task.due_at,
            completed_at: task.completed_at,
            person_id: task.person_id.map(PersonId::new).transpose()?,
            deal_id: task.deal_id.map(DealId::new).transpose()?,
            assignee_id: task.assignee_id.map(UserId::new).transpose()?,
            calendar_event_id: task.calendar_event_id,
            created_at: task.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewTask> for NewTask<'a> {
    fn from(task: &'a DomainNewTask) -> Self {
        Self {
            tenant_id: task.tenant_id.get(),
            title: task.title.as_str(),
            description: task.description.as_deref(),
            priority: task.priority.as_str(),
            due_at: task.due_at,
            person_id: task.person_id.map(PersonId::get),
            deal_id: task.deal_id.map(DealId::get),
            assignee_id: task.assignee_id.map(UserId::get),
        }
    }
}

impl<'a> From<&'a DomainUpdateTask> for UpdateTask<'a> {
    fn from(task: &'a DomainUpdateTask) -> Self {
        Self {
            title: task.title.as_str(),
            description: task.description.as_deref(),
            priority: task.priority.as_str(),
            due_at: task.due_at,
            assignee_id: task.assignee_id.map(UserId::get),
        }
    }
}
