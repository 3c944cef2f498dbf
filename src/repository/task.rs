//! Repository implementation for tasks.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::task::{NewTask, Task, TaskFilter, UpdateTask};
use crate::domain::types::{TaskId, TenantId};
use crate::models::task::{NewTask as DbNewTask, Task as DbTask, UpdateTask as DbUpdateTask};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, TaskListQuery, TaskReader, TaskWriter};
use crate::schema::tasks;

fn filtered(query: &TaskListQuery) -> tasks::BoxedQuery<'static, Sqlite> {
    let mut items = tasks::table
        .filter(tasks::tenant_id.eq(query.tenant_id.get()))
        .into_boxed();

    items = match query.filter {
        TaskFilter::Open => items.filter(tasks::completed_at.is_null()),
        TaskFilter::Completed => items.filter(tasks::completed_at.is_not_null()),
        TaskFilter::Overdue => items
            .filter(tasks::completed_at.is_null())
            .filter(tasks::due_at.lt(query.now)),
        TaskFilter::All => items,
    };

    if let Some(assignee_id) = query.assignee_id {
        items = items.filter(tasks::assignee_id.eq(assignee_id.get()));
    }

    if let Some(person_id) = query.person_id {
        items = items.filter(tasks::person_id.eq(person_id.get()));
    }

    if let Some(deal_id) = query.deal_id {
        items = items.filter(tasks::deal_id.eq(deal_id.get()));
    }

    items
}

fn into_domain(rows: Vec<DbTask>) -> RepositoryResult<Vec<Task>> {
    rows.into_iter()
        .map(|t| Task::try_from(t).map_err(RepositoryError::from))
        .collect()
}

impl TaskReader for DieselRepository {
    fn get_task_by_id(&self, id: TaskId, tenant_id: TenantId) -> RepositoryResult<Option<Task>> {
        let mut conn = self.conn()?;
        let db_task = tasks::table
            .filter(tasks::id.eq(id.get()))
            .filter(tasks::tenant_id.eq(tenant_id.get()))
            .first::<DbTask>(&mut conn)
            .optional()?;

        db_task
            .map(Task::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_tasks(&self, query: TaskListQuery) -> RepositoryResult<(usize, Vec<Task>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        // Tasks without a due date sort last.
        let mut items = filtered(&query).order((
            tasks::due_at.is_null().asc(),
            tasks::due_at.asc(),
            tasks::id.asc(),
        ));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let tasks = into_domain(items.load::<DbTask>(&mut conn)?)?;

        Ok((total as usize, tasks))
    }

    fn list_tasks_to_schedule(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Task>> {
        let mut conn = self.conn()?;
        let rows = tasks::table
            .filter(tasks::tenant_id.eq(tenant_id.get()))
            .filter(tasks::completed_at.is_null())
            .filter(tasks::due_at.is_not_null())
            .filter(tasks::calendar_event_id.is_null())
            .order(tasks::due_at.asc())
            .load::<DbTask>(&mut conn)?;

        into_domain(rows)
    }
}

impl TaskWriter for DieselRepository {
    fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task> {
        let mut conn = self.conn()?;
        let db_task = diesel::insert_into(tasks::table)
            .values(&DbNewTask::from(new_task))
            .get_result::<DbTask>(&mut conn)?;

        Ok(Task::try_from(db_task)?)
    }

    fn update_task(
        &self,
        id: TaskId,
        tenant_id: TenantId,
        updates: &UpdateTask,
    ) -> RepositoryResult<Task> {
        let mut conn = self.conn()?;
        let db_task = diesel::update(
            tasks::table
                .filter(tasks::id.eq(id.get()))
                .filter(tasks::tenant_id.eq(tenant_id.get())),
        )
        .set(&DbUpdateTask::from(updates))
        .get_result::<DbTask>(&mut conn)?;

        Ok(Task::try_from(db_task)?)
    }

    fn set_task_completed(
        &self,
        id: TaskId,
        tenant_id: TenantId,
        completed_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<Task> {
        let mut conn = self.conn()?;
        let db_task = diesel::update(
            tasks::table
                .filter(tasks::id.eq(id.get()))
                .filter(tasks::tenant_id.eq(tenant_id.get())),
        )
        .set(tasks::completed_at.eq(completed_at))
        .get_result::<DbTask>(&mut conn)?;

        Ok(Task::try_from(db_task)?)
    }

    fn set_calendar_event_id(
        &self,
        id: TaskId,
        tenant_id: TenantId,
        event_id: &str,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        diesel::update(
            tasks::table
                .filter(tasks::id.eq(id.get()))
                .filter(tasks::tenant_id.eq(tenant_id.get())),
        )
        .set(tasks::calendar_event_id.eq(Some(event_id)))
        .execute(&mut conn)?;

        Ok(())
    }

    fn delete_task(&self, id: TaskId, tenant_id: TenantId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(
            tasks::table
                .filter(tasks::id.eq(id.get()))
                .filter(tasks::tenant_id.eq(tenant_id.get())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
