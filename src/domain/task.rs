use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{DealId, PersonId, TaskId, TaskTitle, TenantId, UserId, text_enum};

text_enum! {
    TaskPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

text_enum! {
    /// Completion filter applied to task lists.
    TaskFilter {
        Open => "open",
        Completed => "completed",
        Overdue => "overdue",
        All => "all",
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub tenant_id: TenantId,
    pub title: TaskTitle,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub person_id: Option<PersonId>,
    pub deal_id: Option<DealId>,
    pub assignee_id: Option<UserId>,
    pub calendar_event_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        !self.is_completed() && self.due_at.is_some_and(|due| due < now)
    }
}

#[derive(Clone, Debug)]
pub struct NewTask {
    pub tenant_id: TenantId,
    pub title: TaskTitle,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_at: Option<NaiveDateTime>,
    pub person_id: Option<PersonId>,
    pub deal_id: Option<DealId>,
    pub assignee_id: Option<UserId>,
}

#[derive(Clone, Debug)]
pub struct UpdateTask {
    pub title: TaskTitle,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_at: Option<NaiveDateTime>,
    pub assignee_id: Option<UserId>,
}
