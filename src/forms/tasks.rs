use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

use crate::domain::task::{NewTask, TaskPriority, UpdateTask};
use crate::domain::types::{DealId, PersonId, TaskTitle, TenantId, UserId};
use crate::forms::{FormError, non_blank, optional_id, parse_datetime};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    /// `datetime-local` value, interpreted as UTC.
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub deal_id: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
}

#[derive(Debug)]
pub struct TaskPayload {
    pub title: TaskTitle,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_at: Option<NaiveDateTime>,
    pub person_id: Option<PersonId>,
    pub deal_id: Option<DealId>,
    pub assignee_id: Option<UserId>,
}

impl TryFrom<TaskForm> for TaskPayload {
    type Error = FormError;

    fn try_from(form: TaskForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let priority = match non_blank(form.priority) {
            Some(raw) => raw.parse::<TaskPriority>()?,
            None => TaskPriority::Medium,
        };
        Ok(Self {
            title: TaskTitle::new(form.title).map_err(|_| FormError::InvalidName)?,
            description: non_blank(form.description),
            priority,
            due_at: non_blank(form.due_at)
                .map(|raw| parse_datetime(&raw))
                .transpose()?,
            person_id: optional_id(form.person_id, PersonId::new)?,
            deal_id: optional_id(form.deal_id, DealId::new)?,
            assignee_id: optional_id(form.assignee_id, UserId::new)?,
        })
    }
}

impl TaskPayload {
    pub fn into_new_task(self, tenant_id: TenantId, default_assignee: Option<UserId>) -> NewTask {
        NewTask {
            tenant_id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_at: self.due_at,
            person_id: self.person_id,
            deal_id: self.deal_id,
            assignee_id: self.assignee_id.or(default_assignee),
        }
    }

    pub fn into_update(self) -> UpdateTask {
        UpdateTask {
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_at: self.due_at,
            assignee_id: self.assignee_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_defaults_to_medium_priority() {
        let payload = TaskPayload::try_from(TaskForm {
            title: "Call back".to_string(),
            due_at: Some("2025-06-02T09:00".to_string()),
            ..TaskForm::default()
        })
        .unwrap();
        assert_eq!(payload.priority, TaskPriority::Medium);
        assert!(payload.due_at.is_some());

        let assignee = UserId::new(4).unwrap();
        let task = payload.into_new_task(TenantId::new(1).unwrap(), Some(assignee));
        assert_eq!(task.assignee_id, Some(assignee));
    }

    #[test]
    fn unknown_priority_is_rejected() {
        let result = TaskPayload::try_from(TaskForm {
            title: "Call back".to_string(),
            priority: Some("urgent".to_string()),
            ..TaskForm::default()
        });
        assert!(result.is_err());
    }
}
