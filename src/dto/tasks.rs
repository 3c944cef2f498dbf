use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::domain::task::{Task, TaskFilter};
use crate::domain::user::User;
use crate::pagination::Paginated;

#[derive(Debug, Default, Deserialize)]
pub struct TasksQuery {
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub assignee: Option<i32>,
    #[serde(default)]
    pub page: Option<usize>,
}

pub struct TasksPageData {
    pub tasks: Paginated<Task>,
    pub filter: TaskFilter,
    pub assignee_id: Option<i32>,
    pub team: Vec<User>,
    /// Reference time used to flag overdue rows.
    pub now: NaiveDateTime,
}
