use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{ActivityId, PersonId, TenantId, UserId, text_enum};

text_enum! {
    /// System-generated event on a contact's timeline.
    ActivityType {
        EmailSent => "email_sent",
        EmailReplied => "email_replied",
        Enriched => "enriched",
        SyncImport => "sync_import",
        StageChanged => "stage_changed",
        TaskCompleted => "task_completed",
        Enrolled => "enrolled",
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: ActivityId,
    pub tenant_id: TenantId,
    pub person_id: PersonId,
    pub user_id: Option<UserId>,
    pub activity_type: ActivityType,
    pub data: Value,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewActivity {
    pub tenant_id: TenantId,
    pub person_id: PersonId,
    pub user_id: Option<UserId>,
    pub activity_type: ActivityType,
    pub data: Value,
}

impl NewActivity {
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        person_id: PersonId,
        activity_type: ActivityType,
        data: Value,
    ) -> Self {
        Self {
            tenant_id,
            person_id,
            user_id: None,
            activity_type,
            data,
        }
    }

    #[must_use]
    pub fn by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}
