use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{AccountId, DealId, NoteId, PersonId, RichText, TenantId, UserId};

/// Record a note is attached to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NoteTarget {
    Person(PersonId),
    Account(AccountId),
    Deal(DealId),
}

impl NoteTarget {
    /// Path of the page showing the target record.
    pub fn url(&self) -> String {
        match self {
            NoteTarget::Person(id) => format!("/people/{id}"),
            NoteTarget::Account(id) => format!("/accounts/{id}"),
            NoteTarget::Deal(id) => format!("/deals/{id}"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub tenant_id: TenantId,
    pub author_id: UserId,
    pub body: RichText,
    pub target: NoteTarget,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewNote {
    pub tenant_id: TenantId,
    pub author_id: UserId,
    pub body: RichText,
    pub target: NoteTarget,
}
