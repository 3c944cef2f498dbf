use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::note::{NewNote as DomainNewNote, Note as DomainNote, NoteTarget};
use crate::domain::types::{
    AccountId, DealId, NoteId, PersonId, RichText, TenantId, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::notes)]
pub struct Note {
    pub id: i32,
    pub tenant_id: i32,
    pub author_id: i32,
    pub body: String,
    pub person_id: Option<i32>,
    pub account_id: Option<i32>,
    pub deal_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::notes)]
pub struct NewNote<'a> {
    pub tenant_id: i32,
    pub author_id: i32,
    pub body: &'a str,
    pub person_id: Option<i32>,
    pub account_id: Option<i32>,
    pub deal_id: Option<i32>,
}

/// Exactly one of the three target columns is set.
fn note_target(note: &Note) -> Result<NoteTarget, TypeConstraintError> {
    match (note.person_id, note.account_id, note.deal_id) {
        (Some(id), None, None) => Ok(NoteTarget::Person(PersonId::new(id)?)),
        (None, Some(id), None) => Ok(NoteTarget::Account(AccountId::new(id)?)),
        (None, None, Some(id)) => Ok(NoteTarget::Deal(DealId::new(id)?)),
        _ => Err(TypeConstraintError::InvalidValue(format!(
            "note {} must reference exactly one record",
            note.id
        ))),
    }
}

impl TryFrom<Note> for DomainNote {
    type Error = TypeConstraintError;

    fn try_from(note: Note) -> Result<Self, Self::Error> {
        let target = note_target(&note)?;
        Ok(Self {
            id: NoteId::new(note.id)?,
            tenant_id: TenantId::new(note.tenant_id)?,
            author_id: UserId::new(note.author_id)?,
            body: RichText::new(note.body)?,
            target,
            created_at: note.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewNote> for NewNote<'a> {
    fn from(note: &'a DomainNewNote) -> Self {
        let (person_id, account_id, deal_id) = match note.target {
            NoteTarget::Person(id) => (Some(id.get()), None, None),
            NoteTarget::Account(id) => (None, Some(id.get()), None),
            NoteTarget::Deal(id) => (None, None, Some(id.get())),
        };
        Self {
            tenant_id: note.tenant_id.get(),
            author_id: note.author_id.get(),
            body: note.body.as_str(),
            person_id,
            account_id,
            deal_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn note_with_two_targets_is_rejected() {
        let note = Note {
            id: 1,
            tenant_id: 1,
            author_id: 1,
            body: "hi".into(),
            person_id: Some(1),
            account_id: Some(2),
            deal_id: None,
            created_at: Utc::now().naive_utc(),
        };
        assert!(DomainNote::try_from(note).is_err());
    }

    #[test]
    fn deal_target_maps_to_deal_column() {
        let domain = DomainNewNote {
            tenant_id: TenantId::new(1).unwrap(),
            author_id: UserId::new(1).unwrap(),
            body: RichText::new("Call went well").unwrap(),
            target: NoteTarget::Deal(DealId::new(9).unwrap()),
        };
        let insertable = NewNote::from(&domain);
        assert_eq!(insertable.deal_id, Some(9));
        assert_eq!(insertable.person_id, None);
    }
}
