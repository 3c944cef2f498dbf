//! Repository implementation for notes.

use diesel::prelude::*;

use crate::domain::note::{NewNote, Note, NoteTarget};
use crate::domain::types::{NoteId, TenantId};
use crate::models::note::{NewNote as DbNewNote, Note as DbNote};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, NoteReader, NoteWriter};
use crate::schema::notes;

impl NoteReader for DieselRepository {
    fn get_note_by_id(&self, id: NoteId, tenant_id: TenantId) -> RepositoryResult<Option<Note>> {
        let mut conn = self.conn()?;
        let db_note = notes::table
            .filter(notes::id.eq(id.get()))
            .filter(notes::tenant_id.eq(tenant_id.get()))
            .first::<DbNote>(&mut conn)
            .optional()?;

        db_note
            .map(Note::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_notes(&self, tenant_id: TenantId, target: NoteTarget) -> RepositoryResult<Vec<Note>> {
        let mut conn = self.conn()?;
        let mut query = notes::table
            .filter(notes::tenant_id.eq(tenant_id.get()))
            .into_boxed();

        query = match target {
            NoteTarget::Person(id) => query.filter(notes::person_id.eq(id.get())),
            NoteTarget::Account(id) => query.filter(notes::account_id.eq(id.get())),
            NoteTarget::Deal(id) => query.filter(notes::deal_id.eq(id.get())),
        };

        query
            .order((notes::created_at.desc(), notes::id.desc()))
            .load::<DbNote>(&mut conn)?
            .into_iter()
            .map(|n| Note::try_from(n).map_err(RepositoryError::from))
            .collect()
    }
}

impl NoteWriter for DieselRepository {
    fn create_note(&self, new_note: &NewNote) -> RepositoryResult<Note> {
        let mut conn = self.conn()?;
        let db_note = diesel::insert_into(notes::table)
            .values(&DbNewNote::from(new_note))
            .get_result::<DbNote>(&mut conn)?;

        Ok(Note::try_from(db_note)?)
    }

    fn delete_note(&self, id: NoteId, tenant_id: TenantId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(
            notes::table
                .filter(notes::id.eq(id.get()))
                .filter(notes::tenant_id.eq(tenant_id.get())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
