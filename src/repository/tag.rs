//! Repository implementation for tags.

use diesel::prelude::*;

use crate::domain::tag::{NewTag, Tag};
use crate::domain::types::{PersonId, TagId, TenantId};
use crate::models::tag::{NewTag as DbNewTag, Tag as DbTag};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, TagReader, TagWriter};
use crate::schema::tags;

fn into_domain(rows: Vec<DbTag>) -> RepositoryResult<Vec<Tag>> {
    rows.into_iter()
        .map(|t| Tag::try_from(t).map_err(RepositoryError::from))
        .collect()
}

impl TagReader for DieselRepository {
    fn get_tag_by_id(&self, id: TagId, tenant_id: TenantId) -> RepositoryResult<Option<Tag>> {
        let mut conn = self.conn()?;
        let db_tag = tags::table
            .filter(tags::id.eq(id.get()))
            .filter(tags::tenant_id.eq(tenant_id.get()))
            .first::<DbTag>(&mut conn)
            .optional()?;

        db_tag
            .map(Tag::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_tags(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Tag>> {
        let mut conn = self.conn()?;
        let rows = tags::table
            .filter(tags::tenant_id.eq(tenant_id.get()))
            .order(tags::name.asc())
            .load::<DbTag>(&mut conn)?;

        into_domain(rows)
    }

    fn list_person_tags(&self, person_id: PersonId) -> RepositoryResult<Vec<Tag>> {
        use crate::schema::person_tags;

        let mut conn = self.conn()?;
        let rows = tags::table
            .inner_join(person_tags::table)
            .filter(person_tags::person_id.eq(person_id.get()))
            .order(tags::name.asc())
            .select(tags::all_columns)
            .load::<DbTag>(&mut conn)?;

        into_domain(rows)
    }
}

impl TagWriter for DieselRepository {
    fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag> {
        let mut conn = self.conn()?;
        let db_tag = diesel::insert_into(tags::table)
            .values(&DbNewTag::from(new_tag))
            .get_result::<DbTag>(&mut conn)?;

        Ok(Tag::try_from(db_tag)?)
    }

    fn update_tag(&self, id: TagId, tenant_id: TenantId, updates: &NewTag) -> RepositoryResult<Tag> {
        let mut conn = self.conn()?;
        let db_tag = diesel::update(
            tags::table
                .filter(tags::id.eq(id.get()))
                .filter(tags::tenant_id.eq(tenant_id.get())),
        )
        .set((
            tags::name.eq(updates.name.as_str()),
            tags::color.eq(updates.color.as_str()),
        ))
        .get_result::<DbTag>(&mut conn)?;

        Ok(Tag::try_from(db_tag)?)
    }

    fn delete_tag(&self, id: TagId, tenant_id: TenantId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(
            tags::table
                .filter(tags::id.eq(id.get()))
                .filter(tags::tenant_id.eq(tenant_id.get())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
