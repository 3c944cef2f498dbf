//! Repository implementation for the contact activity timeline.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::activity::{Activity, ActivityType, NewActivity};
use crate::domain::types::PersonId;
use crate::models::activity::{Activity as DbActivity, NewActivity as DbNewActivity};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ActivityListQuery, ActivityReader, ActivityWriter, DieselRepository};
use crate::schema::{activities, people};

fn filtered(query: &ActivityListQuery) -> activities::BoxedQuery<'static, Sqlite> {
    let mut items = activities::table
        .filter(activities::tenant_id.eq(query.tenant_id.get()))
        .into_boxed();

    if let Some(person_id) = query.person_id {
        items = items.filter(activities::person_id.eq(person_id.get()));
    }

    if let Some(owner_id) = query.owner_id {
        items = items.filter(
            activities::person_id.eq_any(
                people::table
                    .filter(people::owner_id.eq(owner_id.get()))
                    .select(people::id),
            ),
        );
    }

    if let Some(activity_type) = query.activity_type {
        items = items.filter(activities::activity_type.eq(activity_type.as_str()));
    }

    items
}

impl ActivityReader for DieselRepository {
    fn list_activities(
        &self,
        query: ActivityListQuery,
    ) -> RepositoryResult<(usize, Vec<Activity>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items =
            filtered(&query).order((activities::created_at.desc(), activities::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let activities = items
            .load::<DbActivity>(&mut conn)?
            .into_iter()
            .map(|a| Activity::try_from(a).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, activities))
    }

    fn person_has_activity(
        &self,
        person_id: PersonId,
        activity_type: ActivityType,
    ) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;
        let exists = diesel::select(diesel::dsl::exists(
            activities::table
                .filter(activities::person_id.eq(person_id.get()))
                .filter(activities::activity_type.eq(activity_type.as_str())),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(exists)
    }
}

impl ActivityWriter for DieselRepository {
    fn create_activity(&self, new_activity: &NewActivity) -> RepositoryResult<Activity> {
        let mut conn = self.conn()?;
        let db_activity = diesel::insert_into(activities::table)
            .values(&DbNewActivity::from(new_activity))
            .get_result::<DbActivity>(&mut conn)?;

        Ok(Activity::try_from(db_activity)?)
    }
}
