//! Repository implementation for contacts.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::activity::ActivityType;
use crate::domain::deal::DealStage;
use crate::domain::person::{NewPerson, Person, PersonEnrichment, PersonStatus, UpdatePerson};
use crate::domain::scoring::ScoreInput;
use crate::domain::types::{EmailAddress, PersonId, TagId, TenantId, UserId};
use crate::models::person::{
    NewPerson as DbNewPerson, Person as DbPerson, PersonTag as DbPersonTag,
    UpdatePerson as DbUpdatePerson,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, PersonListQuery, PersonReader, PersonWriter};
use crate::schema::people;

fn filtered(query: &PersonListQuery) -> people::BoxedQuery<'static, Sqlite> {
    use crate::schema::person_tags;

    let mut items = people::table
        .filter(people::tenant_id.eq(query.tenant_id.get()))
        .into_boxed();

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        items = items.filter(
            people::first_name
                .like(pattern.clone())
                .or(people::last_name.like(pattern.clone()))
                .or(people::email.like(pattern.clone()))
                .or(people::phone.like(pattern.clone()))
                .or(people::title.like(pattern)),
        );
    }

    if let Some(status) = query.status {
        items = items.filter(people::status.eq(status.as_str()));
    }

    if let Some(account_id) = query.account_id {
        items = items.filter(people::account_id.eq(account_id.get()));
    }

    if let Some(owner_id) = query.owner_id {
        items = items.filter(people::owner_id.eq(owner_id.get()));
    }

    if let Some(tag_id) = query.tag_id {
        items = items.filter(
            people::id.eq_any(
                person_tags::table
                    .filter(person_tags::tag_id.eq(tag_id.get()))
                    .select(person_tags::person_id),
            ),
        );
    }

    items
}

fn into_domain(rows: Vec<DbPerson>) -> RepositoryResult<Vec<Person>> {
    rows.into_iter()
        .map(|p| Person::try_from(p).map_err(RepositoryError::from))
        .collect()
}

impl PersonReader for DieselRepository {
    fn get_person_by_id(
        &self,
        id: PersonId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Person>> {
        let mut conn = self.conn()?;
        let db_person = people::table
            .filter(people::id.eq(id.get()))
            .filter(people::tenant_id.eq(tenant_id.get()))
            .first::<DbPerson>(&mut conn)
            .optional()?;

        db_person
            .map(Person::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_person_by_email(
        &self,
        email: &EmailAddress,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Person>> {
        let mut conn = self.conn()?;
        let db_person = people::table
            .filter(people::email.eq(email.as_str()))
            .filter(people::tenant_id.eq(tenant_id.get()))
            .first::<DbPerson>(&mut conn)
            .optional()?;

        db_person
            .map(Person::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_people(&self, query: PersonListQuery) -> RepositoryResult<(usize, Vec<Person>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = filtered(&query).order((people::created_at.desc(), people::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let people = into_domain(items.load::<DbPerson>(&mut conn)?)?;

        Ok((total as usize, people))
    }

    fn list_people_to_enrich(
        &self,
        tenant_id: TenantId,
        limit: i64,
    ) -> RepositoryResult<Vec<Person>> {
        let mut conn = self.conn()?;
        let rows = people::table
            .filter(people::tenant_id.eq(tenant_id.get()))
            .filter(
                people::email
                    .is_not_null()
                    .and(people::email_status.is_null())
                    .or(people::email
                        .is_null()
                        .and(people::account_id.is_not_null())
                        .and(people::enriched_at.is_null())),
            )
            .order(people::id.asc())
            .limit(limit)
            .load::<DbPerson>(&mut conn)?;

        into_domain(rows)
    }

    fn load_score_input(&self, id: PersonId, tenant_id: TenantId) -> RepositoryResult<ScoreInput> {
        use crate::schema::{accounts, activities, deals};

        let mut conn = self.conn()?;
        let db_person = people::table
            .filter(people::id.eq(id.get()))
            .filter(people::tenant_id.eq(tenant_id.get()))
            .first::<DbPerson>(&mut conn)?;
        let person = Person::try_from(db_person)?;

        let employees = match person.account_id {
            Some(account_id) => accounts::table
                .find(account_id.get())
                .select(accounts::employees)
                .first::<Option<i32>>(&mut conn)
                .optional()?
                .flatten(),
            None => None,
        };

        let open_stages: Vec<&str> = DealStage::OPEN.iter().map(|s| s.as_str()).collect();
        let has_open_deal = diesel::select(diesel::dsl::exists(
            deals::table
                .filter(deals::tenant_id.eq(tenant_id.get()))
                .filter(deals::person_id.eq(id.get()))
                .filter(deals::stage.eq_any(open_stages)),
        ))
        .get_result::<bool>(&mut conn)?;

        let replied = diesel::select(diesel::dsl::exists(
            activities::table
                .filter(activities::person_id.eq(id.get()))
                .filter(activities::activity_type.eq(ActivityType::EmailReplied.as_str())),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(ScoreInput {
            has_email: person.email.is_some(),
            email_status: person.email_status,
            has_phone: person.phone.is_some(),
            title: person.title,
            employees,
            has_open_deal,
            replied,
        })
    }
}

impl PersonWriter for DieselRepository {
    fn create_person(&self, new_person: &NewPerson) -> RepositoryResult<Person> {
        let mut conn = self.conn()?;
        let db_person = diesel::insert_into(people::table)
            .values(&DbNewPerson::from(new_person))
            .get_result::<DbPerson>(&mut conn)?;

        Ok(Person::try_from(db_person)?)
    }

    fn create_people(&self, new_people: &[NewPerson]) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let rows: Vec<DbNewPerson> = new_people.iter().map(DbNewPerson::from).collect();

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            let mut inserted = 0;
            for row in &rows {
                inserted += diesel::insert_into(people::table)
                    .values(row)
                    .on_conflict_do_nothing()
                    .execute(conn)?;
            }
            Ok(inserted)
        })
    }

    fn update_person(
        &self,
        id: PersonId,
        tenant_id: TenantId,
        updates: &UpdatePerson,
    ) -> RepositoryResult<Person> {
        let mut conn = self.conn()?;
        let changes = DbUpdatePerson::new(updates, Utc::now().naive_utc());

        let db_person = diesel::update(
            people::table
                .filter(people::id.eq(id.get()))
                .filter(people::tenant_id.eq(tenant_id.get())),
        )
        .set(&changes)
        .get_result::<DbPerson>(&mut conn)?;

        Ok(Person::try_from(db_person)?)
    }

    fn delete_person(&self, id: PersonId, tenant_id: TenantId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(
            people::table
                .filter(people::id.eq(id.get()))
                .filter(people::tenant_id.eq(tenant_id.get())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn assign_people(
        &self,
        tenant_id: TenantId,
        person_ids: &[PersonId],
        owner_id: UserId,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let ids: Vec<i32> = person_ids.iter().map(|id| id.get()).collect();

        let affected = diesel::update(
            people::table
                .filter(people::tenant_id.eq(tenant_id.get()))
                .filter(people::id.eq_any(ids)),
        )
        .set((
            people::owner_id.eq(Some(owner_id.get())),
            people::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }

    fn set_person_status(
        &self,
        id: PersonId,
        tenant_id: TenantId,
        status: PersonStatus,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        diesel::update(
            people::table
                .filter(people::id.eq(id.get()))
                .filter(people::tenant_id.eq(tenant_id.get())),
        )
        .set((
            people::status.eq(status.as_str()),
            people::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        Ok(())
    }

    fn set_person_score(
        &self,
        id: PersonId,
        tenant_id: TenantId,
        score: i32,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        diesel::update(
            people::table
                .filter(people::id.eq(id.get()))
                .filter(people::tenant_id.eq(tenant_id.get())),
        )
        .set(people::score.eq(score))
        .execute(&mut conn)?;

        Ok(())
    }

    fn set_amplemarket_id(
        &self,
        id: PersonId,
        tenant_id: TenantId,
        amplemarket_id: &str,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        diesel::update(
            people::table
                .filter(people::id.eq(id.get()))
                .filter(people::tenant_id.eq(tenant_id.get())),
        )
        .set(people::amplemarket_id.eq(Some(amplemarket_id)))
        .execute(&mut conn)?;

        Ok(())
    }

    fn apply_enrichment(
        &self,
        id: PersonId,
        tenant_id: TenantId,
        enrichment: &PersonEnrichment,
    ) -> RepositoryResult<Person> {
        let mut conn = self.conn()?;

        let db_person = conn.transaction::<DbPerson, RepositoryError, _>(|conn| {
            if let Some(email) = &enrichment.email {
                diesel::update(
                    people::table
                        .filter(people::id.eq(id.get()))
                        .filter(people::tenant_id.eq(tenant_id.get())),
                )
                .set(people::email.eq(Some(email.as_str())))
                .execute(conn)?;
            }

            let updated = diesel::update(
                people::table
                    .filter(people::id.eq(id.get()))
                    .filter(people::tenant_id.eq(tenant_id.get())),
            )
            .set((
                people::email_status.eq(enrichment.email_status.map(|s| s.as_str())),
                people::enriched_at.eq(Some(enrichment.enriched_at)),
                people::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbPerson>(conn)?;

            Ok(updated)
        })?;

        Ok(Person::try_from(db_person)?)
    }

    fn tag_person(&self, id: PersonId, tag_id: TagId) -> RepositoryResult<()> {
        use crate::schema::person_tags;

        let mut conn = self.conn()?;
        diesel::insert_into(person_tags::table)
            .values(&DbPersonTag {
                person_id: id.get(),
                tag_id: tag_id.get(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)?;

        Ok(())
    }

    fn untag_person(&self, id: PersonId, tag_id: TagId) -> RepositoryResult<()> {
        use crate::schema::person_tags;

        let mut conn = self.conn()?;
        diesel::delete(
            person_tags::table
                .filter(person_tags::person_id.eq(id.get()))
                .filter(person_tags::tag_id.eq(tag_id.get())),
        )
        .execute(&mut conn)?;

        Ok(())
    }
}
