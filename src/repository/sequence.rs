//! Repository implementation for sequences, steps and enrollments.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::domain::account::Account;
use crate::domain::person::Person;
use crate::domain::sequence::{
    Enrollment, EnrollmentProgress, EnrollmentStatus, NewEnrollment, NewSequence,
    NewSequenceStep, Sequence, SequenceStatus, SequenceStep,
};
use crate::domain::types::{
    EnrollmentId, PersonId, SequenceId, SequenceName, SequenceStepId, TenantId,
};
use crate::models::account::Account as DbAccount;
use crate::models::person::Person as DbPerson;
use crate::models::sequence::{
    Enrollment as DbEnrollment, NewEnrollment as DbNewEnrollment,
    NewSequence as DbNewSequence, NewSequenceStep as DbNewSequenceStep,
    Sequence as DbSequence, SequenceStep as DbSequenceStep,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, DueEnrollment, SequenceReader, SequenceWriter};
use crate::schema::{sequence_enrollments, sequence_steps, sequences};

impl SequenceReader for DieselRepository {
    fn get_sequence_by_id(
        &self,
        id: SequenceId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Sequence>> {
        let mut conn = self.conn()?;
        let db_sequence = sequences::table
            .filter(sequences::id.eq(id.get()))
            .filter(sequences::tenant_id.eq(tenant_id.get()))
            .first::<DbSequence>(&mut conn)
            .optional()?;

        db_sequence
            .map(Sequence::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_sequences(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Sequence>> {
        let mut conn = self.conn()?;
        sequences::table
            .filter(sequences::tenant_id.eq(tenant_id.get()))
            .order(sequences::name.asc())
            .load::<DbSequence>(&mut conn)?
            .into_iter()
            .map(|s| Sequence::try_from(s).map_err(RepositoryError::from))
            .collect()
    }

    fn list_steps(&self, sequence_id: SequenceId) -> RepositoryResult<Vec<SequenceStep>> {
        let mut conn = self.conn()?;
        sequence_steps::table
            .filter(sequence_steps::sequence_id.eq(sequence_id.get()))
            .order(sequence_steps::position.asc())
            .load::<DbSequenceStep>(&mut conn)?
            .into_iter()
            .map(|s| SequenceStep::try_from(s).map_err(RepositoryError::from))
            .collect()
    }

    fn get_enrollment_by_id(
        &self,
        id: EnrollmentId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Enrollment>> {
        let mut conn = self.conn()?;
        let db_enrollment = sequence_enrollments::table
            .inner_join(sequences::table)
            .filter(sequence_enrollments::id.eq(id.get()))
            .filter(sequences::tenant_id.eq(tenant_id.get()))
            .select(sequence_enrollments::all_columns)
            .first::<DbEnrollment>(&mut conn)
            .optional()?;

        db_enrollment
            .map(Enrollment::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_enrollments(
        &self,
        sequence_id: SequenceId,
    ) -> RepositoryResult<Vec<(Enrollment, Person)>> {
        use crate::schema::people;

        let mut conn = self.conn()?;
        let rows = sequence_enrollments::table
            .inner_join(people::table)
            .filter(sequence_enrollments::sequence_id.eq(sequence_id.get()))
            .order(sequence_enrollments::enrolled_at.desc())
            .select((sequence_enrollments::all_columns, people::all_columns))
            .load::<(DbEnrollment, DbPerson)>(&mut conn)?;

        rows.into_iter()
            .map(|(enrollment, person)| -> RepositoryResult<_> {
                Ok((Enrollment::try_from(enrollment)?, Person::try_from(person)?))
            })
            .collect()
    }

    fn list_person_enrollments(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<(Enrollment, Sequence)>> {
        let mut conn = self.conn()?;
        let rows = sequence_enrollments::table
            .inner_join(sequences::table)
            .filter(sequence_enrollments::person_id.eq(person_id.get()))
            .order(sequence_enrollments::enrolled_at.desc())
            .select((sequence_enrollments::all_columns, sequences::all_columns))
            .load::<(DbEnrollment, DbSequence)>(&mut conn)?;

        rows.into_iter()
            .map(|(enrollment, sequence)| -> RepositoryResult<_> {
                Ok((
                    Enrollment::try_from(enrollment)?,
                    Sequence::try_from(sequence)?,
                ))
            })
            .collect()
    }

    fn list_enrolled_person_ids(
        &self,
        sequence_id: SequenceId,
    ) -> RepositoryResult<Vec<PersonId>> {
        let mut conn = self.conn()?;
        sequence_enrollments::table
            .filter(sequence_enrollments::sequence_id.eq(sequence_id.get()))
            .select(sequence_enrollments::person_id)
            .load::<i32>(&mut conn)?
            .into_iter()
            .map(|id| PersonId::new(id).map_err(RepositoryError::from))
            .collect()
    }

    fn list_due_enrollments(&self, now: NaiveDateTime) -> RepositoryResult<Vec<DueEnrollment>> {
        use crate::schema::{accounts, people};

        let mut conn = self.conn()?;
        let rows = sequence_enrollments::table
            .inner_join(sequences::table)
            .inner_join(people::table)
            .filter(sequence_enrollments::status.eq(EnrollmentStatus::Active.as_str()))
            .filter(sequence_enrollments::next_send_at.le(now))
            .filter(sequences::status.eq(SequenceStatus::Active.as_str()))
            .order(sequence_enrollments::next_send_at.asc())
            .select((
                sequence_enrollments::all_columns,
                sequences::all_columns,
                people::all_columns,
            ))
            .load::<(DbEnrollment, DbSequence, DbPerson)>(&mut conn)?;

        let mut due = Vec::with_capacity(rows.len());
        for (enrollment, sequence, person) in rows {
            let account = match person.account_id {
                Some(account_id) => accounts::table
                    .find(account_id)
                    .first::<DbAccount>(&mut conn)
                    .optional()?
                    .map(Account::try_from)
                    .transpose()?,
                None => None,
            };
            due.push(DueEnrollment {
                enrollment: Enrollment::try_from(enrollment)?,
                sequence: Sequence::try_from(sequence)?,
                person: Person::try_from(person)?,
                account,
            });
        }

        Ok(due)
    }
}

impl SequenceWriter for DieselRepository {
    fn create_sequence(&self, new_sequence: &NewSequence) -> RepositoryResult<Sequence> {
        let mut conn = self.conn()?;
        let db_sequence = diesel::insert_into(sequences::table)
            .values(&DbNewSequence::from(new_sequence))
            .get_result::<DbSequence>(&mut conn)?;

        Ok(Sequence::try_from(db_sequence)?)
    }

    fn rename_sequence(
        &self,
        id: SequenceId,
        tenant_id: TenantId,
        name: &SequenceName,
    ) -> RepositoryResult<Sequence> {
        let mut conn = self.conn()?;
        let db_sequence = diesel::update(
            sequences::table
                .filter(sequences::id.eq(id.get()))
                .filter(sequences::tenant_id.eq(tenant_id.get())),
        )
        .set((
            sequences::name.eq(name.as_str()),
            sequences::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbSequence>(&mut conn)?;

        Ok(Sequence::try_from(db_sequence)?)
    }

    fn set_sequence_status(
        &self,
        id: SequenceId,
        tenant_id: TenantId,
        status: SequenceStatus,
    ) -> RepositoryResult<Sequence> {
        let mut conn = self.conn()?;
        let db_sequence = diesel::update(
            sequences::table
                .filter(sequences::id.eq(id.get()))
                .filter(sequences::tenant_id.eq(tenant_id.get())),
        )
        .set((
            sequences::status.eq(status.as_str()),
            sequences::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbSequence>(&mut conn)?;

        Ok(Sequence::try_from(db_sequence)?)
    }

    fn delete_sequence(&self, id: SequenceId, tenant_id: TenantId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(
            sequences::table
                .filter(sequences::id.eq(id.get()))
                .filter(sequences::tenant_id.eq(tenant_id.get())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn add_step(&self, new_step: &NewSequenceStep) -> RepositoryResult<SequenceStep> {
        let mut conn = self.conn()?;

        let db_step = conn.transaction::<DbSequenceStep, RepositoryError, _>(|conn| {
            let last: Option<i32> = sequence_steps::table
                .filter(sequence_steps::sequence_id.eq(new_step.sequence_id.get()))
                .select(diesel::dsl::max(sequence_steps::position))
                .first(conn)?;

            let step = diesel::insert_into(sequence_steps::table)
                .values(&DbNewSequenceStep {
                    sequence_id: new_step.sequence_id.get(),
                    position: last.unwrap_or(0) + 1,
                    delay_days: new_step.delay.get(),
                    subject: new_step.subject.as_str(),
                    body: new_step.body.as_str(),
                    condition: new_step.condition.as_str(),
                })
                .get_result::<DbSequenceStep>(conn)?;

            Ok(step)
        })?;

        Ok(SequenceStep::try_from(db_step)?)
    }

    fn update_step(
        &self,
        id: SequenceStepId,
        updates: &NewSequenceStep,
    ) -> RepositoryResult<SequenceStep> {
        let mut conn = self.conn()?;
        let db_step = diesel::update(
            sequence_steps::table
                .filter(sequence_steps::id.eq(id.get()))
                .filter(sequence_steps::sequence_id.eq(updates.sequence_id.get())),
        )
        .set((
            sequence_steps::delay_days.eq(updates.delay.get()),
            sequence_steps::subject.eq(updates.subject.as_str()),
            sequence_steps::body.eq(updates.body.as_str()),
            sequence_steps::condition.eq(updates.condition.as_str()),
        ))
        .get_result::<DbSequenceStep>(&mut conn)?;

        Ok(SequenceStep::try_from(db_step)?)
    }

    fn delete_step(&self, id: SequenceStepId, sequence_id: SequenceId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(
            sequence_steps::table
                .filter(sequence_steps::id.eq(id.get()))
                .filter(sequence_steps::sequence_id.eq(sequence_id.get())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn create_enrollments(&self, enrollments: &[NewEnrollment]) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let rows: Vec<DbNewEnrollment> = enrollments.iter().map(DbNewEnrollment::from).collect();

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            let mut inserted = 0;
            for row in &rows {
                inserted += diesel::insert_into(sequence_enrollments::table)
                    .values(row)
                    .on_conflict_do_nothing()
                    .execute(conn)?;
            }
            Ok(inserted)
        })
    }

    fn update_enrollment_progress(
        &self,
        id: EnrollmentId,
        progress: &EnrollmentProgress,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::update(sequence_enrollments::table.find(id.get()))
            .set((
                sequence_enrollments::current_step.eq(progress.current_step),
                sequence_enrollments::status.eq(progress.status.as_str()),
                sequence_enrollments::next_send_at.eq(progress.next_send_at),
                sequence_enrollments::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn finish_person_enrollments(
        &self,
        person_id: PersonId,
        status: EnrollmentStatus,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let affected = diesel::update(
            sequence_enrollments::table
                .filter(sequence_enrollments::person_id.eq(person_id.get()))
                .filter(sequence_enrollments::status.eq(EnrollmentStatus::Active.as_str())),
        )
        .set((
            sequence_enrollments::status.eq(status.as_str()),
            sequence_enrollments::next_send_at.eq(None::<NaiveDateTime>),
            sequence_enrollments::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }
}
