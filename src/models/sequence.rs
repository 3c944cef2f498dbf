//! Diesel models for sequences, their steps and enrollments.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::sequence::{
    DelayDays, Enrollment as DomainEnrollment, EnrollmentStatus,
    NewEnrollment as DomainNewEnrollment, NewSequence as DomainNewSequence,
    Sequence as DomainSequence, SequenceStatus, SequenceStep as DomainSequenceStep, StepCondition,
};
use crate::domain::types::{
    EmailSubject, EnrollmentId, PersonId, RichText, SequenceId, SequenceName, SequenceStepId,
    TenantId, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::sequences)]
pub struct Sequence {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sequences)]
pub struct NewSequence<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(table_name = crate::schema::sequence_steps)]
#[diesel(belongs_to(Sequence, foreign_key = sequence_id))]
pub struct SequenceStep {
    pub id: i32,
    pub sequence_id: i32,
    pub position: i32,
    pub delay_days: i32,
    pub subject: String,
    pub body: String,
    pub condition: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sequence_steps)]
pub struct NewSequenceStep<'a> {
    pub sequence_id: i32,
    pub position: i32,
    pub delay_days: i32,
    pub subject: &'a str,
    pub body: &'a str,
    pub condition: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::sequence_enrollments)]
pub struct Enrollment {
    pub id: i32,
    pub sequence_id: i32,
    pub person_id: i32,
    pub current_step: i32,
    pub status: String,
    pub next_send_at: Option<NaiveDateTime>,
    pub enrolled_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sequence_enrollments)]
pub struct NewEnrollment {
    pub sequence_id: i32,
    pub person_id: i32,
    pub next_send_at: Option<NaiveDateTime>,
}

impl TryFrom<Sequence> for DomainSequence {
    type Error = TypeConstraintError;

    fn try_from(sequence: Sequence) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SequenceId::new(sequence.id)?,
            tenant_id: TenantId::new(sequence.tenant_id)?,
            name: SequenceName::new(sequence.name)?,
            status: SequenceStatus::try_from(sequence.status)?,
            created_at: sequence.created_at,
            updated_at: sequence.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewSequence> for NewSequence<'a> {
    fn from(sequence: &'a DomainNewSequence) -> Self {
        Self {
            tenant_id: sequence.tenant_id.get(),
            name: sequence.name.as_str(),
        }
    }
}

impl TryFrom<SequenceStep> for DomainSequenceStep {
    type Error = TypeConstraintError;

    fn try_from(step: SequenceStep) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SequenceStepId::new(step.id)?,
            sequence_id: SequenceId::new(step.sequence_id)?,
            position: step.position,
            delay: DelayDays::new(step.delay_days)?,
            subject: EmailSubject::new(step.subject)?,
            body: RichText::new(step.body)?,
            condition: StepCondition::try_from(step.condition)?,
        })
    }
}

impl TryFrom<Enrollment> for DomainEnrollment {
    type Error = TypeConstraintError;

    fn try_from(enrollment: Enrollment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EnrollmentId::new(enrollment.id)?,
            sequence_id: SequenceId::new(enrollment.sequence_id)?,
            person_id: PersonId::new(enrollment.person_id)?,
            current_step: enrollment.current_step,
            status: EnrollmentStatus::try_from(enrollment.status)?,
            next_send_at: enrollment.next_send_at,
            enrolled_at: enrollment.enrolled_at,
            updated_at: enrollment.updated_at,
        })
    }
}

impl From<&DomainNewEnrollment> for NewEnrollment {
    fn from(enrollment: &DomainNewEnrollment) -> Self {
        Self {
            sequence_id: enrollment.sequence_id.get(),
            person_id: enrollment.person_id.get(),
            next_send_at: enrollment.next_send_at,
        }
    }
}
