//! Email sequences, their steps and per-contact enrollments.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    EmailSubject, EnrollmentId, PersonId, RichText, SequenceId, SequenceName, SequenceStepId,
    TenantId, TypeConstraintError, text_enum,
};

text_enum! {
    SequenceStatus {
        Draft => "draft",
        Active => "active",
        Paused => "paused",
    }
}

text_enum! {
    /// Gate evaluated before a step is sent.
    StepCondition {
        Always => "always",
        NoReply => "no_reply",
    }
}

text_enum! {
    EnrollmentStatus {
        Active => "active",
        Completed => "completed",
        Replied => "replied",
        Stopped => "stopped",
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Sequence {
    pub id: SequenceId,
    pub tenant_id: TenantId,
    pub name: SequenceName,
    pub status: SequenceStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewSequence {
    pub tenant_id: TenantId,
    pub name: SequenceName,
}

/// Non-negative number of days to wait before a step is sent.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DelayDays(i32);

impl DelayDays {
    pub fn new(days: i32) -> Result<Self, TypeConstraintError> {
        if (0..=365).contains(&days) {
            Ok(Self(days))
        } else {
            Err(TypeConstraintError::OutOfRange(format!(
                "delay must be between 0 and 365 days, got {days}"
            )))
        }
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    pub fn duration(self) -> Duration {
        Duration::days(i64::from(self.0))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SequenceStep {
    pub id: SequenceStepId,
    pub sequence_id: SequenceId,
    pub position: i32,
    pub delay: DelayDays,
    pub subject: EmailSubject,
    pub body: RichText,
    pub condition: StepCondition,
}

#[derive(Clone, Debug)]
pub struct NewSequenceStep {
    pub sequence_id: SequenceId,
    pub delay: DelayDays,
    pub subject: EmailSubject,
    pub body: RichText,
    pub condition: StepCondition,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub sequence_id: SequenceId,
    pub person_id: PersonId,
    /// Index into the position-ordered steps of the next step to send.
    pub current_step: i32,
    pub status: EnrollmentStatus,
    pub next_send_at: Option<NaiveDateTime>,
    pub enrolled_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Enrollment {
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.status == EnrollmentStatus::Active && self.next_send_at.is_some_and(|at| at <= now)
    }
}

#[derive(Clone, Debug)]
pub struct NewEnrollment {
    pub sequence_id: SequenceId,
    pub person_id: PersonId,
    pub next_send_at: Option<NaiveDateTime>,
}

impl NewEnrollment {
    /// Schedules the first step relative to `now`.
    pub fn schedule(
        sequence_id: SequenceId,
        person_id: PersonId,
        steps: &[SequenceStep],
        now: NaiveDateTime,
    ) -> Self {
        Self {
            sequence_id,
            person_id,
            next_send_at: steps.first().map(|step| now + step.delay.duration()),
        }
    }
}

/// New progress values written back to an enrollment.
#[derive(Clone, Debug, PartialEq)]
pub struct EnrollmentProgress {
    pub current_step: i32,
    pub status: EnrollmentStatus,
    pub next_send_at: Option<NaiveDateTime>,
}

impl EnrollmentProgress {
    pub fn finished(current_step: i32, status: EnrollmentStatus) -> Self {
        Self {
            current_step,
            status,
            next_send_at: None,
        }
    }
}

/// What the runner should do with a due enrollment.
#[derive(Clone, Debug, PartialEq)]
pub enum StepPlan {
    /// Send `step`, then store `after`.
    Send {
        step: SequenceStep,
        after: EnrollmentProgress,
    },
    /// Nothing to send; store the final state.
    Finish(EnrollmentProgress),
}

/// Decides the next action for an enrollment given the ordered steps of its sequence.
pub fn plan_step(
    enrollment: &Enrollment,
    steps: &[SequenceStep],
    has_replied: bool,
    now: NaiveDateTime,
) -> StepPlan {
    let index = usize::try_from(enrollment.current_step).unwrap_or(usize::MAX);
    let Some(step) = steps.get(index) else {
        return StepPlan::Finish(EnrollmentProgress::finished(
            enrollment.current_step,
            EnrollmentStatus::Completed,
        ));
    };

    if step.condition == StepCondition::NoReply && has_replied {
        return StepPlan::Finish(EnrollmentProgress::finished(
            enrollment.current_step,
            EnrollmentStatus::Replied,
        ));
    }

    let next_index = enrollment.current_step + 1;
    let after = match steps.get(index + 1) {
        Some(next) => EnrollmentProgress {
            current_step: next_index,
            status: EnrollmentStatus::Active,
            next_send_at: Some(now + next.delay.duration()),
        },
        None => EnrollmentProgress::finished(next_index, EnrollmentStatus::Completed),
    };

    StepPlan::Send {
        step: step.clone(),
        after,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn step(position: i32, delay: i32, condition: StepCondition) -> SequenceStep {
        SequenceStep {
            id: SequenceStepId::new(position).unwrap(),
            sequence_id: SequenceId::new(1).unwrap(),
            position,
            delay: DelayDays::new(delay).unwrap(),
            subject: EmailSubject::new(format!("Step {position}")).unwrap(),
            body: RichText::new("Hello {{ first_name }}").unwrap(),
            condition,
        }
    }

    fn enrollment(current_step: i32) -> Enrollment {
        let now = Utc::now().naive_utc();
        Enrollment {
            id: EnrollmentId::new(1).unwrap(),
            sequence_id: SequenceId::new(1).unwrap(),
            person_id: PersonId::new(1).unwrap(),
            current_step,
            status: EnrollmentStatus::Active,
            next_send_at: Some(now),
            enrolled_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn schedule_uses_first_step_delay() {
        let now = Utc::now().naive_utc();
        let steps = vec![step(1, 2, StepCondition::Always)];
        let new = NewEnrollment::schedule(
            SequenceId::new(1).unwrap(),
            PersonId::new(1).unwrap(),
            &steps,
            now,
        );
        assert_eq!(new.next_send_at, Some(now + Duration::days(2)));
    }

    #[test]
    fn sends_step_and_schedules_next() {
        let now = Utc::now().naive_utc();
        let steps = vec![
            step(1, 0, StepCondition::Always),
            step(2, 3, StepCondition::NoReply),
        ];

        match plan_step(&enrollment(0), &steps, false, now) {
            StepPlan::Send { step, after } => {
                assert_eq!(step.position, 1);
                assert_eq!(after.current_step, 1);
                assert_eq!(after.status, EnrollmentStatus::Active);
                assert_eq!(after.next_send_at, Some(now + Duration::days(3)));
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn last_step_completes_enrollment() {
        let now = Utc::now().naive_utc();
        let steps = vec![step(1, 0, StepCondition::Always)];

        match plan_step(&enrollment(0), &steps, false, now) {
            StepPlan::Send { after, .. } => {
                assert_eq!(after.status, EnrollmentStatus::Completed);
                assert_eq!(after.next_send_at, None);
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn no_reply_step_is_skipped_after_reply() {
        let now = Utc::now().naive_utc();
        let steps = vec![
            step(1, 0, StepCondition::Always),
            step(2, 3, StepCondition::NoReply),
        ];

        assert_eq!(
            plan_step(&enrollment(1), &steps, true, now),
            StepPlan::Finish(EnrollmentProgress::finished(1, EnrollmentStatus::Replied))
        );
    }

    #[test]
    fn past_the_end_completes() {
        let now = Utc::now().naive_utc();
        assert_eq!(
            plan_step(&enrollment(5), &[], false, now),
            StepPlan::Finish(EnrollmentProgress::finished(5, EnrollmentStatus::Completed))
        );
    }

    #[test]
    fn delay_is_bounded() {
        assert!(DelayDays::new(-1).is_err());
        assert!(DelayDays::new(400).is_err());
        assert_eq!(DelayDays::new(7).unwrap().get(), 7);
    }
}
