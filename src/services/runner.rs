//! Sends due sequence steps.
//!
//! Invoked by the `run_sequences` binary on a schedule. Each due enrollment is
//! handled on its own: a failure is logged and counted, and the enrollment is
//! left untouched so the next run retries it.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::json;
use tera::{Context, Tera};

use crate::domain::account::Account;
use crate::domain::activity::{ActivityType, NewActivity};
use crate::domain::person::Person;
use crate::domain::sequence::{
    EnrollmentProgress, EnrollmentStatus, SequenceStep, StepPlan, plan_step,
};
use crate::domain::types::SequenceId;
use crate::integrations::{Mailer, OutgoingEmail};
use crate::repository::{
    ActivityReader, ActivityWriter, DueEnrollment, SequenceReader, SequenceWriter,
};
use crate::services::{ServiceError, ServiceResult};

/// Counters reported after a run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub sent: usize,
    pub finished: usize,
    pub failed: usize,
}

enum Handled {
    Sent,
    Finished,
}

/// Subject and bodies of one rendered step.
#[derive(Debug, PartialEq)]
pub struct RenderedStep {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

fn step_context(person: &Person, account: Option<&Account>) -> Context {
    let mut context = Context::new();
    context.insert("first_name", person.first_name.as_str());
    context.insert("last_name", person.last_name.as_str());
    context.insert("email", person.email.as_ref().map(|e| e.as_str()).unwrap_or_default());
    context.insert("title", person.title.as_deref().unwrap_or_default());
    context.insert("account", account.map(|a| a.name.as_str()).unwrap_or_default());
    context
}

/// Fills the contact's merge fields into the step templates.
pub fn render_step(
    step: &SequenceStep,
    person: &Person,
    account: Option<&Account>,
) -> Result<RenderedStep, tera::Error> {
    let context = step_context(person, account);
    let subject = Tera::one_off(step.subject.as_str(), &context, false)?;
    let html_body = Tera::one_off(step.body.as_str(), &context, true)?;
    let text_body = ammonia::Builder::empty().clean(&html_body).to_string();

    Ok(RenderedStep {
        subject: subject.trim().to_string(),
        html_body,
        text_body,
    })
}

async fn handle_due<R>(
    repo: &R,
    mailer: &dyn Mailer,
    due: &DueEnrollment,
    steps: &[SequenceStep],
    now: NaiveDateTime,
) -> ServiceResult<Handled>
where
    R: SequenceWriter + ActivityReader + ActivityWriter + ?Sized,
{
    let DueEnrollment {
        enrollment,
        sequence,
        person,
        account,
    } = due;

    let has_replied = repo.person_has_activity(person.id, ActivityType::EmailReplied)?;

    let (step, after) = match plan_step(enrollment, steps, has_replied, now) {
        StepPlan::Finish(progress) => {
            repo.update_enrollment_progress(enrollment.id, &progress)?;
            return Ok(Handled::Finished);
        }
        StepPlan::Send { step, after } => (step, after),
    };

    let Some(email) = person.email.as_ref() else {
        log::warn!("Stopping enrollment {}: person {} has no email", enrollment.id, person.id);
        repo.update_enrollment_progress(
            enrollment.id,
            &EnrollmentProgress::finished(enrollment.current_step, EnrollmentStatus::Stopped),
        )?;
        return Ok(Handled::Finished);
    };

    let rendered = render_step(&step, person, account.as_ref())
        .map_err(|err| ServiceError::Internal(format!("template error: {err}")))?;

    mailer
        .send(&OutgoingEmail {
            to_email: email.as_str().to_string(),
            to_name: person.full_name(),
            subject: rendered.subject.clone(),
            text_body: rendered.text_body,
            html_body: rendered.html_body,
        })
        .await?;

    repo.create_activity(&NewActivity::new(
        sequence.tenant_id,
        person.id,
        ActivityType::EmailSent,
        json!({
            "sequence_id": sequence.id.get(),
            "sequence": sequence.name.as_str(),
            "step": step.position,
            "subject": rendered.subject,
        }),
    ))?;
    repo.update_enrollment_progress(enrollment.id, &after)?;

    Ok(Handled::Sent)
}

/// Processes every enrollment due at `now` across all tenants.
pub async fn run_due_enrollments<R>(
    repo: &R,
    mailer: &dyn Mailer,
    now: NaiveDateTime,
) -> ServiceResult<RunSummary>
where
    R: SequenceReader + SequenceWriter + ActivityReader + ActivityWriter + ?Sized,
{
    let due = repo.list_due_enrollments(now).map_err(|err| {
        log::error!("Failed to load due enrollments: {err}");
        err
    })?;
    log::info!("{} enrollment(s) due", due.len());

    let mut steps_by_sequence: HashMap<SequenceId, Vec<SequenceStep>> = HashMap::new();
    let mut summary = RunSummary::default();

    for item in &due {
        let sequence_id = item.sequence.id;
        if !steps_by_sequence.contains_key(&sequence_id) {
            match repo.list_steps(sequence_id) {
                Ok(steps) => {
                    steps_by_sequence.insert(sequence_id, steps);
                }
                Err(err) => {
                    log::error!("Failed to load steps of sequence {sequence_id}: {err}");
                    summary.failed += 1;
                    continue;
                }
            }
        }
        let steps = steps_by_sequence
            .get(&sequence_id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        match handle_due(repo, mailer, item, steps, now).await {
            Ok(Handled::Sent) => summary.sent += 1,
            Ok(Handled::Finished) => summary.finished += 1,
            Err(err) => {
                log::error!("Failed to process enrollment {}: {err}", item.enrollment.id);
                summary.failed += 1;
            }
        }
    }

    log::info!(
        "Sequence run done: {} sent, {} finished, {} failed",
        summary.sent,
        summary.finished,
        summary.failed
    );
    Ok(summary)
}
