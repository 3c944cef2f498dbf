use serde::Deserialize;
use validator::Validate;

use crate::domain::sequence::{DelayDays, NewSequence, NewSequenceStep, StepCondition};
use crate::domain::types::{
    EmailSubject, PersonId, RichText, SequenceId, SequenceName, TenantId,
};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
pub struct SequenceForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

impl TryFrom<SequenceForm> for SequenceName {
    type Error = FormError;

    fn try_from(form: SequenceForm) -> Result<Self, Self::Error> {
        form.validate()?;
        SequenceName::new(form.name).map_err(|_| FormError::InvalidName)
    }
}

impl SequenceForm {
    pub fn into_domain(self, tenant_id: TenantId) -> Result<NewSequence, FormError> {
        Ok(NewSequence {
            tenant_id,
            name: SequenceName::try_from(self)?,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct StepForm {
    #[serde(default)]
    pub delay_days: i32,
    #[validate(length(min = 1, max = 300))]
    pub subject: String,
    #[validate(length(min = 1, max = 20000))]
    pub body: String,
    #[serde(default)]
    pub condition: Option<String>,
}

pub struct StepPayload {
    pub delay: DelayDays,
    pub subject: EmailSubject,
    pub body: RichText,
    pub condition: StepCondition,
}

impl TryFrom<StepForm> for StepPayload {
    type Error = FormError;

    fn try_from(form: StepForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let condition = match non_blank(form.condition) {
            Some(raw) => raw.parse::<StepCondition>()?,
            None => StepCondition::Always,
        };
        Ok(Self {
            delay: DelayDays::new(form.delay_days)?,
            subject: EmailSubject::new(form.subject).map_err(|_| FormError::InvalidName)?,
            body: RichText::new(form.body)
                .map_err(|_| FormError::InvalidValue("email body cannot be empty".to_string()))?,
            condition,
        })
    }
}

impl StepPayload {
    pub fn into_domain(self, sequence_id: SequenceId) -> NewSequenceStep {
        NewSequenceStep {
            sequence_id,
            delay: self.delay,
            subject: self.subject,
            body: self.body,
            condition: self.condition,
        }
    }
}

/// Raw `person_ids=1&person_ids=2` body of the enroll form.
#[derive(Debug, Deserialize)]
pub struct EnrollForm {
    #[serde(default)]
    pub person_ids: Vec<i32>,
}

impl EnrollForm {
    /// Decodes the url-encoded body into distinct contact ids.
    pub fn person_ids_from_body(body: &[u8]) -> Result<Vec<PersonId>, FormError> {
        let form: EnrollForm = serde_html_form::from_bytes(body)
            .map_err(|err| FormError::InvalidValue(err.to_string()))?;
        let mut ids = form
            .person_ids
            .into_iter()
            .map(|id| PersonId::new(id).map_err(|_| FormError::InvalidId))
            .collect::<Result<Vec<_>, _>>()?;
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Err(FormError::InvalidValue("select at least one contact".to_string()));
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_rejects_negative_delay() {
        let result = StepPayload::try_from(StepForm {
            delay_days: -1,
            subject: "Hi".to_string(),
            body: "Hello {{ first_name }}".to_string(),
            condition: None,
        });
        assert!(matches!(result, Err(FormError::InvalidValue(_))));
    }

    #[test]
    fn step_keeps_template_placeholders() {
        let payload = StepPayload::try_from(StepForm {
            delay_days: 2,
            subject: "Quick question, {{ first_name }}".to_string(),
            body: "Hello {{ first_name }} at {{ account }}".to_string(),
            condition: Some("no_reply".to_string()),
        })
        .unwrap();
        assert_eq!(payload.condition, StepCondition::NoReply);
        assert!(payload.body.as_str().contains("{{ account }}"));
    }

    #[test]
    fn enroll_body_collects_ids() {
        let ids = EnrollForm::person_ids_from_body(b"person_ids=2&person_ids=2&person_ids=9").unwrap();
        assert_eq!(ids.len(), 2);
        assert!(EnrollForm::person_ids_from_body(b"").is_err());
    }
}
