//! Settings forms: integrations, automation switches and scoring points.

use std::collections::HashMap;

use serde::Deserialize;
use validator::Validate;

use crate::domain::automation::AutomationRule;
use crate::domain::integration::Provider;
use crate::domain::scoring::{Points, ScoringCriterion};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct IntegrationForm {
    pub provider: String,
    #[validate(length(min = 1, max = 2000))]
    pub credential: String,
}

pub struct IntegrationPayload {
    pub provider: Provider,
    pub credential: String,
}

impl TryFrom<IntegrationForm> for IntegrationPayload {
    type Error = FormError;

    fn try_from(form: IntegrationForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let credential = form.credential.trim().to_string();
        if credential.is_empty() {
            return Err(FormError::InvalidValue("credential cannot be empty".to_string()));
        }
        Ok(Self {
            provider: form.provider.parse::<Provider>()?,
            credential,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderForm {
    pub provider: String,
}

impl TryFrom<ProviderForm> for Provider {
    type Error = FormError;

    fn try_from(form: ProviderForm) -> Result<Self, Self::Error> {
        Ok(form.provider.parse::<Provider>()?)
    }
}

#[derive(Debug, Deserialize)]
pub struct AutomationRuleForm {
    pub rule: String,
    /// Checkbox value; present when switched on.
    #[serde(default)]
    pub enabled: Option<String>,
}

pub struct AutomationRulePayload {
    pub rule: AutomationRule,
    pub enabled: bool,
}

impl TryFrom<AutomationRuleForm> for AutomationRulePayload {
    type Error = FormError;

    fn try_from(form: AutomationRuleForm) -> Result<Self, Self::Error> {
        Ok(Self {
            rule: form.rule.parse::<AutomationRule>()?,
            enabled: form.enabled.is_some(),
        })
    }
}

/// One `criterion=points` pair per scoring criterion.
#[derive(Debug, Default, Deserialize)]
pub struct ScoringWeightsForm {
    #[serde(flatten)]
    pub points: HashMap<String, String>,
}

pub struct ScoringWeightsPayload {
    pub weights: Vec<(ScoringCriterion, Points)>,
}

impl TryFrom<ScoringWeightsForm> for ScoringWeightsPayload {
    type Error = FormError;

    fn try_from(form: ScoringWeightsForm) -> Result<Self, Self::Error> {
        let mut weights = Vec::new();
        for criterion in ScoringCriterion::ALL {
            let Some(raw) = form.points.get(criterion.as_str()) else {
                continue;
            };
            let value: i32 = raw.trim().parse().map_err(|_| {
                FormError::InvalidValue(format!("points for {} must be a number", criterion.title()))
            })?;
            weights.push((*criterion, Points::new(value)?));
        }
        Ok(Self { weights })
    }
}
