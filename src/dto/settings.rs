//! DTOs of the tenant settings pages.

use serde::Serialize;

use crate::domain::automation::RuleSetting;
use crate::domain::integration::Provider;
use crate::domain::scoring::WeightSetting;

#[derive(Debug)]
pub struct AutomationPageData {
    pub rules: Vec<RuleSetting>,
}

#[derive(Debug)]
pub struct ScoringPageData {
    pub weights: Vec<WeightSetting>,
}

/// One provider row of the integrations page.
#[derive(Debug, Serialize)]
pub struct IntegrationView {
    pub provider: Provider,
    pub label: &'static str,
    pub connected: bool,
    pub masked_credential: Option<String>,
    /// Absolute URL Amplemarket should post events to.
    pub webhook_url: Option<String>,
}

#[derive(Debug)]
pub struct IntegrationsPageData {
    pub integrations: Vec<IntegrationView>,
}
