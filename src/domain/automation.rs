//! Catalogue of built-in automation rules.
//!
//! Rules are not user-defined: the catalogue is fixed and tenants can only
//! switch individual rules on or off. Every rule is enabled by default.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::types::text_enum;

text_enum! {
    AutomationRule {
        NewLeadFollowUp => "new_lead_follow_up",
        ReplyStopsSequences => "reply_stops_sequences",
        DealWonOnboarding => "deal_won_onboarding",
    }
}

impl AutomationRule {
    pub fn title(self) -> &'static str {
        match self {
            AutomationRule::NewLeadFollowUp => "Follow up new leads",
            AutomationRule::ReplyStopsSequences => "Stop sequences on reply",
            AutomationRule::DealWonOnboarding => "Onboard won deals",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AutomationRule::NewLeadFollowUp => {
                "When a contact is created, add an intro call task due tomorrow for its owner."
            }
            AutomationRule::ReplyStopsSequences => {
                "When a contact replies, stop their active sequences and mark leads as contacted."
            }
            AutomationRule::DealWonOnboarding => {
                "When a deal is won, add an onboarding task and mark the contact as a customer."
            }
        }
    }
}

/// Rule together with its effective state, as listed on the settings page.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RuleSetting {
    pub rule: AutomationRule,
    pub title: &'static str,
    pub description: &'static str,
    pub enabled: bool,
}

/// Effective rule switches of one tenant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AutomationSettings {
    overrides: HashMap<AutomationRule, bool>,
}

impl AutomationSettings {
    pub fn new(overrides: impl IntoIterator<Item = (AutomationRule, bool)>) -> Self {
        Self {
            overrides: overrides.into_iter().collect(),
        }
    }

    pub fn is_enabled(&self, rule: AutomationRule) -> bool {
        self.overrides.get(&rule).copied().unwrap_or(true)
    }

    pub fn list(&self) -> Vec<RuleSetting> {
        AutomationRule::ALL
            .iter()
            .map(|rule| RuleSetting {
                rule: *rule,
                title: rule.title(),
                description: rule.description(),
                enabled: self.is_enabled(*rule),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_default_to_enabled() {
        let settings = AutomationSettings::default();
        assert!(
            AutomationRule::ALL
                .iter()
                .all(|rule| settings.is_enabled(*rule))
        );
    }

    #[test]
    fn overrides_disable_rules() {
        let settings = AutomationSettings::new([(AutomationRule::DealWonOnboarding, false)]);
        assert!(!settings.is_enabled(AutomationRule::DealWonOnboarding));
        assert!(settings.is_enabled(AutomationRule::NewLeadFollowUp));

        let listed = settings.list();
        assert_eq!(listed.len(), 3);
        assert!(!listed[2].enabled);
    }
}
