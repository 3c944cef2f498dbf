//! Rule-based lead scoring.
//!
//! A score is the sum of the points of every criterion a contact matches,
//! clamped to `0..=100`. Criteria are fixed; tenants may only change points.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::person::EmailStatus;
use crate::domain::types::{TypeConstraintError, text_enum};

pub const MAX_SCORE: i32 = 100;

text_enum! {
    ScoringCriterion {
        HasEmail => "has_email",
        EmailVerified => "email_verified",
        HasPhone => "has_phone",
        SeniorTitle => "senior_title",
        CompanySize => "company_size",
        OpenDeal => "open_deal",
        Replied => "replied",
    }
}

impl ScoringCriterion {
    pub fn default_points(self) -> i32 {
        match self {
            ScoringCriterion::HasEmail => 10,
            ScoringCriterion::EmailVerified => 15,
            ScoringCriterion::HasPhone => 5,
            ScoringCriterion::SeniorTitle => 20,
            ScoringCriterion::CompanySize => 10,
            ScoringCriterion::OpenDeal => 25,
            ScoringCriterion::Replied => 30,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ScoringCriterion::HasEmail => "Has an email address",
            ScoringCriterion::EmailVerified => "Email verified as deliverable",
            ScoringCriterion::HasPhone => "Has a phone number",
            ScoringCriterion::SeniorTitle => "Senior job title",
            ScoringCriterion::CompanySize => "Company has 50+ employees",
            ScoringCriterion::OpenDeal => "Linked to an open deal",
            ScoringCriterion::Replied => "Replied to an email",
        }
    }
}

/// Points awarded for one criterion, within `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Points(i32);

impl Points {
    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if (0..=MAX_SCORE).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::OutOfRange(format!(
                "points must be between 0 and {MAX_SCORE}, got {value}"
            )))
        }
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Facts about a contact that scoring looks at.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreInput {
    pub has_email: bool,
    pub email_status: Option<EmailStatus>,
    pub has_phone: bool,
    pub title: Option<String>,
    pub employees: Option<i32>,
    pub has_open_deal: bool,
    pub replied: bool,
}

/// Matched anywhere in the title, so "Cofounder" and "Co-Director" count.
const SENIOR_TITLE_FRAGMENTS: &[&str] = &["founder", "director", "chief", "president"];

/// Matched as whole words only; "head" must not match "Headhunter".
const SENIOR_TITLE_WORDS: &[&str] = &[
    "vp", "svp", "evp", "avp", "head", "owner", "ceo", "cto", "cfo", "coo", "cmo", "cro",
    "partner",
];

fn is_senior_title(title: &str) -> bool {
    let title = title.to_lowercase();
    SENIOR_TITLE_FRAGMENTS
        .iter()
        .any(|fragment| title.contains(fragment))
        || title
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| SENIOR_TITLE_WORDS.contains(&word))
}

/// Effective points table of one tenant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoringWeights {
    overrides: HashMap<ScoringCriterion, Points>,
}

/// Criterion with its effective points, as listed on the settings page.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WeightSetting {
    pub criterion: ScoringCriterion,
    pub title: &'static str,
    pub points: i32,
    pub default_points: i32,
}

impl ScoringWeights {
    pub fn new(overrides: impl IntoIterator<Item = (ScoringCriterion, Points)>) -> Self {
        Self {
            overrides: overrides.into_iter().collect(),
        }
    }

    pub fn points(&self, criterion: ScoringCriterion) -> i32 {
        self.overrides
            .get(&criterion)
            .map(|p| p.get())
            .unwrap_or_else(|| criterion.default_points())
    }

    pub fn list(&self) -> Vec<WeightSetting> {
        ScoringCriterion::ALL
            .iter()
            .map(|criterion| WeightSetting {
                criterion: *criterion,
                title: criterion.title(),
                points: self.points(*criterion),
                default_points: criterion.default_points(),
            })
            .collect()
    }

    /// Criteria matched by `input`.
    pub fn matched(input: &ScoreInput) -> Vec<ScoringCriterion> {
        let mut matched = Vec::new();
        if input.has_email {
            matched.push(ScoringCriterion::HasEmail);
        }
        if input.email_status == Some(EmailStatus::Valid) {
            matched.push(ScoringCriterion::EmailVerified);
        }
        if input.has_phone {
            matched.push(ScoringCriterion::HasPhone);
        }
        if input.title.as_deref().is_some_and(is_senior_title) {
            matched.push(ScoringCriterion::SeniorTitle);
        }
        if input.employees.is_some_and(|n| n >= 50) {
            matched.push(ScoringCriterion::CompanySize);
        }
        if input.has_open_deal {
            matched.push(ScoringCriterion::OpenDeal);
        }
        if input.replied {
            matched.push(ScoringCriterion::Replied);
        }
        matched
    }

    pub fn score(&self, input: &ScoreInput) -> i32 {
        Self::matched(input)
            .into_iter()
            .map(|criterion| self.points(criterion))
            .sum::<i32>()
            .clamp(0, MAX_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_contact_scores_zero() {
        assert_eq!(ScoringWeights::default().score(&ScoreInput::default()), 0);
    }

    #[test]
    fn default_points_add_up() {
        let input = ScoreInput {
            has_email: true,
            email_status: Some(EmailStatus::Valid),
            has_phone: true,
            title: Some("Sales Manager".to_string()),
            ..ScoreInput::default()
        };
        assert_eq!(ScoringWeights::default().score(&input), 30);
    }

    #[test]
    fn score_is_clamped() {
        let input = ScoreInput {
            has_email: true,
            email_status: Some(EmailStatus::Valid),
            has_phone: true,
            title: Some("VP of Sales".to_string()),
            employees: Some(500),
            has_open_deal: true,
            replied: true,
        };
        assert_eq!(ScoringWeights::default().score(&input), MAX_SCORE);
    }

    #[test]
    fn overrides_replace_default_points() {
        let weights = ScoringWeights::new([(ScoringCriterion::HasEmail, Points::new(40).unwrap())]);
        let input = ScoreInput {
            has_email: true,
            ..ScoreInput::default()
        };
        assert_eq!(weights.score(&input), 40);
        assert_eq!(weights.points(ScoringCriterion::Replied), 30);
    }

    #[test]
    fn senior_titles_are_detected() {
        assert!(is_senior_title("Co-Founder & CEO"));
        assert!(is_senior_title("Head of Growth"));
        assert!(is_senior_title("VP, Engineering"));
        assert!(!is_senior_title("Account Executive"));
        assert!(!is_senior_title("Headhunter"));
        assert!(is_senior_title("Cofounder"));
        assert!(is_senior_title("SVP Sales"));
        assert!(is_senior_title("Vice President, Marketing"));
        assert!(!is_senior_title("Partnerships Manager"));
    }

    #[test]
    fn points_are_bounded() {
        assert!(Points::new(101).is_err());
        assert!(Points::new(-1).is_err());
    }
}
