use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::deal::{DealStage, NewDeal, UpdateDeal};
use crate::domain::types::{AccountId, AmountCents, DealName, PersonId, TenantId, UserId};
use crate::forms::{FormError, non_blank, optional_id, parse_date};

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Default, Deserialize, Validate)]
pub struct DealForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub expected_close: Option<String>,
}

#[derive(Debug)]
pub struct DealPayload {
    pub name: DealName,
    pub stage: DealStage,
    pub amount: AmountCents,
    pub currency: String,
    pub account_id: Option<AccountId>,
    pub person_id: Option<PersonId>,
    pub owner_id: Option<UserId>,
    pub expected_close: Option<NaiveDate>,
}

impl TryFrom<DealForm> for DealPayload {
    type Error = FormError;

    fn try_from(form: DealForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let stage = match non_blank(form.stage) {
            Some(raw) => raw.parse::<DealStage>()?,
            None => DealStage::Prospecting,
        };
        let currency = non_blank(form.currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(FormError::InvalidValue(format!("unknown currency {currency}")));
        }
        Ok(Self {
            name: DealName::new(form.name).map_err(|_| FormError::InvalidName)?,
            stage,
            amount: AmountCents::parse_decimal(&form.amount).map_err(|_| FormError::InvalidAmount)?,
            currency,
            account_id: optional_id(form.account_id, AccountId::new)?,
            person_id: optional_id(form.person_id, PersonId::new)?,
            owner_id: optional_id(form.owner_id, UserId::new)?,
            expected_close: non_blank(form.expected_close)
                .map(|raw| parse_date(&raw))
                .transpose()?,
        })
    }
}

impl DealPayload {
    pub fn into_new_deal(self, tenant_id: TenantId, default_owner: Option<UserId>) -> NewDeal {
        NewDeal {
            tenant_id,
            name: self.name,
            stage: self.stage,
            amount: self.amount,
            currency: self.currency,
            account_id: self.account_id,
            person_id: self.person_id,
            owner_id: self.owner_id.or(default_owner),
            expected_close: self.expected_close,
        }
    }

    pub fn into_update(self) -> UpdateDeal {
        UpdateDeal {
            name: self.name,
            stage: self.stage,
            amount: self.amount,
            currency: self.currency,
            account_id: self.account_id,
            person_id: self.person_id,
            owner_id: self.owner_id,
            expected_close: self.expected_close,
        }
    }
}

/// Drag-and-drop target on the pipeline board.
#[derive(Debug, Deserialize)]
pub struct MoveStageForm {
    pub stage: String,
}

impl TryFrom<MoveStageForm> for DealStage {
    type Error = FormError;

    fn try_from(form: MoveStageForm) -> Result<Self, Self::Error> {
        Ok(form.stage.parse::<DealStage>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_is_stored_in_cents() {
        let payload = DealPayload::try_from(DealForm {
            name: "Renewal".to_string(),
            amount: "1,250.50".to_string(),
            currency: Some("eur".to_string()),
            expected_close: Some("2025-09-30".to_string()),
            ..DealForm::default()
        })
        .unwrap();
        assert_eq!(payload.amount.get(), 125_050);
        assert_eq!(payload.currency, "EUR");
        assert_eq!(payload.stage, DealStage::Prospecting);
        assert!(payload.expected_close.is_some());
    }

    #[test]
    fn invalid_amount_is_rejected() {
        let result = DealPayload::try_from(DealForm {
            name: "Renewal".to_string(),
            amount: "12.345".to_string(),
            ..DealForm::default()
        });
        assert!(matches!(result, Err(FormError::InvalidAmount)));
    }

    #[test]
    fn move_stage_parses_known_stages() {
        let stage = DealStage::try_from(MoveStageForm {
            stage: "won".to_string(),
        })
        .unwrap();
        assert_eq!(stage, DealStage::Won);
        assert!(
            DealStage::try_from(MoveStageForm {
                stage: "done".to_string()
            })
            .is_err()
        );
    }
}
