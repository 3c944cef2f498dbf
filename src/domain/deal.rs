use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AccountId, AmountCents, DealId, DealName, PersonId, TenantId, UserId, text_enum,
};

text_enum! {
    /// Pipeline stage of a deal.
    DealStage {
        Prospecting => "prospecting",
        Qualification => "qualification",
        Proposal => "proposal",
        Negotiation => "negotiation",
        Won => "won",
        Lost => "lost",
    }
}

impl DealStage {
    /// Stages shown as columns of the pipeline board.
    pub const OPEN: &'static [DealStage] = &[
        DealStage::Prospecting,
        DealStage::Qualification,
        DealStage::Proposal,
        DealStage::Negotiation,
    ];

    pub fn is_open(self) -> bool {
        !matches!(self, DealStage::Won | DealStage::Lost)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Deal {
    pub id: DealId,
    pub tenant_id: TenantId,
    pub name: DealName,
    pub stage: DealStage,
    pub amount: AmountCents,
    pub currency: String,
    pub account_id: Option<AccountId>,
    pub person_id: Option<PersonId>,
    pub owner_id: Option<UserId>,
    pub expected_close: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewDeal {
    pub tenant_id: TenantId,
    pub name: DealName,
    pub stage: DealStage,
    pub amount: AmountCents,
    pub currency: String,
    pub account_id: Option<AccountId>,
    pub person_id: Option<PersonId>,
    pub owner_id: Option<UserId>,
    pub expected_close: Option<NaiveDate>,
}

#[derive(Clone, Debug)]
pub struct UpdateDeal {
    pub name: DealName,
    pub stage: DealStage,
    pub amount: AmountCents,
    pub currency: String,
    pub account_id: Option<AccountId>,
    pub person_id: Option<PersonId>,
    pub owner_id: Option<UserId>,
    pub expected_close: Option<NaiveDate>,
}

/// Open deals of one stage with their summed amount.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineColumn {
    pub stage: DealStage,
    pub deals: Vec<Deal>,
    pub total: AmountCents,
}

/// Groups open deals into one column per open stage, preserving stage order.
pub fn build_pipeline(deals: Vec<Deal>) -> Vec<PipelineColumn> {
    let mut columns: Vec<PipelineColumn> = DealStage::OPEN
        .iter()
        .map(|stage| PipelineColumn {
            stage: *stage,
            deals: Vec::new(),
            total: AmountCents::default(),
        })
        .collect();

    for deal in deals {
        if let Some(column) = columns.iter_mut().find(|c| c.stage == deal.stage) {
            column.total = AmountCents::new(column.total.get().saturating_add(deal.amount.get()))
                .unwrap_or(column.total);
            column.deals.push(deal);
        }
    }

    columns
}
