use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::deal::{
    Deal as DomainDeal, DealStage, NewDeal as DomainNewDeal, UpdateDeal as DomainUpdateDeal,
};
use crate::domain::types::{
    AccountId, AmountCents, DealId, DealName, PersonId, TenantId, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::deals)]
pub struct Deal {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub stage: String,
    pub amount_cents: i64,
    pub currency: String,
    pub account_id: Option<i32>,
    pub person_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub expected_close: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::deals)]
pub struct NewDeal<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
    pub stage: &'a str,
    pub amount_cents: i64,
    pub currency: &'a str,
    pub account_id: Option<i32>,
    pub person_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub expected_close: Option<NaiveDate>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::deals)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateDeal<'a> {
    pub name: &'a str,
    pub stage: &'a str,
    pub amount_cents: i64,
    pub currency: &'a str,
    pub account_id: Option<i32>,
    pub person_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub expected_close: Option<NaiveDate>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Deal> for DomainDeal {
    type Error = TypeConstraintError;

    fn try_from(deal: Deal) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DealId::new(deal.id)?,
            tenant_id: TenantId::new(deal.tenant_id)?,
            name: DealName::new(deal.name)?,
            stage: DealStage::try_from(deal.stage)?,
            amount: AmountCents::new(deal.amount_cents)?,
            currency: deal.currency,
            account_id: deal.account_id.map(AccountId::new).transpose()?,
            person_id: deal.person_id.map(PersonId::new).transpose()?,
            owner_id: deal.owner_id.map(UserId::new).transpose()?,
            expected_close: deal.expected_close,
            created_at: deal.created_at,
            updated_at: deal.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewDeal> for NewDeal<'a> {
    fn from(deal: &'a DomainNewDeal) -> Self {
        Self {
            tenant_id: deal.tenant_id.get(),
            name: deal.name.as_str(),
            stage: deal.stage.as_str(),
            amount_cents: deal.amount.get(),
            currency: deal.currency.as_str(),
            account_id: deal.account_id.map(AccountId::get),
            person_id: deal.person_id.map(PersonId::get),
            owner_id: deal.owner_id.map(UserId::get),
            expected_close: deal.expected_close,
        }
    }
}

impl<'a> UpdateDeal<'a> {
    pub fn new(deal: &'a DomainUpdateDeal, updated_at: NaiveDateTime) -> Self {
        Self {
            name: deal.name.as_str(),
            stage: deal.stage.as_str(),
            amount_cents: deal.amount.get(),
            currency: deal.currency.as_str(),
            account_id: deal.account_id.map(AccountId::get),
            person_id: deal.person_id.map(PersonId::get),
            owner_id: deal.owner_id.map(UserId::get),
            expected_close: deal.expected_close,
            updated_at,
        }
    }
}
