use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::campaign::{Campaign as DomainCampaign, CampaignStatus, NewCampaign as DomainNewCampaign};
use crate::domain::types::{CampaignId, CampaignName, SequenceId, TagId, TenantId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::campaigns)]
pub struct Campaign {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub status: String,
    pub sequence_id: Option<i32>,
    pub tag_id: Option<i32>,
    pub launched_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::campaigns)]
pub struct NewCampaign<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
    pub sequence_id: Option<i32>,
    pub tag_id: Option<i32>,
}

impl TryFrom<Campaign> for DomainCampaign {
    type Error = TypeConstraintError;

    fn try_from(campaign: Campaign) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CampaignId::new(campaign.id)?,
            tenant_id: TenantId::new(campaign.tenant_id)?,
            name: CampaignName::new(campaign.name)?,
            status: CampaignStatus::try_from(campaign.status)?,
            sequence_id: campaign.sequence_id.map(SequenceId::new).transpose()?,
            tag_id: campaign.tag_id.map(TagId::new).transpose()?,
            launched_at: campaign.launched_at,
            created_at: campaign.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewCampaign> for NewCampaign<'a> {
    fn from(campaign: &'a DomainNewCampaign) -> Self {
        Self {
            tenant_id: campaign.tenant_id.get(),
            name: campaign.name.as_str(),
            sequence_id: campaign.sequence_id.map(SequenceId::get),
            tag_id: campaign.tag_id.map(TagId::get),
        }
    }
}
