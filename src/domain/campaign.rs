use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CampaignId, CampaignName, SequenceId, TagId, TenantId, text_enum};

text_enum! {
    CampaignStatus {
        Draft => "draft",
        Launched => "launched",
    }
}

/// Targets every contact carrying `tag_id` with the emails of `sequence_id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id: CampaignId,
    pub tenant_id: TenantId,
    pub name: CampaignName,
    pub status: CampaignStatus,
    pub sequence_id: Option<SequenceId>,
    pub tag_id: Option<TagId>,
    pub launched_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewCampaign {
    pub tenant_id: TenantId,
    pub name: CampaignName,
    pub sequence_id: Option<SequenceId>,
    pub tag_id: Option<TagId>,
}
