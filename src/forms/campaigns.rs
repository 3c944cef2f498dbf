use serde::Deserialize;
use validator::Validate;

use crate::domain::campaign::NewCampaign;
use crate::domain::types::{CampaignName, SequenceId, TagId, TenantId};
use crate::forms::{FormError, optional_id};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CampaignForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub sequence_id: Option<String>,
    #[serde(default)]
    pub tag_id: Option<String>,
}

pub struct CampaignPayload {
    pub name: CampaignName,
    pub sequence_id: Option<SequenceId>,
    pub tag_id: Option<TagId>,
}

impl TryFrom<CampaignForm> for CampaignPayload {
    type Error = FormError;

    fn try_from(form: CampaignForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: CampaignName::new(form.name).map_err(|_| FormError::InvalidName)?,
            sequence_id: optional_id(form.sequence_id, SequenceId::new)?,
            tag_id: optional_id(form.tag_id, TagId::new)?,
        })
    }
}

impl CampaignPayload {
    pub fn into_domain(self, tenant_id: TenantId) -> NewCampaign {
        NewCampaign {
            tenant_id,
            name: self.name,
            sequence_id: self.sequence_id,
            tag_id: self.tag_id,
        }
    }
}
