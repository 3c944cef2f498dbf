use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::campaign::{Campaign, CampaignStatus, NewCampaign};
use crate::domain::types::{CampaignId, SequenceId, TagId, TenantId};
use crate::models::campaign::{Campaign as DbCampaign, NewCampaign as DbNewCampaign};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CampaignReader, CampaignWriter, DieselRepository};
use crate::schema::campaigns;

impl CampaignReader for DieselRepository {
    fn get_campaign_by_id(
        &self,
        id: CampaignId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Campaign>> {
        let mut conn = self.conn()?;
        let db_campaign = campaigns::table
            .filter(campaigns::id.eq(id.get()))
            .filter(campaigns::tenant_id.eq(tenant_id.get()))
            .first::<DbCampaign>(&mut conn)
            .optional()?;

        db_campaign
            .map(Campaign::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_campaigns(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Campaign>> {
        let mut conn = self.conn()?;
        campaigns::table
            .filter(campaigns::tenant_id.eq(tenant_id.get()))
            .order((campaigns::created_at.desc(), campaigns::id.desc()))
            .load::<DbCampaign>(&mut conn)?
            .into_iter()
            .map(|c| Campaign::try_from(c).map_err(RepositoryError::from))
            .collect()
    }
}

impl CampaignWriter for DieselRepository {
    fn create_campaign(&self, new_campaign: &NewCampaign) -> RepositoryResult<Campaign> {
        let mut conn = self.conn()?;
        let db_campaign = diesel::insert_into(campaigns::table)
            .values(&DbNewCampaign::from(new_campaign))
            .get_result::<DbCampaign>(&mut conn)?;

        Ok(Campaign::try_from(db_campaign)?)
    }

    fn update_campaign(
        &self,
        id: CampaignId,
        updates: &NewCampaign,
    ) -> RepositoryResult<Campaign> {
        let mut conn = self.conn()?;
        let db_campaign = diesel::update(
            campaigns::table
                .filter(campaigns::id.eq(id.get()))
                .filter(campaigns::tenant_id.eq(updates.tenant_id.get())),
        )
        .set((
            campaigns::name.eq(updates.name.as_str()),
            campaigns::sequence_id.eq(updates.sequence_id.map(SequenceId::get)),
            campaigns::tag_id.eq(updates.tag_id.map(TagId::get)),
        ))
        .get_result::<DbCampaign>(&mut conn)?;

        Ok(Campaign::try_from(db_campaign)?)
    }

    fn mark_campaign_launched(
        &self,
        id: CampaignId,
        tenant_id: TenantId,
        launched_at: NaiveDateTime,
    ) -> RepositoryResult<Campaign> {
        let mut conn = self.conn()?;
        let db_campaign = diesel::update(
            campaigns::table
                .filter(campaigns::id.eq(id.get()))
                .filter(campaigns::tenant_id.eq(tenant_id.get())),
        )
        .set((
            campaigns::status.eq(CampaignStatus::Launched.as_str()),
            campaigns::launched_at.eq(Some(launched_at)),
        ))
        .get_result::<DbCampaign>(&mut conn)?;

        Ok(Campaign::try_from(db_campaign)?)
    }

    fn delete_campaign(&self, id: CampaignId, tenant_id: TenantId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(
            campaigns::table
                .filter(campaigns::id.eq(id.get()))
                .filter(campaigns::tenant_id.eq(tenant_id.get())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
