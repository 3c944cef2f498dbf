//! Per-tenant automation switches and scoring points.
//!
//! Only overrides are stored; missing rows fall back to the built-in defaults.
//! Rows whose key is no longer part of the catalogue are skipped.

use diesel::prelude::*;
use diesel::upsert::excluded;

use crate::domain::automation::{AutomationRule, AutomationSettings};
use crate::domain::scoring::{Points, ScoringCriterion, ScoringWeights};
use crate::domain::types::TenantId;
use crate::models::settings::{AutomationRuleRow, ScoringWeightRow};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, SettingsReader, SettingsWriter};
use crate::schema::{automation_rules, scoring_weights};

impl SettingsReader for DieselRepository {
    fn load_automation_settings(
        &self,
        tenant_id: TenantId,
    ) -> RepositoryResult<AutomationSettings> {
        let mut conn = self.conn()?;
        let rows = automation_rules::table
            .filter(automation_rules::tenant_id.eq(tenant_id.get()))
            .load::<AutomationRuleRow>(&mut conn)?;

        let overrides = rows.into_iter().filter_map(|row| {
            match AutomationRule::try_from(row.rule_key.as_str()) {
                Ok(rule) => Some((rule, row.enabled)),
                Err(err) => {
                    log::warn!("Skipping automation rule override: {err}");
                    None
                }
            }
        });

        Ok(AutomationSettings::new(overrides))
    }

    fn load_scoring_weights(&self, tenant_id: TenantId) -> RepositoryResult<ScoringWeights> {
        let mut conn = self.conn()?;
        let rows = scoring_weights::table
            .filter(scoring_weights::tenant_id.eq(tenant_id.get()))
            .load::<ScoringWeightRow>(&mut conn)?;

        let overrides = rows.into_iter().filter_map(|row| {
            let criterion = ScoringCriterion::try_from(row.criterion.as_str());
            let points = Points::new(row.points);
            match (criterion, points) {
                (Ok(criterion), Ok(points)) => Some((criterion, points)),
                (Err(err), _) | (_, Err(err)) => {
                    log::warn!("Skipping scoring weight override: {err}");
                    None
                }
            }
        });

        Ok(ScoringWeights::new(overrides))
    }
}

impl SettingsWriter for DieselRepository {
    fn set_automation_rule(
        &self,
        tenant_id: TenantId,
        rule: AutomationRule,
        enabled: bool,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(automation_rules::table)
            .values(&AutomationRuleRow {
                tenant_id: tenant_id.get(),
                rule_key: rule.as_str().to_string(),
                enabled,
            })
            .on_conflict((automation_rules::tenant_id, automation_rules::rule_key))
            .do_update()
            .set(automation_rules::enabled.eq(excluded(automation_rules::enabled)))
            .execute(&mut conn)?;

        Ok(())
    }

    fn set_scoring_points(
        &self,
        tenant_id: TenantId,
        criterion: ScoringCriterion,
        points: Points,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(scoring_weights::table)
            .values(&ScoringWeightRow {
                tenant_id: tenant_id.get(),
                criterion: criterion.as_str().to_string(),
                points: points.get(),
            })
            .on_conflict((scoring_weights::tenant_id, scoring_weights::criterion))
            .do_update()
            .set(scoring_weights::points.eq(excluded(scoring_weights::points)))
            .execute(&mut conn)?;

        Ok(())
    }
}
