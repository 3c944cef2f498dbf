//! Per-tenant overrides of automation switches and scoring points.

use diesel::prelude::*;

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::automation_rules)]
pub struct AutomationRuleRow {
    pub tenant_id: i32,
    pub rule_key: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::scoring_weights)]
pub struct ScoringWeightRow {
    pub tenant_id: i32,
    pub criterion: String,
    pub points: i32,
}
