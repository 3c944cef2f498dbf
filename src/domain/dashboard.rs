use serde::Serialize;

use crate::domain::types::AmountCents;

/// Headline numbers shown on the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub people: i64,
    pub accounts: i64,
    pub open_deals: i64,
    pub pipeline_value: AmountCents,
    pub open_tasks: i64,
    pub overdue_tasks: i64,
    pub active_enrollments: i64,
}
