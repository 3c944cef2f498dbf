use crate::domain::activity::Activity;
use crate::domain::dashboard::DashboardStats;

/// Data required to render the dashboard.
pub struct DashboardData {
    pub stats: DashboardStats,
    /// Most recent timeline entries across the visible contacts.
    pub recent_activities: Vec<Activity>,
}
