use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::dashboard::DashboardStats;
use crate::domain::deal::DealStage;
use crate::domain::sequence::EnrollmentStatus;
use crate::domain::types::{AmountCents, TenantId, UserId};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DashboardReader, DieselRepository};
use crate::schema::{accounts, deals, people, sequence_enrollments, sequences, tasks};

impl DashboardReader for DieselRepository {
    fn dashboard_stats(
        &self,
        tenant_id: TenantId,
        owner_id: Option<UserId>,
        now: NaiveDateTime,
    ) -> RepositoryResult<DashboardStats> {
        let mut conn = self.conn()?;
        let tenant = tenant_id.get();
        let open_stages: Vec<&str> = DealStage::OPEN.iter().map(|s| s.as_str()).collect();

        let mut people_query = people::table
            .filter(people::tenant_id.eq(tenant))
            .into_boxed();
        if let Some(owner_id) = owner_id {
            people_query = people_query.filter(people::owner_id.eq(owner_id.get()));
        }
        let people: i64 = people_query.count().get_result(&mut conn)?;

        let accounts: i64 = accounts::table
            .filter(accounts::tenant_id.eq(tenant))
            .count()
            .get_result(&mut conn)?;

        let open_amounts: Vec<i64> = deals::table
            .filter(deals::tenant_id.eq(tenant))
            .filter(deals::stage.eq_any(open_stages))
            .select(deals::amount_cents)
            .load(&mut conn)?;

        let open_tasks: i64 = tasks::table
            .filter(tasks::tenant_id.eq(tenant))
            .filter(tasks::completed_at.is_null())
            .count()
            .get_result(&mut conn)?;

        let overdue_tasks: i64 = tasks::table
            .filter(tasks::tenant_id.eq(tenant))
            .filter(tasks::completed_at.is_null())
            .filter(tasks::due_at.lt(now))
            .count()
            .get_result(&mut conn)?;

        let active_enrollments: i64 = sequence_enrollments::table
            .inner_join(sequences::table)
            .filter(sequences::tenant_id.eq(tenant))
            .filter(sequence_enrollments::status.eq(EnrollmentStatus::Active.as_str()))
            .count()
            .get_result(&mut conn)?;

        Ok(DashboardStats {
            people,
            accounts,
            open_deals: open_amounts.len() as i64,
            pipeline_value: AmountCents::new(open_amounts.iter().sum())?,
            open_tasks,
            overdue_tasks,
            active_enrollments,
        })
    }
}
