//! Dashboard headline numbers and recent activity.

use chrono::Utc;

use crate::domain::auth::{ACCESS_ROLE, AuthenticatedUser};
use crate::dto::dashboard::DashboardData;
use crate::repository::{ActivityListQuery, ActivityReader, DashboardReader};
use crate::services::{ServiceResult, ensure_role};

const RECENT_ACTIVITIES: usize = 5;

pub fn load_dashboard<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<DashboardData>
where
    R: DashboardReader + ActivityReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let owner = user.visibility_owner()?;

    let stats = repo
        .dashboard_stats(tenant_id, owner, Utc::now().naive_utc())
        .map_err(|err| {
            log::error!("Failed to load dashboard stats: {err}");
            err
        })?;

    let mut query = ActivityListQuery::new(tenant_id).paginate(1, RECENT_ACTIVITIES);
    if let Some(owner) = owner {
        query = query.owner(owner);
    }
    let (_, recent_activities) = repo.list_activities(query)?;

    Ok(DashboardData {
        stats,
        recent_activities,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::dashboard::DashboardStats;
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;
    use crate::services::test_support::{admin_user, member_user, outsider_user};

    #[test]
    fn members_see_their_own_numbers() {
        let mut repo = MockRepository::new();
        repo.expect_dashboard_stats()
            .withf(|_, owner, _| owner.map(|o| o.get()) == Some(2))
            .times(1)
            .returning(|_, _, _| {
                Ok(DashboardStats {
                    people: 4,
                    ..DashboardStats::default()
                })
            });
        repo.expect_list_activities()
            .withf(|query| {
                query.owner_id.map(|o| o.get()) == Some(2)
                    && query.pagination.as_ref().map(|p| p.per_page) == Some(RECENT_ACTIVITIES)
            })
            .times(1)
            .returning(|_| Ok((0, Vec::new())));

        let data = load_dashboard(&repo, &member_user()).unwrap();
        assert_eq!(data.stats.people, 4);
    }

    #[test]
    fn admins_see_the_whole_tenant() {
        let mut repo = MockRepository::new();
        repo.expect_dashboard_stats()
            .withf(|_, owner, _| owner.is_none())
            .returning(|_, _, _| Ok(DashboardStats::default()));
        repo.expect_list_activities()
            .withf(|query| query.owner_id.is_none())
            .returning(|_| Ok((0, Vec::new())));

        assert!(load_dashboard(&repo, &admin_user()).is_ok());
    }

    #[test]
    fn outsiders_are_rejected() {
        let repo = MockRepository::new();
        assert!(matches!(
            load_dashboard(&repo, &outsider_user()),
            Err(ServiceError::Unauthorized)
        ));
    }
}
