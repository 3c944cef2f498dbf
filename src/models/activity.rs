use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::activity::{
    Activity as DomainActivity, ActivityType, NewActivity as DomainNewActivity,
};
use crate::domain::types::{ActivityId, PersonId, TenantId, TypeConstraintError, UserId};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::activities)]
pub struct Activity {
    pub id: i32,
    pub tenant_id: i32,
    pub person_id: i32,
    pub user_id: Option<i32>,
    pub activity_type: String,
    pub data: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::activities)]
pub struct NewActivity<'a> {
    pub tenant_id: i32,
    pub person_id: i32,
    pub user_id: Option<i32>,
    pub activity_type: &'a str,
    pub data: String,
}

impl TryFrom<Activity> for DomainActivity {
    type Error = TypeConstraintError;

    fn try_from(activity: Activity) -> Result<Self, Self::Error> {
        let data = serde_json::from_str(&activity.data)
            .map_err(|e| TypeConstraintError::InvalidValue(format!("activity data: {e}")))?;
        Ok(Self {
            id: ActivityId::new(activity.id)?,
            tenant_id: TenantId::new(activity.tenant_id)?,
            person_id: PersonId::new(activity.person_id)?,
            user_id: activity.user_id.map(UserId::new).transpose()?,
            activity_type: ActivityType::try_from(activity.activity_type)?,
            data,
            created_at: activity.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewActivity> for NewActivity<'a> {
    fn from(activity: &'a DomainNewActivity) -> Self {
        Self {
            tenant_id: activity.tenant_id.get(),
            person_id: activity.person_id.get(),
            user_id: activity.user_id.map(UserId::get),
            activity_type: activity.activity_type.as_str(),
            data: activity.data.to_string(),
        }
    }
}
