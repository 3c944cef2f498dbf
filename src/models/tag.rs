use diesel::prelude::*;

use crate::domain::tag::{NewTag as DomainNewTag, Tag as DomainTag};
use crate::domain::types::{HexColor, TagId, TagName, TenantId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::tags)]
pub struct Tag {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub color: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
    pub color: &'a str,
}

impl TryFrom<Tag> for DomainTag {
    type Error = TypeConstraintError;

    fn try_from(tag: Tag) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TagId::new(tag.id)?,
            tenant_id: TenantId::new(tag.tenant_id)?,
            name: TagName::new(tag.name)?,
            color: HexColor::new(tag.color)?,
        })
    }
}

impl<'a> From<&'a DomainNewTag> for NewTag<'a> {
    fn from(tag: &'a DomainNewTag) -> Self {
        Self {
            tenant_id: tag.tenant_id.get(),
            name: tag.name.as_str(),
            color: tag.color.as_str(),
        }
    }
}
