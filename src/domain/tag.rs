use serde::{Deserialize, Serialize};

use crate::domain::types::{HexColor, TagId, TagName, TenantId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: TagId,
    pub tenant_id: TenantId,
    pub name: TagName,
    pub color: HexColor,
}

#[derive(Clone, Debug)]
pub struct NewTag {
    pub tenant_id: TenantId,
    pub name: TagName,
    pub color: HexColor,
}
