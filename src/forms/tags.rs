use serde::Deserialize;
use validator::Validate;

use crate::domain::tag::NewTag;
use crate::domain::types::{HexColor, TagName, TenantId};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct TagForm {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

pub struct TagPayload {
    pub name: TagName,
    pub color: HexColor,
}

impl TryFrom<TagForm> for TagPayload {
    type Error = FormError;

    fn try_from(form: TagForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let color = match non_blank(form.color) {
            Some(raw) => HexColor::new(raw).map_err(|_| FormError::InvalidColor)?,
            None => HexColor::default(),
        };
        Ok(Self {
            name: TagName::new(form.name).map_err(|_| FormError::InvalidName)?,
            color,
        })
    }
}

impl TagPayload {
    pub fn into_domain(self, tenant_id: TenantId) -> NewTag {
        NewTag {
            tenant_id,
            name: self.name,
            color: self.color,
        }
    }
}
