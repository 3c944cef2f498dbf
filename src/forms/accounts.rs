use serde::Deserialize;
use validator::Validate;

use crate::domain::account::{NewAccount, UpdateAccount};
use crate::domain::types::{AccountName, CompanyDomain, TenantId, UserId, WebUrl};
use crate::forms::{FormError, non_blank, optional_id, optional_value};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AccountForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub industry: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub employees: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
}

#[derive(Debug)]
pub struct AccountPayload {
    pub name: AccountName,
    pub domain: Option<CompanyDomain>,
    pub industry: Option<String>,
    pub website: Option<WebUrl>,
    pub employees: Option<i32>,
    pub owner_id: Option<UserId>,
}

impl TryFrom<AccountForm> for AccountPayload {
    type Error = FormError;

    fn try_from(form: AccountForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let employees = optional_value(
            form.employees,
            |raw| raw.parse::<i32>().ok().filter(|n| *n >= 0).ok_or(()),
            FormError::InvalidValue("employees must be a non-negative number".to_string()),
        )?;
        Ok(Self {
            name: AccountName::new(form.name).map_err(|_| FormError::InvalidName)?,
            domain: optional_value(form.domain, CompanyDomain::new, FormError::InvalidDomain)?,
            industry: non_blank(form.industry),
            website: optional_value(form.website, WebUrl::new, FormError::InvalidUrl)?,
            employees,
            owner_id: optional_id(form.owner_id, UserId::new)?,
        })
    }
}

impl AccountPayload {
    pub fn into_new_account(self, tenant_id: TenantId) -> NewAccount {
        NewAccount {
            tenant_id,
            name: self.name,
            domain: self.domain,
            industry: self.industry,
            website: self.website,
            employees: self.employees,
            owner_id: self.owner_id,
        }
    }

    pub fn into_update(self) -> UpdateAccount {
        UpdateAccount {
            name: self.name,
            domain: self.domain,
            industry: self.industry,
            website: self.website,
            employees: self.employees,
            owner_id: self.owner_id,
        }
    }
}
