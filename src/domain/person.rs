use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AccountId, EmailAddress, PersonId, PersonName, PhoneNumber, TenantId, UserId, WebUrl,
    text_enum,
};

text_enum! {
    /// Lifecycle stage of a contact.
    PersonStatus {
        Lead => "lead",
        Contacted => "contacted",
        Qualified => "qualified",
        Customer => "customer",
        Lost => "lost",
    }
}

text_enum! {
    /// Deliverability verdict returned by email verification.
    EmailStatus {
        Valid => "valid",
        Invalid => "invalid",
        AcceptAll => "accept_all",
        Unknown => "unknown",
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub id: PersonId,
    pub tenant_id: TenantId,
    pub account_id: Option<AccountId>,
    pub owner_id: Option<UserId>,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub title: Option<String>,
    pub linkedin_url: Option<WebUrl>,
    pub status: PersonStatus,
    pub score: i32,
    pub email_status: Option<EmailStatus>,
    pub enriched_at: Option<NaiveDateTime>,
    pub amplemarket_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Clone, Debug)]
pub struct NewPerson {
    pub tenant_id: TenantId,
    pub account_id: Option<AccountId>,
    pub owner_id: Option<UserId>,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub title: Option<String>,
    pub linkedin_url: Option<WebUrl>,
    pub status: PersonStatus,
    pub amplemarket_id: Option<String>,
}

impl NewPerson {
    #[must_use]
    pub fn new(tenant_id: TenantId, first_name: PersonName, last_name: PersonName) -> Self {
        Self {
            tenant_id,
            account_id: None,
            owner_id: None,
            first_name,
            last_name,
            email: None,
            phone: None,
            title: None,
            linkedin_url: None,
            status: PersonStatus::Lead,
            amplemarket_id: None,
        }
    }

    #[must_use]
    pub fn email(mut self, email: EmailAddress) -> Self {
        self.email = Some(email);
        self
    }

    #[must_use]
    pub fn owner(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    #[must_use]
    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }
}

#[derive(Clone, Debug)]
pub struct UpdatePerson {
    pub account_id: Option<AccountId>,
    pub owner_id: Option<UserId>,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub title: Option<String>,
    pub linkedin_url: Option<WebUrl>,
    pub status: PersonStatus,
}

impl From<&Person> for UpdatePerson {
    fn from(person: &Person) -> Self {
        Self {
            account_id: person.account_id,
            owner_id: person.owner_id,
            first_name: person.first_name.clone(),
            last_name: person.last_name.clone(),
            email: person.email.clone(),
            phone: person.phone.clone(),
            title: person.title.clone(),
            linkedin_url: person.linkedin_url.clone(),
            status: person.status,
        }
    }
}

/// Result of an enrichment lookup applied to a contact.
#[derive(Clone, Debug, PartialEq)]
pub struct PersonEnrichment {
    pub email: Option<EmailAddress>,
    pub email_status: Option<EmailStatus>,
    pub enriched_at: NaiveDateTime,
}
