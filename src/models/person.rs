//! Diesel models for contacts and their tag links.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::person::{
    EmailStatus, NewPerson as DomainNewPerson, Person as DomainPerson, PersonStatus,
    UpdatePerson as DomainUpdatePerson,
};
use crate::domain::types::{
    AccountId, EmailAddress, PersonId, PersonName, PhoneNumber, TenantId, TypeConstraintError,
    UserId, WebUrl,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::people)]
/// Diesel model for [`crate::domain::person::Person`].
pub struct Person {
    pub id: i32,
    pub tenant_id: i32,
    pub account_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub linkedin_url: Option<String>,
    pub status: String,
    pub score: i32,
    pub email_status: Option<String>,
    pub enriched_at: Option<NaiveDateTime>,
    pub amplemarket_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::people)]
/// Insertable form of [`Person`].
pub struct NewPerson<'a> {
    pub tenant_id: i32,
    pub account_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub title: Option<&'a str>,
    pub linkedin_url: Option<&'a str>,
    pub status: &'a str,
    pub amplemarket_id: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::people)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Person`] record.
pub struct UpdatePerson<'a> {
    pub account_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub title: Option<&'a str>,
    pub linkedin_url: Option<&'a str>,
    pub status: &'a str,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Queryable, Debug, Clone)]
#[diesel(table_name = crate::schema::person_tags)]
pub struct PersonTag {
    pub person_id: i32,
    pub tag_id: i32,
}

impl TryFrom<Person> for DomainPerson {
    type Error = TypeConstraintError;

    fn try_from(person: Person) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PersonId::new(person.id)?,
            tenant_id: TenantId::new(person.tenant_id)?,
            account_id: person.account_id.map(AccountId::new).transpose()?,
            owner_id: person.owner_id.map(UserId::new).transpose()?,
            first_name: PersonName::new(person.first_name)?,
            last_name: PersonName::new(person.last_name)?,
            email: person.email.map(EmailAddress::new).transpose()?,
            phone: person.phone.map(PhoneNumber::new).transpose()?,
            title: person.title,
            linkedin_url: person.linkedin_url.map(WebUrl::new).transpose()?,
            status: PersonStatus::try_from(person.status)?,
            score: person.score,
            email_status: person
                .email_status
                .map(EmailStatus::try_from)
                .transpose()?,
            enriched_at: person.enriched_at,
            amplemarket_id: person.amplemarket_id,
            created_at: person.created_at,
            updated_at: person.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewPerson> for NewPerson<'a> {
    fn from(person: &'a DomainNewPerson) -> Self {
        Self {
            tenant_id: person.tenant_id.get(),
            account_id: person.account_id.map(AccountId::get),
            owner_id: person.owner_id.map(UserId::get),
            first_name: person.first_name.as_str(),
            last_name: person.last_name.as_str(),
            email: person.email.as_ref().map(EmailAddress::as_str),
            phone: person.phone.as_ref().map(PhoneNumber::as_str),
            title: person.title.as_deref(),
            linkedin_url: person.linkedin_url.as_ref().map(WebUrl::as_str),
            status: person.status.as_str(),
            amplemarket_id: person.amplemarket_id.as_deref(),
        }
    }
}

impl<'a> UpdatePerson<'a> {
    pub fn new(person: &'a DomainUpdatePerson, updated_at: NaiveDateTime) -> Self {
        Self {
            account_id: person.account_id.map(AccountId::get),
            owner_id: person.owner_id.map(UserId::get),
            first_name: person.first_name.as_str(),
            last_name: person.last_name.as_str(),
            email: person.email.as_ref().map(EmailAddress::as_str),
            phone: person.phone.as_ref().map(PhoneNumber::as_str),
            title: person.title.as_deref(),
            linkedin_url: person.linkedin_url.as_ref().map(WebUrl::as_str),
            status: person.status.as_str(),
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn row() -> Person {
        let now = Utc::now().naive_utc();
        Person {
            id: 3,
            tenant_id: 1,
            account_id: None,
            owner_id: Some(2),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: Some("ada@example.com".into()),
            phone: None,
            title: Some("CTO".into()),
            linkedin_url: None,
            status: "qualified".into(),
            score: 40,
            email_status: Some("accept_all".into()),
            enriched_at: None,
            amplemarket_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn person_row_into_domain() {
        let person = DomainPerson::try_from(row()).expect("valid person");
        assert_eq!(person.full_name(), "Ada Lovelace");
        assert_eq!(person.status, PersonStatus::Qualified);
        assert_eq!(person.email_status, Some(EmailStatus::AcceptAll));
        assert_eq!(person.owner_id.map(UserId::get), Some(2));
    }

    #[test]
    fn domain_new_person_into_insertable() {
        let domain = DomainNewPerson::new(
            TenantId::new(1).unwrap(),
            PersonName::new("Ada").unwrap(),
            PersonName::new("Lovelace").unwrap(),
        )
        .email(EmailAddress::new("ADA@example.com").unwrap());
        let insertable = NewPerson::from(&domain);
        assert_eq!(insertable.email, Some("ada@example.com"));
        assert_eq!(insertable.status, "lead");
    }
}
