//! Contact forms: create/edit, CSV upload, assignment and tagging.

use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::domain::person::{NewPerson, PersonStatus, UpdatePerson};
use crate::domain::types::{
    AccountId, EmailAddress, PersonId, PersonName, PhoneNumber, TagId, TenantId, UserId, WebUrl,
};
use crate::forms::{FormError, non_blank, optional_id, optional_value};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct PersonForm {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// Validated contact fields shared by create and update.
#[derive(Debug)]
pub struct PersonPayload {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub title: Option<String>,
    pub linkedin_url: Option<WebUrl>,
    pub status: PersonStatus,
    pub account_id: Option<AccountId>,
    pub owner_id: Option<UserId>,
}

impl TryFrom<PersonForm> for PersonPayload {
    type Error = FormError;

    fn try_from(form: PersonForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let status = match non_blank(form.status) {
            Some(raw) => raw.parse::<PersonStatus>()?,
            None => PersonStatus::Lead,
        };
        Ok(Self {
            first_name: PersonName::new(form.first_name).map_err(|_| FormError::InvalidName)?,
            last_name: PersonName::new(form.last_name).map_err(|_| FormError::InvalidName)?,
            email: optional_value(form.email, EmailAddress::new, FormError::InvalidEmail)?,
            phone: optional_value(form.phone, PhoneNumber::new, FormError::InvalidPhoneNumber)?,
            title: non_blank(form.title),
            linkedin_url: optional_value(form.linkedin_url, WebUrl::new, FormError::InvalidUrl)?,
            status,
            account_id: optional_id(form.account_id, AccountId::new)?,
            owner_id: optional_id(form.owner_id, UserId::new)?,
        })
    }
}

impl PersonPayload {
    /// New contact; `default_owner` applies when the form left the owner empty.
    pub fn into_new_person(self, tenant_id: TenantId, default_owner: Option<UserId>) -> NewPerson {
        NewPerson {
            tenant_id,
            account_id: self.account_id,
            owner_id: self.owner_id.or(default_owner),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            title: self.title,
            linkedin_url: self.linkedin_url,
            status: self.status,
            amplemarket_id: None,
        }
    }

    pub fn into_update(self) -> UpdatePerson {
        UpdatePerson {
            account_id: self.account_id,
            owner_id: self.owner_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            title: self.title,
            linkedin_url: self.linkedin_url,
            status: self.status,
        }
    }
}

#[derive(MultipartForm)]
pub struct UploadPeopleForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

impl UploadPeopleForm {
    /// Parses the uploaded file into contacts owned by `owner_id`.
    pub fn parse(
        &self,
        tenant_id: TenantId,
        owner_id: Option<UserId>,
    ) -> Result<Vec<NewPerson>, FormError> {
        let file = std::fs::File::open(self.csv.file.path())
            .map_err(|err| FormError::InvalidCsv(err.to_string()))?;
        parse_people_csv(file, tenant_id, owner_id)
    }
}

#[derive(Debug, Deserialize)]
struct PersonCsvRow {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    title: Option<String>,
}

/// Reads `first_name,last_name,email,phone,title` rows; other columns are ignored.
///
/// The whole file is rejected when any row is invalid, naming the first bad row.
pub fn parse_people_csv<R: Read>(
    reader: R,
    tenant_id: TenantId,
    owner_id: Option<UserId>,
) -> Result<Vec<NewPerson>, FormError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut people = Vec::new();
    for (index, row) in reader.deserialize::<PersonCsvRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let row = row.map_err(|err| FormError::InvalidCsv(format!("row {line}: {err}")))?;
        let invalid = |what: &str| FormError::InvalidCsv(format!("row {line}: {what}"));

        let first_name = non_blank(row.first_name)
            .and_then(|v| PersonName::new(v).ok())
            .ok_or_else(|| invalid("first_name is required"))?;
        let last_name = non_blank(row.last_name)
            .and_then(|v| PersonName::new(v).ok())
            .ok_or_else(|| invalid("last_name is required"))?;

        let mut person = NewPerson::new(tenant_id, first_name, last_name);
        person.owner_id = owner_id;
        person.email = optional_value(row.email, EmailAddress::new, FormError::InvalidEmail)
            .map_err(|_| invalid("invalid email"))?;
        person.phone = optional_value(row.phone, PhoneNumber::new, FormError::InvalidPhoneNumber)
            .map_err(|_| invalid("invalid phone"))?;
        person.title = non_blank(row.title);
        people.push(person);
    }

    Ok(people)
}

/// Raw `person_ids=1&person_ids=2&user_id=3` body of the assignment form.
#[derive(Debug, Deserialize)]
pub struct AssignPeopleForm {
    #[serde(default)]
    pub person_ids: Vec<i32>,
    pub user_id: i32,
}

pub struct AssignPeoplePayload {
    pub person_ids: Vec<PersonId>,
    pub owner_id: UserId,
}

impl TryFrom<AssignPeopleForm> for AssignPeoplePayload {
    type Error = FormError;

    fn try_from(form: AssignPeopleForm) -> Result<Self, Self::Error> {
        let mut person_ids = form
            .person_ids
            .into_iter()
            .map(|id| PersonId::new(id).map_err(|_| FormError::InvalidId))
            .collect::<Result<Vec<_>, _>>()?;
        person_ids.sort_unstable();
        person_ids.dedup();
        if person_ids.is_empty() {
            return Err(FormError::InvalidValue("select at least one contact".to_string()));
        }
        Ok(Self {
            person_ids,
            owner_id: UserId::new(form.user_id).map_err(|_| FormError::InvalidId)?,
        })
    }
}

impl AssignPeoplePayload {
    /// Decodes the url-encoded body, which may repeat `person_ids`.
    pub fn from_body(body: &[u8]) -> Result<Self, FormError> {
        let form: AssignPeopleForm = serde_html_form::from_bytes(body)
            .map_err(|err| FormError::InvalidValue(err.to_string()))?;
        Self::try_from(form)
    }
}

/// Amplemarket sequence picked on the contact page.
#[derive(Debug, Deserialize)]
pub struct AmplemarketPushForm {
    pub sequence_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TagPersonForm {
    pub tag_id: i32,
}

impl TryFrom<TagPersonForm> for TagId {
    type Error = FormError;

    fn try_from(form: TagPersonForm) -> Result<Self, Self::Error> {
        TagId::new(form.tag_id).map_err(|_| FormError::InvalidId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant() -> TenantId {
        TenantId::new(1).unwrap()
    }

    #[test]
    fn person_form_normalises_fields() {
        let payload = PersonPayload::try_from(PersonForm {
            first_name: " Ada ".to_string(),
            last_name: "Lovelace".to_string(),
            email: Some("ADA@Example.com".to_string()),
            phone: Some("+1 415 555 2671".to_string()),
            title: Some("  ".to_string()),
            account_id: Some(String::new()),
            status: Some("qualified".to_string()),
            ..PersonForm::default()
        })
        .unwrap();

        assert_eq!(payload.first_name.as_str(), "Ada");
        assert_eq!(payload.email.unwrap().as_str(), "ada@example.com");
        assert_eq!(payload.phone.unwrap().as_str(), "+14155552671");
        assert_eq!(payload.title, None);
        assert_eq!(payload.account_id, None);
        assert_eq!(payload.status, PersonStatus::Qualified);
    }

    #[test]
    fn person_form_rejects_bad_email() {
        let result = PersonPayload::try_from(PersonForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Some("nope".to_string()),
            ..PersonForm::default()
        });
        assert!(matches!(result, Err(FormError::InvalidEmail)));
    }

    #[test]
    fn new_person_falls_back_to_default_owner() {
        let payload = PersonPayload::try_from(PersonForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            ..PersonForm::default()
        })
        .unwrap();
        let owner = UserId::new(9).unwrap();
        let person = payload.into_new_person(tenant(), Some(owner));
        assert_eq!(person.owner_id, Some(owner));
        assert_eq!(person.status, PersonStatus::Lead);
    }

    #[test]
    fn csv_rows_become_people_and_ignore_extra_columns() {
        let data = "first_name,last_name,email,phone,title,favourite_colour\n\
                    Ada,Lovelace,ada@example.com,,Founder,blue\n\
                    Grace,Hopper,,+14155552671,,green\n";
        let people = parse_people_csv(data.as_bytes(), tenant(), None).unwrap();

        assert_eq!(people.len(), 2);
        assert_eq!(people[0].email.as_ref().unwrap().as_str(), "ada@example.com");
        assert_eq!(people[0].title.as_deref(), Some("Founder"));
        assert_eq!(people[1].email, None);
        assert_eq!(people[1].phone.as_ref().unwrap().as_str(), "+14155552671");
    }

    #[test]
    fn csv_reports_the_offending_row() {
        let data = "first_name,last_name,email\nAda,Lovelace,ada@example.com\nBob,,bob@example.com\n";
        match parse_people_csv(data.as_bytes(), tenant(), None) {
            Err(FormError::InvalidCsv(message)) => assert!(message.contains("row 3")),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn assignment_body_accepts_repeated_ids() {
        let payload =
            AssignPeoplePayload::from_body(b"person_ids=3&person_ids=1&person_ids=3&user_id=7")
                .unwrap();
        let ids: Vec<i32> = payload.person_ids.iter().map(|id| id.get()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(payload.owner_id.get(), 7);

        assert!(AssignPeoplePayload::from_body(b"user_id=7").is_err());
    }
}
