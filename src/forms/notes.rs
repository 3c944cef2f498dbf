use serde::Deserialize;
use validator::Validate;

use crate::domain::note::{NewNote, NoteTarget};
use crate::domain::types::{AccountId, DealId, PersonId, RichText, TenantId, UserId};
use crate::forms::{FormError, optional_id};

/// Note body plus exactly one of the target ids.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct NoteForm {
    #[validate(length(min = 1, max = 10000))]
    pub body: String,
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub deal_id: Option<String>,
}

pub struct NotePayload {
    pub body: RichText,
    pub target: NoteTarget,
}

impl TryFrom<NoteForm> for NotePayload {
    type Error = FormError;

    fn try_from(form: NoteForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let person = optional_id(form.person_id, PersonId::new)?.map(NoteTarget::Person);
        let account = optional_id(form.account_id, AccountId::new)?.map(NoteTarget::Account);
        let deal = optional_id(form.deal_id, DealId::new)?.map(NoteTarget::Deal);

        let mut targets = [person, account, deal].into_iter().flatten();
        let target = match (targets.next(), targets.next()) {
            (Some(target), None) => target,
            _ => {
                return Err(FormError::InvalidValue(
                    "a note must belong to exactly one record".to_string(),
                ));
            }
        };

        Ok(Self {
            body: RichText::new(form.body)
                .map_err(|_| FormError::InvalidValue("note cannot be empty".to_string()))?,
            target,
        })
    }
}

impl NotePayload {
    pub fn into_domain(self, tenant_id: TenantId, author_id: UserId) -> NewNote {
        NewNote {
            tenant_id,
            author_id,
            body: self.body,
            target: self.target,
        }
    }
}
