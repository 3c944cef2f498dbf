//! Amplemarket REST client (bearer API key).

use serde::{Deserialize, Serialize};

use crate::integrations::{IntegrationResult, check_status, decode_json, http_client, join_url};

const SERVICE: &str = "Amplemarket";

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AmplemarketContact {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub phone_number: Option<String>,
    pub linkedin_url: Option<String>,
    pub company_name: Option<String>,
    pub company_domain: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContactsPage {
    #[serde(default)]
    pub contacts: Vec<AmplemarketContact>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AmplemarketSequence {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize)]
struct SequencesResponse {
    #[serde(default)]
    sequences: Vec<AmplemarketSequence>,
}

/// Event posted by Amplemarket to the tenant's webhook endpoint.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AmplemarketEvent {
    #[serde(alias = "type")]
    pub event: String,
    #[serde(default)]
    pub data: AmplemarketEventData,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct AmplemarketEventData {
    #[serde(default, alias = "from")]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default, alias = "body")]
    pub snippet: Option<String>,
    #[serde(default)]
    pub sequence_name: Option<String>,
}

impl AmplemarketEvent {
    pub const REPLY: &'static str = "reply";

    pub fn is_reply(&self) -> bool {
        self.event == Self::REPLY
    }
}

#[derive(Serialize)]
struct AddContactRequest<'a> {
    email: &'a str,
}

pub struct AmplemarketClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AmplemarketClient {
    pub fn new(base_url: &str, api_key: &str) -> IntegrationResult<Self> {
        Ok(Self {
            http: http_client()?,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub async fn list_contacts(&self, page: usize, page_size: usize) -> IntegrationResult<ContactsPage> {
        log::debug!("{SERVICE}: GET /contacts page={page}");
        let response = self
            .http
            .get(join_url(&self.base_url, "/contacts"))
            .bearer_auth(&self.api_key)
            .query(&[("page", page), ("page_size", page_size)])
            .send()
            .await?;

        decode_json(check_status(SERVICE, response).await?).await
    }

    pub async fn list_sequences(&self) -> IntegrationResult<Vec<AmplemarketSequence>> {
        log::debug!("{SERVICE}: GET /sequences");
        let response = self
            .http
            .get(join_url(&self.base_url, "/sequences"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let body: SequencesResponse = decode_json(check_status(SERVICE, response).await?).await?;
        Ok(body.sequences)
    }

    pub async fn add_contact_to_sequence(&self, sequence_id: &str, email: &str) -> IntegrationResult<()> {
        let path = format!("/sequences/{}/contacts", urlencoding::encode(sequence_id));
        log::debug!("{SERVICE}: POST {path}");
        let response = self
            .http
            .post(join_url(&self.base_url, &path))
            .bearer_auth(&self.api_key)
            .json(&AddContactRequest { email })
            .send()
            .await?;

        check_status(SERVICE, response).await?;
        Ok(())
    }
}
