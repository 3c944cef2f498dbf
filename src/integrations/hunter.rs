//! Hunter.io client (API key query parameter).

use serde::Deserialize;

use crate::domain::person::EmailStatus;
use crate::integrations::{IntegrationResult, check_status, decode_json, http_client, join_url};

const SERVICE: &str = "Hunter";

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FoundEmail {
    pub email: Option<String>,
    #[serde(default)]
    pub score: Option<i32>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct EmailVerification {
    pub email: String,
    pub status: String,
}

impl EmailVerification {
    pub fn email_status(&self) -> EmailStatus {
        match self.status.as_str() {
            "valid" => EmailStatus::Valid,
            "invalid" => EmailStatus::Invalid,
            "accept_all" => EmailStatus::AcceptAll,
            _ => EmailStatus::Unknown,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DomainEmail {
    pub value: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DomainSearch {
    pub domain: String,
    pub organization: Option<String>,
    #[serde(default)]
    pub emails: Vec<DomainEmail>,
}

pub struct HunterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HunterClient {
    pub fn new(base_url: &str, api_key: &str) -> IntegrationResult<Self> {
        Ok(Self {
            http: http_client()?,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> IntegrationResult<T> {
        log::debug!("{SERVICE}: GET {path}");
        let response = self
            .http
            .get(join_url(&self.base_url, path))
            .query(params)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let envelope: Envelope<T> = decode_json(check_status(SERVICE, response).await?).await?;
        Ok(envelope.data)
    }

    pub async fn email_finder(
        &self,
        domain: &str,
        first_name: &str,
        last_name: &str,
    ) -> IntegrationResult<FoundEmail> {
        self.get(
            "/email-finder",
            &[
                ("domain", domain),
                ("first_name", first_name),
                ("last_name", last_name),
            ],
        )
        .await
    }

    pub async fn email_verifier(&self, email: &str) -> IntegrationResult<EmailVerification> {
        self.get("/email-verifier", &[("email", email)]).await
    }

    pub async fn domain_search(&self, domain: &str) -> IntegrationResult<DomainSearch> {
        self.get("/domain-search", &[("domain", domain)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_status_mapping() {
        let verification = |status: &str| EmailVerification {
            email: "a@b.co".to_string(),
            status: status.to_string(),
        };
        assert_eq!(verification("valid").email_status(), EmailStatus::Valid);
        assert_eq!(verification("invalid").email_status(), EmailStatus::Invalid);
        assert_eq!(verification("accept_all").email_status(), EmailStatus::AcceptAll);
        assert_eq!(verification("webmail").email_status(), EmailStatus::Unknown);
    }
}
