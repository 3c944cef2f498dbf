use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{TenantId, text_enum};

text_enum! {
    /// Third-party service a tenant can connect.
    Provider {
        Amplemarket => "amplemarket",
        GoogleCalendar => "google_calendar",
        Hunter => "hunter",
    }
}

impl Provider {
    pub fn label(self) -> &'static str {
        match self {
            Provider::Amplemarket => "Amplemarket",
            Provider::GoogleCalendar => "Google Calendar",
            Provider::Hunter => "Hunter.io",
        }
    }
}

/// Stored credential of a tenant for one provider.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Integration {
    pub tenant_id: TenantId,
    pub provider: Provider,
    #[serde(skip_serializing)]
    pub credential: String,
    pub webhook_token: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl Integration {
    /// Credential with everything but the last four characters masked.
    pub fn masked_credential(&self) -> String {
        let chars: Vec<char> = self.credential.chars().collect();
        let visible = chars.len().min(4);
        let tail: String = chars[chars.len() - visible..].iter().collect();
        format!("{}{}", "•".repeat(chars.len() - visible), tail)
    }
}

#[derive(Clone, Debug)]
pub struct NewIntegration {
    pub tenant_id: TenantId,
    pub provider: Provider,
    pub credential: String,
    pub webhook_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn credential_is_masked() {
        let integration = Integration {
            tenant_id: TenantId::new(1).unwrap(),
            provider: Provider::Hunter,
            credential: "secret-key-1234".to_string(),
            webhook_token: None,
            updated_at: Utc::now().naive_utc(),
        };
        assert_eq!(integration.masked_credential(), "•••••••••••1234");
    }
}
