//! Third-party credentials of a tenant.

use crate::domain::auth::{ADMIN_ROLE, AuthenticatedUser};
use crate::domain::integration::{Integration, NewIntegration, Provider};
use crate::domain::types::{TenantId, WebhookToken};
use crate::dto::settings::{IntegrationView, IntegrationsPageData};
use crate::forms::settings::{IntegrationForm, IntegrationPayload, ProviderForm};
use crate::integrations::IntegrationError;
use crate::repository::{IntegrationReader, IntegrationWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role};

/// Endpoint Amplemarket posts events to for the given token.
pub fn webhook_url(base_url: &str, token: &str) -> String {
    format!("{}/webhooks/amplemarket/{token}", base_url.trim_end_matches('/'))
}

/// Lists every provider with its connection state. `base_url` is the public
/// origin of this server, used to print the webhook address.
pub fn load_integrations_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    base_url: &str,
) -> ServiceResult<IntegrationsPageData>
where
    R: IntegrationReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let connected = repo.list_integrations(user.tenant_id()?)?;

    let integrations = Provider::ALL
        .iter()
        .map(|provider| {
            let stored = connected.iter().find(|i| i.provider == *provider);
            IntegrationView {
                provider: *provider,
                label: provider.label(),
                connected: stored.is_some(),
                masked_credential: stored.map(Integration::masked_credential),
                webhook_url: stored
                    .and_then(|i| i.webhook_token.as_deref())
                    .map(|token| webhook_url(base_url, token)),
            }
        })
        .collect();

    Ok(IntegrationsPageData { integrations })
}

/// Stores or replaces a credential. Amplemarket keeps its webhook token
/// across credential changes and gets a fresh one on first connect.
pub fn save_integration<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: IntegrationForm,
) -> ServiceResult<Integration>
where
    R: IntegrationReader + IntegrationWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let payload = IntegrationPayload::try_from(form)?;

    let webhook_token = match payload.provider {
        Provider::Amplemarket => {
            let existing = repo
                .get_integration(tenant_id, Provider::Amplemarket)?
                .and_then(|i| i.webhook_token);
            Some(existing.unwrap_or_else(|| WebhookToken::new().to_string()))
        }
        _ => None,
    };

    let integration = repo
        .save_integration(&NewIntegration {
            tenant_id,
            provider: payload.provider,
            credential: payload.credential,
            webhook_token,
        })
        .map_err(|err| {
            log::error!("Failed to save {} integration: {err}", payload.provider);
            err
        })?;

    log::info!("Tenant {tenant_id} connected {}", integration.provider);
    Ok(integration)
}

pub fn disconnect_integration<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ProviderForm,
) -> ServiceResult<Provider>
where
    R: IntegrationReader + IntegrationWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let provider = Provider::try_from(form)?;

    if repo.get_integration(tenant_id, provider)?.is_none() {
        return Err(ServiceError::NotFound);
    }
    repo.delete_integration(tenant_id, provider)?;

    Ok(provider)
}

/// Credential of a connected provider, or [`IntegrationError::NotConfigured`].
pub(crate) fn require_integration<R>(
    repo: &R,
    tenant_id: TenantId,
    provider: Provider,
) -> ServiceResult<Integration>
where
    R: IntegrationReader + ?Sized,
{
    repo.get_integration(tenant_id, provider)?
        .ok_or(ServiceError::Integration(IntegrationError::NotConfigured(provider)))
}
