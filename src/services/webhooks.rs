//! Inbound Amplemarket webhooks and the webhook monitor.

use chrono::Utc;
use serde_json::json;

use crate::domain::activity::{ActivityType, NewActivity};
use crate::domain::auth::{ADMIN_ROLE, AuthenticatedUser};
use crate::domain::integration::Provider;
use crate::domain::types::{EmailAddress, WebhookEventId};
use crate::domain::webhook::{NewWebhookEvent, WebhookEvent, WebhookStatus};
use crate::dto::webhooks::{WebhooksPageData, WebhooksQuery};
use crate::integrations::amplemarket::AmplemarketEvent;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ActivityWriter, IntegrationReader, PersonReader, PersonWriter, SequenceWriter,
    SettingsReader, WebhookListQuery, WebhookReader, WebhookWriter,
};
use crate::services::automation::on_reply;
use crate::services::scoring::recompute_score;
use crate::services::{ServiceError, ServiceResult, ensure_role};

fn parse_event(payload: &[u8]) -> ServiceResult<AmplemarketEvent> {
    serde_json::from_slice(payload)
        .map_err(|err| ServiceError::Form(format!("Malformed webhook payload: {err}")))
}

/// Records an `email_replied` activity and runs the reply automation.
fn handle_reply<R>(repo: &R, event: &WebhookEvent, parsed: &AmplemarketEvent) -> ServiceResult<()>
where
    R: PersonReader + PersonWriter + ActivityWriter + SequenceWriter + SettingsReader + ?Sized,
{
    let raw_email = parsed
        .data
        .email
        .as_deref()
        .ok_or_else(|| ServiceError::Form("Reply event carries no email.".to_string()))?;
    let email = EmailAddress::new(raw_email)?;

    let person = repo
        .get_person_by_email(&email, event.tenant_id)?
        .ok_or_else(|| ServiceError::Form(format!("No contact with email {email}.")))?;

    repo.create_activity(&NewActivity::new(
        person.tenant_id,
        person.id,
        ActivityType::EmailReplied,
        json!({
            "source": event.source,
            "webhook_event_id": event.id.get(),
            "subject": parsed.data.subject,
            "snippet": parsed.data.snippet,
            "sequence": parsed.data.sequence_name,
        }),
    ))?;

    on_reply(repo, &person)?;
    recompute_score(repo, person.tenant_id, person.id)?;

    Ok(())
}

/// Processes a stored event and records the resulting status.
pub(crate) fn process_event<R>(repo: &R, event: &WebhookEvent) -> ServiceResult<WebhookEvent>
where
    R: PersonReader
        + PersonWriter
        + ActivityWriter
        + SequenceWriter
        + SettingsReader
        + WebhookWriter
        + ?Sized,
{
    let result = parse_event(event.payload.as_bytes()).and_then(|parsed| {
        if parsed.is_reply() {
            handle_reply(repo, event, &parsed).map(|()| WebhookStatus::Processed)
        } else {
            Ok(WebhookStatus::Ignored)
        }
    });

    let now = Some(Utc::now().naive_utc());
    let updated = match result {
        Ok(status) => repo.set_webhook_status(event.id, status, None, now)?,
        Err(err) => {
            log::warn!("Webhook event {} failed: {err}", event.id);
            repo.set_webhook_status(event.id, WebhookStatus::Failed, Some(err.to_string()), now)?
        }
    };

    Ok(updated)
}

/// Stores and processes an event posted to `/webhooks/amplemarket/{token}`.
pub fn receive_amplemarket_event<R>(repo: &R, token: &str, body: &[u8]) -> ServiceResult<WebhookEvent>
where
    R: IntegrationReader
        + PersonReader
        + PersonWriter
        + ActivityWriter
        + SequenceWriter
        + SettingsReader
        + WebhookWriter
        + ?Sized,
{
    let integration = repo
        .get_integration_by_webhook_token(token)?
        .filter(|i| i.provider == Provider::Amplemarket)
        .ok_or(ServiceError::NotFound)?;

    let parsed = parse_event(body)?;

    let event = repo
        .create_webhook_event(&NewWebhookEvent {
            tenant_id: integration.tenant_id,
            source: Provider::Amplemarket.to_string(),
            event_type: parsed.event,
            payload: String::from_utf8_lossy(body).into_owned(),
        })
        .map_err(|err| {
            log::error!("Failed to store webhook event: {err}");
            err
        })?;

    log::info!(
        "Received {} webhook {} for tenant {}",
        event.event_type,
        event.id,
        event.tenant_id
    );
    process_event(repo, &event)
}

pub fn load_webhooks_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: WebhooksQuery,
) -> ServiceResult<WebhooksPageData>
where
    R: WebhookReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let page = query.page.unwrap_or(1).max(1);
    let status = query
        .status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let mut list_query =
        WebhookListQuery::new(user.tenant_id()?).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(raw) = status.as_deref() {
        list_query = list_query.status(raw.parse::<WebhookStatus>()?);
    }

    let (total, events) = repo.list_webhook_events(list_query).map_err(|err| {
        log::error!("Failed to list webhook events: {err}");
        err
    })?;

    Ok(WebhooksPageData {
        events: Paginated::from_total(events, page, total),
        status,
    })
}

/// Re-runs processing of a failed event.
pub fn retry_webhook_event<R>(
    repo: &R,
    user: &AuthenticatedUser,
    event_id: i32,
) -> ServiceResult<WebhookEvent>
where
    R: WebhookReader
        + WebhookWriter
        + PersonReader
        + PersonWriter
        + ActivityWriter
        + SequenceWriter
        + SettingsReader
        + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let event = repo
        .get_webhook_event(WebhookEventId::new(event_id)?, user.tenant_id()?)?
        .ok_or(ServiceError::NotFound)?;

    if event.status != WebhookStatus::Failed {
        return Err(ServiceError::Conflict(
            "Only failed events can be retried.".to_string(),
        ));
    }

    process_event(repo, &event)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::integration::Integration;
    use crate::domain::person::{Person, PersonStatus};
    use crate::domain::types::TenantId;
    use crate::repository::mock::MockRepository;
    use crate::services::people::tests::person;
    use crate::services::sequences::tests::activity_from;
    use crate::services::test_support::{admin_user, member_user};

    const REPLY: &[u8] =
        br#"{"event": "reply", "data": {"email": "ada@example.com", "subject": "Re: hi"}}"#;

    fn integration() -> Integration {
        Integration {
            tenant_id: TenantId::new(10).unwrap(),
            provider: Provider::Amplemarket,
            credential: "key".to_string(),
            webhook_token: Some("tok".to_string()),
            updated_at: Utc::now().naive_utc(),
        }
    }

    fn stored(new: &NewWebhookEvent) -> WebhookEvent {
        WebhookEvent {
            id: WebhookEventId::new(3).unwrap(),
            tenant_id: new.tenant_id,
            source: new.source.clone(),
            event_type: new.event_type.clone(),
            payload: new.payload.clone(),
            status: WebhookStatus::Received,
            error: None,
            received_at: Utc::now().naive_utc(),
            processed_at: None,
        }
    }

    fn with_status(status: WebhookStatus, error: Option<String>) -> WebhookEvent {
        let mut event = stored(&NewWebhookEvent {
            tenant_id: TenantId::new(10).unwrap(),
            source: "amplemarket".to_string(),
            event_type: "reply".to_string(),
            payload: String::from_utf8_lossy(REPLY).into_owned(),
        });
        event.status = status;
        event.error = error;
        event
    }

    #[test]
    fn unknown_token_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_integration_by_webhook_token()
            .returning(|_| Ok(None));
        repo.expect_create_webhook_event().never();

        assert!(matches!(
            receive_amplemarket_event(&repo, "nope", REPLY),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn malformed_body_is_rejected_before_storing() {
        let mut repo = MockRepository::new();
        repo.expect_get_integration_by_webhook_token()
            .returning(|_| Ok(Some(integration())));
        repo.expect_create_webhook_event().never();

        assert!(matches!(
            receive_amplemarket_event(&repo, "tok", b"{not json"),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn reply_is_processed() {
        let mut repo = MockRepository::new();
        repo.expect_get_integration_by_webhook_token()
            .returning(|_| Ok(Some(integration())));
        repo.expect_create_webhook_event()
            .withf(|new| new.event_type == "reply" && new.source == "amplemarket")
            .times(1)
            .returning(|new| Ok(stored(new)));
        repo.expect_get_person_by_email()
            .withf(|email, _| email.as_str() == "ada@example.com")
            .returning(|email, _| {
                Ok(Some(Person {
                    email: Some(email.clone()),
                    ..person(1, None)
                }))
            });
        repo.expect_create_activity()
            .withf(|a| a.activity_type == ActivityType::EmailReplied)
            .times(1)
            .returning(|new| Ok(activity_from(new)));
        repo.expect_load_automation_settings()
            .returning(|_| Ok(Default::default()));
        repo.expect_finish_person_enrollments()
            .times(1)
            .returning(|_, _| Ok(1));
        repo.expect_set_person_status()
            .withf(|_, _, status| *status == PersonStatus::Contacted)
            .times(1)
            .returning(|_, _, _| Ok(()));
        repo.expect_load_scoring_weights()
            .returning(|_| Ok(Default::default()));
        repo.expect_load_score_input()
            .returning(|_, _| Ok(Default::default()));
        repo.expect_set_person_score().returning(|_, _, _| Ok(()));
        repo.expect_set_webhook_status()
            .withf(|_, status, error, at| {
                *status == WebhookStatus::Processed && error.is_none() && at.is_some()
            })
            .times(1)
            .returning(|_, status, error, _| Ok(with_status(status, error)));

        let event = receive_amplemarket_event(&repo, "tok", REPLY).unwrap();
        assert_eq!(event.status, WebhookStatus::Processed);
    }

    #[test]
    fn other_events_are_ignored() {
        let mut repo = MockRepository::new();
        repo.expect_get_integration_by_webhook_token()
            .returning(|_| Ok(Some(integration())));
        repo.expect_create_webhook_event()
            .returning(|new| Ok(stored(new)));
        repo.expect_create_activity().never();
        repo.expect_set_webhook_status()
            .withf(|_, status, _, _| *status == WebhookStatus::Ignored)
            .times(1)
            .returning(|_, status, error, _| Ok(with_status(status, error)));

        let event =
            receive_amplemarket_event(&repo, "tok", br#"{"type": "email_opened"}"#).unwrap();
        assert_eq!(event.status, WebhookStatus::Ignored);
    }

    #[test]
    fn reply_from_unknown_contact_fails() {
        let mut repo = MockRepository::new();
        repo.expect_get_integration_by_webhook_token()
            .returning(|_| Ok(Some(integration())));
        repo.expect_create_webhook_event()
            .returning(|new| Ok(stored(new)));
        repo.expect_get_person_by_email().returning(|_, _| Ok(None));
        repo.expect_set_webhook_status()
            .withf(|_, status, error, _| {
                *status == WebhookStatus::Failed
                    && error.as_deref().is_some_and(|e| e.contains("ada@example.com"))
            })
            .times(1)
            .returning(|_, status, error, _| Ok(with_status(status, error)));

        let event = receive_amplemarket_event(&repo, "tok", REPLY).unwrap();
        assert_eq!(event.status, WebhookStatus::Failed);
    }

    #[test]
    fn only_failed_events_are_retried() {
        let mut repo = MockRepository::new();
        repo.expect_get_webhook_event()
            .returning(|_, _| Ok(Some(with_status(WebhookStatus::Processed, None))));
        repo.expect_set_webhook_status().never();

        assert!(matches!(
            retry_webhook_event(&repo, &admin_user(), 3),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn monitor_is_admin_only() {
        let repo = MockRepository::new();
        assert!(matches!(
            load_webhooks_page(&repo, &member_user(), WebhooksQuery::default()),
            Err(ServiceError::Unauthorized)
        ));
    }
}
