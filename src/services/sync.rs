//! Amplemarket import, Google Calendar push and Hunter enrichment.
//!
//! Each sync is recorded as a [`SyncRun`]. Provider failures end the run as
//! `failed` with the error text; rows written before the failure are kept.

use chrono::{Duration, NaiveDateTime, TimeZone, Utc};
use serde_json::json;

use crate::domain::account::NewAccount;
use crate::domain::activity::{ActivityType, NewActivity};
use crate::domain::auth::{ACCESS_ROLE, ADMIN_ROLE, AuthenticatedUser};
use crate::domain::integration::Provider;
use crate::domain::person::{NewPerson, Person, PersonEnrichment, UpdatePerson};
use crate::domain::sync::{SyncOutcome, SyncRun};
use crate::domain::types::{
    AccountId, AccountName, CompanyDomain, EmailAddress, PersonName, PhoneNumber, TenantId,
    WebUrl,
};
use crate::dto::sync::{EnrichmentSummary, SyncHistoryData, SyncHistoryQuery};
use crate::integrations::amplemarket::{AmplemarketContact, AmplemarketSequence};
use crate::integrations::google_calendar::{CalendarEvent, EventTime};
use crate::integrations::{
    AmplemarketClient, GoogleCalendarClient, HunterClient, IntegrationError,
};
use crate::models::config::IntegrationsConfig;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    AccountReader, AccountWriter, ActivityWriter, IntegrationReader, PersonReader, PersonWriter,
    SettingsReader, SyncRunListQuery, SyncRunReader, SyncRunWriter, TaskReader, TaskWriter,
};
use crate::services::integrations::require_integration;
use crate::services::people::load_visible_person;
use crate::services::scoring::recompute_score;
use crate::services::{ServiceError, ServiceResult, ensure_role};

const IMPORT_PAGE_SIZE: usize = 100;
const MAX_IMPORT_PAGES: usize = 100;
const ENRICH_BATCH_LIMIT: i64 = 50;
const CALENDAR_ID: &str = "primary";
const EVENT_LENGTH_MINUTES: i64 = 60;
const UNKNOWN_LAST_NAME: &str = "Unknown";

fn to_i32(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// Closes a run with the outcome of `result`.
fn finish_run<R>(
    repo: &R,
    run: &SyncRun,
    records: usize,
    result: ServiceResult<()>,
) -> ServiceResult<SyncRun>
where
    R: SyncRunWriter + ?Sized,
{
    let outcome = match result {
        Ok(()) => SyncOutcome::Succeeded {
            records: to_i32(records),
        },
        Err(err) => {
            log::error!("{} sync {} failed: {err}", run.provider, run.id);
            SyncOutcome::Failed {
                records: to_i32(records),
                error: err.to_string(),
            }
        }
    };

    Ok(repo.finish_sync_run(run.id, &outcome, Utc::now().naive_utc())?)
}

pub fn load_sync_history<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: SyncHistoryQuery,
) -> ServiceResult<SyncHistoryData>
where
    R: SyncRunReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let page = query.page.unwrap_or(1).max(1);
    let provider = query
        .provider
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let mut list_query =
        SyncRunListQuery::new(user.tenant_id()?).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(raw) = provider.as_deref() {
        list_query = list_query.provider(raw.parse::<Provider>()?);
    }

    let (total, runs) = repo.list_sync_runs(list_query).map_err(|err| {
        log::error!("Failed to list sync runs: {err}");
        err
    })?;

    Ok(SyncHistoryData {
        runs: Paginated::from_total(runs, page, total),
        provider,
    })
}

fn contact_name(contact: &AmplemarketContact, email: &EmailAddress) -> ServiceResult<(PersonName, PersonName)> {
    let non_blank = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let first = non_blank(&contact.first_name).unwrap_or_else(|| {
        email
            .as_str()
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string()
    });
    let last = non_blank(&contact.last_name).unwrap_or_else(|| UNKNOWN_LAST_NAME.to_string());

    Ok((PersonName::new(first)?, PersonName::new(last)?))
}

/// Finds or creates the account of the contact's company domain.
fn ensure_account<R>(
    repo: &R,
    tenant_id: TenantId,
    contact: &AmplemarketContact,
) -> ServiceResult<Option<AccountId>>
where
    R: AccountReader + AccountWriter + ?Sized,
{
    let Some(domain) = contact
        .company_domain
        .as_deref()
        .and_then(|raw| CompanyDomain::new(raw).ok())
    else {
        return Ok(None);
    };

    if let Some(account) = repo.get_account_by_domain(&domain, tenant_id)? {
        return Ok(Some(account.id));
    }

    let name = contact
        .company_name
        .as_deref()
        .and_then(|n| AccountName::new(n).ok())
        .map_or_else(|| AccountName::new(domain.as_str()), Ok)?;
    let account = repo.create_account(&NewAccount::from_domain(tenant_id, name, domain))?;
    Ok(Some(account.id))
}

/// Creates or updates one imported contact. Returns `false` when skipped.
fn upsert_contact<R>(
    repo: &R,
    tenant_id: TenantId,
    contact: &AmplemarketContact,
) -> ServiceResult<bool>
where
    R: PersonReader
        + PersonWriter
        + AccountReader
        + AccountWriter
        + ActivityWriter
        + SettingsReader
        + ?Sized,
{
    let Some(email) = contact
        .email
        .as_deref()
        .and_then(|raw| EmailAddress::new(raw).ok())
    else {
        log::debug!("Skipping Amplemarket contact {} without a valid email", contact.id);
        return Ok(false);
    };

    let (first_name, last_name) = contact_name(contact, &email)?;
    let account_id = ensure_account(repo, tenant_id, contact)?;
    let phone = contact
        .phone_number
        .as_deref()
        .and_then(|raw| PhoneNumber::new(raw).ok());
    let linkedin_url = contact
        .linkedin_url
        .as_deref()
        .and_then(|raw| WebUrl::new(raw).ok());
    let title = contact
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let person_id = match repo.get_person_by_email(&email, tenant_id)? {
        Some(existing) => {
            let mut updates = UpdatePerson::from(&existing);
            updates.first_name = first_name;
            updates.last_name = last_name;
            updates.title = title.or(updates.title);
            updates.phone = phone.or(updates.phone);
            updates.linkedin_url = linkedin_url.or(updates.linkedin_url);
            updates.account_id = updates.account_id.or(account_id);
            repo.update_person(existing.id, tenant_id, &updates)?;
            repo.set_amplemarket_id(existing.id, tenant_id, &contact.id)?;
            existing.id
        }
        None => {
            let mut new_person = NewPerson::new(tenant_id, first_name, last_name).email(email);
            new_person.account_id = account_id;
            new_person.title = title;
            new_person.phone = phone;
            new_person.linkedin_url = linkedin_url;
            new_person.amplemarket_id = Some(contact.id.clone());

            let person = repo.create_person(&new_person)?;
            repo.create_activity(&NewActivity::new(
                tenant_id,
                person.id,
                ActivityType::SyncImport,
                json!({
                    "source": Provider::Amplemarket.as_str(),
                    "amplemarket_id": contact.id,
                }),
            ))?;
            person.id
        }
    };

    recompute_score(repo, tenant_id, person_id)?;
    Ok(true)
}

/// Pages through Amplemarket contacts and upserts them by email.
pub async fn import_amplemarket<R>(
    repo: &R,
    user: &AuthenticatedUser,
    config: &IntegrationsConfig,
) -> ServiceResult<SyncRun>
where
    R: PersonReader
        + PersonWriter
        + AccountReader
        + AccountWriter
        + ActivityWriter
        + SettingsReader
        + IntegrationReader
        + SyncRunWriter
        + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let integration = require_integration(repo, tenant_id, Provider::Amplemarket)?;
    let client = AmplemarketClient::new(&config.amplemarket_base_url, &integration.credential)?;

    let run = repo.start_sync_run(tenant_id, Provider::Amplemarket)?;
    let mut records = 0;

    let result = async {
        for page in 1..=MAX_IMPORT_PAGES {
            let batch = client.list_contacts(page, IMPORT_PAGE_SIZE).await?;
            for contact in &batch.contacts {
                if upsert_contact(repo, tenant_id, contact)? {
                    records += 1;
                }
            }
            if !batch.has_more || batch.contacts.is_empty() {
                break;
            }
        }
        Ok::<_, ServiceError>(())
    }
    .await;

    log::info!("Amplemarket import for tenant {tenant_id}: {records} contact(s)");
    finish_run(repo, &run, records, result)
}

pub async fn load_amplemarket_sequences<R>(
    repo: &R,
    user: &AuthenticatedUser,
    config: &IntegrationsConfig,
) -> ServiceResult<Vec<AmplemarketSequence>>
where
    R: IntegrationReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let integration = require_integration(repo, user.tenant_id()?, Provider::Amplemarket)?;
    let client = AmplemarketClient::new(&config.amplemarket_base_url, &integration.credential)?;

    Ok(client.list_sequences().await?)
}

/// Adds a contact to an Amplemarket sequence.
pub async fn push_to_amplemarket_sequence<R>(
    repo: &R,
    user: &AuthenticatedUser,
    person_id: i32,
    sequence_id: &str,
    config: &IntegrationsConfig,
) -> ServiceResult<()>
where
    R: PersonReader + IntegrationReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let person = load_visible_person(repo, user, person_id)?;
    let Some(email) = person.email.as_ref() else {
        return Err(ServiceError::Form("This contact has no email.".to_string()));
    };
    let sequence_id = sequence_id.trim();
    if sequence_id.is_empty() {
        return Err(ServiceError::Form("Choose an Amplemarket sequence.".to_string()));
    }

    let integration = require_integration(repo, person.tenant_id, Provider::Amplemarket)?;
    let client = AmplemarketClient::new(&config.amplemarket_base_url, &integration.credential)?;
    client.add_contact_to_sequence(sequence_id, email.as_str()).await?;

    log::info!("Person {} pushed to Amplemarket sequence {sequence_id}", person.id);
    Ok(())
}

/// Creates a calendar event for every open, dated and unscheduled task.
pub async fn push_tasks_to_calendar<R>(
    repo: &R,
    user: &AuthenticatedUser,
    config: &IntegrationsConfig,
) -> ServiceResult<SyncRun>
where
    R: TaskReader + TaskWriter + IntegrationReader + SyncRunWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let integration = require_integration(repo, tenant_id, Provider::GoogleCalendar)?;
    let client =
        GoogleCalendarClient::new(&config.google_calendar_base_url, &integration.credential)?;

    let run = repo.start_sync_run(tenant_id, Provider::GoogleCalendar)?;
    let mut records = 0;

    let result = async {
        for task in repo.list_tasks_to_schedule(tenant_id)? {
            let Some(due_at) = task.due_at else {
                continue;
            };
            let start = Utc.from_utc_datetime(&due_at);
            let event = CalendarEvent {
                id: None,
                summary: task.title.to_string(),
                description: task.description.clone(),
                start: EventTime { date_time: start },
                end: EventTime {
                    date_time: start + Duration::minutes(EVENT_LENGTH_MINUTES),
                },
            };

            let created = client.insert_event(CALENDAR_ID, &event).await?;
            let event_id = created.id.ok_or_else(|| {
                IntegrationError::Decode(format!("no event id returned for task {}", task.id))
            })?;
            repo.set_calendar_event_id(task.id, tenant_id, &event_id)?;
            records += 1;
        }
        Ok::<_, ServiceError>(())
    }
    .await;

    finish_run(repo, &run, records, result)
}

/// Finds a missing email by the account domain, verifies the email and
/// stores the result on the person.
async fn enrich_one<R>(
    repo: &R,
    client: &HunterClient,
    person: &Person,
    now: NaiveDateTime,
) -> ServiceResult<Person>
where
    R: PersonReader + PersonWriter + AccountReader + ActivityWriter + SettingsReader + ?Sized,
{
    let mut found = None;
    if person.email.is_none()
        && let Some(account_id) = person.account_id
        && let Some(domain) = repo
            .get_account_by_id(account_id, person.tenant_id)?
            .and_then(|account| account.domain)
    {
        let result = client
            .email_finder(domain.as_str(), &person.first_name, &person.last_name)
            .await?;
        found = result.email.and_then(|raw| EmailAddress::new(raw).ok());
    }

    let email = person.email.clone().or_else(|| found.clone());
    let email_status = match email.as_ref() {
        Some(email) => Some(client.email_verifier(email.as_str()).await?.email_status()),
        None => None,
    };

    let enriched = repo.apply_enrichment(
        person.id,
        person.tenant_id,
        &PersonEnrichment {
            email: found,
            email_status,
            enriched_at: now,
        },
    )?;

    repo.create_activity(&NewActivity::new(
        enriched.tenant_id,
        enriched.id,
        ActivityType::Enriched,
        json!({
            "source": Provider::Hunter.as_str(),
            "email": enriched.email.as_ref().map(|e| e.as_str()),
            "email_status": enriched.email_status.map(|s| s.as_str()),
        }),
    ))?;
    let score = recompute_score(repo, enriched.tenant_id, enriched.id)?;

    Ok(Person { score, ..enriched })
}

pub async fn enrich_person<R>(
    repo: &R,
    user: &AuthenticatedUser,
    person_id: i32,
    config: &IntegrationsConfig,
) -> ServiceResult<Person>
where
    R: PersonReader
        + PersonWriter
        + AccountReader
        + ActivityWriter
        + SettingsReader
        + IntegrationReader
        + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let person = load_visible_person(repo, user, person_id)?;
    let integration = require_integration(repo, person.tenant_id, Provider::Hunter)?;
    let client = HunterClient::new(&config.hunter_base_url, &integration.credential)?;

    enrich_one(repo, &client, &person, Utc::now().naive_utc())
        .await
        .map_err(|err| {
            log::error!("Failed to enrich person {person_id}: {err}");
            err
        })
}

/// Enriches the next batch of unverified contacts. Stops early when Hunter
/// rate-limits the tenant.
pub async fn enrich_batch<R>(
    repo: &R,
    user: &AuthenticatedUser,
    config: &IntegrationsConfig,
) -> ServiceResult<EnrichmentSummary>
where
    R: PersonReader
        + PersonWriter
        + AccountReader
        + ActivityWriter
        + SettingsReader
        + IntegrationReader
        + SyncRunWriter
        + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let integration = require_integration(repo, tenant_id, Provider::Hunter)?;
    let client = HunterClient::new(&config.hunter_base_url, &integration.credential)?;

    let people = repo.list_people_to_enrich(tenant_id, ENRICH_BATCH_LIMIT)?;
    let run = repo.start_sync_run(tenant_id, Provider::Hunter)?;
    let now = Utc::now().naive_utc();

    let mut summary = EnrichmentSummary::default();
    let mut last_error = None;
    for person in &people {
        match enrich_one(repo, &client, person, now).await {
            Ok(_) => summary.enriched += 1,
            Err(ServiceError::Integration(IntegrationError::RateLimited)) => {
                log::warn!("Hunter rate limit reached after {} contact(s)", summary.enriched);
                summary.failed += 1;
                last_error = Some(ServiceError::Integration(IntegrationError::RateLimited));
                break;
            }
            Err(err) => {
                log::error!("Failed to enrich person {}: {err}", person.id);
                summary.failed += 1;
                last_error = Some(err);
            }
        }
    }

    let result = match last_error {
        Some(err) if summary.enriched == 0 => Err(err),
        _ => Ok(()),
    };
    finish_run(repo, &run, summary.enriched, result)?;

    Ok(summary)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use httpmock::prelude::*;

    use super::*;
    use crate::domain::account::Account;
    use crate::domain::integration::Integration;
    use crate::domain::person::EmailStatus;
    use crate::domain::sync::SyncStatus;
    use crate::domain::types::SyncRunId;
    use crate::repository::mock::MockRepository;
    use crate::services::people::tests::person;
    use crate::services::sequences::tests::activity_from;
    use crate::services::tasks::tests::task;
    use crate::services::test_support::{admin_user, member_user};

    fn config(base: &str) -> IntegrationsConfig {
        IntegrationsConfig {
            amplemarket_base_url: base.to_string(),
            google_calendar_base_url: base.to_string(),
            hunter_base_url: base.to_string(),
        }
    }

    fn connected(provider: Provider) -> Integration {
        Integration {
            tenant_id: TenantId::new(10).unwrap(),
            provider,
            credential: "key".to_string(),
            webhook_token: None,
            updated_at: Utc::now().naive_utc(),
        }
    }

    fn run(provider: Provider) -> SyncRun {
        SyncRun {
            id: SyncRunId::new(1).unwrap(),
            tenant_id: TenantId::new(10).unwrap(),
            provider,
            status: SyncStatus::Running,
            records: 0,
            error: None,
            started_at: Utc::now().naive_utc(),
            finished_at: None,
        }
    }

    fn finished(provider: Provider, outcome: &SyncOutcome) -> SyncRun {
        SyncRun {
            status: outcome.status(),
            records: outcome.records(),
            error: outcome.error().map(str::to_string),
            ..run(provider)
        }
    }

    fn account(id: AccountId) -> Account {
        let now = Utc::now().naive_utc();
        Account {
            id,
            tenant_id: TenantId::new(10).unwrap(),
            name: AccountName::new("Analytical Engines").unwrap(),
            domain: Some(CompanyDomain::new("engines.example").unwrap()),
            industry: None,
            website: None,
            employees: None,
            owner_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn missing_names_fall_back() {
        let contact = AmplemarketContact {
            id: "c1".to_string(),
            email: Some("ada@engines.example".to_string()),
            first_name: Some("  ".to_string()),
            last_name: None,
            title: None,
            phone_number: None,
            linkedin_url: None,
            company_name: None,
            company_domain: None,
        };
        let email = EmailAddress::new("ada@engines.example").unwrap();
        let (first, last) = contact_name(&contact, &email).unwrap();
        assert_eq!(first.as_str(), "ada");
        assert_eq!(last.as_str(), UNKNOWN_LAST_NAME);
    }

    #[actix_web::test]
    async fn import_creates_people_and_accounts() {
        let server = MockServer::start_async().await;
        let contacts = server
            .mock_async(|when, then| {
                when.method(GET).path("/contacts").query_param("page", "1");
                then.status(200).json_body(serde_json::json!({
                    "contacts": [
                        {
                            "id": "am-1",
                            "email": "ada@engines.example",
                            "first_name": "Ada",
                            "last_name": "Lovelace",
                            "title": "CTO",
                            "company_name": "Analytical Engines",
                            "company_domain": "https://www.engines.example"
                        },
                        { "id": "am-2", "email": null }
                    ],
                    "has_more": false
                }));
            })
            .await;

        let mut repo = MockRepository::new();
        repo.expect_get_integration()
            .returning(|_, p| Ok(Some(connected(p))));
        repo.expect_start_sync_run()
            .returning(|_, p| Ok(run(p)));
        repo.expect_get_account_by_domain()
            .withf(|domain, _| domain.as_str() == "engines.example")
            .returning(|_, _| Ok(None));
        repo.expect_create_account()
            .withf(|new| new.name.as_str() == "Analytical Engines")
            .times(1)
            .returning(|_| Ok(account(AccountId::new(3).unwrap())));
        repo.expect_get_person_by_email().returning(|_, _| Ok(None));
        repo.expect_create_person()
            .withf(|new| {
                new.amplemarket_id.as_deref() == Some("am-1")
                    && new.account_id.map(|a| a.get()) == Some(3)
                    && new.title.as_deref() == Some("CTO")
            })
            .times(1)
            .returning(|_| Ok(person(1, None)));
        repo.expect_create_activity()
            .withf(|a| a.activity_type == ActivityType::SyncImport)
            .times(1)
            .returning(|new| Ok(activity_from(new)));
        repo.expect_load_scoring_weights()
            .returning(|_| Ok(Default::default()));
        repo.expect_load_score_input()
            .returning(|_, _| Ok(Default::default()));
        repo.expect_set_person_score().returning(|_, _, _| Ok(()));
        repo.expect_finish_sync_run()
            .withf(|_, outcome, _| *outcome == SyncOutcome::Succeeded { records: 1 })
            .times(1)
            .returning(|_, outcome, _| Ok(finished(Provider::Amplemarket, outcome)));

        let result = import_amplemarket(&repo, &admin_user(), &config(&server.base_url()))
            .await
            .unwrap();
        contacts.assert_async().await;
        assert_eq!(result.status, SyncStatus::Succeeded);
    }

    #[actix_web::test]
    async fn rejected_credential_fails_the_run() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/contacts");
                then.status(401).body("bad key");
            })
            .await;

        let mut repo = MockRepository::new();
        repo.expect_get_integration()
            .returning(|_, p| Ok(Some(connected(p))));
        repo.expect_start_sync_run()
            .returning(|_, p| Ok(run(p)));
        repo.expect_create_person().never();
        repo.expect_finish_sync_run()
            .withf(|_, outcome, _| matches!(outcome, SyncOutcome::Failed { records: 0, .. }))
            .times(1)
            .returning(|_, outcome, _| Ok(finished(Provider::Amplemarket, outcome)));

        let result = import_amplemarket(&repo, &admin_user(), &config(&server.base_url()))
            .await
            .unwrap();
        assert_eq!(result.status, SyncStatus::Failed);
    }

    #[actix_web::test]
    async fn import_requires_connection() {
        let mut repo = MockRepository::new();
        repo.expect_get_integration().returning(|_, _| Ok(None));
        repo.expect_start_sync_run().never();

        let result = import_amplemarket(&repo, &admin_user(), &config("http://127.0.0.1:1")).await;
        assert!(matches!(
            result,
            Err(ServiceError::Integration(IntegrationError::NotConfigured(
                Provider::Amplemarket
            )))
        ));
    }

    #[actix_web::test]
    async fn calendar_push_stores_event_ids() {
        let server = MockServer::start_async().await;
        let insert = server
            .mock_async(|when, then| {
                when.method(POST).path("/calendars/primary/events");
                then.status(200).json_body(serde_json::json!({
                    "id": "evt-1",
                    "summary": "Call Ada",
                    "start": { "dateTime": "2026-01-05T09:00:00Z" },
                    "end": { "dateTime": "2026-01-05T10:00:00Z" }
                }));
            })
            .await;

        let mut repo = MockRepository::new();
        repo.expect_get_integration()
            .returning(|_, p| Ok(Some(connected(p))));
        repo.expect_start_sync_run()
            .returning(|_, p| Ok(run(p)));
        repo.expect_list_tasks_to_schedule().returning(|_| {
            let mut dated = task(None, None);
            dated.due_at = Some(Utc::now().naive_utc());
            Ok(vec![dated])
        });
        repo.expect_set_calendar_event_id()
            .withf(|id, _, event| id.get() == 5 && event == "evt-1")
            .times(1)
            .returning(|_, _, _| Ok(()));
        repo.expect_finish_sync_run()
            .withf(|_, outcome, _| *outcome == SyncOutcome::Succeeded { records: 1 })
            .times(1)
            .returning(|_, outcome, _| Ok(finished(Provider::GoogleCalendar, outcome)));

        push_tasks_to_calendar(&repo, &admin_user(), &config(&server.base_url()))
            .await
            .unwrap();
        insert.assert_async().await;
    }

    #[actix_web::test]
    async fn calendar_event_without_id_fails_the_run() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/calendars/primary/events");
                then.status(200).json_body(serde_json::json!({
                    "summary": "Call Ada",
                    "start": { "dateTime": "2026-01-05T09:00:00Z" },
                    "end": { "dateTime": "2026-01-05T10:00:00Z" }
                }));
            })
            .await;

        let mut repo = MockRepository::new();
        repo.expect_get_integration()
            .returning(|_, p| Ok(Some(connected(p))));
        repo.expect_start_sync_run()
            .returning(|_, p| Ok(run(p)));
        repo.expect_list_tasks_to_schedule().returning(|_| {
            let mut dated = task(None, None);
            dated.due_at = Some(Utc::now().naive_utc());
            Ok(vec![dated])
        });
        repo.expect_set_calendar_event_id().never();
        repo.expect_finish_sync_run()
            .withf(|_, outcome, _| matches!(outcome, SyncOutcome::Failed { records: 0, .. }))
            .times(1)
            .returning(|_, outcome, _| Ok(finished(Provider::GoogleCalendar, outcome)));

        push_tasks_to_calendar(&repo, &admin_user(), &config(&server.base_url()))
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn enrichment_finds_and_verifies_email() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/email-finder")
                    .query_param("domain", "engines.example")
                    .query_param("api_key", "key");
                then.status(200).json_body(serde_json::json!({
                    "data": { "email": "ada@engines.example", "score": 91 }
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/email-verifier")
                    .query_param("email", "ada@engines.example");
                then.status(200).json_body(serde_json::json!({
                    "data": { "email": "ada@engines.example", "status": "valid" }
                }));
            })
            .await;

        let mut repo = MockRepository::new();
        repo.expect_get_person_by_id().returning(|_, _| {
            Ok(Some(Person {
                account_id: Some(AccountId::new(3).unwrap()),
                ..person(1, None)
            }))
        });
        repo.expect_get_integration()
            .returning(|_, p| Ok(Some(connected(p))));
        repo.expect_get_account_by_id()
            .returning(|id, _| Ok(Some(account(id))));
        repo.expect_apply_enrichment()
            .withf(|id, _, enrichment| {
                id.get() == 1
                    && enrichment.email.as_ref().map(|e| e.as_str()) == Some("ada@engines.example")
                    && enrichment.email_status == Some(EmailStatus::Valid)
            })
            .times(1)
            .returning(|id, _, enrichment| {
                Ok(Person {
                    email: enrichment.email.clone(),
                    email_status: enrichment.email_status,
                    enriched_at: Some(enrichment.enriched_at),
                    ..person(id.get(), None)
                })
            });
        repo.expect_create_activity()
            .withf(|a| a.activity_type == ActivityType::Enriched)
            .times(1)
            .returning(|new| Ok(activity_from(new)));
        repo.expect_load_scoring_weights()
            .returning(|_| Ok(Default::default()));
        repo.expect_load_score_input().returning(|_, _| {
            Ok(crate::domain::scoring::ScoreInput {
                has_email: true,
                email_status: Some(EmailStatus::Valid),
                ..Default::default()
            })
        });
        repo.expect_set_person_score().returning(|_, _, _| Ok(()));

        let enriched = enrich_person(&repo, &admin_user(), 1, &config(&server.base_url()))
            .await
            .unwrap();
        assert_eq!(enriched.email_status, Some(EmailStatus::Valid));
        assert_eq!(enriched.score, 25);
    }

    #[actix_web::test]
    async fn batch_stops_on_rate_limit() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/email-verifier");
                then.status(429);
            })
            .await;

        let mut repo = MockRepository::new();
        repo.expect_get_integration()
            .returning(|_, p| Ok(Some(connected(p))));
        repo.expect_list_people_to_enrich().returning(|_, _| {
            let with_email = |id| Person {
                email: Some(EmailAddress::new(format!("p{id}@example.com")).unwrap()),
                ..person(id, None)
            };
            Ok(vec![with_email(1), with_email(2)])
        });
        repo.expect_start_sync_run()
            .returning(|_, p| Ok(run(p)));
        repo.expect_apply_enrichment().never();
        repo.expect_finish_sync_run()
            .withf(|_, outcome, _| matches!(outcome, SyncOutcome::Failed { .. }))
            .times(1)
            .returning(|_, outcome, _| Ok(finished(Provider::Hunter, outcome)));

        let summary = enrich_batch(&repo, &admin_user(), &config(&server.base_url()))
            .await
            .unwrap();
        assert_eq!(
            summary,
            EnrichmentSummary {
                enriched: 0,
                failed: 1
            }
        );
    }

    #[test]
    fn history_is_admin_only() {
        let repo = MockRepository::new();
        assert!(matches!(
            load_sync_history(&repo, &member_user(), SyncHistoryQuery::default()),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn history_filters_by_provider() {
        let mut repo = MockRepository::new();
        repo.expect_list_sync_runs()
            .withf(|query| query.provider == Some(Provider::Hunter))
            .times(1)
            .returning(|_| Ok((0, Vec::new())));

        let query = SyncHistoryQuery {
            provider: Some("hunter".to_string()),
            page: None,
        };
        let data = load_sync_history(&repo, &admin_user(), query).unwrap();
        assert_eq!(data.provider.as_deref(), Some("hunter"));
    }
}
