//! Persistence traits and their Diesel implementation.
//!
//! Every method that takes an entity id also takes the caller's [`TenantId`]
//! and filters on it, so one tenant can never read or touch another tenant's
//! rows through this layer.

use chrono::NaiveDateTime;

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::account::{Account, NewAccount, UpdateAccount};
use crate::domain::activity::{Activity, ActivityType, NewActivity};
use crate::domain::automation::{AutomationRule, AutomationSettings};
use crate::domain::campaign::{Campaign, NewCampaign};
use crate::domain::dashboard::DashboardStats;
use crate::domain::deal::{Deal, DealStage, NewDeal, UpdateDeal};
use crate::domain::integration::{Integration, NewIntegration, Provider};
use crate::domain::note::{NewNote, Note, NoteTarget};
use crate::domain::person::{NewPerson, Person, PersonEnrichment, PersonStatus, UpdatePerson};
use crate::domain::scoring::{Points, ScoreInput, ScoringCriterion, ScoringWeights};
use crate::domain::sequence::{
    Enrollment, EnrollmentProgress, EnrollmentStatus, NewEnrollment, NewSequence,
    NewSequenceStep, Sequence, SequenceStatus, SequenceStep,
};
use crate::domain::sync::{SyncOutcome, SyncRun};
use crate::domain::tag::{NewTag, Tag};
use crate::domain::task::{NewTask, Task, TaskFilter, UpdateTask};
use crate::domain::tenant::{NewTenant, NewTenantAdmin, Tenant};
use crate::domain::types::{
    AccountId, CampaignId, CompanyDomain, DealId, EmailAddress, EnrollmentId, NoteId, PersonId,
    SequenceId, SequenceName, SequenceStepId, SyncRunId, TagId, TaskId, TenantId, UserId,
    WebhookEventId,
};
use crate::domain::user::{BackupCode, NewUser, Role, User};
use crate::domain::webhook::{NewWebhookEvent, WebhookEvent, WebhookStatus};
use crate::repository::errors::RepositoryResult;

pub mod account;
pub mod activity;
pub mod campaign;
pub mod dashboard;
pub mod deal;
pub mod errors;
pub mod integration;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod note;
pub mod person;
pub mod sequence;
pub mod settings;
pub mod sync_run;
pub mod tag;
pub mod task;
pub mod tenant;
pub mod user;
pub mod webhook;

/// Diesel-backed repository sharing one connection pool.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Row offset of the first item on the page; page numbers start at 1.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.per_page as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

#[derive(Debug, Clone)]
pub struct PersonListQuery {
    pub tenant_id: TenantId,
    pub search: Option<String>,
    pub status: Option<PersonStatus>,
    pub tag_id: Option<TagId>,
    pub account_id: Option<AccountId>,
    pub owner_id: Option<UserId>,
    pub pagination: Option<Pagination>,
}

impl PersonListQuery {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            search: None,
            status: None,
            tag_id: None,
            account_id: None,
            owner_id: None,
            pagination: None,
        }
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn status(mut self, status: PersonStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn tag(mut self, tag_id: TagId) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Restricts results to contacts owned by `owner_id`.
    pub fn owner(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct AccountListQuery {
    pub tenant_id: TenantId,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl AccountListQuery {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            search: None,
            pagination: None,
        }
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct DealListQuery {
    pub tenant_id: TenantId,
    pub stage: Option<DealStage>,
    pub open_only: bool,
    pub account_id: Option<AccountId>,
    pub person_id: Option<PersonId>,
    pub pagination: Option<Pagination>,
}

impl DealListQuery {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            stage: None,
            open_only: false,
            account_id: None,
            person_id: None,
            pagination: None,
        }
    }

    pub fn stage(mut self, stage: DealStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn open_only(mut self) -> Self {
        self.open_only = true;
        self
    }

    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn person(mut self, person_id: PersonId) -> Self {
        self.person_id = Some(person_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct TaskListQuery {
    pub tenant_id: TenantId,
    pub filter: TaskFilter,
    /// Reference time for the overdue filter.
    pub now: NaiveDateTime,
    pub assignee_id: Option<UserId>,
    pub person_id: Option<PersonId>,
    pub deal_id: Option<DealId>,
    pub pagination: Option<Pagination>,
}

impl TaskListQuery {
    pub fn new(tenant_id: TenantId, now: NaiveDateTime) -> Self {
        Self {
            tenant_id,
            filter: TaskFilter::All,
            now,
            assignee_id: None,
            person_id: None,
            deal_id: None,
            pagination: None,
        }
    }

    pub fn filter(mut self, filter: TaskFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    pub fn person(mut self, person_id: PersonId) -> Self {
        self.person_id = Some(person_id);
        self
    }

    pub fn deal(mut self, deal_id: DealId) -> Self {
        self.deal_id = Some(deal_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct ActivityListQuery {
    pub tenant_id: TenantId,
    pub person_id: Option<PersonId>,
    /// Only activities of contacts owned by this user.
    pub owner_id: Option<UserId>,
    pub activity_type: Option<ActivityType>,
    pub pagination: Option<Pagination>,
}

impl ActivityListQuery {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            person_id: None,
            owner_id: None,
            activity_type: None,
            pagination: None,
        }
    }

    pub fn person(mut self, person_id: PersonId) -> Self {
        self.person_id = Some(person_id);
        self
    }

    pub fn owner(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn activity_type(mut self, activity_type: ActivityType) -> Self {
        self.activity_type = Some(activity_type);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct WebhookListQuery {
    pub tenant_id: TenantId,
    pub status: Option<WebhookStatus>,
    pub pagination: Option<Pagination>,
}

impl WebhookListQuery {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            status: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: WebhookStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct SyncRunListQuery {
    pub tenant_id: TenantId,
    pub provider: Option<Provider>,
    pub pagination: Option<Pagination>,
}

impl SyncRunListQuery {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            provider: None,
            pagination: None,
        }
    }

    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Active enrollment whose next step is due, with everything needed to send it.
#[derive(Debug, Clone, PartialEq)]
pub struct DueEnrollment {
    pub enrollment: Enrollment,
    pub sequence: Sequence,
    pub person: Person,
    pub account: Option<Account>,
}

pub trait TenantReader {
    fn get_tenant_by_id(&self, id: TenantId) -> RepositoryResult<Option<Tenant>>;
    fn tenant_slug_exists(&self, slug: &str) -> RepositoryResult<bool>;
}

pub trait TenantWriter {
    /// Creates the tenant and its first admin in one transaction.
    fn create_tenant_with_admin(
        &self,
        tenant: &NewTenant,
        admin: &NewTenantAdmin,
    ) -> RepositoryResult<(Tenant, User)>;
}

pub trait UserReader {
    /// Unscoped lookup used while signing in.
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<User>>;
    fn get_team_member(&self, id: UserId, tenant_id: TenantId) -> RepositoryResult<Option<User>>;
    fn list_team_members(&self, tenant_id: TenantId) -> RepositoryResult<Vec<User>>;
    fn list_unused_backup_codes(&self, user_id: UserId) -> RepositoryResult<Vec<BackupCode>>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    fn update_user_role(
        &self,
        id: UserId,
        tenant_id: TenantId,
        role: Role,
    ) -> RepositoryResult<User>;
    fn set_totp(&self, id: UserId, secret: Option<String>, enabled: bool)
    -> RepositoryResult<User>;
    /// Drops every existing backup code of the user and stores `code_hashes`.
    fn replace_backup_codes(&self, user_id: UserId, code_hashes: &[String])
    -> RepositoryResult<usize>;
    fn mark_backup_code_used(&self, code_id: i32, used_at: NaiveDateTime)
    -> RepositoryResult<()>;
}

pub trait PersonReader {
    fn get_person_by_id(&self, id: PersonId, tenant_id: TenantId)
    -> RepositoryResult<Option<Person>>;
    fn get_person_by_email(
        &self,
        email: &EmailAddress,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Person>>;
    fn list_people(&self, query: PersonListQuery) -> RepositoryResult<(usize, Vec<Person>)>;
    /// People with an unverified email, or with no email but a linked account.
    fn list_people_to_enrich(
        &self,
        tenant_id: TenantId,
        limit: i64,
    ) -> RepositoryResult<Vec<Person>>;
    fn load_score_input(&self, id: PersonId, tenant_id: TenantId)
    -> RepositoryResult<ScoreInput>;
}

pub trait PersonWriter {
    fn create_person(&self, new_person: &NewPerson) -> RepositoryResult<Person>;
    /// Inserts every contact, skipping ones whose email already exists.
    fn create_people(&self, new_people: &[NewPerson]) -> RepositoryResult<usize>;
    fn update_person(
        &self,
        id: PersonId,
        tenant_id: TenantId,
        updates: &UpdatePerson,
    ) -> RepositoryResult<Person>;
    fn delete_person(&self, id: PersonId, tenant_id: TenantId) -> RepositoryResult<()>;
    fn assign_people(
        &self,
        tenant_id: TenantId,
        person_ids: &[PersonId],
        owner_id: UserId,
    ) -> RepositoryResult<usize>;
    fn set_person_status(
        &self,
        id: PersonId,
        tenant_id: TenantId,
        status: PersonStatus,
    ) -> RepositoryResult<()>;
    fn set_person_score(&self, id: PersonId, tenant_id: TenantId, score: i32)
    -> RepositoryResult<()>;
    fn set_amplemarket_id(
        &self,
        id: PersonId,
        tenant_id: TenantId,
        amplemarket_id: &str,
    ) -> RepositoryResult<()>;
    fn apply_enrichment(
        &self,
        id: PersonId,
        tenant_id: TenantId,
        enrichment: &PersonEnrichment,
    ) -> RepositoryResult<Person>;
    fn tag_person(&self, id: PersonId, tag_id: TagId) -> RepositoryResult<()>;
    fn untag_person(&self, id: PersonId, tag_id: TagId) -> RepositoryResult<()>;
}

pub trait AccountReader {
    fn get_account_by_id(&self, id: AccountId, tenant_id: TenantId)
    -> RepositoryResult<Option<Account>>;
    fn get_account_by_domain(
        &self,
        domain: &CompanyDomain,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Account>>;
    fn list_accounts(&self, query: AccountListQuery) -> RepositoryResult<(usize, Vec<Account>)>;
}

pub trait AccountWriter {
    fn create_account(&self, new_account: &NewAccount) -> RepositoryResult<Account>;
    fn update_account(
        &self,
        id: AccountId,
        tenant_id: TenantId,
        updates: &UpdateAccount,
    ) -> RepositoryResult<Account>;
    fn delete_account(&self, id: AccountId, tenant_id: TenantId) -> RepositoryResult<()>;
}

pub trait DealReader {
    fn get_deal_by_id(&self, id: DealId, tenant_id: TenantId) -> RepositoryResult<Option<Deal>>;
    fn list_deals(&self, query: DealListQuery) -> RepositoryResult<(usize, Vec<Deal>)>;
}

pub trait DealWriter {
    fn create_deal(&self, new_deal: &NewDeal) -> RepositoryResult<Deal>;
    fn update_deal(
        &self,
        id: DealId,
        tenant_id: TenantId,
        updates: &UpdateDeal,
    ) -> RepositoryResult<Deal>;
    fn set_deal_stage(
        &self,
        id: DealId,
        tenant_id: TenantId,
        stage: DealStage,
    ) -> RepositoryResult<Deal>;
    fn delete_deal(&self, id: DealId, tenant_id: TenantId) -> RepositoryResult<()>;
}

pub trait TaskReader {
    fn get_task_by_id(&self, id: TaskId, tenant_id: TenantId) -> RepositoryResult<Option<Task>>;
    fn list_tasks(&self, query: TaskListQuery) -> RepositoryResult<(usize, Vec<Task>)>;
    /// Open tasks with a due date that have not been pushed to a calendar yet.
    fn list_tasks_to_schedule(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Task>>;
}

pub trait TaskWriter {
    fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task>;
    fn update_task(
        &self,
        id: TaskId,
        tenant_id: TenantId,
        updates: &UpdateTask,
    ) -> RepositoryResult<Task>;
    /// Sets or clears the completion timestamp.
    fn set_task_completed(
        &self,
        id: TaskId,
        tenant_id: TenantId,
        completed_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<Task>;
    fn set_calendar_event_id(
        &self,
        id: TaskId,
        tenant_id: TenantId,
        event_id: &str,
    ) -> RepositoryResult<()>;
    fn delete_task(&self, id: TaskId, tenant_id: TenantId) -> RepositoryResult<()>;
}

pub trait NoteReader {
    fn get_note_by_id(&self, id: NoteId, tenant_id: TenantId) -> RepositoryResult<Option<Note>>;
    fn list_notes(&self, tenant_id: TenantId, target: NoteTarget) -> RepositoryResult<Vec<Note>>;
}

pub trait NoteWriter {
    fn create_note(&self, new_note: &NewNote) -> RepositoryResult<Note>;
    fn delete_note(&self, id: NoteId, tenant_id: TenantId) -> RepositoryResult<()>;
}

pub trait ActivityReader {
    fn list_activities(&self, query: ActivityListQuery)
    -> RepositoryResult<(usize, Vec<Activity>)>;
    fn person_has_activity(
        &self,
        person_id: PersonId,
        activity_type: ActivityType,
    ) -> RepositoryResult<bool>;
}

pub trait ActivityWriter {
    fn create_activity(&self, new_activity: &NewActivity) -> RepositoryResult<Activity>;
}

pub trait TagReader {
    fn get_tag_by_id(&self, id: TagId, tenant_id: TenantId) -> RepositoryResult<Option<Tag>>;
    fn list_tags(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Tag>>;
    fn list_person_tags(&self, person_id: PersonId) -> RepositoryResult<Vec<Tag>>;
}

pub trait TagWriter {
    fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag>;
    fn update_tag(&self, id: TagId, tenant_id: TenantId, updates: &NewTag)
    -> RepositoryResult<Tag>;
    fn delete_tag(&self, id: TagId, tenant_id: TenantId) -> RepositoryResult<()>;
}

pub trait SequenceReader {
    fn get_sequence_by_id(
        &self,
        id: SequenceId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Sequence>>;
    fn list_sequences(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Sequence>>;
    /// Steps ordered by position.
    fn list_steps(&self, sequence_id: SequenceId) -> RepositoryResult<Vec<SequenceStep>>;
    fn get_enrollment_by_id(
        &self,
        id: EnrollmentId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Enrollment>>;
    fn list_enrollments(
        &self,
        sequence_id: SequenceId,
    ) -> RepositoryResult<Vec<(Enrollment, Person)>>;
    fn list_person_enrollments(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<(Enrollment, Sequence)>>;
    fn list_enrolled_person_ids(&self, sequence_id: SequenceId)
    -> RepositoryResult<Vec<PersonId>>;
    /// Active enrollments of active sequences due at `now`, across tenants.
    fn list_due_enrollments(&self, now: NaiveDateTime) -> RepositoryResult<Vec<DueEnrollment>>;
}

pub trait SequenceWriter {
    fn create_sequence(&self, new_sequence: &NewSequence) -> RepositoryResult<Sequence>;
    fn rename_sequence(
        &self,
        id: SequenceId,
        tenant_id: TenantId,
        name: &SequenceName,
    ) -> RepositoryResult<Sequence>;
    fn set_sequence_status(
        &self,
        id: SequenceId,
        tenant_id: TenantId,
        status: SequenceStatus,
    ) -> RepositoryResult<Sequence>;
    fn delete_sequence(&self, id: SequenceId, tenant_id: TenantId) -> RepositoryResult<()>;
    /// Appends a step after the current last position.
    fn add_step(&self, new_step: &NewSequenceStep) -> RepositoryResult<SequenceStep>;
    fn update_step(
        &self,
        id: SequenceStepId,
        updates: &NewSequenceStep,
    ) -> RepositoryResult<SequenceStep>;
    fn delete_step(&self, id: SequenceStepId, sequence_id: SequenceId) -> RepositoryResult<()>;
    fn create_enrollments(&self, enrollments: &[NewEnrollment]) -> RepositoryResult<usize>;
    fn update_enrollment_progress(
        &self,
        id: EnrollmentId,
        progress: &EnrollmentProgress,
    ) -> RepositoryResult<()>;
    /// Moves every active enrollment of the person to `status`.
    fn finish_person_enrollments(
        &self,
        person_id: PersonId,
        status: EnrollmentStatus,
    ) -> RepositoryResult<usize>;
}

pub trait CampaignReader {
    fn get_campaign_by_id(
        &self,
        id: CampaignId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Campaign>>;
    fn list_campaigns(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Campaign>>;
}

pub trait CampaignWriter {
    fn create_campaign(&self, new_campaign: &NewCampaign) -> RepositoryResult<Campaign>;
    fn update_campaign(
        &self,
        id: CampaignId,
        updates: &NewCampaign,
    ) -> RepositoryResult<Campaign>;
    fn mark_campaign_launched(
        &self,
        id: CampaignId,
        tenant_id: TenantId,
        launched_at: NaiveDateTime,
    ) -> RepositoryResult<Campaign>;
    fn delete_campaign(&self, id: CampaignId, tenant_id: TenantId) -> RepositoryResult<()>;
}

pub trait WebhookReader {
    fn get_webhook_event(
        &self,
        id: WebhookEventId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<WebhookEvent>>;
    fn list_webhook_events(
        &self,
        query: WebhookListQuery,
    ) -> RepositoryResult<(usize, Vec<WebhookEvent>)>;
}

pub trait WebhookWriter {
    fn create_webhook_event(&self, event: &NewWebhookEvent) -> RepositoryResult<WebhookEvent>;
    fn set_webhook_status(
        &self,
        id: WebhookEventId,
        status: WebhookStatus,
        error: Option<String>,
        processed_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<WebhookEvent>;
}

pub trait SyncRunReader {
    fn list_sync_runs(&self, query: SyncRunListQuery) -> RepositoryResult<(usize, Vec<SyncRun>)>;
}

pub trait SyncRunWriter {
    fn start_sync_run(&self, tenant_id: TenantId, provider: Provider) -> RepositoryResult<SyncRun>;
    fn finish_sync_run(
        &self,
        id: SyncRunId,
        outcome: &SyncOutcome,
        finished_at: NaiveDateTime,
    ) -> RepositoryResult<SyncRun>;
}

pub trait IntegrationReader {
    fn get_integration(
        &self,
        tenant_id: TenantId,
        provider: Provider,
    ) -> RepositoryResult<Option<Integration>>;
    fn get_integration_by_webhook_token(&self, token: &str)
    -> RepositoryResult<Option<Integration>>;
    fn list_integrations(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Integration>>;
}

pub trait IntegrationWriter {
    /// Inserts or replaces the credential of the tenant for the provider.
    fn save_integration(&self, integration: &NewIntegration) -> RepositoryResult<Integration>;
    fn delete_integration(&self, tenant_id: TenantId, provider: Provider)
    -> RepositoryResult<()>;
}

pub trait SettingsReader {
    fn load_automation_settings(&self, tenant_id: TenantId)
    -> RepositoryResult<AutomationSettings>;
    fn load_scoring_weights(&self, tenant_id: TenantId) -> RepositoryResult<ScoringWeights>;
}

pub trait SettingsWriter {
    fn set_automation_rule(
        &self,
        tenant_id: TenantId,
        rule: AutomationRule,
        enabled: bool,
    ) -> RepositoryResult<()>;
    fn set_scoring_points(
        &self,
        tenant_id: TenantId,
        criterion: ScoringCriterion,
        points: Points,
    ) -> RepositoryResult<()>;
}

pub trait DashboardReader {
    /// `owner_id` restricts the contact count to one team member.
    fn dashboard_stats(
        &self,
        tenant_id: TenantId,
        owner_id: Option<UserId>,
        now: NaiveDateTime,
    ) -> RepositoryResult<DashboardStats>;
}
