//! Mock repository implementations for isolating services in tests.

use chrono::NaiveDateTime;
use mockall::mock;

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
use crate::domain::task::{NewTask, Task, UpdateTask};
use crate::domain::tenant::{NewTenant, NewTenantAdmin, Tenant};
use crate::domain::types::{
    AccountId, CampaignId, CompanyDomain, DealId, EmailAddress, EnrollmentId, NoteId, PersonId,
    SequenceId, SequenceName, SequenceStepId, SyncRunId, TagId, TaskId, TenantId, UserId,
    WebhookEventId,
};
use crate::domain::user::{BackupCode, NewUser, Role, User};
use crate::domain::webhook::{NewWebhookEvent, WebhookEvent, WebhookStatus};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    AccountListQuery, AccountReader, AccountWriter, ActivityListQuery, ActivityReader,
    ActivityWriter, CampaignReader, CampaignWriter, DashboardReader, DealListQuery, DealReader,
    DealWriter, DueEnrollment, IntegrationReader, IntegrationWriter, NoteReader, NoteWriter,
    PersonListQuery, PersonReader, PersonWriter, SequenceReader, SequenceWriter, SettingsReader,
    SettingsWriter, SyncRunListQuery, SyncRunReader, SyncRunWriter, TagReader, TagWriter,
    TaskListQuery, TaskReader, TaskWriter, TenantReader, TenantWriter, UserReader, UserWriter,
    WebhookListQuery, WebhookReader, WebhookWriter,
};

mock! {
    pub Repository {}

    impl TenantReader for Repository {
        fn get_tenant_by_id(&self, id: TenantId) -> RepositoryResult<Option<Tenant>>;
        fn tenant_slug_exists(&self, slug: &str) -> RepositoryResult<bool>;
    }

    impl TenantWriter for Repository {
        fn create_tenant_with_admin(
            &self,
            tenant: &NewTenant,
            admin: &NewTenantAdmin,
        ) -> RepositoryResult<(Tenant, User)>;
    }

    impl UserReader for Repository {
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<User>>;
        fn get_team_member(&self, id: UserId, tenant_id: TenantId) -> RepositoryResult<Option<User>>;
        fn list_team_members(&self, tenant_id: TenantId) -> RepositoryResult<Vec<User>>;
        fn list_unused_backup_codes(&self, user_id: UserId) -> RepositoryResult<Vec<BackupCode>>;
    }

    impl UserWriter for Repository {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn update_user_role(
            &self,
            id: UserId,
            tenant_id: TenantId,
            role: Role,
        ) -> RepositoryResult<User>;
        fn set_totp(&self, id: UserId, secret: Option<String>, enabled: bool)
        -> RepositoryResult<User>;
        fn replace_backup_codes(&self, user_id: UserId, code_hashes: &[String])
        -> RepositoryResult<usize>;
        fn mark_backup_code_used(&self, code_id: i32, used_at: NaiveDateTime)
        -> RepositoryResult<()>;
    }

    impl PersonReader for Repository {
        fn get_person_by_id(&self, id: PersonId, tenant_id: TenantId)
        -> RepositoryResult<Option<Person>>;
        fn get_person_by_email(
            &self,
            email: &EmailAddress,
            tenant_id: TenantId,
        ) -> RepositoryResult<Option<Person>>;
        fn list_people(&self, query: PersonListQuery) -> RepositoryResult<(usize, Vec<Person>)>;
        fn list_people_to_enrich(
            &self,
            tenant_id: TenantId,
            limit: i64,
        ) -> RepositoryResult<Vec<Person>>;
        fn load_score_input(&self, id: PersonId, tenant_id: TenantId)
        -> RepositoryResult<ScoreInput>;
    }

    impl PersonWriter for Repository {
        fn create_person(&self, new_person: &NewPerson) -> RepositoryResult<Person>;
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

    impl AccountReader for Repository {
        fn get_account_by_id(&self, id: AccountId, tenant_id: TenantId)
        -> RepositoryResult<Option<Account>>;
        fn get_account_by_domain(
            &self,
            domain: &CompanyDomain,
            tenant_id: TenantId,
        ) -> RepositoryResult<Option<Account>>;
        fn list_accounts(&self, query: AccountListQuery) -> RepositoryResult<(usize, Vec<Account>)>;
    }

    impl AccountWriter for Repository {
        fn create_account(&self, new_account: &NewAccount) -> RepositoryResult<Account>;
        fn update_account(
            &self,
            id: AccountId,
            tenant_id: TenantId,
            updates: &UpdateAccount,
        ) -> RepositoryResult<Account>;
        fn delete_account(&self, id: AccountId, tenant_id: TenantId) -> RepositoryResult<()>;
    }

    impl DealReader for Repository {
        fn get_deal_by_id(&self, id: DealId, tenant_id: TenantId) -> RepositoryResult<Option<Deal>>;
        fn list_deals(&self, query: DealListQuery) -> RepositoryResult<(usize, Vec<Deal>)>;
    }

    impl DealWriter for Repository {
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

    impl TaskReader for Repository {
        fn get_task_by_id(&self, id: TaskId, tenant_id: TenantId) -> RepositoryResult<Option<Task>>;
        fn list_tasks(&self, query: TaskListQuery) -> RepositoryResult<(usize, Vec<Task>)>;
        fn list_tasks_to_schedule(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Task>>;
    }

    impl TaskWriter for Repository {
        fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task>;
        fn update_task(
            &self,
            id: TaskId,
            tenant_id: TenantId,
            updates: &UpdateTask,
        ) -> RepositoryResult<Task>;
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

    impl NoteReader for Repository {
        fn get_note_by_id(&self, id: NoteId, tenant_id: TenantId) -> RepositoryResult<Option<Note>>;
        fn list_notes(&self, tenant_id: TenantId, target: NoteTarget) -> RepositoryResult<Vec<Note>>;
    }

    impl NoteWriter for Repository {
        fn create_note(&self, new_note: &NewNote) -> RepositoryResult<Note>;
        fn delete_note(&self, id: NoteId, tenant_id: TenantId) -> RepositoryResult<()>;
    }

    impl ActivityReader for Repository {
        fn list_activities(&self, query: ActivityListQuery)
        -> RepositoryResult<(usize, Vec<Activity>)>;
        fn person_has_activity(
            &self,
            person_id: PersonId,
            activity_type: ActivityType,
        ) -> RepositoryResult<bool>;
    }

    impl ActivityWriter for Repository {
        fn create_activity(&self, new_activity: &NewActivity) -> RepositoryResult<Activity>;
    }

    impl TagReader for Repository {
        fn get_tag_by_id(&self, id: TagId, tenant_id: TenantId) -> RepositoryResult<Option<Tag>>;
        fn list_tags(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Tag>>;
        fn list_person_tags(&self, person_id: PersonId) -> RepositoryResult<Vec<Tag>>;
    }

    impl TagWriter for Repository {
        fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag>;
        fn update_tag(&self, id: TagId, tenant_id: TenantId, updates: &NewTag)
        -> RepositoryResult<Tag>;
        fn delete_tag(&self, id: TagId, tenant_id: TenantId) -> RepositoryResult<()>;
    }

    impl SequenceReader for Repository {
        fn get_sequence_by_id(
            &self,
            id: SequenceId,
            tenant_id: TenantId,
        ) -> RepositoryResult<Option<Sequence>>;
        fn list_sequences(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Sequence>>;
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
        fn list_due_enrollments(&self, now: NaiveDateTime) -> RepositoryResult<Vec<DueEnrollment>>;
    }

    impl SequenceWriter for Repository {
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
        fn finish_person_enrollments(
            &self,
            person_id: PersonId,
            status: EnrollmentStatus,
        ) -> RepositoryResult<usize>;
    }

    impl CampaignReader for Repository {
        fn get_campaign_by_id(
            &self,
            id: CampaignId,
            tenant_id: TenantId,
        ) -> RepositoryResult<Option<Campaign>>;
        fn list_campaigns(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Campaign>>;
    }

    impl CampaignWriter for Repository {
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

    impl WebhookReader for Repository {
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

    impl WebhookWriter for Repository {
        fn create_webhook_event(&self, event: &NewWebhookEvent) -> RepositoryResult<WebhookEvent>;
        fn set_webhook_status(
            &self,
            id: WebhookEventId,
            status: WebhookStatus,
            error: Option<String>,
            processed_at: Option<NaiveDateTime>,
        ) -> RepositoryResult<WebhookEvent>;
    }

    impl SyncRunReader for Repository {
        fn list_sync_runs(&self, query: SyncRunListQuery) -> RepositoryResult<(usize, Vec<SyncRun>)>;
    }

    impl SyncRunWriter for Repository {
        fn start_sync_run(&self, tenant_id: TenantId, provider: Provider) -> RepositoryResult<SyncRun>;
        fn finish_sync_run(
            &self,
            id: SyncRunId,
            outcome: &SyncOutcome,
            finished_at: NaiveDateTime,
        ) -> RepositoryResult<SyncRun>;
    }

    impl IntegrationReader for Repository {
        fn get_integration(
            &self,
            tenant_id: TenantId,
            provider: Provider,
        ) -> RepositoryResult<Option<Integration>>;
        fn get_integration_by_webhook_token(&self, token: &str)
        -> RepositoryResult<Option<Integration>>;
        fn list_integrations(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Integration>>;
    }

    impl IntegrationWriter for Repository {
        fn save_integration(&self, integration: &NewIntegration) -> RepositoryResult<Integration>;
        fn delete_integration(&self, tenant_id: TenantId, provider: Provider)
        -> RepositoryResult<()>;
    }

    impl SettingsReader for Repository {
        fn load_automation_settings(&self, tenant_id: TenantId)
        -> RepositoryResult<AutomationSettings>;
        fn load_scoring_weights(&self, tenant_id: TenantId) -> RepositoryResult<ScoringWeights>;
    }

    impl SettingsWriter for Repository {
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

    impl DashboardReader for Repository {
        fn dashboard_stats(
            &self,
            tenant_id: TenantId,
            owner_id: Option<UserId>,
            now: NaiveDateTime,
        ) -> RepositoryResult<DashboardStats>;
    }
}
