use chrono::Utc;
use onetwenty_crm::auth::token::claims_for;
use onetwenty_crm::domain::auth::AuthenticatedUser;
use onetwenty_crm::domain::deal::DealStage;
use onetwenty_crm::domain::person::{NewPerson, Person, PersonStatus};
use onetwenty_crm::domain::task::TaskFilter;
use onetwenty_crm::domain::tenant::{NewTenant, NewTenantAdmin, Tenant};
use onetwenty_crm::domain::types::{EmailAddress, PersonName, TenantName, UserName};
use onetwenty_crm::domain::user::{NewUser, Role, User};
use onetwenty_crm::forms::deals::DealForm;
use onetwenty_crm::forms::people::PersonForm;
use onetwenty_crm::forms::tasks::TaskForm;
use onetwenty_crm::repository::{
    DealListQuery, DealReader, DieselRepository, PersonListQuery, PersonReader, PersonWriter,
    TaskListQuery, TaskReader, TenantWriter, UserWriter,
};
use onetwenty_crm::services::ServiceError;
use onetwenty_crm::services::{deals, people, tasks};

mod common;

fn create_tenant(repo: &DieselRepository, name: &str, admin_email: &str) -> (Tenant, User) {
    let tenant = NewTenant::new(TenantName::new(name).unwrap()).unwrap();
    let admin = NewTenantAdmin {
        email: EmailAddress::new(admin_email).unwrap(),
        name: UserName::new("Admin").unwrap(),
        password_hash: "hash".to_string(),
    };
    repo.create_tenant_with_admin(&tenant, &admin).unwrap()
}

fn create_person(repo: &DieselRepository, tenant: &Tenant, owner: &User, email: &str) -> Person {
    let new_person = NewPerson::new(
        tenant.id,
        PersonName::new("Ada").unwrap(),
        PersonName::new("Lovelace").unwrap(),
    )
    .email(EmailAddress::new(email).unwrap())
    .owner(owner.id);
    repo.create_person(&new_person).unwrap()
}

fn session(user: &User) -> AuthenticatedUser {
    claims_for(user, 1)
}

#[test]
fn test_deal_cannot_reference_another_tenants_contact() {
    let test_db = common::TestDb::new("test_deal_cannot_reference_another_tenants_contact.db");
    let repo = DieselRepository::new(test_db.pool());
    let (acme, acme_admin) = create_tenant(&repo, "Acme", "admin@acme.com");
    let (globex, globex_admin) = create_tenant(&repo, "Globex", "admin@globex.com");
    let grace = create_person(&repo, &globex, &globex_admin, "grace@globex.com");

    let form = DealForm {
        name: "Poached deal".to_string(),
        person_id: Some(grace.id.get().to_string()),
        ..DealForm::default()
    };
    let result = deals::create_deal(&repo, &session(&acme_admin), form);

    assert!(matches!(result, Err(ServiceError::Form(_))));
    let (total, _) = repo.list_deals(DealListQuery::new(acme.id)).unwrap();
    assert_eq!(total, 0);
}

#[test]
fn test_contact_cannot_reference_another_tenants_owner() {
    let test_db = common::TestDb::new("test_contact_cannot_reference_another_tenants_owner.db");
    let repo = DieselRepository::new(test_db.pool());
    let (acme, acme_admin) = create_tenant(&repo, "Acme", "admin@acme.com");
    let (_, globex_admin) = create_tenant(&repo, "Globex", "admin@globex.com");

    let form = PersonForm {
        first_name: "Alan".to_string(),
        last_name: "Turing".to_string(),
        owner_id: Some(globex_admin.id.get().to_string()),
        ..PersonForm::default()
    };
    let result = people::create_person(&repo, &session(&acme_admin), form);

    assert!(matches!(result, Err(ServiceError::Form(_))));
    let (total, _) = repo.list_people(PersonListQuery::new(acme.id)).unwrap();
    assert_eq!(total, 0);
}

#[test]
fn test_member_cannot_attach_task_to_colleagues_contact() {
    let test_db = common::TestDb::new("test_member_cannot_attach_task_to_colleagues_contact.db");
    let repo = DieselRepository::new(test_db.pool());
    let (acme, acme_admin) = create_tenant(&repo, "Acme", "admin@acme.com");
    let member = repo
        .create_user(&NewUser {
            tenant_id: acme.id,
            email: EmailAddress::new("member@acme.com").unwrap(),
            name: UserName::new("Member").unwrap(),
            password_hash: "hash".to_string(),
            role: Role::Member,
        })
        .unwrap();
    let ada = create_person(&repo, &acme, &acme_admin, "ada@acme.com");

    let form = TaskForm {
        title: "Call Ada".to_string(),
        person_id: Some(ada.id.get().to_string()),
        ..TaskForm::default()
    };
    let result = tasks::create_task(&repo, &session(&member), form);

    assert!(matches!(result, Err(ServiceError::Form(_))));
    let (total, _) = repo
        .list_tasks(TaskListQuery::new(acme.id, Utc::now().naive_utc()))
        .unwrap();
    assert_eq!(total, 0);
}

#[test]
fn test_winning_from_edit_form_onboards_the_customer() {
    let test_db = common::TestDb::new("test_winning_from_edit_form_onboards_the_customer.db");
    let repo = DieselRepository::new(test_db.pool());
    let (acme, acme_admin) = create_tenant(&repo, "Acme", "admin@acme.com");
    let ada = create_person(&repo, &acme, &acme_admin, "ada@acme.com");
    let user = session(&acme_admin);

    let deal = deals::create_deal(
        &repo,
        &user,
        DealForm {
            name: "Acme renewal".to_string(),
            stage: Some("negotiation".to_string()),
            amount: "5000".to_string(),
            person_id: Some(ada.id.get().to_string()),
            ..DealForm::default()
        },
    )
    .unwrap();

    let saved = deals::update_deal(
        &repo,
        &user,
        deal.id.get(),
        DealForm {
            name: "Acme renewal".to_string(),
            stage: Some("won".to_string()),
            amount: "5000".to_string(),
            person_id: Some(ada.id.get().to_string()),
            ..DealForm::default()
        },
    )
    .unwrap();
    assert_eq!(saved.stage, DealStage::Won);

    let ada = repo.get_person_by_id(ada.id, acme.id).unwrap().unwrap();
    assert_eq!(ada.status, PersonStatus::Customer);

    let (onboarding, _) = repo
        .list_tasks(
            TaskListQuery::new(acme.id, Utc::now().naive_utc())
                .filter(TaskFilter::Open)
                .deal(deal.id),
        )
        .unwrap();
    assert_eq!(onboarding, 1);

    let stored = repo.get_deal_by_id(deal.id, acme.id).unwrap().unwrap();
    assert_eq!(stored.stage, DealStage::Won);
}
