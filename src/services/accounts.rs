//! Company management workflows.

use crate::domain::account::Account;
use crate::domain::auth::{ACCESS_ROLE, AuthenticatedUser};
use crate::domain::note::NoteTarget;
use crate::domain::types::AccountId;
use crate::dto::accounts::{AccountDetailData, AccountsPageData, AccountsQuery};
use crate::forms::accounts::{AccountForm, AccountPayload};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    AccountListQuery, AccountReader, AccountWriter, DealListQuery, DealReader, NoteReader,
    PersonListQuery, PersonReader, UserReader,
};
use crate::services::{ServiceError, ServiceResult, ensure_role, normalize_search};

pub fn load_accounts_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: AccountsQuery,
) -> ServiceResult<AccountsPageData>
where
    R: AccountReader + UserReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let page = query.page.unwrap_or(1).max(1);
    let search_query = normalize_search(query.q);

    let mut list_query = AccountListQuery::new(tenant_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = &search_query {
        list_query = list_query.search(term.clone());
    }

    let (total, accounts) = repo.list_accounts(list_query).map_err(|err| {
        log::error!("Failed to list accounts: {err}");
        err
    })?;

    Ok(AccountsPageData {
        accounts: Paginated::from_total(accounts, page, total),
        search_query,
        team: repo.list_team_members(tenant_id)?,
    })
}

pub fn load_account_detail<R>(
    repo: &R,
    user: &AuthenticatedUser,
    account_id: i32,
) -> ServiceResult<AccountDetailData>
where
    R: AccountReader + PersonReader + DealReader + NoteReader + UserReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let account = repo
        .get_account_by_id(AccountId::new(account_id)?, tenant_id)?
        .ok_or(ServiceError::NotFound)?;

    let mut people_query = PersonListQuery::new(tenant_id).account(account.id);
    if let Some(owner) = user.visibility_owner()? {
        people_query = people_query.owner(owner);
    }
    let (_, people) = repo.list_people(people_query)?;
    let (_, deals) = repo.list_deals(DealListQuery::new(tenant_id).account(account.id))?;

    let owner = match account.owner_id {
        Some(owner_id) => repo.get_team_member(owner_id, tenant_id)?,
        None => None,
    };

    Ok(AccountDetailData {
        notes: repo.list_notes(tenant_id, NoteTarget::Account(account.id))?,
        team: repo.list_team_members(tenant_id)?,
        account,
        owner,
        people,
        deals,
    })
}

pub fn create_account<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AccountForm,
) -> ServiceResult<Account>
where
    R: AccountWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let payload = AccountPayload::try_from(form)?;
    let new_account = payload.into_new_account(user.tenant_id()?);

    let account = repo.create_account(&new_account).map_err(|err| {
        log::error!("Failed to create account: {err}");
        err
    })?;

    Ok(account)
}

pub fn update_account<R>(
    repo: &R,
    user: &AuthenticatedUser,
    account_id: i32,
    form: AccountForm,
) -> ServiceResult<Account>
where
    R: AccountReader + AccountWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    let tenant_id = user.tenant_id()?;
    let account = repo
        .get_account_by_id(AccountId::new(account_id)?, tenant_id)?
        .ok_or(ServiceError::NotFound)?;

    let updates = AccountPayload::try_from(form)?.into_update();

    Ok(repo.update_account(account.id, tenant_id, &updates)?)
}

/// Deletes the account; linked contacts and deals keep existing unlinked.
pub fn delete_account<R>(repo: &R, user: &AuthenticatedUser, account_id: i32) -> ServiceResult<()>
where
    R: AccountWriter + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    repo.delete_account(AccountId::new(account_id)?, user.tenant_id()?)
        .map_err(|err| {
            log::error!("Failed to delete account {account_id}: {err}");
            err
        })?;

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::types::{AccountName, CompanyDomain, TenantId, UserId};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{member_user, outsider_user};

    fn account() -> Account {
        let now = Utc::now().naive_utc();
        Account {
            id: AccountId::new(4).unwrap(),
            tenant_id: TenantId::new(10).unwrap(),
            name: AccountName::new("Acme").unwrap(),
            domain: Some(CompanyDomain::new("acme.com").unwrap()),
            industry: None,
            website: None,
            employees: Some(120),
            owner_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn outsiders_cannot_create_accounts() {
        let repo = MockRepository::new();
        let form = AccountForm {
            name: "Acme".to_string(),
            ..AccountForm::default()
        };
        assert!(matches!(
            create_account(&repo, &outsider_user(), form),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn create_normalizes_domain() {
        let mut repo = MockRepository::new();
        repo.expect_create_account()
            .withf(|new| new.domain.as_ref().map(|d| d.as_str()) == Some("acme.com"))
            .times(1)
            .returning(|_| Ok(account()));

        let form = AccountForm {
            name: "Acme".to_string(),
            domain: Some("https://www.Acme.com/".to_string()),
            ..AccountForm::default()
        };
        let created = create_account(&repo, &member_user(), form).unwrap();
        assert_eq!(created.name.as_str(), "Acme");
    }

    #[test]
    fn detail_lists_only_owned_people_for_members() {
        let mut repo = MockRepository::new();
        repo.expect_get_account_by_id()
            .returning(|_, _| Ok(Some(account())));
        repo.expect_list_people()
            .withf(|query| {
                query.account_id == Some(AccountId::new(4).unwrap())
                    && query.owner_id == Some(UserId::new(2).unwrap())
            })
            .times(1)
            .returning(|_| Ok((0, Vec::new())));
        repo.expect_list_deals().returning(|_| Ok((0, Vec::new())));
        repo.expect_list_notes().returning(|_, _| Ok(Vec::new()));
        repo.expect_list_team_members().returning(|_| Ok(Vec::new()));

        let data = load_account_detail(&repo, &member_user(), 4).unwrap();
        assert_eq!(data.account.id.get(), 4);
        assert!(data.owner.is_none());
    }

    #[test]
    fn missing_account_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_account_by_id().returning(|_, _| Ok(None));

        assert!(matches!(
            update_account(&repo, &member_user(), 9, AccountForm::default()),
            Err(ServiceError::NotFound)
        ));
    }
}
