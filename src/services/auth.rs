//! Sign-in, registration and two-factor management.

use chrono::{DateTime, Utc};

use crate::auth::password::{
    generate_backup_codes, hash_password, normalize_backup_code, verify_password,
};
use crate::auth::totp::{generate_totp_secret, otpauth_url, qr_code_svg, verify_totp};
use crate::domain::auth::{ACCESS_ROLE, AuthenticatedUser};
use crate::domain::tenant::NewTenantAdmin;
use crate::domain::types::UserId;
use crate::domain::user::User;
use crate::dto::auth::{BackupCodesData, SecurityPageData, TotpSetupData};
use crate::forms::auth::{
    DisableTotpForm, SignInForm, SignInPayload, SignUpForm, SignUpPayload, TotpCodeForm,
    TwoFactorForm,
};
use crate::repository::{TenantReader, TenantWriter, UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult, conflict_on_violation, ensure_role};

const INVALID_CREDENTIALS: &str = "Invalid email or password.";
const INVALID_CODE: &str = "Invalid verification code.";
const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Result of a password check.
#[derive(Debug)]
pub enum SignInOutcome {
    /// Credentials are enough; the session can be established.
    Authenticated(User),
    /// A second factor is required for this user.
    TwoFactorRequired(UserId),
}

fn unix_time(now: DateTime<Utc>) -> u64 {
    u64::try_from(now.timestamp()).unwrap_or_default()
}

pub fn sign_in<R>(repo: &R, form: SignInForm) -> ServiceResult<SignInOutcome>
where
    R: UserReader + ?Sized,
{
    let payload =
        SignInPayload::try_from(form).map_err(|_| ServiceError::Form(INVALID_CREDENTIALS.into()))?;

    let user = repo
        .get_user_by_email(&payload.email)?
        .filter(|user| verify_password(&payload.password, &user.password_hash))
        .ok_or_else(|| {
            log::warn!("Failed sign-in attempt for {}", payload.email);
            ServiceError::Form(INVALID_CREDENTIALS.to_string())
        })?;

    if user.totp_enabled {
        Ok(SignInOutcome::TwoFactorRequired(user.id))
    } else {
        Ok(SignInOutcome::Authenticated(user))
    }
}

/// Completes a pending sign-in with a TOTP code or an unused backup code.
pub fn complete_two_factor<R>(
    repo: &R,
    pending_user_id: UserId,
    form: TwoFactorForm,
    now: DateTime<Utc>,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    let user = repo
        .get_user_by_id(pending_user_id)?
        .ok_or(ServiceError::Unauthorized)?;

    let secret = match (&user.totp_secret, user.totp_enabled) {
        (Some(secret), true) => secret,
        _ => return Err(ServiceError::Unauthorized),
    };

    if verify_totp(secret, &form.code, unix_time(now))? {
        return Ok(user);
    }

    let typed = normalize_backup_code(&form.code);
    let backup = repo
        .list_unused_backup_codes(user.id)?
        .into_iter()
        .find(|code| verify_password(&typed, &code.code_hash));

    match backup {
        Some(code) => {
            repo.mark_backup_code_used(code.id, now.naive_utc())?;
            log::info!("User {} signed in with a backup code", user.id);
            Ok(user)
        }
        None => Err(ServiceError::Form(INVALID_CODE.to_string())),
    }
}

/// Registers a new tenant together with its first admin.
pub fn sign_up<R>(repo: &R, form: SignUpForm, bcrypt_cost: u32) -> ServiceResult<User>
where
    R: TenantReader + TenantWriter + ?Sized,
{
    let payload = SignUpPayload::try_from(form)?;

    let mut tenant = payload.tenant.clone();
    let mut attempt = 1;
    while repo.tenant_slug_exists(&tenant.slug)? {
        attempt += 1;
        if attempt > MAX_SLUG_ATTEMPTS {
            return Err(ServiceError::Conflict(
                "This company name is already taken.".to_string(),
            ));
        }
        tenant = payload.tenant.with_suffix(attempt);
    }

    let admin = NewTenantAdmin {
        email: payload.email,
        name: payload.name,
        password_hash: hash_password(&payload.password, bcrypt_cost)?,
    };

    let (tenant, user) = repo
        .create_tenant_with_admin(&tenant, &admin)
        .map_err(conflict_on_violation("An account with this email already exists."))?;

    log::info!("Registered tenant {} ({})", tenant.id, tenant.slug);
    Ok(user)
}

fn load_current_user<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    ensure_role(user, ACCESS_ROLE)?;

    repo.get_team_member(user.user_id()?, user.tenant_id()?)?
        .ok_or(ServiceError::Unauthorized)
}

pub fn load_security_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<SecurityPageData>
where
    R: UserReader + ?Sized,
{
    let current = load_current_user(repo, user)?;
    let backup_codes_left = if current.totp_enabled {
        repo.list_unused_backup_codes(current.id)?.len()
    } else {
        0
    };

    Ok(SecurityPageData {
        totp_enabled: current.totp_enabled,
        backup_codes_left,
    })
}

/// Stores a fresh, not yet enabled secret and returns what the authenticator app needs.
pub fn begin_totp_setup<R>(
    repo: &R,
    user: &AuthenticatedUser,
    issuer: &str,
) -> ServiceResult<TotpSetupData>
where
    R: UserReader + UserWriter + ?Sized,
{
    let current = load_current_user(repo, user)?;
    if current.totp_enabled {
        return Err(ServiceError::Conflict(
            "Two-factor authentication is already enabled.".to_string(),
        ));
    }

    let secret = generate_totp_secret();
    repo.set_totp(current.id, Some(secret.clone()), false)?;

    let url = otpauth_url(issuer, current.email.as_str(), &secret);
    Ok(TotpSetupData {
        qr_svg: qr_code_svg(&url)?,
        otpauth_url: url,
        secret,
    })
}

fn issue_backup_codes<R>(repo: &R, user_id: UserId, bcrypt_cost: u32) -> ServiceResult<BackupCodesData>
where
    R: UserWriter + ?Sized,
{
    let codes = generate_backup_codes();
    let hashes = codes
        .iter()
        .map(|code| hash_password(code, bcrypt_cost))
        .collect::<Result<Vec<_>, _>>()?;
    repo.replace_backup_codes(user_id, &hashes)?;

    Ok(BackupCodesData { codes })
}

/// Enables two-factor login once the user proves the authenticator works.
pub fn confirm_totp_setup<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: TotpCodeForm,
    now: DateTime<Utc>,
    bcrypt_cost: u32,
) -> ServiceResult<BackupCodesData>
where
    R: UserReader + UserWriter + ?Sized,
{
    let current = load_current_user(repo, user)?;
    let Some(secret) = current.totp_secret.as_deref() else {
        return Err(ServiceError::Form("Start the setup first.".to_string()));
    };

    if !verify_totp(secret, &form.code, unix_time(now))? {
        return Err(ServiceError::Form(INVALID_CODE.to_string()));
    }

    repo.set_totp(current.id, Some(secret.to_string()), true)?;
    log::info!("User {} enabled two-factor authentication", current.id);

    issue_backup_codes(repo, current.id, bcrypt_cost)
}

pub fn regenerate_backup_codes<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: TotpCodeForm,
    now: DateTime<Utc>,
    bcrypt_cost: u32,
) -> ServiceResult<BackupCodesData>
where
    R: UserReader + UserWriter + ?Sized,
{
    let current = load_current_user(repo, user)?;
    let secret = match (&current.totp_secret, current.totp_enabled) {
        (Some(secret), true) => secret,
        _ => {
            return Err(ServiceError::Form(
                "Two-factor authentication is not enabled.".to_string(),
            ));
        }
    };

    if !verify_totp(secret, &form.code, unix_time(now))? {
        return Err(ServiceError::Form(INVALID_CODE.to_string()));
    }

    issue_backup_codes(repo, current.id, bcrypt_cost)
}

pub fn disable_totp<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: DisableTotpForm,
) -> ServiceResult<()>
where
    R: UserReader + UserWriter + ?Sized,
{
    let current = load_current_user(repo, user)?;
    if !verify_password(&form.password, &current.password_hash) {
        return Err(ServiceError::Form("Incorrect password.".to_string()));
    }

    repo.set_totp(current.id, None, false)?;
    repo.replace_backup_codes(current.id, &[])?;
    log::info!("User {} disabled two-factor authentication", current.id);

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use totp_rs::{Algorithm, Secret, TOTP};

    use super::*;
    use crate::domain::tenant::Tenant;
    use crate::domain::types::TenantId;
    use crate::domain::user::{BackupCode, Role};
    use crate::repository::mock::MockRepository;
    use crate::services::team::tests::user;
    use crate::services::test_support::member_user;

    const COST: u32 = 4;

    fn current_code(secret: &str, now: DateTime<Utc>) -> String {
        let bytes = Secret::Encoded(secret.to_string()).to_bytes().unwrap();
        TOTP::new(Algorithm::SHA1, 6, 1, 30, bytes)
            .unwrap()
            .generate(unix_time(now))
    }

    fn user_with_password(password: &str) -> User {
        User {
            password_hash: hash_password(password, COST).unwrap(),
            ..user(2, Role::Member)
        }
    }

    fn sign_in_form(password: &str) -> SignInForm {
        SignInForm {
            email: "user2@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn wrong_password_is_generic_form_error() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .returning(|_| Ok(Some(user_with_password("secret-pass"))));

        match sign_in(&repo, sign_in_form("nope")) {
            Err(ServiceError::Form(message)) => assert_eq!(message, INVALID_CREDENTIALS),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn unknown_email_is_generic_form_error() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email().returning(|_| Ok(None));

        assert!(matches!(
            sign_in(&repo, sign_in_form("secret-pass")),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn totp_users_need_second_factor() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email().returning(|_| {
            Ok(Some(User {
                totp_enabled: true,
                totp_secret: Some(generate_totp_secret()),
                ..user_with_password("secret-pass")
            }))
        });

        match sign_in(&repo, sign_in_form("secret-pass")).unwrap() {
            SignInOutcome::TwoFactorRequired(id) => assert_eq!(id.get(), 2),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn second_factor_accepts_current_code() {
        let secret = generate_totp_secret();
        let now = Utc::now();
        let code = current_code(&secret, now);

        let mut repo = MockRepository::new();
        let stored = secret.clone();
        repo.expect_get_user_by_id().returning(move |_| {
            Ok(Some(User {
                totp_enabled: true,
                totp_secret: Some(stored.clone()),
                ..user(2, Role::Member)
            }))
        });
        repo.expect_list_unused_backup_codes().never();

        let form = TwoFactorForm { code };
        let signed_in = complete_two_factor(&repo, UserId::new(2).unwrap(), form, now).unwrap();
        assert_eq!(signed_in.id.get(), 2);
    }

    #[test]
    fn second_factor_accepts_backup_code_once() {
        let secret = generate_totp_secret();
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id().returning(move |_| {
            Ok(Some(User {
                totp_enabled: true,
                totp_secret: Some(secret.clone()),
                ..user(2, Role::Member)
            }))
        });
        repo.expect_list_unused_backup_codes().returning(|user_id| {
            Ok(vec![BackupCode {
                id: 11,
                user_id,
                code_hash: hash_password("abcde-12345", COST).unwrap(),
                used_at: None,
            }])
        });
        repo.expect_mark_backup_code_used()
            .withf(|id, _| *id == 11)
            .times(1)
            .returning(|_, _| Ok(()));

        let form = TwoFactorForm {
            code: " ABCDE-12345 ".to_string(),
        };
        assert!(complete_two_factor(&repo, UserId::new(2).unwrap(), form, Utc::now()).is_ok());
    }

    #[test]
    fn sign_up_suffixes_taken_slug() {
        let mut repo = MockRepository::new();
        repo.expect_tenant_slug_exists()
            .returning(|slug| Ok(slug == "globex"));
        repo.expect_create_tenant_with_admin()
            .withf(|tenant, admin| tenant.slug == "globex-2" && admin.email.as_str() == "hank@globex.com")
            .times(1)
            .returning(|tenant, _| {
                Ok((
                    Tenant {
                        id: TenantId::new(10).unwrap(),
                        name: tenant.name.clone(),
                        slug: tenant.slug.clone(),
                        created_at: Utc::now().naive_utc(),
                    },
                    user(1, Role::Admin),
                ))
            });

        let form = SignUpForm {
            company: "Globex".to_string(),
            name: "Hank".to_string(),
            email: "hank@globex.com".to_string(),
            password: "volcano-lair".to_string(),
            password_confirm: "volcano-lair".to_string(),
        };
        let admin = sign_up(&repo, form, COST).unwrap();
        assert!(admin.is_admin());
    }

    #[test]
    fn setup_stores_disabled_secret() {
        let mut repo = MockRepository::new();
        repo.expect_get_team_member()
            .returning(|id, _| Ok(Some(user(id.get(), Role::Member))));
        repo.expect_set_totp()
            .withf(|_, secret, enabled| secret.is_some() && !enabled)
            .times(1)
            .returning(|id, _, _| Ok(user(id.get(), Role::Member)));

        let data = begin_totp_setup(&repo, &member_user(), "1twenty CRM").unwrap();
        assert!(data.otpauth_url.starts_with("otpauth://totp/1twenty%20CRM:"));
        assert!(data.qr_svg.contains("<svg"));
    }

    #[test]
    fn confirming_setup_issues_backup_codes() {
        let secret = generate_totp_secret();
        let now = Utc::now();
        let code = current_code(&secret, now);

        let mut repo = MockRepository::new();
        let stored = secret.clone();
        repo.expect_get_team_member().returning(move |id, _| {
            Ok(Some(User {
                totp_secret: Some(stored.clone()),
                ..user(id.get(), Role::Member)
            }))
        });
        repo.expect_set_totp()
            .withf(|_, _, enabled| *enabled)
            .times(1)
            .returning(|id, _, _| Ok(user(id.get(), Role::Member)));
        repo.expect_replace_backup_codes()
            .withf(|_, hashes| hashes.len() == crate::auth::password::BACKUP_CODE_COUNT)
            .times(1)
            .returning(|_, hashes| Ok(hashes.len()));

        let data =
            confirm_totp_setup(&repo, &member_user(), TotpCodeForm { code }, now, COST).unwrap();
        assert_eq!(data.codes.len(), crate::auth::password::BACKUP_CODE_COUNT);
    }

    #[test]
    fn disabling_requires_password() {
        let mut repo = MockRepository::new();
        repo.expect_get_team_member()
            .returning(|_, _| Ok(Some(user_with_password("secret-pass"))));
        repo.expect_set_totp().never();

        let form = DisableTotpForm {
            password: "wrong".to_string(),
        };
        assert!(matches!(
            disable_totp(&repo, &member_user(), form),
            Err(ServiceError::Form(_))
        ));
    }
}
