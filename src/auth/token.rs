//! Session token stored in the identity cookie.

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{Error, FromRequest, HttpRequest, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::future::{Ready, ready};

use crate::auth::AuthResult;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::user::User;
use crate::models::config::ServerConfig;
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, UserReader};

/// Claims for `user` valid for `ttl_hours` from now.
pub fn claims_for(user: &User, ttl_hours: i64) -> AuthenticatedUser {
    let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp();
    AuthenticatedUser::from_user(user, usize::try_from(exp).unwrap_or_default())
}

pub fn encode_token(claims: &AuthenticatedUser, secret: &str) -> AuthResult<String> {
    Ok(encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Decodes and validates the signature and expiry of a session token.
pub fn decode_token(token: &str, secret: &str) -> AuthResult<AuthenticatedUser> {
    let data = decode::<AuthenticatedUser>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Replaces the role claims with the role currently stored for the user.
///
/// Returns `None` when the account no longer exists in the token's tenant.
pub fn refresh_claims<R>(
    repo: &R,
    claims: AuthenticatedUser,
) -> RepositoryResult<Option<AuthenticatedUser>>
where
    R: UserReader + ?Sized,
{
    let Ok(user_id) = claims.user_id() else {
        return Ok(None);
    };
    let user = repo
        .get_user_by_id(user_id)?
        .filter(|user| user.tenant_id.get() == claims.tenant_id);

    Ok(user.map(|user| AuthenticatedUser::from_user(&user, claims.exp)))
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(config) = req.app_data::<web::Data<ServerConfig>>() else {
            log::error!("Server config is not registered");
            return ready(Err(ErrorInternalServerError("configuration missing")));
        };

        let token = match req.get_identity().and_then(|identity| identity.id()) {
            Ok(token) => token,
            Err(_) => return ready(Err(ErrorUnauthorized("not signed in"))),
        };

        let Some(repo) = req.app_data::<web::Data<DieselRepository>>() else {
            log::error!("Repository is not registered");
            return ready(Err(ErrorInternalServerError("repository missing")));
        };

        let claims = match decode_token(&token, &config.secret) {
            Ok(claims) => claims,
            Err(err) => {
                log::warn!("Rejected session token: {err}");
                return ready(Err(ErrorUnauthorized("invalid session")));
            }
        };

        ready(match refresh_claims(repo.get_ref(), claims) {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(ErrorUnauthorized("account removed")),
            Err(err) => {
                log::error!("Failed to load session user: {err}");
                Err(ErrorInternalServerError("session lookup failed"))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EmailAddress, TenantId, UserId, UserName};
    use crate::domain::user::Role;

    const SECRET: &str = "test-secret-test-secret-test-secret-test-secret-test-secret-0000";

    fn user() -> User {
        let now = Utc::now().naive_utc();
        User {
            id: UserId::new(3).unwrap(),
            tenant_id: TenantId::new(1).unwrap(),
            email: EmailAddress::new("bob@example.com").unwrap(),
            name: UserName::new("Bob").unwrap(),
            role: Role::Member,
            password_hash: String::new(),
            totp_secret: None,
            totp_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn token_round_trip() {
        let claims = claims_for(&user(), 1);
        let token = encode_token(&claims, SECRET).unwrap();
        assert_eq!(decode_token(&token, SECRET).unwrap(), claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_token(&claims_for(&user(), 1), SECRET).unwrap();
        assert!(decode_token(&token, "another-secret").is_err());
    }

    #[cfg(feature = "test-mocks")]
    #[test]
    fn refreshed_claims_follow_the_stored_role() {
        use crate::domain::auth::{ADMIN_ROLE, MEMBER_ROLE};
        use crate::repository::mock::MockRepository;

        let admin = User {
            role: Role::Admin,
            ..user()
        };
        let claims = claims_for(&admin, 1);
        assert!(claims.has_role(ADMIN_ROLE));

        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id().returning(|_| Ok(Some(user())));

        let refreshed = refresh_claims(&repo, claims.clone()).unwrap().unwrap();
        assert!(!refreshed.has_role(ADMIN_ROLE));
        assert!(refreshed.has_role(MEMBER_ROLE));
        assert_eq!(refreshed.exp, claims.exp);
    }

    #[cfg(feature = "test-mocks")]
    #[test]
    fn removed_accounts_lose_their_session() {
        use crate::repository::mock::MockRepository;

        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id().returning(|_| Ok(None));
        assert!(refresh_claims(&repo, claims_for(&user(), 1)).unwrap().is_none());

        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id().returning(|_| {
            Ok(Some(User {
                tenant_id: TenantId::new(2).unwrap(),
                ..user()
            }))
        });
        assert!(refresh_claims(&repo, claims_for(&user(), 1)).unwrap().is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = encode_token(&claims_for(&user(), -2), SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }
}
