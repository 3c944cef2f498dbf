//! Business workflows invoked by the HTTP routes and the sequence runner.
//!
//! Services take a repository implementing the traits they need, check the
//! caller's role and translate form input into domain values. They never see
//! HTTP types.

use thiserror::Error;

use crate::auth::AuthError;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::integrations::IntegrationError;
use crate::repository::errors::RepositoryError;

pub mod accounts;
pub mod api;
pub mod auth;
pub mod automation;
pub mod campaigns;
pub mod dashboard;
pub mod deals;
pub mod integrations;
pub mod notes;
pub mod people;
mod references;
pub mod runner;
pub mod scoring;
pub mod sequences;
pub mod sync;
pub mod tags;
pub mod tasks;
pub mod team;
pub mod webhooks;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    Conflict(String),

    #[error("invalid value: {0}")]
    TypeConstraint(String),

    #[error("repository error: {0}")]
    Repository(RepositoryError),

    #[error("integration error: {0}")]
    Integration(#[from] IntegrationError),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(err.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

/// Fails with [`ServiceError::Unauthorized`] unless the user carries `role`.
pub fn ensure_role(user: &AuthenticatedUser, role: &str) -> ServiceResult<()> {
    if user.has_role(role) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Maps a constraint violation to [`ServiceError::Conflict`] carrying `message`.
pub(crate) fn conflict_on_violation(
    message: &str,
) -> impl FnOnce(RepositoryError) -> ServiceError + '_ {
    move |err| match err {
        RepositoryError::ConstraintViolation(detail) => {
            log::warn!("Constraint violation: {detail}");
            ServiceError::Conflict(message.to_string())
        }
        other => other.into(),
    }
}

/// Returns the trimmed search term, or `None` when blank.
pub(crate) fn normalize_search(search: Option<String>) -> Option<String> {
    search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::{ACCESS_ROLE, ADMIN_ROLE};

    fn user(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".to_string(),
            email: "a@example.com".to_string(),
            name: "A".to_string(),
            tenant_id: 1,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: 0,
        }
    }

    #[test]
    fn ensure_role_checks_membership() {
        assert!(ensure_role(&user(&[ACCESS_ROLE]), ACCESS_ROLE).is_ok());
        assert!(matches!(
            ensure_role(&user(&[ACCESS_ROLE]), ADMIN_ROLE),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn repository_not_found_maps_to_not_found() {
        let err: ServiceError = RepositoryError::NotFound.into();
        assert!(matches!(err, ServiceError::NotFound));

        let err: ServiceError = RepositoryError::ConstraintViolation("dup".into()).into();
        assert!(matches!(err, ServiceError::Repository(_)));
    }

    #[test]
    fn blank_search_is_dropped() {
        assert_eq!(normalize_search(Some("  ".into())), None);
        assert_eq!(normalize_search(Some(" ada ".into())), Some("ada".into()));
    }
}
