//! Form definitions backing the CRM routes.
//!
//! Every form deserializes the raw request body and converts into a payload
//! of validated domain values through `TryFrom`, failing with [`FormError`].

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod accounts;
pub mod auth;
pub mod campaigns;
pub mod deals;
pub mod notes;
pub mod people;
pub mod sequences;
pub mod settings;
pub mod tags;
pub mod tasks;
pub mod team;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid url")]
    InvalidUrl,

    #[error("invalid company domain")]
    InvalidDomain,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("invalid date")]
    InvalidDate,

    #[error("invalid colour, expected #rrggbb")]
    InvalidColor,

    #[error("invalid identifier")]
    InvalidId,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("{0}")]
    InvalidValue(String),

    #[error("invalid CSV file: {0}")]
    InvalidCsv(String),
}

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::NonPositiveId => FormError::InvalidId,
            TypeConstraintError::InvalidEmail => FormError::InvalidEmail,
            TypeConstraintError::InvalidPhone => FormError::InvalidPhoneNumber,
            TypeConstraintError::InvalidUrl => FormError::InvalidUrl,
            other => FormError::InvalidValue(other.to_string()),
        }
    }
}

/// Trims the value and turns blank input into `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional select value holding a positive identifier.
pub(crate) fn optional_id<T>(
    value: Option<String>,
    new: fn(i32) -> Result<T, TypeConstraintError>,
) -> Result<Option<T>, FormError> {
    non_blank(value)
        .map(|raw| {
            let raw: i32 = raw.parse().map_err(|_| FormError::InvalidId)?;
            new(raw).map_err(|_| FormError::InvalidId)
        })
        .transpose()
}

/// Parses an optional value with `ctor`, mapping failures to `err`.
pub(crate) fn optional_value<T, E>(
    value: Option<String>,
    ctor: impl FnOnce(String) -> Result<T, E>,
    err: FormError,
) -> Result<Option<T>, FormError> {
    match non_blank(value) {
        Some(raw) => ctor(raw).map(Some).map_err(|_| err),
        None => Ok(None),
    }
}

/// Parses `YYYY-MM-DD`.
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| FormError::InvalidDate)
}

/// Parses the value of a `datetime-local` input, with or without seconds.
pub(crate) fn parse_datetime(value: &str) -> Result<NaiveDateTime, FormError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| FormError::InvalidDate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PersonId;

    #[test]
    fn blank_ids_are_none() {
        assert_eq!(optional_id(Some(" ".into()), PersonId::new).unwrap(), None);
        assert_eq!(optional_id(None, PersonId::new).unwrap(), None);
        assert_eq!(
            optional_id(Some("4".into()), PersonId::new).unwrap(),
            Some(PersonId::new(4).unwrap())
        );
        assert!(matches!(
            optional_id(Some("0".into()), PersonId::new),
            Err(FormError::InvalidId)
        ));
        assert!(matches!(
            optional_id(Some("x".into()), PersonId::new),
            Err(FormError::InvalidId)
        ));
    }

    #[test]
    fn datetime_local_values_parse() {
        assert!(parse_datetime("2025-06-01T14:30").is_ok());
        assert!(parse_datetime("2025-06-01T14:30:15").is_ok());
        assert!(parse_datetime("tomorrow").is_err());
        assert!(parse_date("2025-06-01").is_ok());
        assert!(parse_date("06/01/2025").is_err());
    }
}
