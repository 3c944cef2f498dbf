//! Sign-in, registration and two-factor forms.

use serde::Deserialize;
use validator::Validate;

use crate::domain::tenant::NewTenant;
use crate::domain::types::{EmailAddress, TenantName, UserName};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct SignInForm {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Normalised credentials; the password stays as typed.
pub struct SignInPayload {
    pub email: EmailAddress,
    pub password: String,
}

impl TryFrom<SignInForm> for SignInPayload {
    type Error = FormError;

    fn try_from(form: SignInForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            email: EmailAddress::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            password: form.password,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(length(min = 1, max = 120))]
    pub company: String,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub password_confirm: String,
}

pub struct SignUpPayload {
    pub tenant: NewTenant,
    pub name: UserName,
    pub email: EmailAddress,
    pub password: String,
}

impl TryFrom<SignUpForm> for SignUpPayload {
    type Error = FormError;

    fn try_from(form: SignUpForm) -> Result<Self, Self::Error> {
        form.validate()?;
        if form.password != form.password_confirm {
            return Err(FormError::PasswordMismatch);
        }
        let company = TenantName::new(form.company).map_err(|_| FormError::InvalidName)?;
        Ok(Self {
            tenant: NewTenant::new(company)?,
            name: UserName::new(form.name).map_err(|_| FormError::InvalidName)?,
            email: EmailAddress::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            password: form.password,
        })
    }
}

/// Code typed on the second login step: a TOTP code or a backup code.
#[derive(Debug, Deserialize, Validate)]
pub struct TwoFactorForm {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
}

/// TOTP code confirming setup or backup-code regeneration.
#[derive(Debug, Deserialize, Validate)]
pub struct TotpCodeForm {
    #[validate(length(min = 6, max = 16))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DisableTotpForm {
    #[validate(length(min = 1))]
    pub password: String,
}
