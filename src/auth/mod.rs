//! Credentials, two-factor authentication and the signed session token.

use thiserror::Error;

pub mod password;
pub mod token;
pub mod totp;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("invalid TOTP secret: {0}")]
    InvalidSecret(String),

    #[error("failed to render QR code: {0}")]
    QrCode(String),

    #[error("invalid session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;
