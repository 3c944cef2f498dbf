//! Time-based one-time passwords (SHA1, 6 digits, 30 second step).

use qrcode::QrCode;
use qrcode::render::svg;
use totp_rs::{Algorithm, Secret, TOTP};

use crate::auth::{AuthError, AuthResult};

const DIGITS: usize = 6;
const SKEW: u8 = 1;
const STEP: u64 = 30;

/// New random 160-bit secret, base32 encoded.
pub fn generate_totp_secret() -> String {
    Secret::generate_secret().to_encoded().to_string()
}

pub fn otpauth_url(issuer: &str, account: &str, secret: &str) -> String {
    let issuer = urlencoding::encode(issuer);
    format!(
        "otpauth://totp/{issuer}:{}?secret={secret}&issuer={issuer}&algorithm=SHA1&digits={DIGITS}&period={STEP}",
        urlencoding::encode(account),
    )
}

fn build_totp(secret: &str) -> AuthResult<TOTP> {
    let bytes = Secret::Encoded(secret.to_string())
        .to_bytes()
        .map_err(|err| AuthError::InvalidSecret(format!("{err:?}")))?;

    TOTP::new(Algorithm::SHA1, DIGITS, SKEW, STEP, bytes)
        .map_err(|err| AuthError::InvalidSecret(err.to_string()))
}

/// Checks `code` against the secret at `unix_time`, one step of skew either side.
///
/// Whitespace inside the code is ignored. Anything other than six digits is
/// rejected without an error.
pub fn verify_totp(secret: &str, code: &str, unix_time: u64) -> AuthResult<bool> {
    let code: String = code.chars().filter(|c| !c.is_whitespace()).collect();
    if code.len() != DIGITS || !code.chars().all(|c| c.is_ascii_digit()) {
        return Ok(false);
    }

    let totp = build_totp(secret)?;
    Ok(totp.check(&code, unix_time))
}

/// Renders `data` as an inline SVG QR code.
pub fn qr_code_svg(data: &str) -> AuthResult<String> {
    let code = QrCode::new(data.as_bytes()).map_err(|err| AuthError::QrCode(err.to_string()))?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_at(secret: &str, time: u64) -> String {
        build_totp(secret).unwrap().generate(time)
    }

    #[test]
    fn generated_secret_is_usable() {
        let secret = generate_totp_secret();
        assert_eq!(secret.len(), 32);
        assert!(build_totp(&secret).is_ok());
    }

    #[test]
    fn accepts_current_and_adjacent_steps() {
        let secret = generate_totp_secret();
        let now = 1_700_000_000;

        assert!(verify_totp(&secret, &code_at(&secret, now), now).unwrap());
        assert!(verify_totp(&secret, &code_at(&secret, now - STEP), now).unwrap());
        assert!(verify_totp(&secret, &code_at(&secret, now + STEP), now).unwrap());
        assert!(!verify_totp(&secret, &code_at(&secret, now - 10 * STEP), now).unwrap());
    }

    #[test]
    fn whitespace_is_ignored() {
        let secret = generate_totp_secret();
        let now = 1_700_000_000;
        let code = code_at(&secret, now);
        let spaced = format!(" {} {} ", &code[..3], &code[3..]);

        assert!(verify_totp(&secret, &spaced, now).unwrap());
    }

    #[test]
    fn malformed_codes_are_rejected() {
        let secret = generate_totp_secret();
        assert!(!verify_totp(&secret, "12345", 0).unwrap());
        assert!(!verify_totp(&secret, "abcdef", 0).unwrap());
    }

    #[test]
    fn invalid_secret_is_an_error() {
        assert!(matches!(
            verify_totp("not base32!", "123456", 0),
            Err(AuthError::InvalidSecret(_))
        ));
    }

    #[test]
    fn otpauth_url_is_encoded() {
        let url = otpauth_url("1twenty CRM", "ann@example.com", "ABC");
        assert_eq!(
            url,
            "otpauth://totp/1twenty%20CRM:ann%40example.com?secret=ABC&issuer=1twenty%20CRM&algorithm=SHA1&digits=6&period=30"
        );
    }

    #[test]
    fn qr_code_is_svg() {
        let svg = qr_code_svg("otpauth://totp/x").unwrap();
        assert!(svg.contains("<svg"));
    }
}
