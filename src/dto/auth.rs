//! DTOs of the sign-in flow and the security settings page.

/// Two-factor state shown on the security page.
#[derive(Debug)]
pub struct SecurityPageData {
    pub totp_enabled: bool,
    /// Backup codes that have not been used yet.
    pub backup_codes_left: usize,
}

/// Secret and QR code shown while two-factor login is being set up.
#[derive(Debug)]
pub struct TotpSetupData {
    pub secret: String,
    pub otpauth_url: String,
    pub qr_svg: String,
}

/// Plain backup codes, displayed exactly once after they are issued.
#[derive(Debug)]
pub struct BackupCodesData {
    pub codes: Vec<String>,
}
