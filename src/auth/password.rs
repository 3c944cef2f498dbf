//! Password and backup code hashing.

use crate::auth::AuthResult;

pub const BACKUP_CODE_COUNT: usize = 10;

const BACKUP_CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const BACKUP_CODE_HALF_LEN: usize = 5;

pub fn hash_password(password: &str, cost: u32) -> AuthResult<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Returns `false` for a wrong password as well as for a malformed hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(valid) => valid,
        Err(err) => {
            log::warn!("Failed to verify password hash: {err}");
            false
        }
    }
}

fn random_chunk() -> String {
    (0..BACKUP_CODE_HALF_LEN)
        .map(|_| {
            let index = rand::random::<u32>() as usize % BACKUP_CODE_ALPHABET.len();
            char::from(BACKUP_CODE_ALPHABET[index])
        })
        .collect()
}

/// Plain-text recovery codes shaped `xxxxx-xxxxx`.
pub fn generate_backup_codes() -> Vec<String> {
    (0..BACKUP_CODE_COUNT)
        .map(|_| format!("{}-{}", random_chunk(), random_chunk()))
        .collect()
}

/// Lower-cases the code and drops whitespace so typed codes match generated ones.
pub fn normalize_backup_code(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lowest cost bcrypt accepts; keeps the tests fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse", TEST_COST).unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn malformed_hash_does_not_verify() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn backup_codes_have_expected_shape() {
        let codes = generate_backup_codes();
        assert_eq!(codes.len(), BACKUP_CODE_COUNT);
        for code in codes {
            let (left, right) = code.split_once('-').unwrap();
            assert_eq!(left.len(), 5);
            assert_eq!(right.len(), 5);
            assert!(
                code.chars()
                    .all(|c| c == '-' || c.is_ascii_lowercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn backup_codes_are_normalized() {
        assert_eq!(normalize_backup_code(" ABCDE-12345 "), "abcde-12345");
    }
}
