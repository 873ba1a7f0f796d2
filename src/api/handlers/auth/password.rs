//! Password hashing for local credentials.
//!
//! Argon2id with per-hash random salts; only PHC strings are persisted.

use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

/// Derive a salted Argon2id hash from a plaintext password.
///
/// # Errors
/// Returns an error if salt generation or hashing fails.
pub(crate) fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Verify a plaintext password against a stored PHC string.
pub(crate) fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else {
        false
    }
}

/// Burn the same hashing cost as a real verification.
///
/// Called when the username is unknown or has no local credential, so the
/// response time does not reveal whether an account exists.
pub(crate) fn equalize_verification_cost() {
    let _ = hash_password("segreti-nonexistent-credential");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() -> Result<()> {
        let hash = hash_password("correct horse battery staple")?;
        assert!(verify_password(&hash, "correct horse battery staple"));
        assert!(!verify_password(&hash, "wrong password"));
        Ok(())
    }

    #[test]
    fn hashes_are_salted() -> Result<()> {
        let first = hash_password("same password")?;
        let second = hash_password("same password")?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn hash_is_phc_encoded_argon2id() -> Result<()> {
        let hash = hash_password("password123")?;
        assert!(hash.starts_with("$argon2id$"));
        assert!(PasswordHash::new(&hash).is_ok());
        assert!(!hash.contains("password123"));
        Ok(())
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("not-a-phc-string", "password"));
        assert!(!verify_password("", "password"));
    }

    #[test]
    fn equalize_verification_cost_does_not_panic() {
        equalize_verification_cost();
    }
}
