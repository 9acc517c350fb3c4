//! Password hashing and verification using Argon2id.
//!
//! If a pepper is configured it is prepended to the password before hashing
//! and before verification; both sides must use the same pepper.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rootcause::prelude::Report;

use crate::error::AuthenticationError;

fn peppered(password: &str, pepper: Option<&str>) -> String {
    match pepper {
        Some(p) => format!("{p}{password}"),
        None => password.to_string(),
    }
}

/// Hashes a password into an Argon2id PHC string.
pub fn hash_password(
    password: &str,
    pepper: Option<&str>,
) -> Result<String, Report<AuthenticationError>> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(peppered(password, pepper).as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            AuthenticationError::PasswordHash {
                reason: e.to_string(),
            }
            .into()
        })
}

/// Verifies a plaintext password against an Argon2id PHC string.
///
/// Returns `Ok(false)` on mismatch and an error only if the stored hash is
/// malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, Report<AuthenticationError>> {
    let parsed = argon2::PasswordHash::new(hash).map_err(|e| AuthenticationError::PasswordHash {
        reason: format!("invalid hash format: {e}"),
    })?;

    match Argon2::default().verify_password(peppered(password, pepper).as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthenticationError::PasswordHash {
            reason: format!("verify error: {e}"),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("shepherd", None).expect("hash");
        assert!(verify_password("shepherd", &hash, None).expect("verify"));
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("shepherd", None).expect("hash");
        assert!(!verify_password("wolf", &hash, None).expect("verify"));
    }

    #[test]
    fn pepper_is_applied() {
        let hash = hash_password("shepherd", Some("pepper!")).expect("hash");
        assert!(verify_password("shepherd", &hash, Some("pepper!")).expect("verify"));
        assert!(!verify_password("shepherd", &hash, None).expect("verify"));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("shepherd", None).expect("hash");
        let second = hash_password("shepherd", None).expect("hash");
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("shepherd", "not-a-phc-string", None).is_err());
    }
}
