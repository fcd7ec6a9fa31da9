//! Password hashing and verification using Argon2id.
//!
//! Hashes are stored as PHC strings (algorithm, parameters, and salt
//! included), so verification needs no side-channel configuration.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AuthError;

/// Hash a plaintext password with a freshly generated random salt.
pub fn hash(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a plaintext password against a stored PHC hash string.
///
/// Returns `Ok(false)` on a mismatch; errors are reserved for malformed
/// hashes and hashing failures.
pub fn verify(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AuthError::PasswordHash(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswordHash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let password = "correct horse battery staple";
        let hashed = hash(password).unwrap();

        assert!(hashed.starts_with("$argon2id$"));
        assert!(verify(password, &hashed).unwrap());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hashed = hash("secret").unwrap();
        assert!(!verify("not-secret", &hashed).unwrap());
        assert!(!verify("", &hashed).unwrap());
    }

    #[test]
    fn test_same_password_different_hashes() {
        let first = hash("secret").unwrap();
        let second = hash("secret").unwrap();
        // random salt per hash
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let result = verify("secret", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::PasswordHash(_))));
    }
}
