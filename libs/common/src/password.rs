//! Password hashing and verification
//!
//! Argon2 helpers shared by the auth service (registration, login,
//! password change) and the api service (admin user management).

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};

/// Hash a plaintext password with a freshly generated salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

/// Verify a plaintext password against a stored hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Sup3r$ecret").expect("hashing failed");
        assert_ne!(hash, "Sup3r$ecret");
        assert!(verify_password("Sup3r$ecret", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password_fails_verification() {
        let hash = hash_password("Sup3r$ecret").expect("hashing failed");
        assert!(!verify_password("not-the-password", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("Sup3r$ecret").unwrap();
        let second = hash_password("Sup3r$ecret").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
