//! Password hashing (Argon2, PHC string format).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password for storage.
pub fn hash(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored PHC hash. An unparseable hash counts
/// as a failed verification, not an error.
pub fn verify(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_succeeds() {
        let hashed = hash("Abcdef1!").unwrap();
        assert!(verify(&hashed, "Abcdef1!"));
    }

    #[test]
    fn wrong_password_fails_verification() {
        let hashed = hash("Abcdef1!").unwrap();
        assert!(!verify(&hashed, "Abcdef2!"));
    }

    #[test]
    fn garbage_hash_fails_quietly() {
        assert!(!verify("not-a-phc-string", "Abcdef1!"));
    }
}
