//! Password hashing and verification using Argon2id
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Invalid password hash format: {0}")]
    MalformedHash(String),

    #[error("Password hashing task failed: {0}")]
    Task(String),
}

/// Hash a password with a fresh random salt.
///
/// The result is a PHC string (`$argon2id$v=19$...`) carrying algorithm,
/// parameters and salt, so two calls on the same input never match.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC hash.
///
/// Comparison is constant-time inside the argon2 verifier. A mismatch is
/// `Ok(false)`; only an unreadable stored hash is an error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e.to_string())),
    }
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: String, password_hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
}

/// Hash checked against when the username is unknown, so that a miss costs
/// the same as a wrong password.
pub fn decoy_hash() -> Result<&'static str, PasswordError> {
    static DECOY: OnceLock<String> = OnceLock::new();

    if let Some(hash) = DECOY.get() {
        return Ok(hash);
    }
    let hash = hash_password("decoy-password-never-matches")?;
    Ok(DECOY.get_or_init(|| hash))
}

/// [`decoy_hash`] on the blocking pool. Called once at startup so the first
/// unknown-user login does not pay for the hash.
pub async fn decoy_hash_blocking() -> Result<&'static str, PasswordError> {
    tokio::task::spawn_blocking(decoy_hash)
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifies() {
        let first = hash_password("correct horse battery staple").unwrap();
        let second = hash_password("correct horse battery staple").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery staple", &first).unwrap());
        assert!(verify_password("correct horse battery staple", &second).unwrap());
    }

    #[test]
    fn wrong_password_is_false_not_error() {
        let hash = hash_password("hunter22").unwrap();
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_error() {
        let err = verify_password("anything", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, PasswordError::MalformedHash(_)));
    }

    #[tokio::test]
    async fn blocking_variants_agree() {
        let hash = hash_password_blocking("pa55word".to_string()).await.unwrap();
        assert!(verify_password_blocking("pa55word".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("nope".to_string(), hash).await.unwrap());
    }

    #[test]
    fn decoy_hash_is_stable_and_valid() {
        let first = decoy_hash().unwrap();
        let second = decoy_hash().unwrap();
        assert_eq!(first, second);
        assert!(!verify_password("hunter22", first).unwrap());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn decoy_hash_is_built_off_the_runtime_thread() {
        let warmed = decoy_hash_blocking().await.unwrap();
        assert!(warmed.starts_with("$argon2id$"));
        assert_eq!(warmed, decoy_hash().unwrap());
    }
}
