//! Password hashing and verification using argon2id.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$digest`)
//! so the parameters travel with the hash and older hashes keep verifying
//! after the defaults change.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid argon2 parameters: {0}")]
    Params(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("hashing task failed: {0}")]
    Join(String),
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub output_len: usize,
}

impl Default for HashParams {
    /// time cost 3, 64 MiB, 4 lanes, 32-byte digest.
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 4,
            output_len: 32,
        }
    }
}

impl HashParams {
    /// Cheap parameters for tests.
    pub const fn light() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
            output_len: 32,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(self.output_len),
        )
        .map_err(|e| PasswordError::Params(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hash a password using argon2id with a random 16-byte salt.
pub fn hash_password(password: &str, params: &HashParams) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
///
/// The digest comparison is constant time.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(
    password: String,
    params: HashParams,
) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password, &params))
        .await
        .map_err(|e| PasswordError::Join(e.to_string()))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(
    password: String,
    hash: String,
) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::Join(e.to_string()))?
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("StrongP@ss123!", &HashParams::light()).unwrap();
        assert!(verify_password("StrongP@ss123!", &hash).unwrap());
        assert!(!verify_password("StrongP@ss124!", &hash).unwrap());
    }

    #[test]
    fn same_password_different_salts() {
        let h1 = hash_password("StrongP@ss123!", &HashParams::light()).unwrap();
        let h2 = hash_password("StrongP@ss123!", &HashParams::light()).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn hash_is_self_describing() {
        let hash = hash_password("StrongP@ss123!", &HashParams::default()).unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=65536,t=3,p=4$"));

        let parsed = PasswordHash::new(&hash).unwrap();
        assert_eq!(parsed.hash.unwrap().len(), 32);
        // 16 raw salt bytes, base64 without padding.
        assert_eq!(parsed.salt.unwrap().as_str().len(), 22);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(PasswordError::MalformedHash(_))
        ));
    }

    #[tokio::test]
    async fn blocking_wrappers_agree() {
        let hash = hash_password_blocking("StrongP@ss123!".into(), HashParams::light())
            .await
            .unwrap();
        assert!(
            verify_password_blocking("StrongP@ss123!".into(), hash)
                .await
                .unwrap()
        );
    }
}
