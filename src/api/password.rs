//! Salted password hashing (Argon2id).

use anyhow::{Context, Result, anyhow};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};

/// Salt and PHC-encoded hash produced for one password.
#[derive(Debug, Clone)]
pub struct SaltedHash {
    pub salt: String,
    pub hash: String,
}

/// Argon2id hasher. Hashing is CPU bound; the `*_blocking` async wrappers move
/// the work onto tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct Hasher {
    params: argon2::Params,
}

impl Default for Hasher {
    fn default() -> Self {
        Self {
            params: argon2::Params::default(),
        }
    }
}

impl Hasher {
    #[must_use]
    pub fn new(params: argon2::Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            self.params.clone(),
        )
    }

    /// Generate a random salt and hash `password` with it.
    /// # Errors
    /// Returns an error if Argon2 rejects the input.
    pub fn hash(&self, password: &SecretString) -> Result<SaltedHash> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map_err(|e| anyhow!("failed to hash password: {e}"))?
            .to_string();

        Ok(SaltedHash {
            salt: salt.as_str().to_string(),
            hash,
        })
    }

    /// Check `password` against a stored PHC string. A mismatch is `Ok(false)`;
    /// only a malformed stored hash is an error.
    /// # Errors
    /// Returns an error if `stored_hash` cannot be parsed.
    pub fn verify(&self, password: &SecretString, stored_hash: &str) -> Result<bool> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|e| anyhow!("invalid stored hash: {e}"))?;

        Ok(self
            .argon2()
            .verify_password(password.expose_secret().as_bytes(), &parsed)
            .is_ok())
    }

    /// # Errors
    /// Returns an error if hashing fails or the blocking task panics.
    pub async fn hash_blocking(&self, password: SecretString) -> Result<SaltedHash> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("password hashing task failed")?
    }

    /// # Errors
    /// Returns an error if the stored hash is malformed or the blocking task panics.
    pub async fn verify_blocking(&self, password: SecretString, stored_hash: String) -> Result<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .context("password verification task failed")?
    }
}
