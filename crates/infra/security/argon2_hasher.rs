use anyhow::{Context, Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};
use async_trait::async_trait;
use rand::rngs::OsRng;

use crate::domain::repositories::passwords::PasswordHashing;

/// Argon2id with the crate defaults. Hashing runs on the blocking pool.
#[derive(Debug, Default, Clone)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PasswordHashing for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| anyhow!("failed to hash password: {}", err))
        })
        .await
        .context("password hashing task failed")?
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&password_hash)
                .map_err(|err| anyhow!("stored password hash is malformed: {}", err))?;

            match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(err) => Err(anyhow!("failed to verify password: {}", err)),
            }
        })
        .await
        .context("password verification task failed")?
    }
}
