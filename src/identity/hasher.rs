//! One-way salted hashing shared by passwords and OTP codes.

use anyhow::{Result, anyhow};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};

pub trait PasswordHasher: Send + Sync {
    /// Hash `secret` with a fresh salt, returning a self-describing hash string.
    ///
    /// # Errors
    /// Returns an error if the hashing backend fails.
    fn hash(&self, secret: &str) -> Result<String>;

    /// Check `secret` against a hash produced by [`PasswordHasher::hash`].
    ///
    /// # Errors
    /// Returns an error if `hash` is not a valid hash string.
    fn verify(&self, secret: &str, hash: &str) -> Result<bool>;
}

/// Argon2id hasher producing PHC strings.
#[derive(Clone, Debug)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|err| anyhow!("failed to hash secret: {err}"))?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, secret: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|err| anyhow!("invalid stored hash: {err}"))?;
        // Parameters come from the PHC string, so hashes made with other params still verify.
        Ok(self
            .argon2()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok())
    }
}
