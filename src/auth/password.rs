use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2 iteration count used for every new hash.
pub const HASH_WORK_FACTOR: u32 = 10;

/// Salted one-way hashing for account passwords.
///
/// Produces PHC strings (`$argon2id$v=19$m=...,t=10,p=1$...`). Verification
/// takes its parameters from the stored string, so older hashes made under a
/// different work factor keep verifying.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_params(Params::DEFAULT_M_COST, HASH_WORK_FACTOR)
    }

    pub fn with_params(memory_kib: u32, work_factor: u32) -> anyhow::Result<Self> {
        let params = Params::new(memory_kib, work_factor, Params::DEFAULT_P_COST, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Cheap parameters for tests.
    #[cfg(test)]
    pub fn fast() -> Self {
        Self::with_params(Params::MIN_M_COST, 1).expect("min argon2 params are valid")
    }

    pub async fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let argon2 = self.argon2.clone();
        let plain = plain.to_owned();
        tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(plain.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| {
                    error!(error = %e, "argon2 hash_password error");
                    anyhow::anyhow!(e.to_string())
                })
        })
        .await
        .context("password hashing task")?
    }

    /// `Ok(false)` on mismatch; `Err` only when `hash` is not a PHC string.
    pub async fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let argon2 = self.argon2.clone();
        let plain = plain.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || -> anyhow::Result<bool> {
            let parsed = PasswordHash::new(&hash).map_err(|e| {
                error!(error = %e, "argon2 parse hash error");
                anyhow::anyhow!(e.to_string())
            })?;
            Ok(argon2.verify_password(plain.as_bytes(), &parsed).is_ok())
        })
        .await
        .context("password verification task")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify_roundtrip() {
        let hasher = PasswordHasher::fast();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash(password).await.expect("hashing should succeed");
        assert!(hasher.verify(password, &hash).await.expect("verify should succeed"));
    }

    #[tokio::test]
    async fn same_password_hashes_differently() {
        let hasher = PasswordHasher::fast();
        let a = hasher.hash("password123").await.unwrap();
        let b = hasher.hash("password123").await.unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("password123", &a).await.unwrap());
        assert!(hasher.verify("password123", &b).await.unwrap());
    }

    #[tokio::test]
    async fn verify_rejects_wrong_password() {
        let hasher = PasswordHasher::fast();
        let hash = hasher.hash("correct-horse-battery-staple").await.unwrap();
        assert!(!hasher
            .verify("wrong-password", &hash)
            .await
            .expect("verify should not error"));
    }

    #[tokio::test]
    async fn verify_errors_on_malformed_hash() {
        let err = PasswordHasher::fast()
            .verify("anything", "not-a-valid-hash")
            .await
            .unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn verify_reads_params_from_the_stored_hash() {
        let hash = PasswordHasher::with_params(Params::MIN_M_COST, 2)
            .unwrap()
            .hash("pw-123456")
            .await
            .unwrap();
        assert!(hash.contains("t=2"));
        assert!(PasswordHasher::fast().verify("pw-123456", &hash).await.unwrap());
    }

    #[test]
    fn default_hasher_uses_the_fixed_work_factor() {
        let hasher = PasswordHasher::new().expect("default params are valid");
        assert_eq!(hasher.argon2.params().t_cost(), HASH_WORK_FACTOR);
    }
}
