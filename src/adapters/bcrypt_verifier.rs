use async_trait::async_trait;

use crate::ports::store::Result;
use crate::ports::PasswordVerifier;

/// bcrypt password verifier
///
/// Hash checks are CPU bound and run on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptPasswordVerifier;

impl BcryptPasswordVerifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PasswordVerifier for BcryptPasswordVerifier {
    async fn verify(&self, secret: &str, hash: &str) -> Result<bool> {
        let secret = secret.to_owned();
        let hash = hash.to_owned();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(&secret, &hash)).await??;
        Ok(verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verifies_matching_password() {
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        let verifier = BcryptPasswordVerifier::new();

        assert!(verifier.verify("correct horse", &hash).await.unwrap());
        assert!(!verifier.verify("battery staple", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_an_error() {
        let verifier = BcryptPasswordVerifier::new();
        assert!(verifier.verify("anything", "not-a-hash").await.is_err());
    }
}
