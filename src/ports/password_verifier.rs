use async_trait::async_trait;

use super::store::Result;

/// Password verification port
///
/// Hashing happens at registration, outside this crate. Only the check of a
/// plain secret against a stored hash is needed here.
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    async fn verify(&self, secret: &str, hash: &str) -> Result<bool>;
}
