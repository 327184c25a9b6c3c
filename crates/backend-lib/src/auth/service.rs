use async_trait::async_trait;
use worksphere_common::UserId;
use super::TokenError;

/// Credential and token operations the HTTP layer depends on
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn hash_password(&self, plain: &str) -> anyhow::Result<String>;

    /// `Ok(false)` for a wrong password; `Err` only when the check itself
    /// could not run.
    async fn verify_password(&self, hash: &str, plain: &str) -> anyhow::Result<bool>;

    /// A hash no password matches, costing as much to verify as a real one.
    /// Login checks against it when the email is unknown.
    fn dummy_hash(&self) -> &str;

    fn issue_token(&self, user_id: UserId) -> Result<String, TokenError>;
    fn verify_token(&self, token: &str) -> Result<UserId, TokenError>;
}
