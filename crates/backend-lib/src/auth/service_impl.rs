use crate::auth::{password, AuthService, TokenError, TokenService};
use crate::config::AuthSettings;
use async_trait::async_trait;
use scrypt::Params;
use tracing::error;
use worksphere_common::UserId;
use zeroize::Zeroizing;

/// scrypt hashing on the blocking pool plus JWT tokens
pub struct DefaultAuth {
    tokens: TokenService,
    params: Params,
    dummy_hash: String,
}

impl DefaultAuth {
    pub fn new(tokens: TokenService, params: Params) -> anyhow::Result<Self> {
        // Random salt, so the plaintext behind it is irrelevant
        let dummy_hash = password::hash_password("worksphere-unused-credential", params)?;
        Ok(Self { tokens, params, dummy_hash })
    }

    pub fn from_settings(settings: &AuthSettings) -> anyhow::Result<Self> {
        let secret = Zeroizing::new(settings.jwt_secret.clone());
        let tokens = TokenService::from_secret(secret, settings.token_ttl())?;
        let params = password::scrypt_params(settings.scrypt_log_n)?;
        Self::new(tokens, params)
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn hash_password(&self, plain: &str) -> anyhow::Result<String> {
        let mut plain = plain.to_owned();
        let params = self.params;
        tokio::task::spawn_blocking(move || password::hash_password_secure(&mut plain, params))
            .await?
    }

    async fn verify_password(&self, hash: &str, plain: &str) -> anyhow::Result<bool> {
        let hash = hash.to_owned();
        let plain = Zeroizing::new(plain.to_owned());
        tokio::task::spawn_blocking(move || password::verify_password(&hash, &plain))
            .await
            .map_err(|err| {
                error!(error = %err, "password verification task failed");
                anyhow::anyhow!("password verification did not complete: {err}")
            })
    }

    fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    fn issue_token(&self, user_id: UserId) -> Result<String, TokenError> {
        self.tokens.issue(user_id)
    }

    fn verify_token(&self, token: &str) -> Result<UserId, TokenError> {
        self.tokens.verify(token)
    }
}
