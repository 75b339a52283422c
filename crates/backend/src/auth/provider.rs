//! Boundary to the external identity provider.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{AuthUser, NewAccount, TokenPair};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email not confirmed")]
    EmailNotConfirmed,

    #[error("user with email '{0}' already exists")]
    UserAlreadyExists(String),

    #[error("invalid or expired token")]
    InvalidToken,

    /// Transport failure or an unexpected provider response
    #[error("identity provider error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Upstream(err.to_string())
    }
}

/// Operations the service needs from an identity provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange email and password for a token pair.
    async fn sign_in(&self, email: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Exchange a refresh token for a fresh token pair.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Resolve a bearer access token to the user it was issued for.
    async fn user_from_token(&self, token: &str) -> Result<AuthUser, AuthError>;

    async fn create_account(&self, email: &str, password: &str) -> Result<NewAccount, AuthError>;
}
