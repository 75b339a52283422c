//! Auth-related types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export shared types for convenience
pub use shared_types::{AuthTokenResponse, AuthUserResponse, CreateAccountResponse};

/// Claims carried by identity provider access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub aud: String,
    /// Issued at timestamp
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Validated user behind a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

impl From<AuthUser> for AuthUserResponse {
    fn from(user: AuthUser) -> Self {
        AuthUserResponse {
            id: user.id,
            email: user.email,
        }
    }
}

/// Access/refresh token pair issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl From<TokenPair> for AuthTokenResponse {
    fn from(tokens: TokenPair) -> Self {
        AuthTokenResponse {
            access_token: tokens.access_token,
            token_type: "bearer".to_string(),
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        }
    }
}

/// Account registered with the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub id: Uuid,
    pub email: String,
    pub confirmation_required: bool,
}

impl From<NewAccount> for CreateAccountResponse {
    fn from(account: NewAccount) -> Self {
        CreateAccountResponse {
            id: account.id,
            email: account.email,
            confirmation_required: account.confirmation_required,
        }
    }
}
