//! Supabase (GoTrue) identity provider client.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::JwtVerifier;
use super::provider::{AuthError, AuthProvider};
use super::types::{AuthUser, NewAccount, TokenPair};

/// Identity provider backed by the Supabase auth REST API.
pub struct SupabaseAuth {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    verifier: Option<JwtVerifier>,
}

impl SupabaseAuth {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            verifier: None,
        }
    }

    /// Verify bearer tokens locally instead of asking the provider.
    pub fn with_jwt_verifier(mut self, verifier: JwtVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn token_grant<T: Serialize + ?Sized>(
        &self,
        grant_type: &str,
        body: &T,
        email: Option<&str>,
    ) -> Result<TokenPair, AuthError> {
        let response = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body, email));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Upstream(format!("Invalid token response: {}", e)))?;

        Ok(session.into())
    }
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

impl From<SessionResponse> for TokenPair {
    fn from(session: SessionResponse) -> Self {
        TokenPair {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: Option<String>,
}

/// Signup answers with a session when email confirmation is off, and with
/// the bare user object when it is on.
#[derive(Debug, Deserialize)]
struct SignupResponse {
    id: Option<Uuid>,
    email: Option<String>,
    user: Option<ProviderUser>,
    access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    error: Option<String>,
    error_code: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

/// Map a failed provider response to an [`AuthError`].
///
/// Older GoTrue versions report `error`/`error_description`, newer ones
/// `error_code`/`msg`; both are understood.
fn classify_error(status: StatusCode, body: &str, email: Option<&str>) -> AuthError {
    let parsed: ProviderErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed
        .error_code
        .or(parsed.error)
        .unwrap_or_default()
        .to_lowercase();
    let message = parsed
        .msg
        .or(parsed.error_description)
        .or(parsed.message)
        .unwrap_or_default();
    let lowered = message.to_lowercase();

    if code == "email_not_confirmed" || lowered.contains("email not confirmed") {
        AuthError::EmailNotConfirmed
    } else if code == "user_already_exists"
        || code == "email_exists"
        || lowered.contains("already registered")
    {
        AuthError::UserAlreadyExists(email.unwrap_or_default().to_string())
    } else if code == "invalid_credentials"
        || code == "invalid_grant"
        || lowered.contains("invalid login credentials")
    {
        AuthError::InvalidCredentials
    } else if code == "bad_jwt" || status == StatusCode::UNAUTHORIZED {
        AuthError::InvalidToken
    } else {
        tracing::error!("Identity provider error: {} - {}", status, body);
        AuthError::Upstream(format!("{}: {}", status, message))
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        self.token_grant(
            "password",
            &PasswordCredentials { email, password },
            Some(email),
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.token_grant("refresh_token", &RefreshGrant { refresh_token }, None)
            .await
            .map_err(|e| match e {
                AuthError::InvalidCredentials => AuthError::InvalidToken,
                other => other,
            })
    }

    async fn user_from_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        if let Some(verifier) = &self.verifier {
            return verifier
                .user_from_token(token)
                .ok_or(AuthError::InvalidToken);
        }

        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body, None));
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| AuthError::Upstream(format!("Invalid user response: {}", e)))?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<NewAccount, AuthError> {
        let response = self
            .client
            .post(self.endpoint("signup"))
            .header("apikey", &self.api_key)
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body, Some(email)));
        }

        let signup: SignupResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Upstream(format!("Invalid signup response: {}", e)))?;

        new_account_from_signup(signup, email)
    }
}

fn new_account_from_signup(signup: SignupResponse, email: &str) -> Result<NewAccount, AuthError> {
    let confirmation_required = signup.access_token.is_none();
    let (id, account_email) = match signup.user {
        Some(user) => (Some(user.id), user.email),
        None => (signup.id, signup.email),
    };
    let id = id.ok_or_else(|| AuthError::Upstream("Signup response without user id".to_string()))?;

    Ok(NewAccount {
        id,
        email: account_email.unwrap_or_else(|| email.to_string()),
        confirmation_required,
    })
}
