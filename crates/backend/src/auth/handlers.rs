//! Authentication HTTP handlers.
//!
//! Thin pass-throughs to the configured [`AuthProvider`](super::AuthProvider).

use axum::{extract::State, http::StatusCode, Extension, Json};
use shared_types::{CreateAccountRequest, LoginRequest, RefreshTokenRequest};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

use super::types::{AuthTokenResponse, AuthUser, AuthUserResponse, CreateAccountResponse};

/// Exchange email and password for an access/refresh token pair.
pub async fn get_token(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<AuthTokenResponse>> {
    let email = validate_credentials(&body.email, &body.password)?;

    let tokens = state.auth.sign_in(email, &body.password).await?;
    tracing::info!("Issued token for {}", email);

    Ok(Json(tokens.into()))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> ApiResult<Json<AuthTokenResponse>> {
    let refresh_token = body.refresh_token.trim();
    if refresh_token.is_empty() {
        return Err(ApiError::bad_request("refresh_token is required"));
    }

    let tokens = state.auth.refresh(refresh_token).await?;
    Ok(Json(tokens.into()))
}

/// Echo the user behind the bearer token. Runs behind `require_auth`.
pub async fn verify_token(Extension(user): Extension<AuthUser>) -> Json<AuthUserResponse> {
    Json(user.into())
}

pub async fn create_account(
    State(state): State<AppState>,
    Json(body): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<CreateAccountResponse>)> {
    let email = validate_credentials(&body.email, &body.password)?;

    let account = state.auth.create_account(email, &body.password).await?;
    tracing::info!(
        "Created account for {} (confirmation required: {})",
        email,
        account.confirmation_required
    );

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Check credentials are present and return the trimmed email.
fn validate_credentials<'a>(email: &'a str, password: &str) -> ApiResult<&'a str> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if password.is_empty() {
        return Err(ApiError::bad_request("password is required"));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_credentials() {
        assert_eq!(
            validate_credentials("  user@example.com ", "secret").unwrap(),
            "user@example.com"
        );
        assert!(matches!(
            validate_credentials("", "secret"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_credentials("not-an-email", "secret"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_credentials("user@example.com", ""),
            Err(ApiError::BadRequest(_))
        ));
    }
}
