//! Router-level tests with in-memory identity and generation providers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use report_backend::auth::{AuthError, AuthProvider, AuthUser, NewAccount, TokenPair};
use report_backend::report::{
    GeneratedText, GenerationError, ReportService, ReportSettings, TextGenerator,
};
use report_backend::{build_router, AppState};

const VALID_TOKEN: &str = "valid-token";
const USER_ID: Uuid = Uuid::from_u128(0x5a1e_0000_0000_0000_0000_0000_0000_0001);

struct FakeAuth;

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        match (email, password) {
            ("user@example.com", "secret") => Ok(TokenPair {
                access_token: VALID_TOKEN.to_string(),
                refresh_token: Some("refresh-1".to_string()),
                expires_in: Some(3600),
            }),
            ("unconfirmed@example.com", _) => Err(AuthError::EmailNotConfirmed),
            ("down@example.com", _) => Err(AuthError::Upstream("connection refused".to_string())),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        if refresh_token == "refresh-1" {
            Ok(TokenPair {
                access_token: "rotated-token".to_string(),
                refresh_token: Some("refresh-2".to_string()),
                expires_in: Some(3600),
            })
        } else {
            Err(AuthError::InvalidToken)
        }
    }

    async fn user_from_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        if token == VALID_TOKEN {
            Ok(AuthUser {
                id: USER_ID,
                email: Some("user@example.com".to_string()),
            })
        } else {
            Err(AuthError::InvalidToken)
        }
    }

    async fn create_account(&self, email: &str, _password: &str) -> Result<NewAccount, AuthError> {
        if email == "taken@example.com" {
            return Err(AuthError::UserAlreadyExists(email.to_string()));
        }
        Ok(NewAccount {
            id: Uuid::from_u128(2),
            email: email.to_string(),
            confirmation_required: true,
        })
    }
}

/// Always answers with a wrapped, mojibake-damaged report.
struct WrappedGenerator;

#[async_trait]
impl TextGenerator for WrappedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<GeneratedText, GenerationError> {
        Ok(GeneratedText::Text(
            r#"candidates=[text='{"report": "RevisÃ© el cÃ³digo y preparÃ© el despliegue."}']"#
                .to_string(),
        ))
    }
}

fn app_with(reports: ReportService) -> Router {
    build_router(AppState {
        auth: Arc::new(FakeAuth),
        reports: Arc::new(reports),
    })
}

fn app() -> Router {
    app_with(ReportService::new(
        Some(Arc::new(WrappedGenerator)),
        ReportSettings::default(),
    ))
}

fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request building should succeed")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body reading should succeed");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response should be JSON")
    };
    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_get_token_success() {
    let request = json_request(
        Method::POST,
        "/auth/get-token",
        json!({"email": "user@example.com", "password": "secret"}),
        None,
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], VALID_TOKEN);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["refresh_token"], "refresh-1");
}

#[tokio::test]
async fn test_get_token_failures_map_to_status() {
    let cases = [
        ("user@example.com", "wrong", StatusCode::UNAUTHORIZED),
        ("unconfirmed@example.com", "secret", StatusCode::FORBIDDEN),
        ("down@example.com", "secret", StatusCode::BAD_GATEWAY),
        ("not-an-email", "secret", StatusCode::BAD_REQUEST),
    ];
    for (email, password, expected) in cases {
        let request = json_request(
            Method::POST,
            "/auth/get-token",
            json!({"email": email, "password": password}),
            None,
        );
        let (status, body) = send(app(), request).await;
        assert_eq!(status, expected, "email {}", email);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_refresh_token() {
    let request = json_request(
        Method::POST,
        "/auth/refresh-token",
        json!({"refresh_token": "refresh-1"}),
        None,
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], "rotated-token");

    let request = json_request(
        Method::POST,
        "/auth/refresh-token",
        json!({"refresh_token": "stale"}),
        None,
    );
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_account() {
    let request = json_request(
        Method::POST,
        "/auth/create-account",
        json!({"email": "new@example.com", "password": "secret"}),
        None,
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["confirmation_required"], true);

    let request = json_request(
        Method::POST,
        "/auth/create-account",
        json!({"email": "taken@example.com", "password": "secret"}),
        None,
    );
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_verify_token_returns_user() {
    let request = Request::builder()
        .uri("/auth/verify-token")
        .header(header::AUTHORIZATION, format!("Bearer {}", VALID_TOKEN))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], USER_ID.to_string());
    assert_eq!(body["email"], "user@example.com");
}

#[tokio::test]
async fn test_reports_require_credentials() {
    let payload = json!({"activities": ["Revisé el código"]});

    let request = json_request(Method::POST, "/reports", payload.clone(), None);
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = json_request(Method::POST, "/reports", payload, Some("forged"));
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_report_is_cleaned_up() {
    let request = json_request(
        Method::POST,
        "/reports",
        json!({"actividades": ["Revisé el código", "Preparé el despliegue"]}),
        Some(VALID_TOKEN),
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"], "Revisé el código y preparé el despliegue.");
}

#[tokio::test]
async fn test_local_report_respects_budget() {
    let reports = ReportService::local_only(ReportSettings {
        max_chars: 60,
        ..ReportSettings::default()
    });
    let activities: Vec<String> = (1..=10)
        .map(|i| format!("Actividad número {} completada", i))
        .collect();
    let request = json_request(
        Method::POST,
        "/reports",
        json!({ "activities": activities }),
        Some(VALID_TOKEN),
    );
    let (status, body) = send(app_with(reports), request).await;
    assert_eq!(status, StatusCode::OK);
    let report = body["report"].as_str().unwrap();
    assert!(report.starts_with("Reporte de actividades:"));
    assert!(report.chars().count() <= 60);
}

#[tokio::test]
async fn test_empty_activities_are_unprocessable() {
    let request = json_request(
        Method::POST,
        "/reports",
        json!({"activities": ["   ", ""]}),
        Some(VALID_TOKEN),
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}
