use axum::http::{header, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::EnvFilter;

use report_backend::auth::{AuthProvider, JwtVerifier, SupabaseAuth};
use report_backend::config::{AppConfig, ProbeCredentials};
use report_backend::report::{GeminiGenerator, ReportService, TextGenerator};
use report_backend::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let mut supabase = SupabaseAuth::new(&config.supabase_url, config.supabase_key.clone());
    if let Some(secret) = &config.supabase_jwt_secret {
        tracing::info!("Validating access tokens locally with SUPABASE_JWT_SECRET");
        supabase = supabase.with_jwt_verifier(JwtVerifier::new(secret));
    }
    let auth: Arc<dyn AuthProvider> = Arc::new(supabase);

    if let Some(probe) = &config.auth_probe {
        probe_identity_provider(auth.as_ref(), probe).await;
    }

    let generator: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
        Some(key) => {
            let mut gemini = GeminiGenerator::new(key.clone(), config.gemini_model.clone());
            if let Some(base_url) = &config.gemini_base_url {
                tracing::info!("Using generation API root {}", base_url);
                gemini = gemini.with_base_url(base_url.clone());
            }
            tracing::info!("Generating reports with model {}", gemini.model());
            Some(Arc::new(gemini))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, reports will be composed locally");
            None
        }
    };

    let reports = Arc::new(ReportService::new(generator, config.report.clone()));
    tracing::info!(
        "Report budget: {} chars, generation timeout {:?}",
        reports.settings().max_chars,
        reports.settings().timeout
    );

    let app = build_router(AppState { auth, reports }).layer(build_cors_layer());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Sign in once with the configured probe account. Failures are logged only.
async fn probe_identity_provider(auth: &dyn AuthProvider, probe: &ProbeCredentials) {
    match auth.sign_in(&probe.email, &probe.password).await {
        Ok(_) => tracing::info!(
            "Identity provider accepted start-up probe for {}",
            probe.email
        ),
        Err(e) => tracing::warn!("Identity provider start-up probe failed: {}", e),
    }
}

/// Build CORS layer based on environment configuration.
///
/// If CORS_ALLOWED_ORIGINS is set, only those origins are allowed.
/// If not set, defaults to permissive CORS (for development only).
fn build_cors_layer() -> CorsLayer {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS").ok();

    match allowed_origins {
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                tracing::warn!(
                    "CORS_ALLOWED_ORIGINS is set but empty, using permissive CORS (not recommended for production)"
                );
                CorsLayer::permissive()
            } else {
                tracing::info!("CORS configured for origins: {:?}", origins);
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::warn!(
                "CORS_ALLOWED_ORIGINS not set, using permissive CORS (not recommended for production)"
            );
            CorsLayer::permissive()
        }
    }
}
