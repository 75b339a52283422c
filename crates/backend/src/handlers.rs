use axum::{extract::State, http::StatusCode, Extension, Json};
use shared_types::{ReportRequest, ReportResponse};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

// Report handlers
pub async fn create_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ReportRequest>,
) -> ApiResult<Json<ReportResponse>> {
    tracing::info!(
        "Generating report for user {} ({} activities)",
        user.id,
        payload.activities.len()
    );

    let response = state.reports.create_report(&payload).await?;
    Ok(Json(response))
}
