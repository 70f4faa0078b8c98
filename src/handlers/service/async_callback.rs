use axum::extract::State;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, JsonBody, ServiceKey};
use crate::services::ApplicationService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CheckResult {
    pub id: i32,
    pub check: bool,
}

/// PUT /async/application - verdict from the external checker
pub async fn put_check(
    State(state): State<AppState>,
    _key: ServiceKey,
    JsonBody(result): JsonBody<CheckResult>,
) -> Result<ApiResponse<()>, ApiError> {
    ApplicationService::new(state.applications())
        .record_check(result.id, result.check)
        .await?;
    tracing::info!("Application {} check set to {}", result.id, result.check);
    Ok(ApiResponse::message("application updated successfully"))
}
