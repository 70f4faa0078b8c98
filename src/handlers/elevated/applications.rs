use axum::extract::State;

use crate::database::models::RulerApplication;
use crate::error::ApiError;
use crate::handlers::protected::applications::StateRequest;
use crate::middleware::{ApiResponse, JsonBody, Moderator};
use crate::services::ApplicationService;
use crate::state::AppState;

/// PUT /application/status/moderator - approve or reject a submitted application
pub async fn change_status(
    State(state): State<AppState>,
    Moderator(moderator): Moderator,
    JsonBody(request): JsonBody<StateRequest>,
) -> Result<ApiResponse<RulerApplication>, ApiError> {
    let target = request.target()?;
    let app = ApplicationService::new(state.applications())
        .change_state_as_moderator(&moderator.user, request.id, target)
        .await?;

    tracing::info!("Application {} moved to {} by {}", app.id, target, moderator.user.name);
    Ok(ApiResponse::ok("application status updated successfully", app))
}
