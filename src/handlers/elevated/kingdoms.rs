use axum::extract::State;
use serde::Deserialize;

use crate::database::models::{kingdom::validate_state, Kingdom, KingdomInput};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, JsonBody, Moderator};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct KingdomUpdate {
    #[serde(rename = "Id")]
    pub id: i32,
    #[serde(flatten)]
    pub kingdom: KingdomInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KingdomStateUpdate {
    pub id: i32,
    pub state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KingdomId {
    pub id: i32,
}

/// POST /kingdom/create
pub async fn create(
    State(state): State<AppState>,
    Moderator(moderator): Moderator,
    JsonBody(input): JsonBody<KingdomInput>,
) -> Result<ApiResponse<Kingdom>, ApiError> {
    input.validate().map_err(ApiError::bad_request)?;
    let kingdom = state.kingdoms().create(&input).await?;
    tracing::info!("Kingdom {} created by {}", kingdom.id, moderator.user.name);
    Ok(ApiResponse::ok("kingdom created successfully", kingdom))
}

/// PUT /kingdom/update - replaces every writable field
pub async fn update(
    State(state): State<AppState>,
    Moderator(_moderator): Moderator,
    JsonBody(update): JsonBody<KingdomUpdate>,
) -> Result<ApiResponse<Kingdom>, ApiError> {
    update.kingdom.validate().map_err(ApiError::bad_request)?;
    let kingdom = state.kingdoms().update(update.id, &update.kingdom).await?;
    Ok(ApiResponse::ok("kingdom updated successfully", kingdom))
}

/// PUT /kingdom/update/status
pub async fn update_status(
    State(state): State<AppState>,
    Moderator(_moderator): Moderator,
    JsonBody(update): JsonBody<KingdomStateUpdate>,
) -> Result<ApiResponse<Kingdom>, ApiError> {
    let new_state = update.state.trim();
    validate_state(new_state).map_err(ApiError::bad_request)?;
    let kingdom = state.kingdoms().update_state(update.id, new_state).await?;
    Ok(ApiResponse::ok("kingdom status updated successfully", kingdom))
}

/// DELETE /kingdom/delete - marks the kingdom conquered
pub async fn delete(
    State(state): State<AppState>,
    Moderator(moderator): Moderator,
    JsonBody(request): JsonBody<KingdomId>,
) -> Result<ApiResponse<Kingdom>, ApiError> {
    let kingdom = state.kingdoms().soft_delete(request.id).await?;
    tracing::info!("Kingdom {} conquered by {}", kingdom.id, moderator.user.name);
    Ok(ApiResponse::ok("kingdom deleted successfully", kingdom))
}
