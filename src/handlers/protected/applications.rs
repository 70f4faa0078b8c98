use axum::extract::State;
use serde::Deserialize;

use crate::database::models::{ApplicationState, ApplicationWithKingdoms, RulerApplication};
use crate::error::ApiError;
use crate::filter::ApplicationFilter;
use crate::handlers::required_date;
use crate::middleware::{ApiResponse, CurrentUser, JsonBody, QueryParams};
use crate::services::{ApplicationService, AsyncNotifier};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListQuery {
    pub id: Option<i32>,
    pub all: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdQuery {
    pub id: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdRequest {
    pub id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateRequest {
    pub kingdom_id: i32,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RulerRequest {
    pub id: i32,
    pub ruler: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KingdomLinkRequest {
    pub application_id: i32,
    pub kingdom_id: i32,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KingdomUnlinkRequest {
    pub application_id: i32,
    pub kingdom_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StateRequest {
    pub id: i32,
    pub state: String,
}

impl StateRequest {
    pub fn target(&self) -> Result<ApplicationState, ApiError> {
        self.state
            .trim()
            .parse()
            .map_err(|e: String| ApiError::bad_request(format!("error parsing application: {}", e)))
    }
}

impl ListQuery {
    /// Only the exact value `true` asks for every application.
    pub fn wants_all(&self) -> bool {
        self.all.as_deref() == Some("true")
    }
}

fn service(state: &AppState) -> ApplicationService {
    ApplicationService::new(state.applications())
}

/// GET /applications - own applications, one by `Id`, or all (`All=true`, moderators).
/// The body is always a list.
pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<ApiResponse<Vec<RulerApplication>>, ApiError> {
    let service = service(&state);

    if query.wants_all() {
        if !current.user.role().is_moderator() {
            return Err(ApiError::forbidden("insufficient rights to complete the request"));
        }
        let mut filter = ApplicationFilter::new();
        filter
            .status(query.status.as_deref())?
            .range(query.from.as_deref(), query.to.as_deref())?;

        let apps = service.list_all(&filter).await?;
        return Ok(ApiResponse::ok("applications found", apps));
    }

    if let Some(id) = query.id {
        let app = service.visible(&current.user, id).await?;
        return Ok(ApiResponse::ok("application found", vec![app]));
    }

    let apps = service.list_own(&current.user).await?;
    Ok(ApiResponse::ok("applications found", apps))
}

/// GET /application/with_kingdoms?Id=
pub async fn with_kingdoms(
    State(state): State<AppState>,
    current: CurrentUser,
    QueryParams(query): QueryParams<IdQuery>,
) -> Result<ApiResponse<ApplicationWithKingdoms>, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::bad_request("error parsing request params: Id is required"))?;
    let view = service(&state).with_kingdoms(&current.user, id).await?;
    Ok(ApiResponse::ok("application found", view))
}

/// POST /application/create - adds a kingdom to the caller's draft, creating it if needed
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    JsonBody(request): JsonBody<CreateRequest>,
) -> Result<ApiResponse<ApplicationWithKingdoms>, ApiError> {
    let from = required_date(&request.from, "From")?;
    let to = required_date(&request.to, "To")?;

    let view = service(&state)
        .create_with_kingdom(&current.user, request.kingdom_id, from, to)
        .await?;
    Ok(ApiResponse::ok("kingdom added to application", view))
}

/// PUT /application/update - sets the ruler name of a draft
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    JsonBody(request): JsonBody<RulerRequest>,
) -> Result<ApiResponse<RulerApplication>, ApiError> {
    if request.ruler.chars().count() > 50 {
        return Err(ApiError::bad_request("ruler name is longer than 50 characters"));
    }
    let app = service(&state)
        .update_ruler(&current.user, request.id, &request.ruler)
        .await?;
    Ok(ApiResponse::ok("application updated successfully", app))
}

/// PUT /application/add_kingdom
pub async fn add_kingdom(
    State(state): State<AppState>,
    current: CurrentUser,
    JsonBody(request): JsonBody<KingdomLinkRequest>,
) -> Result<ApiResponse<ApplicationWithKingdoms>, ApiError> {
    let from = required_date(&request.from, "From")?;
    let to = required_date(&request.to, "To")?;

    let view = service(&state)
        .add_kingdom(&current.user, request.application_id, request.kingdom_id, from, to)
        .await?;
    Ok(ApiResponse::ok("kingdom added to application", view))
}

/// PUT /application/update_kingdom - changes the dates of a kingdom in a draft
pub async fn update_kingdom(
    State(state): State<AppState>,
    current: CurrentUser,
    JsonBody(request): JsonBody<KingdomLinkRequest>,
) -> Result<ApiResponse<ApplicationWithKingdoms>, ApiError> {
    let from = required_date(&request.from, "From")?;
    let to = required_date(&request.to, "To")?;

    let view = service(&state)
        .update_kingdom(&current.user, request.application_id, request.kingdom_id, from, to)
        .await?;
    Ok(ApiResponse::ok("kingdom in application updated", view))
}

/// DELETE /application/delete_kingdom
pub async fn delete_kingdom(
    State(state): State<AppState>,
    current: CurrentUser,
    JsonBody(request): JsonBody<KingdomUnlinkRequest>,
) -> Result<ApiResponse<ApplicationWithKingdoms>, ApiError> {
    let view = service(&state)
        .remove_kingdom(&current.user, request.application_id, request.kingdom_id)
        .await?;
    Ok(ApiResponse::ok("kingdom removed from application", view))
}

/// DELETE /application/delete - removes an application the caller owns
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    JsonBody(request): JsonBody<IdRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    service(&state).delete(&current.user, request.id).await?;
    Ok(ApiResponse::message("application deleted"))
}

/// PUT /application/status/user - submit or withdraw; submissions go to the checker
pub async fn change_status(
    State(state): State<AppState>,
    current: CurrentUser,
    JsonBody(request): JsonBody<StateRequest>,
) -> Result<ApiResponse<RulerApplication>, ApiError> {
    let target = request.target()?;
    let app = service(&state)
        .change_state_as_creator(&current.user, request.id, target)
        .await?;

    if target == ApplicationState::Submitted {
        AsyncNotifier::new(state.http.clone(), state.config.async_service.clone())
            .notify_submitted(app.id, app.checked);
    }

    Ok(ApiResponse::ok("application status updated successfully", app))
}
