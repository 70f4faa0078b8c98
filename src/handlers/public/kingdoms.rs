use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::database::models::Kingdom;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, OptionalSession, QueryParams};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(rename = "Kingdom_name", default)]
    pub kingdom_name: String,
}

#[derive(Debug, Deserialize)]
pub struct KingdomQuery {
    #[serde(rename = "Id")]
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct FeedBody {
    #[serde(rename = "Kingdoms")]
    pub kingdoms: Vec<Kingdom>,
    /// Id of the caller's draft application, 0 when there is none.
    #[serde(rename = "Draft_Application")]
    pub draft_application: i32,
}

/// GET /kingdoms?Kingdom_name= - kingdom search, with the caller's draft id when logged in
pub async fn feed(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    QueryParams(query): QueryParams<FeedQuery>,
) -> Result<ApiResponse<FeedBody>, ApiError> {
    let kingdoms = state.kingdoms().search(query.kingdom_name.trim()).await?;

    let draft_application = match session {
        Some(session) => state
            .applications()
            .find_draft(session.claims.id)
            .await?
            .map(|draft| draft.id)
            .unwrap_or(0),
        None => 0,
    };

    Ok(ApiResponse::ok(
        "kingdoms found",
        FeedBody {
            kingdoms,
            draft_application,
        },
    ))
}

/// GET /kingdom?Id= - one kingdom
pub async fn get(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<KingdomQuery>,
) -> Result<ApiResponse<Kingdom>, ApiError> {
    let kingdom = state.kingdoms().get(query.id).await?;
    Ok(ApiResponse::ok("kingdom found", kingdom))
}
