use std::time::Duration;

use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::database::models::Role;
use crate::error::ApiError;
use crate::middleware::{removal_cookie, ApiResponse, Session};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WhoAmI {
    pub id: i32,
    pub name: String,
    pub role: Role,
}

/// GET /login - identity carried by the session token
pub async fn check_login(session: Session) -> ApiResponse<WhoAmI> {
    let claims = session.claims;
    ApiResponse::ok(
        "user is logged in",
        WhoAmI {
            id: claims.id,
            role: claims.role(),
            name: claims.name,
        },
    )
}

/// DELETE /logout - revokes the token for the rest of its lifetime
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
) -> Result<(CookieJar, ApiResponse<()>), ApiError> {
    let ttl = Duration::from_secs(session.claims.remaining_secs());
    state.blacklist.revoke(&session.token, ttl).await?;
    tracing::info!("User {} logged out", session.claims.name);

    let jar = jar.add(removal_cookie(&state.config.security));
    Ok((jar, ApiResponse::message("user logged out")))
}
