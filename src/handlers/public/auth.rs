use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::database::models::{Role, User};
use crate::error::ApiError;
use crate::middleware::{session_cookie, ApiResponse, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub pass: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginBody {
    pub id: i32,
    pub role: Role,
    pub name: String,
}

impl From<&User> for LoginBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role(),
            name: user.name.clone(),
        }
    }
}

/// POST /login - checks credentials and sets the session cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<LoginBody>), ApiError> {
    let user = state
        .users()
        .find_by_name(request.login.trim())
        .await?
        .filter(|user| auth::verify_password(&request.password, &user.password))
        .ok_or_else(|| ApiError::forbidden("incorrect user data"))?;

    let security = &state.config.security;
    let (token, ttl) = auth::issue_token(&user, security)?;
    tracing::info!("User {} logged in", user.name);

    let jar = jar.add(session_cookie(security, &token, ttl));
    Ok((jar, ApiResponse::ok("user logged in", LoginBody::from(&user))))
}

/// POST /signup - registers a buyer account
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignupRequest>,
) -> Result<ApiResponse<User>, ApiError> {
    if request.pass.is_empty() {
        return Err(ApiError::bad_request("password is empty"));
    }
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is empty"));
    }

    let hash = auth::hash_password(&request.pass)?;
    let user = state.users().create(name, &hash, Role::Buyer).await?;
    tracing::info!("Registered user {} (id {})", user.name, user.id);

    Ok(ApiResponse::ok("user created", user))
}
