use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::{self, Claims};
use crate::config::SecurityConfig;
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Prefix stored in front of the JWT inside the session cookie.
pub const TOKEN_PREFIX: &str = "Bearer";

/// A valid, non-revoked session token and its claims.
#[derive(Clone, Debug)]
pub struct Session {
    pub claims: Claims,
    pub token: String,
}

/// Session when one is present and valid, otherwise anonymous.
#[derive(Clone, Debug)]
pub struct OptionalSession(pub Option<Session>);

/// Session whose user still exists in the database.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub session: Session,
    pub user: User,
}

/// Current user holding a moderator role.
#[derive(Clone, Debug)]
pub struct Moderator(pub CurrentUser);

/// Request from the external checker carrying the shared `AsyncKey` header.
#[derive(Clone, Copy, Debug)]
pub struct ServiceKey;

pub const SERVICE_KEY_HEADER: &str = "AsyncKey";

/// Reads the raw JWT out of the session cookie.
pub fn token_from_cookie(jar: &CookieJar, cookie_name: &str) -> Result<String, ApiError> {
    let cookie = jar
        .get(cookie_name)
        .ok_or_else(|| ApiError::unauthorized("error getting cookie"))?;

    let token = cookie
        .value()
        .strip_prefix(TOKEN_PREFIX)
        .ok_or_else(|| ApiError::unauthorized("error parsing jwt token: no prefix"))?
        .trim_start();

    if token.is_empty() {
        return Err(ApiError::unauthorized("error parsing jwt token: no prefix"));
    }
    Ok(token.to_string())
}

pub fn session_cookie(security: &SecurityConfig, token: &str, ttl_secs: i64) -> Cookie<'static> {
    Cookie::build((security.cookie_name.clone(), format!("{}{}", TOKEN_PREFIX, token)))
        .path("/")
        .http_only(true)
        .secure(security.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl_secs))
        .build()
}

pub fn removal_cookie(security: &SecurityConfig) -> Cookie<'static> {
    Cookie::build((security.cookie_name.clone(), ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .build()
}

impl Session {
    /// Blacklist lookup comes before signature validation so a revoked token
    /// is reported as revoked even after it expired.
    pub async fn resolve(state: &AppState, jar: &CookieJar) -> Result<Self, ApiError> {
        let security = &state.config.security;
        let token = token_from_cookie(jar, &security.cookie_name)?;

        if state.blacklist.is_revoked(&token).await? {
            return Err(ApiError::forbidden("not authorized: token in black list"));
        }

        let claims = auth::validate_token(&token, security)?;
        Ok(Session { claims, token })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Session::resolve(state, &jar).await
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        match Session::resolve(state, &jar).await {
            Ok(session) => Ok(OptionalSession(Some(session))),
            Err(e) => {
                tracing::debug!("Continuing anonymously: {}", e);
                Ok(OptionalSession(None))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        let user = state
            .users()
            .find_by_id(session.claims.id)
            .await?
            .ok_or_else(|| ApiError::forbidden("not authorized: user not found"))?;

        Ok(CurrentUser { session, user })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Moderator {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if !current.user.role().is_moderator() {
            return Err(ApiError::forbidden("insufficient rights to complete the request"));
        }
        Ok(Moderator(current))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ServiceKey {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(SERVICE_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        ServiceKey::check(provided, &state.config.async_service.key)
    }
}

impl ServiceKey {
    /// An unset key locks the callback instead of opening it.
    pub fn check(provided: Option<&str>, expected: &str) -> Result<Self, ApiError> {
        match provided {
            Some(key) if !expected.is_empty() && key == expected => Ok(ServiceKey),
            _ => Err(ApiError::forbidden("error getting async server key")),
        }
    }
}
