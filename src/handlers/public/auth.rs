use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;

use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::{session_cookie, ApiResponse, ApiResult, AuthUser};
use crate::models::UserProfile;
use crate::services::AuthService;
use crate::state::AppState;
use crate::validation::account;

/// The decoded session, or `null` without one
#[utoipa::path(get, path = "/auth/self", tag = "Auth",
    responses((status = 200, description = "Session claims, or null")))]
pub async fn current(user: Option<AuthUser>) -> ApiResult<Option<AuthUser>> {
    Ok(ApiResponse::success(user))
}

#[utoipa::path(post, path = "/auth/signin", tag = "Auth",
    responses((status = 200, description = "Signed in; sets the session cookie"), (status = 400, description = "Invalid credentials")))]
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(body): JsonBody,
) -> Result<(CookieJar, ApiResponse<UserProfile>), ApiError> {
    let credentials = account::signin(&body).map_err(ApiError::validation)?;
    let session = AuthService::new(state.store.clone(), state.config.clone())
        .signin(credentials)
        .await?;

    let jar = jar.add(session_cookie(&state.config.security, session.token));
    Ok((jar, ApiResponse::success(UserProfile::from(&session.user))))
}

/// Register a regular account and sign it in
#[utoipa::path(post, path = "/auth/signup", tag = "Auth",
    responses((status = 201, description = "Registered; sets the session cookie"), (status = 400, description = "Validation failed or email taken")))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(body): JsonBody,
) -> Result<(CookieJar, ApiResponse<UserProfile>), ApiError> {
    let input = account::signup(&body, state.config.security.min_password_length).map_err(ApiError::validation)?;
    let session = AuthService::new(state.store.clone(), state.config.clone())
        .signup(input)
        .await?;

    let jar = jar.add(session_cookie(&state.config.security, session.token));
    Ok((jar, ApiResponse::created(UserProfile::from(&session.user))))
}
