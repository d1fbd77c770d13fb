use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::{session_cookie, ApiResponse, ApiResult, AuthUser};
use crate::models::UserProfile;
use crate::services::UserService;
use crate::state::AppState;
use crate::validation::account;

/// Update the profile and re-issue the session so its claims match
#[utoipa::path(put, path = "/users/profile", tag = "Users",
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Updated profile; session re-issued"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Authentication required")
    ))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
    JsonBody(body): JsonBody,
) -> Result<(CookieJar, ApiResponse<UserProfile>), ApiError> {
    let profile = account::profile(&body).map_err(ApiError::validation)?;
    let session = UserService::new(state.store.clone(), state.config.clone())
        .update_profile(user.id, profile)
        .await?;

    let jar = jar.add(session_cookie(&state.config.security, session.token));
    Ok((jar, ApiResponse::success(UserProfile::from(&session.user))))
}

#[utoipa::path(patch, path = "/users/profile/password", tag = "Users",
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Old password is incorrect"),
        (status = 401, description = "Authentication required")
    ))]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    let change =
        account::password_change(&body, state.config.security.min_password_length).map_err(ApiError::validation)?;
    UserService::new(state.store.clone(), state.config.clone())
        .change_password(user.id, change)
        .await?;
    Ok(ApiResponse::success(json!({ "message": "Password updated successfully" })))
}
