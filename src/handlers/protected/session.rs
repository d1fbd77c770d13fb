use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::middleware::{session_cookie, ApiResponse, AuthUser};
use crate::state::AppState;

/// Replace the session cookie with an expired one
#[utoipa::path(post, path = "/auth/signout", tag = "Auth",
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses((status = 200, description = "Session cookie cleared"), (status = 401, description = "Authentication required")))]
pub async fn signout(State(state): State<AppState>, user: AuthUser, jar: CookieJar) -> (CookieJar, ApiResponse<Value>) {
    tracing::debug!("User {} signed out", user.id);
    let jar = jar.add(session_cookie(&state.config.security, String::new()));
    (jar, ApiResponse::success(json!({ "message": "Signed out successfully" })))
}
