use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Current user decoded from the session token
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub year_of_birth: i64,
    pub is_male: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            is_admin: claims.is_admin,
            year_of_birth: claims.year_of_birth,
            is_male: claims.is_male,
        }
    }
}

/// An authenticated user with admin rights
#[derive(Clone, Debug)]
pub struct AdminUser(pub AuthUser);

/// Decode the session token, if any, into an `AuthUser` request extension.
///
/// Requests without a valid token pass through anonymously; routes that need
/// a session reject them through the `AuthUser`/`AdminUser` extractors.
pub async fn session_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Some(token) = extract_token(request.headers(), &state.config.security.cookie_name) {
        match validate_jwt(&token, &state.config.security) {
            Ok(claims) => {
                tracing::debug!("Session for user {}", claims.sub);
                request.extensions_mut().insert(AuthUser::from(claims));
            }
            Err(e) => tracing::debug!("Ignoring session token: {}", e),
        }
    }

    next.run(request).await
}

/// Session cookie first, then an `Authorization: Bearer` header.
fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

/// HTTP-only cookie carrying `token`. An empty token with zero max-age clears
/// the session.
pub fn session_cookie(security: &SecurityConfig, token: String) -> Cookie<'static> {
    let clearing = token.is_empty();
    let mut cookie = Cookie::build((security.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(security.cookie_secure)
        .same_site(SameSite::Lax)
        .build();
    if clearing {
        cookie.make_removal();
    }
    cookie
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            tracing::warn!("Non-admin user {} tried an admin route", user.id);
            return Err(ApiError::unauthorized("Admin access required"));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cookie_wins_over_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=from-cookie"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(extract_token(&headers, "token").as_deref(), Some("from-cookie"));

        headers.remove(header::COOKIE);
        assert_eq!(extract_token(&headers, "token").as_deref(), Some("from-header"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_token(&headers, "token"), None);
    }

    #[test]
    fn clearing_cookie_expires_immediately() {
        let security = crate::config::AppConfig::development().security;
        let cookie = session_cookie(&security, String::new());
        let header = cookie.to_string();
        assert!(header.starts_with("token=;"));
        assert!(header.contains("Max-Age=0"));
        assert!(session_cookie(&security, "abc".into()).http_only().unwrap_or(false));
    }
}
