use axum::extract::State;

use crate::handlers::QueryParams;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::services::{UserListParams, UserPage, UserService};
use crate::state::AppState;

/// Paginated search over non-admin accounts
#[utoipa::path(get, path = "/users", tag = "Users",
    params(("page" = Option<u64>, Query, description = "1-based page"), ("limit" = Option<u64>, Query, description = "Page size"), ("search" = Option<String>, Query, description = "Case-insensitive match on name or email")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "One page of users"),
        (status = 400, description = "page is out of range"),
        (status = 401, description = "Admin access required")
    ))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    QueryParams(params): QueryParams<UserListParams>,
) -> ApiResult<UserPage> {
    let page = UserService::new(state.store.clone(), state.config.clone())
        .list(&params)
        .await?;
    Ok(ApiResponse::success(page))
}
