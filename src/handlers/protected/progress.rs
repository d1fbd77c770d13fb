use axum::extract::State;

use crate::error::ApiError;
use crate::handlers::{JsonBody, PathId};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{AttemptOutcome, ProgressReport, ProgressService};
use crate::state::AppState;
use crate::validation::curriculum;

/// Grade an answer and fold it into the user's progress
#[utoipa::path(post, path = "/exercises/{id}/attempts", tag = "Progress",
    params(("id" = uuid::Uuid, Path, description = "Exercise id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 201, description = "Graded attempt with updated progress"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Exercise not found")
    ))]
pub async fn record_attempt(
    State(state): State<AppState>,
    user: AuthUser,
    PathId(exercise_id): PathId,
    JsonBody(body): JsonBody,
) -> ApiResult<AttemptOutcome> {
    let attempt = curriculum::attempt(&body).map_err(ApiError::validation)?;
    let outcome = ProgressService::new(state.store.clone())
        .record_attempt(user.id, exercise_id, attempt)
        .await?;
    Ok(ApiResponse::created(outcome))
}

#[utoipa::path(get, path = "/progress", tag = "Progress",
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses((status = 200, description = "Progress of the signed-in user"), (status = 401, description = "Authentication required")))]
pub async fn report(State(state): State<AppState>, user: AuthUser) -> ApiResult<ProgressReport> {
    let report = ProgressService::new(state.store.clone()).report(user.id).await?;
    Ok(ApiResponse::success(report))
}
