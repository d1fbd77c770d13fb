use axum::extract::State;
use serde_json::Value;

use super::deleted;
use crate::error::ApiError;
use crate::handlers::{JsonBody, PathId};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::models::ConceptRelationship;
use crate::services::RelationshipService;
use crate::state::AppState;
use crate::validation::curriculum;

/// Link two concepts; the path id is the source
#[utoipa::path(post, path = "/concepts/{id}/relationships", tag = "Concepts",
    params(("id" = uuid::Uuid, Path, description = "Source concept id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 201, description = "Relationship created"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Concept not found")
    ))]
pub async fn create_relationship(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(source_id): PathId,
    JsonBody(body): JsonBody,
) -> ApiResult<ConceptRelationship> {
    let input = curriculum::new_relationship(&body).map_err(ApiError::validation)?;
    let edge = RelationshipService::new(state.store.clone()).create(source_id, input).await?;
    Ok(ApiResponse::created(edge))
}

#[utoipa::path(delete, path = "/concept-relationships/{id}", tag = "Concepts",
    params(("id" = uuid::Uuid, Path, description = "Relationship id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Relationship deleted"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Relationship not found")
    ))]
pub async fn delete_relationship(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
) -> ApiResult<Value> {
    RelationshipService::new(state.store.clone()).delete(id).await?;
    Ok(ApiResponse::success(deleted("Relationship", id)))
}
