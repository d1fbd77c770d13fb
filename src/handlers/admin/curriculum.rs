//! Curriculum mutations. Every handler takes `AdminUser` first so a missing or
//! non-admin session is rejected before the body is read.

use axum::extract::State;
use serde_json::Value;

use super::deleted;
use crate::error::ApiError;
use crate::handlers::{JsonBody, PathId};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::models::{Concept, Exercise, Formula, Module, Subject, Subtopic, Topic};
use crate::services::{
    ConceptService, ExerciseService, FormulaService, ModuleService, SubjectService, SubtopicService, TopicService,
};
use crate::state::AppState;
use crate::validation::curriculum;

// Subjects

#[utoipa::path(post, path = "/subjects", tag = "Subjects",
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 201, description = "Subject created"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required")
    ))]
pub async fn create_subject(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody,
) -> ApiResult<Subject> {
    let input = curriculum::new_subject(&body).map_err(ApiError::validation)?;
    let subject = SubjectService::new(state.store.clone()).create(input).await?;
    Ok(ApiResponse::created(subject))
}

#[utoipa::path(put, path = "/subjects/{id}", tag = "Subjects",
    params(("id" = uuid::Uuid, Path, description = "Subject id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Updated subject"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Subject not found")
    ))]
pub async fn update_subject(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> ApiResult<Subject> {
    let changes = curriculum::subject_changes(&body).map_err(ApiError::validation)?;
    let subject = SubjectService::new(state.store.clone()).update(id, changes).await?;
    Ok(ApiResponse::success(subject))
}

#[utoipa::path(delete, path = "/subjects/soft/{id}", tag = "Subjects",
    params(("id" = uuid::Uuid, Path, description = "Subject id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Subject marked inactive"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Subject not found")
    ))]
pub async fn soft_delete_subject(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
) -> ApiResult<Subject> {
    let subject = SubjectService::new(state.store.clone()).soft_delete(id).await?;
    Ok(ApiResponse::success(subject))
}

#[utoipa::path(delete, path = "/subjects/hard/{id}", tag = "Subjects",
    params(("id" = uuid::Uuid, Path, description = "Subject id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Subject deleted"),
        (status = 400, description = "Still referenced"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Subject not found")
    ))]
pub async fn hard_delete_subject(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
) -> ApiResult<Value> {
    SubjectService::new(state.store.clone()).hard_delete(id).await?;
    Ok(ApiResponse::success(deleted("Subject", id)))
}

// Topics

#[utoipa::path(post, path = "/topics", tag = "Topics",
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 201, description = "Topic created"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required")
    ))]
pub async fn create_topic(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody,
) -> ApiResult<Topic> {
    let input = curriculum::new_topic(&body).map_err(ApiError::validation)?;
    let topic = TopicService::new(state.store.clone()).create(input).await?;
    Ok(ApiResponse::created(topic))
}

#[utoipa::path(put, path = "/topics/{id}", tag = "Topics",
    params(("id" = uuid::Uuid, Path, description = "Topic id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Updated topic"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Topic not found")
    ))]
pub async fn update_topic(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> ApiResult<Topic> {
    let changes = curriculum::topic_changes(&body).map_err(ApiError::validation)?;
    let topic = TopicService::new(state.store.clone()).update(id, changes).await?;
    Ok(ApiResponse::success(topic))
}

#[utoipa::path(delete, path = "/topics/soft/{id}", tag = "Topics",
    params(("id" = uuid::Uuid, Path, description = "Topic id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Topic marked inactive"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Topic not found")
    ))]
pub async fn soft_delete_topic(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
) -> ApiResult<Topic> {
    let topic = TopicService::new(state.store.clone()).soft_delete(id).await?;
    Ok(ApiResponse::success(topic))
}

#[utoipa::path(delete, path = "/topics/hard/{id}", tag = "Topics",
    params(("id" = uuid::Uuid, Path, description = "Topic id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Topic deleted"),
        (status = 400, description = "Still referenced"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Topic not found")
    ))]
pub async fn hard_delete_topic(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
) -> ApiResult<Value> {
    TopicService::new(state.store.clone()).hard_delete(id).await?;
    Ok(ApiResponse::success(deleted("Topic", id)))
}

// Subtopics

#[utoipa::path(post, path = "/subtopics", tag = "Subtopics",
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 201, description = "Subtopic created"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required")
    ))]
pub async fn create_subtopic(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody,
) -> ApiResult<Subtopic> {
    let input = curriculum::new_subtopic(&body).map_err(ApiError::validation)?;
    let subtopic = SubtopicService::new(state.store.clone()).create(input).await?;
    Ok(ApiResponse::created(subtopic))
}

#[utoipa::path(put, path = "/subtopics/{id}", tag = "Subtopics",
    params(("id" = uuid::Uuid, Path, description = "Subtopic id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Updated subtopic"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Subtopic not found")
    ))]
pub async fn update_subtopic(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> ApiResult<Subtopic> {
    let changes = curriculum::subtopic_changes(&body).map_err(ApiError::validation)?;
    let subtopic = SubtopicService::new(state.store.clone()).update(id, changes).await?;
    Ok(ApiResponse::success(subtopic))
}

#[utoipa::path(delete, path = "/subtopics/hard/{id}", tag = "Subtopics",
    params(("id" = uuid::Uuid, Path, description = "Subtopic id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Subtopic deleted"),
        (status = 400, description = "Still referenced"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Subtopic not found")
    ))]
pub async fn hard_delete_subtopic(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
) -> ApiResult<Value> {
    SubtopicService::new(state.store.clone()).hard_delete(id).await?;
    Ok(ApiResponse::success(deleted("Subtopic", id)))
}

// Modules

#[utoipa::path(post, path = "/modules", tag = "Modules",
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 201, description = "Module created"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required")
    ))]
pub async fn create_module(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody,
) -> ApiResult<Module> {
    let input = curriculum::new_module(&body).map_err(ApiError::validation)?;
    let module = ModuleService::new(state.store.clone()).create(input).await?;
    Ok(ApiResponse::created(module))
}

#[utoipa::path(put, path = "/modules/{id}", tag = "Modules",
    params(("id" = uuid::Uuid, Path, description = "Module id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Updated module"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Module not found")
    ))]
pub async fn update_module(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> ApiResult<Module> {
    let changes = curriculum::module_changes(&body).map_err(ApiError::validation)?;
    let module = ModuleService::new(state.store.clone()).update(id, changes).await?;
    Ok(ApiResponse::success(module))
}

#[utoipa::path(delete, path = "/modules/hard/{id}", tag = "Modules",
    params(("id" = uuid::Uuid, Path, description = "Module id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Module deleted"),
        (status = 400, description = "Still referenced"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Module not found")
    ))]
pub async fn hard_delete_module(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
) -> ApiResult<Value> {
    ModuleService::new(state.store.clone()).hard_delete(id).await?;
    Ok(ApiResponse::success(deleted("Module", id)))
}

// Concepts

#[utoipa::path(post, path = "/concepts", tag = "Concepts",
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 201, description = "Concept created"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required")
    ))]
pub async fn create_concept(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody,
) -> ApiResult<Concept> {
    let input = curriculum::new_concept(&body).map_err(ApiError::validation)?;
    let concept = ConceptService::new(state.store.clone()).create(input).await?;
    Ok(ApiResponse::created(concept))
}

#[utoipa::path(put, path = "/concepts/{id}", tag = "Concepts",
    params(("id" = uuid::Uuid, Path, description = "Concept id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Updated concept"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Concept not found")
    ))]
pub async fn update_concept(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> ApiResult<Concept> {
    let changes = curriculum::concept_changes(&body).map_err(ApiError::validation)?;
    let concept = ConceptService::new(state.store.clone()).update(id, changes).await?;
    Ok(ApiResponse::success(concept))
}

#[utoipa::path(delete, path = "/concepts/hard/{id}", tag = "Concepts",
    params(("id" = uuid::Uuid, Path, description = "Concept id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Concept deleted"),
        (status = 400, description = "Still referenced"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Concept not found")
    ))]
pub async fn hard_delete_concept(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
) -> ApiResult<Value> {
    ConceptService::new(state.store.clone()).hard_delete(id).await?;
    Ok(ApiResponse::success(deleted("Concept", id)))
}

// Formulas

#[utoipa::path(post, path = "/formulas", tag = "Formulas",
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 201, description = "Formula created"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required")
    ))]
pub async fn create_formula(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody,
) -> ApiResult<Formula> {
    let input = curriculum::new_formula(&body).map_err(ApiError::validation)?;
    let formula = FormulaService::new(state.store.clone()).create(input).await?;
    Ok(ApiResponse::created(formula))
}

#[utoipa::path(put, path = "/formulas/{id}", tag = "Formulas",
    params(("id" = uuid::Uuid, Path, description = "Formula id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Updated formula"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Formula not found")
    ))]
pub async fn update_formula(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> ApiResult<Formula> {
    let changes = curriculum::formula_changes(&body).map_err(ApiError::validation)?;
    let formula = FormulaService::new(state.store.clone()).update(id, changes).await?;
    Ok(ApiResponse::success(formula))
}

#[utoipa::path(delete, path = "/formulas/hard/{id}", tag = "Formulas",
    params(("id" = uuid::Uuid, Path, description = "Formula id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Formula deleted"),
        (status = 400, description = "Still referenced"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Formula not found")
    ))]
pub async fn hard_delete_formula(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
) -> ApiResult<Value> {
    FormulaService::new(state.store.clone()).hard_delete(id).await?;
    Ok(ApiResponse::success(deleted("Formula", id)))
}

// Exercises

#[utoipa::path(post, path = "/exercises", tag = "Exercises",
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 201, description = "Exercise created"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required")
    ))]
pub async fn create_exercise(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody,
) -> ApiResult<Exercise> {
    let input = curriculum::new_exercise(&body).map_err(ApiError::validation)?;
    let exercise = ExerciseService::new(state.store.clone()).create(input).await?;
    Ok(ApiResponse::created(exercise))
}

#[utoipa::path(put, path = "/exercises/{id}", tag = "Exercises",
    params(("id" = uuid::Uuid, Path, description = "Exercise id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Updated exercise"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Exercise not found")
    ))]
pub async fn update_exercise(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> ApiResult<Exercise> {
    let changes = curriculum::exercise_changes(&body).map_err(ApiError::validation)?;
    let exercise = ExerciseService::new(state.store.clone()).update(id, changes).await?;
    Ok(ApiResponse::success(exercise))
}

#[utoipa::path(delete, path = "/exercises/hard/{id}", tag = "Exercises",
    params(("id" = uuid::Uuid, Path, description = "Exercise id")),
    security(("cookieAuth" = []), ("bearerAuth" = [])),
    responses(
        (status = 200, description = "Exercise deleted"),
        (status = 400, description = "Still referenced"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Exercise not found")
    ))]
pub async fn hard_delete_exercise(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathId(id): PathId,
) -> ApiResult<Value> {
    ExerciseService::new(state.store.clone()).hard_delete(id).await?;
    Ok(ApiResponse::success(deleted("Exercise", id)))
}
