//! Read-only curriculum routes

use axum::extract::State;

use crate::handlers::{PathId, QueryParams};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Concept, ConceptRelationship, Exercise, Formula, Module, Subject, Subtopic, Topic};
use crate::services::{
    ConceptService, ExerciseService, FormulaService, ListFilter, ModuleService, RelationshipService, SubjectService,
    SubtopicService, TopicService,
};
use crate::state::AppState;

#[utoipa::path(get, path = "/subjects", tag = "Subjects",
    params(("active" = Option<bool>, Query, description = "Only active (true) or inactive (false) subjects")),
    responses((status = 200, description = "Subjects in list order")))]
pub async fn list_subjects(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ListFilter>,
) -> ApiResult<Vec<Subject>> {
    let subjects = SubjectService::new(state.store.clone()).list(&filter).await?;
    Ok(ApiResponse::success(subjects))
}

#[utoipa::path(get, path = "/subjects/{id}", tag = "Subjects",
    params(("id" = uuid::Uuid, Path, description = "Subject id")),
    responses(
        (status = 200, description = "Subject"),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Subject not found")
    ))]
pub async fn get_subject(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Subject> {
    Ok(ApiResponse::success(SubjectService::new(state.store.clone()).get(id).await?))
}

#[utoipa::path(get, path = "/topics", tag = "Topics",
    params(("active" = Option<bool>, Query, description = "Filter on the active flag"), ("subjectId" = Option<uuid::Uuid>, Query, description = "Parent subject")),
    responses((status = 200, description = "Topics in list order")))]
pub async fn list_topics(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ListFilter>,
) -> ApiResult<Vec<Topic>> {
    let topics = TopicService::new(state.store.clone()).list(&filter).await?;
    Ok(ApiResponse::success(topics))
}

#[utoipa::path(get, path = "/topics/{id}", tag = "Topics",
    params(("id" = uuid::Uuid, Path, description = "Topic id")),
    responses(
        (status = 200, description = "Topic"),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Topic not found")
    ))]
pub async fn get_topic(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Topic> {
    Ok(ApiResponse::success(TopicService::new(state.store.clone()).get(id).await?))
}

#[utoipa::path(get, path = "/subtopics", tag = "Subtopics",
    params(("topicId" = Option<uuid::Uuid>, Query, description = "Parent topic"), ("conceptId" = Option<uuid::Uuid>, Query, description = "Subtopics that teach this concept")),
    responses((status = 200, description = "Subtopics in list order")))]
pub async fn list_subtopics(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ListFilter>,
) -> ApiResult<Vec<Subtopic>> {
    let subtopics = SubtopicService::new(state.store.clone()).list(&filter).await?;
    Ok(ApiResponse::success(subtopics))
}

#[utoipa::path(get, path = "/subtopics/{id}", tag = "Subtopics",
    params(("id" = uuid::Uuid, Path, description = "Subtopic id")),
    responses(
        (status = 200, description = "Subtopic"),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Subtopic not found")
    ))]
pub async fn get_subtopic(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Subtopic> {
    Ok(ApiResponse::success(SubtopicService::new(state.store.clone()).get(id).await?))
}

#[utoipa::path(get, path = "/modules", tag = "Modules",
    params(("subtopicId" = Option<uuid::Uuid>, Query, description = "Parent subtopic"), ("moduleType" = Option<String>, Query, description = "theory, practice or assessment")),
    responses((status = 200, description = "Modules in list order")))]
pub async fn list_modules(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ListFilter>,
) -> ApiResult<Vec<Module>> {
    let modules = ModuleService::new(state.store.clone()).list(&filter).await?;
    Ok(ApiResponse::success(modules))
}

#[utoipa::path(get, path = "/modules/{id}", tag = "Modules",
    params(("id" = uuid::Uuid, Path, description = "Module id")),
    responses(
        (status = 200, description = "Module"),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Module not found")
    ))]
pub async fn get_module(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Module> {
    Ok(ApiResponse::success(ModuleService::new(state.store.clone()).get(id).await?))
}

#[utoipa::path(get, path = "/concepts", tag = "Concepts",
    params(("subjectId" = Option<uuid::Uuid>, Query, description = "Parent subject")),
    responses((status = 200, description = "Concepts in list order")))]
pub async fn list_concepts(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ListFilter>,
) -> ApiResult<Vec<Concept>> {
    let concepts = ConceptService::new(state.store.clone()).list(&filter).await?;
    Ok(ApiResponse::success(concepts))
}

#[utoipa::path(get, path = "/concepts/{id}", tag = "Concepts",
    params(("id" = uuid::Uuid, Path, description = "Concept id")),
    responses(
        (status = 200, description = "Concept"),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Concept not found")
    ))]
pub async fn get_concept(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Concept> {
    Ok(ApiResponse::success(ConceptService::new(state.store.clone()).get(id).await?))
}

#[utoipa::path(get, path = "/concepts/{id}/relationships", tag = "Concepts",
    params(("id" = uuid::Uuid, Path, description = "Concept id")),
    responses((status = 200, description = "Edges where the concept is source or target")))]
pub async fn list_relationships(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<Vec<ConceptRelationship>> {
    let edges = RelationshipService::new(state.store.clone()).list_for(id).await?;
    Ok(ApiResponse::success(edges))
}

#[utoipa::path(get, path = "/formulas", tag = "Formulas",
    params(("conceptId" = Option<uuid::Uuid>, Query, description = "Parent concept")),
    responses((status = 200, description = "Formulas in list order")))]
pub async fn list_formulas(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ListFilter>,
) -> ApiResult<Vec<Formula>> {
    let formulas = FormulaService::new(state.store.clone()).list(&filter).await?;
    Ok(ApiResponse::success(formulas))
}

#[utoipa::path(get, path = "/formulas/{id}", tag = "Formulas",
    params(("id" = uuid::Uuid, Path, description = "Formula id")),
    responses(
        (status = 200, description = "Formula"),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Formula not found")
    ))]
pub async fn get_formula(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Formula> {
    Ok(ApiResponse::success(FormulaService::new(state.store.clone()).get(id).await?))
}

#[utoipa::path(get, path = "/exercises", tag = "Exercises",
    params(("moduleId" = Option<uuid::Uuid>, Query, description = "Parent module"), ("conceptId" = Option<uuid::Uuid>, Query, description = "Exercises linked to this concept"), ("type" = Option<String>, Query, description = "Exercise type")),
    responses((status = 200, description = "Exercises in list order")))]
pub async fn list_exercises(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ListFilter>,
) -> ApiResult<Vec<Exercise>> {
    let exercises = ExerciseService::new(state.store.clone()).list(&filter).await?;
    Ok(ApiResponse::success(exercises))
}

#[utoipa::path(get, path = "/exercises/{id}", tag = "Exercises",
    params(("id" = uuid::Uuid, Path, description = "Exercise id")),
    responses(
        (status = 200, description = "Exercise"),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Exercise not found")
    ))]
pub async fn get_exercise(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Exercise> {
    Ok(ApiResponse::success(ExerciseService::new(state.store.clone()).get(id).await?))
}
