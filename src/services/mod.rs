//! Entity services. Each public operation runs in one store transaction:
//! validation checks first, then writes, then commit. Any error rolls the
//! whole transaction back.

pub mod auth_service;
pub mod concept_service;
pub mod exercise_service;
pub mod formula_service;
pub mod module_service;
pub mod progress_service;
pub mod relations;
pub mod relationship_service;
pub mod subject_service;
pub mod subtopic_service;
pub mod topic_service;
pub mod user_service;

pub use auth_service::{AuthService, Session};
pub use concept_service::ConceptService;
pub use exercise_service::ExerciseService;
pub use formula_service::FormulaService;
pub use module_service::ModuleService;
pub use progress_service::{AttemptOutcome, ProgressReport, ProgressService};
pub use relationship_service::RelationshipService;
pub use subject_service::SubjectService;
pub use subtopic_service::SubtopicService;
pub use topic_service::TopicService;
pub use user_service::{UserListParams, UserPage, UserService};

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::TokenError;
use crate::database::{DatabaseError, Transaction};
use crate::error::ApiError;
use crate::models::{ExerciseType, ModuleType};
use crate::validation::FieldError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed")]
    Invalid(Vec<FieldError>),

    /// A business rule rejected the request, e.g. deleting a parent that
    /// still has children.
    #[error("{0}")]
    Rule(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn rule(message: impl Into<String>) -> Self {
        ServiceError::Rule(message.into())
    }
}

impl From<Vec<FieldError>> for ServiceError {
    fn from(errors: Vec<FieldError>) -> Self {
        ServiceError::Invalid(errors)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(errors) => ApiError::validation(errors),
            ServiceError::Rule(message) => ApiError::bad_request(message),
            ServiceError::NotFound(message) => ApiError::not_found(message),
            ServiceError::Database(e) => e.into(),
            ServiceError::Token(e) => {
                tracing::error!("Session token failure: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

/// Fail with every collected field error, if any.
pub(crate) fn check(errors: Vec<FieldError>) -> ServiceResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Invalid(errors))
    }
}

/// Commit on success, roll back on failure. A failed rollback is logged and
/// the original error is returned.
pub(crate) async fn finish<T>(tx: Box<dyn Transaction>, result: ServiceResult<T>) -> ServiceResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::error!("Rollback failed after '{}': {}", err, rollback);
            }
            Err(err)
        }
    }
}

/// Query-string filters accepted by the list routes. Each service uses the
/// ones that apply to it and ignores the rest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    pub active: Option<bool>,
    pub subject_id: Option<Uuid>,
    pub topic_id: Option<Uuid>,
    pub subtopic_id: Option<Uuid>,
    pub module_id: Option<Uuid>,
    pub concept_id: Option<Uuid>,
    pub module_type: Option<ModuleType>,
    #[serde(rename = "type")]
    pub exercise_type: Option<ExerciseType>,
}
