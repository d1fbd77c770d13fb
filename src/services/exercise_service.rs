use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::{check, finish, relations, ListFilter, ServiceError, ServiceResult};
use crate::database::{Query, Repository, Store, Transaction};
use crate::models::{Exercise, ExerciseConcept};
use crate::validation::curriculum::{options_error, ExerciseFields, NewExercise};
use crate::validation::{checks, FieldError};

pub struct ExerciseService {
    store: Arc<dyn Store>,
}

fn concept_ids(concepts: &[ExerciseConcept]) -> Vec<Uuid> {
    concepts.iter().map(|c| c.concept_id).collect()
}

impl ExerciseService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &ListFilter) -> ServiceResult<Vec<Exercise>> {
        let mut query = Query::all();
        if let Some(module_id) = filter.module_id {
            query = query.with("moduleId", module_id.to_string());
        }
        if let Some(concept_id) = filter.concept_id {
            query = query.with("concepts", json!([{ "conceptId": concept_id }]));
        }
        if let Some(exercise_type) = filter.exercise_type {
            query = query.with("type", json!(exercise_type));
        }

        let mut tx = self.store.begin().await?;
        let exercises = tx.select_any::<Exercise>(&query).await;
        finish(tx, exercises.map_err(ServiceError::from)).await
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Exercise> {
        let mut tx = self.store.begin().await?;
        let exercise = tx.get_404::<Exercise>(id).await;
        finish(tx, exercise.map_err(ServiceError::from)).await
    }

    pub async fn create(&self, input: NewExercise) -> ServiceResult<Exercise> {
        let mut tx = self.store.begin().await?;
        let result = Self::create_in(&mut *tx, input).await;
        finish(tx, result).await
    }

    async fn create_in(tx: &mut dyn Transaction, input: NewExercise) -> ServiceResult<Exercise> {
        let mut errors = Vec::new();
        checks::parent_exists::<Exercise>(tx, input.module_id, &mut errors).await?;
        checks::concepts_exist(tx, &concept_ids(&input.concepts), &mut errors).await?;
        check(errors)?;

        let now = Utc::now();
        let exercise = Exercise {
            id: Uuid::new_v4(),
            exercise_type: input.exercise_type,
            question: input.question,
            correct_answer: input.correct_answer,
            explanation: input.explanation,
            options: input.options,
            hint: input.hint,
            difficulty_level: input.difficulty_level,
            concepts: input.concepts,
            module_id: input.module_id,
            created_at: now,
            updated_at: now,
        };
        relations::attach(tx, &exercise).await?;
        Ok(exercise)
    }

    pub async fn update(&self, id: Uuid, changes: ExerciseFields) -> ServiceResult<Exercise> {
        let mut tx = self.store.begin().await?;
        let result = Self::update_in(&mut *tx, id, changes).await;
        finish(tx, result).await
    }

    async fn update_in(tx: &mut dyn Transaction, id: Uuid, changes: ExerciseFields) -> ServiceResult<Exercise> {
        let mut exercise = tx.get_404::<Exercise>(id).await?;
        let module_id = changes.module_id.unwrap_or(exercise.module_id);

        let mut errors: Vec<FieldError> = Vec::new();
        if module_id != exercise.module_id {
            checks::parent_exists::<Exercise>(tx, module_id, &mut errors).await?;
        }
        if let Some(concepts) = &changes.concepts {
            checks::concepts_exist(tx, &concept_ids(concepts), &mut errors).await?;
        }
        check(errors)?;

        if let Some(exercise_type) = changes.exercise_type {
            exercise.exercise_type = exercise_type;
        }
        if let Some(question) = changes.question {
            exercise.question = question;
        }
        if let Some(answer) = changes.correct_answer {
            exercise.correct_answer = answer;
        }
        if let Some(explanation) = changes.explanation {
            exercise.explanation = Some(explanation);
        }
        if let Some(options) = changes.options {
            exercise.options = options;
        }
        if let Some(hint) = changes.hint {
            exercise.hint = Some(hint);
        }
        if let Some(level) = changes.difficulty_level {
            exercise.difficulty_level = level;
        }
        if let Some(concepts) = changes.concepts {
            exercise.concepts = concepts;
        }
        if let Some(error) = options_error(exercise.exercise_type, &exercise.options, &exercise.correct_answer) {
            return Err(ServiceError::Invalid(vec![error]));
        }
        relations::reparent(tx, &mut exercise, module_id).await?;

        tx.save(&mut exercise).await?;
        Ok(exercise)
    }

    /// Delete an exercise. Recorded attempts are kept as history.
    pub async fn hard_delete(&self, id: Uuid) -> ServiceResult<Exercise> {
        let mut tx = self.store.begin().await?;
        let result = async {
            let exercise = tx.get_404::<Exercise>(id).await?;
            relations::detach(&mut *tx, &exercise).await?;
            Ok::<_, ServiceError>(exercise)
        }
        .await;
        finish(tx, result).await
    }
}
