use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::{check, finish, relations, ListFilter, ServiceError, ServiceResult};
use crate::database::{Collection, Query, Repository, Store, Transaction};
use crate::models::{Concept, ConceptRelationship, Exercise};
use crate::validation::checks;
use crate::validation::curriculum::{ConceptFields, NewConcept};

pub struct ConceptService {
    store: Arc<dyn Store>,
}

impl ConceptService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &ListFilter) -> ServiceResult<Vec<Concept>> {
        let mut query = Query::all();
        if let Some(subject_id) = filter.subject_id {
            query = query.with("subjectId", subject_id.to_string());
        }

        let mut tx = self.store.begin().await?;
        let concepts = tx.select_any::<Concept>(&query).await;
        finish(tx, concepts.map_err(ServiceError::from)).await
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Concept> {
        let mut tx = self.store.begin().await?;
        let concept = tx.get_404::<Concept>(id).await;
        finish(tx, concept.map_err(ServiceError::from)).await
    }

    pub async fn create(&self, input: NewConcept) -> ServiceResult<Concept> {
        let mut tx = self.store.begin().await?;
        let result = Self::create_in(&mut *tx, input).await;
        finish(tx, result).await
    }

    async fn create_in(tx: &mut dyn Transaction, input: NewConcept) -> ServiceResult<Concept> {
        let mut errors = Vec::new();
        checks::unique_name::<Concept>(tx, &input.name, None, &mut errors).await?;
        checks::parent_exists::<Concept>(tx, input.subject_id, &mut errors).await?;
        check(errors)?;

        let now = Utc::now();
        let concept = Concept {
            id: Uuid::new_v4(),
            name: input.name,
            symbol_notation: input.symbol_notation,
            description: input.description,
            difficulty_level: input.difficulty_level,
            subject_id: input.subject_id,
            formulas: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        relations::attach(tx, &concept).await?;
        tracing::info!("Created concept {} ({}) in subject {}", concept.name, concept.id, concept.subject_id);
        Ok(concept)
    }

    pub async fn update(&self, id: Uuid, changes: ConceptFields) -> ServiceResult<Concept> {
        let mut tx = self.store.begin().await?;
        let result = Self::update_in(&mut *tx, id, changes).await;
        finish(tx, result).await
    }

    async fn update_in(tx: &mut dyn Transaction, id: Uuid, changes: ConceptFields) -> ServiceResult<Concept> {
        let mut concept = tx.get_404::<Concept>(id).await?;
        let subject_id = changes.subject_id.unwrap_or(concept.subject_id);

        let mut errors = Vec::new();
        if let Some(name) = changes.name.as_deref().filter(|name| *name != concept.name) {
            checks::unique_name::<Concept>(tx, name, Some(id), &mut errors).await?;
        }
        if subject_id != concept.subject_id {
            checks::parent_exists::<Concept>(tx, subject_id, &mut errors).await?;
        }
        check(errors)?;

        if let Some(name) = changes.name {
            concept.name = name;
        }
        if let Some(symbol) = changes.symbol_notation {
            concept.symbol_notation = Some(symbol);
        }
        if let Some(description) = changes.description {
            concept.description = description;
        }
        if let Some(level) = changes.difficulty_level {
            concept.difficulty_level = level;
        }
        relations::reparent(tx, &mut concept, subject_id).await?;

        tx.save(&mut concept).await?;
        Ok(concept)
    }

    /// Delete a concept that owns no formulas and that no exercise
    /// references. It is also dropped from subtopic associations and its
    /// relationship edges are removed.
    pub async fn hard_delete(&self, id: Uuid) -> ServiceResult<Concept> {
        let mut tx = self.store.begin().await?;
        let result = Self::hard_delete_in(&mut *tx, id).await;
        finish(tx, result).await
    }

    async fn hard_delete_in(tx: &mut dyn Transaction, id: Uuid) -> ServiceResult<Concept> {
        let concept = tx.get_404::<Concept>(id).await?;
        if !concept.formulas.is_empty() {
            return Err(ServiceError::rule("Cannot delete concept with existing formulas"));
        }
        let referenced = Query::matching(json!({ "concepts": [{ "conceptId": id }] }));
        if tx.exists::<Exercise>(&referenced).await? {
            return Err(ServiceError::rule("Cannot delete concept referenced by exercises"));
        }

        let unlinked = tx.pull_ref_everywhere(Collection::Subtopics, "concepts", id).await?;
        for query in [
            Query::all().with("sourceConceptId", id.to_string()),
            Query::all().with("targetConceptId", id.to_string()),
        ] {
            for edge in tx.select_any::<ConceptRelationship>(&query).await? {
                tx.delete::<ConceptRelationship>(edge.id).await?;
            }
        }
        relations::detach(tx, &concept).await?;

        tracing::info!("Deleted concept {} ({}), unlinked from {} subtopics", concept.name, id, unlinked);
        Ok(concept)
    }
}
