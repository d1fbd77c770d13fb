use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::{check, finish, ServiceError, ServiceResult};
use crate::database::{Query, Repository, Store, Transaction};
use crate::models::{Concept, ConceptRelationship};
use crate::validation::curriculum::NewRelationship;
use crate::validation::FieldError;

pub struct RelationshipService {
    store: Arc<dyn Store>,
}

impl RelationshipService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Edges where the concept is either end
    pub async fn list_for(&self, concept_id: Uuid) -> ServiceResult<Vec<ConceptRelationship>> {
        let mut tx = self.store.begin().await?;
        let result = async {
            tx.get_404::<Concept>(concept_id).await?;
            let mut edges = tx
                .select_any::<ConceptRelationship>(&Query::all().with("sourceConceptId", concept_id.to_string()))
                .await?;
            edges.extend(
                tx.select_any::<ConceptRelationship>(&Query::all().with("targetConceptId", concept_id.to_string()))
                    .await?,
            );
            Ok::<_, ServiceError>(edges)
        }
        .await;
        finish(tx, result).await
    }

    pub async fn create(&self, source_id: Uuid, input: NewRelationship) -> ServiceResult<ConceptRelationship> {
        let mut tx = self.store.begin().await?;
        let result = Self::create_in(&mut *tx, source_id, input).await;
        finish(tx, result).await
    }

    async fn create_in(
        tx: &mut dyn Transaction,
        source_id: Uuid,
        input: NewRelationship,
    ) -> ServiceResult<ConceptRelationship> {
        tx.get_404::<Concept>(source_id).await?;

        let mut errors = Vec::new();
        if input.target_concept_id == source_id {
            errors.push(FieldError::new("targetConceptId", "A concept cannot relate to itself"));
        } else if tx.get::<Concept>(input.target_concept_id).await?.is_none() {
            errors.push(FieldError::new("targetConceptId", "Concept not found"));
        } else {
            let duplicate = Query::matching(json!({
                "sourceConceptId": source_id,
                "targetConceptId": input.target_concept_id,
                "relationshipType": input.relationship_type,
            }));
            if tx.exists::<ConceptRelationship>(&duplicate).await? {
                errors.push(FieldError::new("relationshipType", "This relationship already exists"));
            }
        }
        check(errors)?;

        let now = Utc::now();
        let edge = ConceptRelationship {
            id: Uuid::new_v4(),
            source_concept_id: source_id,
            target_concept_id: input.target_concept_id,
            relationship_type: input.relationship_type,
            strength: input.strength,
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        tx.create(&edge).await?;
        Ok(edge)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<ConceptRelationship> {
        let mut tx = self.store.begin().await?;
        let result = async {
            let edge = tx.get_404::<ConceptRelationship>(id).await?;
            tx.delete::<ConceptRelationship>(id).await?;
            Ok::<_, ServiceError>(edge)
        }
        .await;
        finish(tx, result).await
    }
}
