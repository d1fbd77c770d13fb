use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::{check, finish, relations, ListFilter, ServiceError, ServiceResult};
use crate::database::{Query, Repository, Store, Transaction};
use crate::models::Subtopic;
use crate::validation::checks;
use crate::validation::curriculum::{NewSubtopic, SubtopicFields};

pub struct SubtopicService {
    store: Arc<dyn Store>,
}

impl SubtopicService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &ListFilter) -> ServiceResult<Vec<Subtopic>> {
        let mut query = Query::all().order_by("position");
        if let Some(topic_id) = filter.topic_id {
            query = query.with("topicId", topic_id.to_string());
        }
        if let Some(concept_id) = filter.concept_id {
            query = query.with("concepts", json!([concept_id]));
        }

        let mut tx = self.store.begin().await?;
        let subtopics = tx.select_any::<Subtopic>(&query).await;
        finish(tx, subtopics.map_err(ServiceError::from)).await
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Subtopic> {
        let mut tx = self.store.begin().await?;
        let subtopic = tx.get_404::<Subtopic>(id).await;
        finish(tx, subtopic.map_err(ServiceError::from)).await
    }

    pub async fn create(&self, input: NewSubtopic) -> ServiceResult<Subtopic> {
        let mut tx = self.store.begin().await?;
        let result = Self::create_in(&mut *tx, input).await;
        finish(tx, result).await
    }

    async fn create_in(tx: &mut dyn Transaction, input: NewSubtopic) -> ServiceResult<Subtopic> {
        let mut errors = Vec::new();
        checks::unique_name::<Subtopic>(tx, &input.name, None, &mut errors).await?;
        if checks::parent_exists::<Subtopic>(tx, input.topic_id, &mut errors).await? {
            checks::position_free::<Subtopic>(tx, input.topic_id, input.position, None, &mut errors).await?;
        }
        checks::concepts_exist(tx, &input.concepts, &mut errors).await?;
        check(errors)?;

        let now = Utc::now();
        let mut concepts = input.concepts;
        dedup(&mut concepts);
        let subtopic = Subtopic {
            id: Uuid::new_v4(),
            name: input.name,
            position: input.position,
            difficulty_score: input.difficulty_score,
            estimated_study_minutes: input.estimated_study_minutes,
            topic_id: input.topic_id,
            modules: Vec::new(),
            concepts,
            created_at: now,
            updated_at: now,
        };
        relations::attach(tx, &subtopic).await?;
        tracing::info!("Created subtopic {} ({}) in topic {}", subtopic.name, subtopic.id, subtopic.topic_id);
        Ok(subtopic)
    }

    pub async fn update(&self, id: Uuid, changes: SubtopicFields) -> ServiceResult<Subtopic> {
        let mut tx = self.store.begin().await?;
        let result = Self::update_in(&mut *tx, id, changes).await;
        finish(tx, result).await
    }

    async fn update_in(tx: &mut dyn Transaction, id: Uuid, changes: SubtopicFields) -> ServiceResult<Subtopic> {
        let mut subtopic = tx.get_404::<Subtopic>(id).await?;
        let topic_id = changes.topic_id.unwrap_or(subtopic.topic_id);
        let position = changes.position.unwrap_or(subtopic.position);
        let moving = topic_id != subtopic.topic_id;

        let mut errors = Vec::new();
        if let Some(name) = changes.name.as_deref().filter(|name| *name != subtopic.name) {
            checks::unique_name::<Subtopic>(tx, name, Some(id), &mut errors).await?;
        }
        let parent_ok = !moving || checks::parent_exists::<Subtopic>(tx, topic_id, &mut errors).await?;
        if parent_ok && (moving || position != subtopic.position) {
            checks::position_free::<Subtopic>(tx, topic_id, position, Some(id), &mut errors).await?;
        }
        if let Some(concepts) = &changes.concepts {
            checks::concepts_exist(tx, concepts, &mut errors).await?;
        }
        check(errors)?;

        if let Some(name) = changes.name {
            subtopic.name = name;
        }
        if let Some(score) = changes.difficulty_score {
            subtopic.difficulty_score = score;
        }
        if let Some(minutes) = changes.estimated_study_minutes {
            subtopic.estimated_study_minutes = minutes;
        }
        if let Some(mut concepts) = changes.concepts {
            dedup(&mut concepts);
            subtopic.concepts = concepts;
        }
        subtopic.position = position;
        relations::reparent(tx, &mut subtopic, topic_id).await?;

        tx.save(&mut subtopic).await?;
        Ok(subtopic)
    }

    pub async fn hard_delete(&self, id: Uuid) -> ServiceResult<Subtopic> {
        let mut tx = self.store.begin().await?;
        let result = Self::hard_delete_in(&mut *tx, id).await;
        finish(tx, result).await
    }

    async fn hard_delete_in(tx: &mut dyn Transaction, id: Uuid) -> ServiceResult<Subtopic> {
        let subtopic = tx.get_404::<Subtopic>(id).await?;
        if !subtopic.modules.is_empty() {
            return Err(ServiceError::rule("Cannot delete subtopic with existing modules"));
        }

        relations::detach(tx, &subtopic).await?;
        tracing::info!("Deleted subtopic {} ({})", subtopic.name, id);
        Ok(subtopic)
    }
}

/// Drop repeated ids, keeping first occurrences in order.
fn dedup(ids: &mut Vec<Uuid>) {
    let mut seen = Vec::with_capacity(ids.len());
    ids.retain(|id| {
        if seen.contains(id) {
            false
        } else {
            seen.push(*id);
            true
        }
    });
}
