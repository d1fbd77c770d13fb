use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::{check, finish, relations, ListFilter, ServiceError, ServiceResult};
use crate::database::{Query, Repository, Store, Transaction};
use crate::models::Topic;
use crate::validation::checks;
use crate::validation::curriculum::{NewTopic, TopicFields};

pub struct TopicService {
    store: Arc<dyn Store>,
}

pub(crate) fn build_topic(input: NewTopic) -> Topic {
    let now = Utc::now();
    Topic {
        id: Uuid::new_v4(),
        name: input.name,
        position: input.position,
        difficulty_range: input.difficulty_range,
        estimated_study_hours: input.estimated_study_hours,
        is_active: input.is_active,
        subject_id: input.subject_id,
        subtopics: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

impl TopicService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Topics ordered by position
    pub async fn list(&self, filter: &ListFilter) -> ServiceResult<Vec<Topic>> {
        let mut query = Query::all().order_by("position");
        if let Some(active) = filter.active {
            query = query.with("isActive", active);
        }
        if let Some(subject_id) = filter.subject_id {
            query = query.with("subjectId", subject_id.to_string());
        }

        let mut tx = self.store.begin().await?;
        let topics = tx.select_any::<Topic>(&query).await;
        finish(tx, topics.map_err(ServiceError::from)).await
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Topic> {
        let mut tx = self.store.begin().await?;
        let topic = tx.get_404::<Topic>(id).await;
        finish(tx, topic.map_err(ServiceError::from)).await
    }

    pub async fn create(&self, input: NewTopic) -> ServiceResult<Topic> {
        let mut tx = self.store.begin().await?;
        let result = Self::create_in(&mut *tx, input).await;
        finish(tx, result).await
    }

    async fn create_in(tx: &mut dyn Transaction, input: NewTopic) -> ServiceResult<Topic> {
        let mut errors = Vec::new();
        checks::unique_name::<Topic>(tx, &input.name, None, &mut errors).await?;
        if checks::parent_exists::<Topic>(tx, input.subject_id, &mut errors).await? {
            checks::position_free::<Topic>(tx, input.subject_id, input.position, None, &mut errors).await?;
        }
        check(errors)?;

        let topic = build_topic(input);
        relations::attach(tx, &topic).await?;
        tracing::info!("Created topic {} ({}) in subject {}", topic.name, topic.id, topic.subject_id);
        Ok(topic)
    }

    /// Apply changes. A new `subjectId` moves the topic between subjects.
    pub async fn update(&self, id: Uuid, changes: TopicFields) -> ServiceResult<Topic> {
        let mut tx = self.store.begin().await?;
        let result = Self::update_in(&mut *tx, id, changes).await;
        finish(tx, result).await
    }

    async fn update_in(tx: &mut dyn Transaction, id: Uuid, changes: TopicFields) -> ServiceResult<Topic> {
        let mut topic = tx.get_404::<Topic>(id).await?;
        let subject_id = changes.subject_id.unwrap_or(topic.subject_id);
        let position = changes.position.unwrap_or(topic.position);
        let moving = subject_id != topic.subject_id;

        let mut errors = Vec::new();
        if let Some(name) = changes.name.as_deref().filter(|name| *name != topic.name) {
            checks::unique_name::<Topic>(tx, name, Some(id), &mut errors).await?;
        }
        let parent_ok = !moving || checks::parent_exists::<Topic>(tx, subject_id, &mut errors).await?;
        if parent_ok && (moving || position != topic.position) {
            checks::position_free::<Topic>(tx, subject_id, position, Some(id), &mut errors).await?;
        }
        check(errors)?;

        if let Some(name) = changes.name {
            topic.name = name;
        }
        if let Some(difficulty_range) = changes.difficulty_range {
            topic.difficulty_range = difficulty_range;
        }
        if let Some(hours) = changes.estimated_study_hours {
            topic.estimated_study_hours = hours;
        }
        if let Some(is_active) = changes.is_active {
            topic.is_active = is_active;
        }
        topic.position = position;
        relations::reparent(tx, &mut topic, subject_id).await?;

        tx.save(&mut topic).await?;
        Ok(topic)
    }

    pub async fn soft_delete(&self, id: Uuid) -> ServiceResult<Topic> {
        self.update(
            id,
            TopicFields {
                is_active: Some(false),
                ..TopicFields::default()
            },
        )
        .await
    }

    pub async fn hard_delete(&self, id: Uuid) -> ServiceResult<Topic> {
        let mut tx = self.store.begin().await?;
        let result = Self::hard_delete_in(&mut *tx, id).await;
        finish(tx, result).await
    }

    async fn hard_delete_in(tx: &mut dyn Transaction, id: Uuid) -> ServiceResult<Topic> {
        let topic = tx.get_404::<Topic>(id).await?;
        if !topic.subtopics.is_empty() {
            return Err(ServiceError::rule("Cannot delete topic with existing subtopics"));
        }

        relations::detach(tx, &topic).await?;
        tracing::info!("Deleted topic {} ({})", topic.name, id);
        Ok(topic)
    }
}
