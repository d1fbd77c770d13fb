//! Attempt grading and per-user learning progress.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{finish, ServiceError, ServiceResult};
use crate::database::{DatabaseError, Entity, Query, Repository, Store, Transaction};
use crate::models::{
    ConceptMastery, Exercise, Module, Subtopic, SubtopicProgress, Topic, TopicProgress, UserExerciseResult,
};
use crate::validation::curriculum::Attempt;

const RECENT_RESULTS: u64 = 20;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutcome {
    pub is_correct: bool,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub result: UserExerciseResult,
    pub concept_mastery: Vec<ConceptMastery>,
    pub subtopic_progress: Option<SubtopicProgress>,
    pub topic_progress: Option<TopicProgress>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub topics: Vec<TopicProgress>,
    pub subtopics: Vec<SubtopicProgress>,
    pub concepts: Vec<ConceptMastery>,
    pub recent_results: Vec<UserExerciseResult>,
}

pub struct ProgressService {
    store: Arc<dyn Store>,
}

/// Insert a new progress record or save an existing one.
async fn upsert<E: Entity>(tx: &mut dyn Transaction, entity: &mut E, existed: bool) -> Result<(), DatabaseError> {
    if existed {
        tx.save(entity).await
    } else {
        tx.create(&*entity).await
    }
}

fn for_user(user_id: Uuid) -> Query {
    Query::all().with("userId", user_id.to_string())
}

impl ProgressService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Grade `attempt` and fold it into the user's mastery and progress
    /// records, all in one transaction.
    pub async fn record_attempt(&self, user_id: Uuid, exercise_id: Uuid, attempt: Attempt) -> ServiceResult<AttemptOutcome> {
        let mut tx = self.store.begin().await?;
        let result = Self::record_in(&mut *tx, user_id, exercise_id, attempt).await;
        finish(tx, result).await
    }

    async fn record_in(
        tx: &mut dyn Transaction,
        user_id: Uuid,
        exercise_id: Uuid,
        attempt: Attempt,
    ) -> ServiceResult<AttemptOutcome> {
        let exercise = tx.get_404::<Exercise>(exercise_id).await?;
        let is_correct = exercise.is_correct(&attempt.answer);
        let now = Utc::now();

        let result = UserExerciseResult {
            id: Uuid::new_v4(),
            user_id,
            exercise_id,
            answer: attempt.answer,
            is_correct,
            attempted_at: now,
            created_at: now,
            updated_at: now,
        };
        tx.create(&result).await?;

        let mut concept_mastery: Vec<ConceptMastery> = Vec::with_capacity(exercise.concepts.len());
        for link in &exercise.concepts {
            if concept_mastery.iter().any(|m| m.concept_id == link.concept_id) {
                continue;
            }
            let query = for_user(user_id).with("conceptId", link.concept_id.to_string());
            let existing = tx.select_one::<ConceptMastery>(&query).await?;
            let existed = existing.is_some();
            let mut mastery = existing.unwrap_or_else(|| ConceptMastery::new(user_id, link.concept_id));
            mastery.record(is_correct, now);
            upsert(tx, &mut mastery, existed).await?;
            concept_mastery.push(mastery);
        }

        let subtopic = match tx.get::<Module>(exercise.module_id).await? {
            Some(module) => tx.get::<Subtopic>(module.subtopic_id).await?,
            None => None,
        };
        let (subtopic_progress, topic_progress) = match subtopic {
            Some(subtopic) => {
                let progress = Self::update_subtopic(tx, user_id, &subtopic, exercise_id, is_correct, now).await?;
                let topic = Self::update_topic(tx, user_id, subtopic.topic_id, now).await?;
                (Some(progress), topic)
            }
            None => {
                tracing::warn!("Exercise {} is not reachable from any subtopic", exercise_id);
                (None, None)
            }
        };

        tracing::debug!("User {} answered exercise {} (correct: {})", user_id, exercise_id, is_correct);
        Ok(AttemptOutcome {
            is_correct,
            correct_answer: exercise.correct_answer,
            explanation: exercise.explanation,
            result,
            concept_mastery,
            subtopic_progress,
            topic_progress,
        })
    }

    async fn update_subtopic(
        tx: &mut dyn Transaction,
        user_id: Uuid,
        subtopic: &Subtopic,
        exercise_id: Uuid,
        is_correct: bool,
        now: DateTime<Utc>,
    ) -> ServiceResult<SubtopicProgress> {
        let modules = tx
            .select_any::<Module>(&Query::all().with("subtopicId", subtopic.id.to_string()))
            .await?;
        let total_exercises: u64 = modules.iter().map(|m| m.exercises.len() as u64).sum();

        let query = for_user(user_id).with("subtopicId", subtopic.id.to_string());
        let existing = tx.select_one::<SubtopicProgress>(&query).await?;
        let existed = existing.is_some();
        let mut progress = existing.unwrap_or_else(|| SubtopicProgress::new(user_id, subtopic.id));
        progress.record(exercise_id, is_correct, total_exercises, now);
        upsert(tx, &mut progress, existed).await?;
        Ok(progress)
    }

    /// Topic completion is the mean completion over all of the topic's
    /// subtopics, counting unstarted ones as zero.
    async fn update_topic(
        tx: &mut dyn Transaction,
        user_id: Uuid,
        topic_id: Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<TopicProgress>> {
        let Some(topic) = tx.get::<Topic>(topic_id).await? else {
            return Ok(None);
        };

        let started: Vec<SubtopicProgress> = tx
            .select_any::<SubtopicProgress>(&for_user(user_id))
            .await?
            .into_iter()
            .filter(|p| topic.subtopics.contains(&p.subtopic_id))
            .collect();
        let total: f64 = started.iter().map(|p| p.completion_percentage).sum();
        let completion = if topic.subtopics.is_empty() {
            0.0
        } else {
            (total / topic.subtopics.len() as f64 * 10.0).round() / 10.0
        };

        let query = for_user(user_id).with("topicId", topic_id.to_string());
        let existing = tx.select_one::<TopicProgress>(&query).await?;
        let existed = existing.is_some();
        let mut progress = existing.unwrap_or_else(|| TopicProgress::new(user_id, topic_id));
        progress.subtopics_started = started.len() as u64;
        progress.completion_percentage = completion.min(100.0);
        progress.last_activity_at = now;
        upsert(tx, &mut progress, existed).await?;
        Ok(Some(progress))
    }

    pub async fn report(&self, user_id: Uuid) -> ServiceResult<ProgressReport> {
        let mut tx = self.store.begin().await?;
        let result = async {
            let query = for_user(user_id);
            Ok::<_, ServiceError>(ProgressReport {
                topics: tx.select_any::<TopicProgress>(&query).await?,
                subtopics: tx.select_any::<SubtopicProgress>(&query).await?,
                concepts: tx.select_any::<ConceptMastery>(&query).await?,
                recent_results: tx
                    .select_any::<UserExerciseResult>(&query.clone().order_by_desc("attemptedAt").limit(RECENT_RESULTS))
                    .await?,
            })
        }
        .await;
        finish(tx, result).await
    }
}

