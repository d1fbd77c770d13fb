use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{child_of, entity, Topic};
use crate::database::Collection;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtopic {
    pub id: Uuid,
    pub name: String,
    pub position: i64,
    pub difficulty_score: f64,
    pub estimated_study_minutes: i64,
    pub topic_id: Uuid,
    #[serde(default)]
    pub modules: Vec<Uuid>,
    /// Concepts covered by this subtopic. Associations only; concepts are
    /// owned by their subject.
    #[serde(default)]
    pub concepts: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

entity!(Subtopic, Collection::Subtopics, "Subtopic");
child_of!(Subtopic, Topic, "subtopics", topic_id, "topicId");
