use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{child_of, entity, Subject};
use crate::database::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyRange {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyRange {
    pub const ALL: &'static [&'static str] = &["Beginner", "Intermediate", "Advanced"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: Uuid,
    pub name: String,
    pub position: i64,
    pub difficulty_range: DifficultyRange,
    pub estimated_study_hours: f64,
    pub is_active: bool,
    pub subject_id: Uuid,
    #[serde(default)]
    pub subtopics: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

entity!(Topic, Collection::Topics, "Topic");
child_of!(Topic, Subject, "topics", subject_id, "subjectId");
