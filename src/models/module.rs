use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{child_of, entity, Subtopic};
use crate::database::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Theory,
    Practice,
    Assessment,
}

impl ModuleType {
    pub const ALL: &'static [&'static str] = &["theory", "practice", "assessment"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: Uuid,
    pub name: String,
    pub position: i64,
    pub module_type: ModuleType,
    pub xp_reward: i64,
    pub difficulty_level: i64,
    pub estimated_minutes: i64,
    pub subtopic_id: Uuid,
    #[serde(default)]
    pub exercises: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

entity!(Module, Collection::Modules, "Module");
child_of!(Module, Subtopic, "modules", subtopic_id, "subtopicId");
