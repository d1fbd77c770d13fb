use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{child_of, entity, Subject};
use crate::database::Collection;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: Uuid,
    pub name: String,
    pub symbol_notation: Option<String>,
    pub description: String,
    pub difficulty_level: i64,
    pub subject_id: Uuid,
    #[serde(default)]
    pub formulas: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

entity!(Concept, Collection::Concepts, "Concept");
child_of!(Concept, Subject, "concepts", subject_id, "subjectId");
