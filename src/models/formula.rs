use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{child_of, entity, Concept};
use crate::database::Collection;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formula {
    pub id: Uuid,
    pub name: String,
    pub latex_notation: String,
    pub plain_text: Option<String>,
    pub description: Option<String>,
    pub concept_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

entity!(Formula, Collection::Formulas, "Formula");
child_of!(Formula, Concept, "formulas", concept_id, "conceptId");
