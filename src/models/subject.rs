use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity;
use crate::database::Collection;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub icon_url: String,
    pub description: String,
    pub is_active: bool,
    #[serde(default)]
    pub topics: Vec<Uuid>,
    #[serde(default)]
    pub concepts: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(name: String, icon_url: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            icon_url,
            description,
            is_active: true,
            topics: Vec::new(),
            concepts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

entity!(Subject, Collection::Subjects, "Subject");
