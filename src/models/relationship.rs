use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity;
use crate::database::Collection;

/// Kind of edge between two concepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Prerequisite,
    Dependent,
    Parent,
    Child,
    Sibling,
    Analogy,
    Generalization,
    Specialization,
    Application,
    Example,
    Counterexample,
    Equivalent,
    Contrast,
    Extension,
    Derivation,
    Component,
    Composite,
    Inverse,
    Alternative,
    Related,
}

impl RelationshipType {
    pub const ALL: &'static [&'static str] = &[
        "prerequisite",
        "dependent",
        "parent",
        "child",
        "sibling",
        "analogy",
        "generalization",
        "specialization",
        "application",
        "example",
        "counterexample",
        "equivalent",
        "contrast",
        "extension",
        "derivation",
        "component",
        "composite",
        "inverse",
        "alternative",
        "related",
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptRelationship {
    pub id: Uuid,
    pub source_concept_id: Uuid,
    pub target_concept_id: Uuid,
    pub relationship_type: RelationshipType,
    pub strength: Option<f64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

entity!(ConceptRelationship, Collection::ConceptRelationships, "Concept relationship");
