pub mod concept;
pub mod exercise;
pub mod formula;
pub mod module;
pub mod progress;
pub mod relationship;
pub mod subject;
pub mod subtopic;
pub mod topic;
pub mod user;

pub use concept::Concept;
pub use exercise::{Exercise, ExerciseConcept, ExerciseType};
pub use formula::Formula;
pub use module::{Module, ModuleType};
pub use progress::{ConceptMastery, SubtopicProgress, TopicProgress, UserExerciseResult};
pub use relationship::{ConceptRelationship, RelationshipType};
pub use subject::Subject;
pub use subtopic::Subtopic;
pub use topic::{DifficultyRange, Topic};
pub use user::{User, UserProfile};

/// Implements `Entity` for a model with `id` and `updated_at` fields
macro_rules! entity {
    ($model:ty, $collection:expr, $label:literal) => {
        impl $crate::database::Entity for $model {
            const COLLECTION: $crate::database::Collection = $collection;
            const LABEL: &'static str = $label;

            fn id(&self) -> uuid::Uuid {
                self.id
            }

            fn touch(&mut self) {
                self.updated_at = chrono::Utc::now();
            }
        }
    };
}

/// Implements `Child` for a model owned through `$parent.$field`
macro_rules! child_of {
    ($model:ty, $parent:ty, $field:literal, $key:ident, $json_key:literal) => {
        impl $crate::database::Child for $model {
            type Parent = $parent;
            const PARENT_FIELD: &'static str = $field;
            const PARENT_KEY: &'static str = $json_key;

            fn parent_id(&self) -> uuid::Uuid {
                self.$key
            }

            fn set_parent_id(&mut self, parent: uuid::Uuid) {
                self.$key = parent;
            }
        }
    };
}

pub(crate) use child_of;
pub(crate) use entity;
