use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::DatabaseError;

/// Every collection the service persists. Table names come from here only,
/// never from request input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Subjects,
    Topics,
    Subtopics,
    Modules,
    Concepts,
    Formulas,
    Exercises,
    Users,
    ConceptRelationships,
    TopicProgress,
    SubtopicProgress,
    ConceptMastery,
    ExerciseResults,
}

impl Collection {
    pub const ALL: [Collection; 13] = [
        Collection::Subjects,
        Collection::Topics,
        Collection::Subtopics,
        Collection::Modules,
        Collection::Concepts,
        Collection::Formulas,
        Collection::Exercises,
        Collection::Users,
        Collection::ConceptRelationships,
        Collection::TopicProgress,
        Collection::SubtopicProgress,
        Collection::ConceptMastery,
        Collection::ExerciseResults,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            Collection::Subjects => "subjects",
            Collection::Topics => "topics",
            Collection::Subtopics => "subtopics",
            Collection::Modules => "modules",
            Collection::Concepts => "concepts",
            Collection::Formulas => "formulas",
            Collection::Exercises => "exercises",
            Collection::Users => "users",
            Collection::ConceptRelationships => "concept_relationships",
            Collection::TopicProgress => "topic_progress",
            Collection::SubtopicProgress => "subtopic_progress",
            Collection::ConceptMastery => "concept_mastery",
            Collection::ExerciseResults => "user_exercise_results",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sort {
    pub field: &'static str,
    pub descending: bool,
}

/// Case-insensitive substring match over a set of string fields.
#[derive(Debug, Clone)]
pub struct Search {
    pub fields: &'static [&'static str],
    pub term: String,
}

/// Document query. `filter` is a containment pattern: a document matches
/// when every key/value of the pattern is present in it (arrays match when
/// each pattern element is found in the document array).
#[derive(Debug, Clone)]
pub struct Query {
    pub filter: Value,
    pub exclude_id: Option<Uuid>,
    pub search: Option<Search>,
    pub sort: Option<Sort>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filter: Value::Object(Default::default()),
            exclude_id: None,
            search: None,
            sort: None,
            offset: None,
            limit: None,
        }
    }
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching(filter: Value) -> Self {
        Self { filter, ..Self::default() }
    }

    /// Add one equality condition to the containment pattern.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        if let Value::Object(map) = &mut self.filter {
            map.insert(field.to_string(), value.into());
        }
        self
    }

    pub fn excluding(mut self, id: Uuid) -> Self {
        self.exclude_id = Some(id);
        self
    }

    pub fn search(mut self, fields: &'static [&'static str], term: impl Into<String>) -> Self {
        self.search = Some(Search { fields, term: term.into() });
        self
    }

    pub fn order_by(mut self, field: &'static str) -> Self {
        self.sort = Some(Sort { field, descending: false });
        self
    }

    pub fn order_by_desc(mut self, field: &'static str) -> Self {
        self.sort = Some(Sort { field, descending: true });
        self
    }

    pub fn page(mut self, offset: u64, limit: u64) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A persistent document store. Every access goes through a transaction so
/// multi-document bookkeeping commits or rolls back as a unit.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn Transaction>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Unit of work over the store. Dropping a transaction without committing
/// discards its writes.
#[async_trait]
pub trait Transaction: Send {
    async fn find(&mut self, collection: Collection, id: Uuid) -> Result<Option<Value>, DatabaseError>;

    async fn find_many(&mut self, collection: Collection, query: &Query) -> Result<Vec<Value>, DatabaseError>;

    async fn count(&mut self, collection: Collection, query: &Query) -> Result<u64, DatabaseError>;

    async fn insert(&mut self, collection: Collection, id: Uuid, doc: Value) -> Result<(), DatabaseError>;

    /// Replace a whole document. Returns false when no document has `id`.
    async fn replace(&mut self, collection: Collection, id: Uuid, doc: Value) -> Result<bool, DatabaseError>;

    async fn remove(&mut self, collection: Collection, id: Uuid) -> Result<bool, DatabaseError>;

    /// Append `child` to the id array `field` of document `id`, keeping it
    /// present exactly once.
    async fn push_ref(
        &mut self,
        collection: Collection,
        id: Uuid,
        field: &'static str,
        child: Uuid,
    ) -> Result<bool, DatabaseError>;

    /// Remove every occurrence of `child` from the id array `field`.
    async fn pull_ref(
        &mut self,
        collection: Collection,
        id: Uuid,
        field: &'static str,
        child: Uuid,
    ) -> Result<bool, DatabaseError>;

    /// Remove `child` from the id array `field` of every document holding it.
    async fn pull_ref_everywhere(
        &mut self,
        collection: Collection,
        field: &'static str,
        child: Uuid,
    ) -> Result<u64, DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError>;
}

/// Field names accepted in sort clauses and search lists. They are spliced
/// into SQL, so only plain identifiers are allowed.
pub(crate) fn is_valid_field(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_extends_containment_pattern() {
        let id = Uuid::new_v4();
        let q = Query::all().with("subjectId", id.to_string()).with("isActive", true);
        assert_eq!(q.filter, json!({ "subjectId": id.to_string(), "isActive": true }));
    }

    #[test]
    fn table_names_are_plain_identifiers() {
        for collection in Collection::ALL {
            assert!(is_valid_field(collection.table_name()), "{:?}", collection);
        }
        assert!(!is_valid_field("name; DROP TABLE users"));
        assert!(!is_valid_field(""));
    }
}
