use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::store::{Collection, Query, Transaction};
use super::DatabaseError;

/// A typed document stored in one collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;
    /// Human-readable name used in error messages
    const LABEL: &'static str;

    fn id(&self) -> Uuid;

    /// Refresh the `updatedAt` timestamp before a save
    fn touch(&mut self);
}

/// An entity owned by exactly one parent whose id array lists it.
pub trait Child: Entity {
    type Parent: Entity;
    /// Name of the parent's id array holding this child
    const PARENT_FIELD: &'static str;
    /// Name of this entity's own parent-id field
    const PARENT_KEY: &'static str;

    fn parent_id(&self) -> Uuid;

    fn set_parent_id(&mut self, parent: Uuid);
}

/// Typed access to entities on top of the document transaction
#[async_trait]
pub trait Repository: Transaction {
    async fn get<E: Entity>(&mut self, id: Uuid) -> Result<Option<E>, DatabaseError> {
        match self.find(E::COLLECTION, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    async fn get_404<E: Entity>(&mut self, id: Uuid) -> Result<E, DatabaseError> {
        self.get::<E>(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", E::LABEL)))
    }

    async fn select_any<E: Entity>(&mut self, query: &Query) -> Result<Vec<E>, DatabaseError> {
        let docs = self.find_many(E::COLLECTION, query).await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(DatabaseError::from))
            .collect()
    }

    async fn select_one<E: Entity>(&mut self, query: &Query) -> Result<Option<E>, DatabaseError> {
        let query = query.clone().limit(1);
        Ok(self.select_any::<E>(&query).await?.into_iter().next())
    }

    async fn count_of<E: Entity>(&mut self, query: &Query) -> Result<u64, DatabaseError> {
        self.count(E::COLLECTION, query).await
    }

    async fn exists<E: Entity>(&mut self, query: &Query) -> Result<bool, DatabaseError> {
        Ok(self.count(E::COLLECTION, query).await? > 0)
    }

    async fn create<E: Entity>(&mut self, entity: &E) -> Result<(), DatabaseError> {
        let doc = serde_json::to_value(entity)?;
        self.insert(E::COLLECTION, entity.id(), doc).await
    }

    async fn save<E: Entity>(&mut self, entity: &mut E) -> Result<(), DatabaseError> {
        entity.touch();
        let doc = serde_json::to_value(&*entity)?;
        if self.replace(E::COLLECTION, entity.id(), doc).await? {
            Ok(())
        } else {
            Err(DatabaseError::NotFound(format!("{} not found", E::LABEL)))
        }
    }

    async fn delete<E: Entity>(&mut self, id: Uuid) -> Result<bool, DatabaseError> {
        self.remove(E::COLLECTION, id).await
    }
}

impl<T: Transaction + ?Sized> Repository for T {}
