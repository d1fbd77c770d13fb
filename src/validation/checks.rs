//! Validation that needs the store. Each check appends to the caller's error
//! list so a request reports every problem at once; store failures abort.

use uuid::Uuid;

use super::FieldError;
use crate::database::{Child, DatabaseError, Entity, Query, Repository, Transaction};
use crate::models::{Concept, User};

/// `name` is a natural key: no other `E` may carry it.
pub async fn unique_name<E: Entity>(
    tx: &mut dyn Transaction,
    name: &str,
    except: Option<Uuid>,
    errors: &mut Vec<FieldError>,
) -> Result<(), DatabaseError> {
    let mut query = Query::all().with("name", name);
    if let Some(id) = except {
        query = query.excluding(id);
    }
    if tx.exists::<E>(&query).await? {
        errors.push(FieldError::new("name", format!("{} with this name already exists", E::LABEL)));
    }
    Ok(())
}

/// The parent named by `C::PARENT_KEY` must exist.
pub async fn parent_exists<C: Child>(
    tx: &mut dyn Transaction,
    parent: Uuid,
    errors: &mut Vec<FieldError>,
) -> Result<bool, DatabaseError> {
    let found = tx.get::<C::Parent>(parent).await?.is_some();
    if !found {
        errors.push(FieldError::new(
            C::PARENT_KEY,
            format!("{} not found", <C::Parent as Entity>::LABEL),
        ));
    }
    Ok(found)
}

/// `position` is unique among the children of one parent.
pub async fn position_free<C: Child>(
    tx: &mut dyn Transaction,
    parent: Uuid,
    position: i64,
    except: Option<Uuid>,
    errors: &mut Vec<FieldError>,
) -> Result<(), DatabaseError> {
    let mut query = Query::all()
        .with(C::PARENT_KEY, parent.to_string())
        .with("position", position);
    if let Some(id) = except {
        query = query.excluding(id);
    }
    if tx.exists::<C>(&query).await? {
        errors.push(FieldError::new(
            "position",
            format!(
                "Position {} is already used in this {}",
                position,
                <C::Parent as Entity>::LABEL.to_lowercase()
            ),
        ));
    }
    Ok(())
}

pub async fn concepts_exist(
    tx: &mut dyn Transaction,
    ids: &[Uuid],
    errors: &mut Vec<FieldError>,
) -> Result<(), DatabaseError> {
    for id in ids {
        if tx.get::<Concept>(*id).await?.is_none() {
            errors.push(FieldError::new("concepts", format!("Concept {} not found", id)));
        }
    }
    Ok(())
}

pub async fn email_available(
    tx: &mut dyn Transaction,
    email: &str,
    errors: &mut Vec<FieldError>,
) -> Result<(), DatabaseError> {
    if tx.exists::<User>(&Query::all().with("email", email)).await? {
        errors.push(FieldError::new("email", "Email is already in use"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, Store};
    use crate::models::{Subject, Topic};
    use serde_json::json;

    #[tokio::test]
    async fn position_is_scoped_to_the_parent() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let (a, b, topic) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        tx.insert(
            Topic::COLLECTION,
            topic,
            json!({ "id": topic, "name": "Linear Equations", "position": 1, "subjectId": a.to_string() }),
        )
        .await
        .unwrap();

        let mut errors = Vec::new();
        position_free::<Topic>(&mut *tx, a, 1, None, &mut errors).await.unwrap();
        position_free::<Topic>(&mut *tx, a, 1, Some(topic), &mut errors).await.unwrap();
        position_free::<Topic>(&mut *tx, b, 1, None, &mut errors).await.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Position 1 is already used in this subject");
    }

    #[tokio::test]
    async fn names_are_unique_per_collection() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let subject = Subject::new("Algebra".into(), "x".into(), "y".into());
        tx.create(&subject).await.unwrap();

        let mut errors = Vec::new();
        unique_name::<Subject>(&mut *tx, "Algebra", None, &mut errors).await.unwrap();
        unique_name::<Subject>(&mut *tx, "Algebra", Some(subject.id), &mut errors).await.unwrap();
        unique_name::<Topic>(&mut *tx, "Algebra", None, &mut errors).await.unwrap();
        assert_eq!(errors, vec![FieldError::new("name", "Subject with this name already exists")]);
    }

    #[tokio::test]
    async fn missing_parent_is_reported_on_its_key() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let mut errors = Vec::new();
        let found = parent_exists::<Topic>(&mut *tx, Uuid::new_v4(), &mut errors).await.unwrap();
        assert!(!found);
        assert_eq!(errors[0].field, "subjectId");
        assert_eq!(errors[0].message, "Subject not found");
    }
}
