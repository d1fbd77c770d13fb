//! Parent/child bookkeeping. A child's id sits exactly once in its parent's
//! id array, and the child's parent field points back at that parent.

use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::database::{Child, Entity, Repository, Transaction};

fn parent_missing<C: Child>() -> ServiceError {
    ServiceError::NotFound(format!("{} not found", <C::Parent as Entity>::LABEL))
}

/// Insert `child` and list it on its parent.
pub async fn attach<C: Child>(tx: &mut dyn Transaction, child: &C) -> ServiceResult<()> {
    tx.create(child).await?;
    let listed = tx
        .push_ref(<C::Parent as Entity>::COLLECTION, child.parent_id(), C::PARENT_FIELD, child.id())
        .await?;
    if !listed {
        return Err(parent_missing::<C>());
    }
    Ok(())
}

/// Move `child` to `new_parent`: pull from the old parent's array, push onto
/// the new one and repoint the child. The caller saves the child.
pub async fn reparent<C: Child>(tx: &mut dyn Transaction, child: &mut C, new_parent: Uuid) -> ServiceResult<()> {
    let old_parent = child.parent_id();
    if old_parent == new_parent {
        return Ok(());
    }

    let collection = <C::Parent as Entity>::COLLECTION;
    // a missing old parent leaves nothing to pull
    tx.pull_ref(collection, old_parent, C::PARENT_FIELD, child.id()).await?;
    if !tx.push_ref(collection, new_parent, C::PARENT_FIELD, child.id()).await? {
        return Err(parent_missing::<C>());
    }

    tracing::debug!(
        "Moved {} {} from {} to {}",
        C::LABEL,
        child.id(),
        old_parent,
        new_parent
    );
    child.set_parent_id(new_parent);
    Ok(())
}

/// Remove `child` from its parent's array and delete it.
pub async fn detach<C: Child>(tx: &mut dyn Transaction, child: &C) -> ServiceResult<()> {
    tx.pull_ref(<C::Parent as Entity>::COLLECTION, child.parent_id(), C::PARENT_FIELD, child.id())
        .await?;
    tx.delete::<C>(child.id()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, Store};
    use crate::models::{Subject, Topic};
    use crate::validation::curriculum::NewTopic;
    use crate::models::DifficultyRange;

    fn topic(subject: Uuid) -> Topic {
        crate::services::topic_service::build_topic(NewTopic {
            name: "Linear Equations".into(),
            subject_id: subject,
            position: 1,
            difficulty_range: DifficultyRange::Beginner,
            estimated_study_hours: 2.0,
            is_active: true,
        })
    }

    #[tokio::test]
    async fn attach_then_reparent_keeps_both_sides_consistent() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let a = Subject::new("Algebra".into(), "x".into(), "y".into());
        let b = Subject::new("Geometry".into(), "x".into(), "y".into());
        tx.create(&a).await.unwrap();
        tx.create(&b).await.unwrap();

        let mut t = topic(a.id);
        attach(&mut *tx, &t).await.unwrap();
        reparent(&mut *tx, &mut t, b.id).await.unwrap();
        tx.save(&mut t).await.unwrap();

        let a: Subject = tx.get_404(a.id).await.unwrap();
        let b: Subject = tx.get_404(b.id).await.unwrap();
        let stored: Topic = tx.get_404(t.id).await.unwrap();
        assert!(a.topics.is_empty());
        assert_eq!(b.topics, vec![t.id]);
        assert_eq!(stored.subject_id, b.id);
    }

    #[tokio::test]
    async fn attach_to_missing_parent_fails() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let err = attach(&mut *tx, &topic(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Subject not found"));
    }

    #[tokio::test]
    async fn detach_removes_document_and_reference() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let subject = Subject::new("Algebra".into(), "x".into(), "y".into());
        tx.create(&subject).await.unwrap();
        let t = topic(subject.id);
        attach(&mut *tx, &t).await.unwrap();

        detach(&mut *tx, &t).await.unwrap();
        let subject: Subject = tx.get_404(subject.id).await.unwrap();
        assert!(subject.topics.is_empty());
        assert!(tx.get::<Topic>(t.id).await.unwrap().is_none());
    }
}
