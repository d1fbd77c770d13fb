//! A store that fails the first reference push after being armed, to check
//! that multi-document writes commit or roll back as a unit.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{ids, str_of, TestApp};
use mathgenius_api::database::{Collection, DatabaseError, MemoryStore, Query, Store, Transaction};

#[derive(Clone, Default)]
struct FailingStore {
    inner: MemoryStore,
    armed: Arc<AtomicBool>,
}

struct FailingTransaction {
    inner: Box<dyn Transaction>,
    armed: Arc<AtomicBool>,
}

#[async_trait]
impl Store for FailingStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, DatabaseError> {
        Ok(Box::new(FailingTransaction {
            inner: self.inner.begin().await?,
            armed: self.armed.clone(),
        }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.inner.ping().await
    }
}

#[async_trait]
impl Transaction for FailingTransaction {
    async fn find(&mut self, collection: Collection, id: Uuid) -> Result<Option<Value>, DatabaseError> {
        self.inner.find(collection, id).await
    }

    async fn find_many(&mut self, collection: Collection, query: &Query) -> Result<Vec<Value>, DatabaseError> {
        self.inner.find_many(collection, query).await
    }

    async fn count(&mut self, collection: Collection, query: &Query) -> Result<u64, DatabaseError> {
        self.inner.count(collection, query).await
    }

    async fn insert(&mut self, collection: Collection, id: Uuid, doc: Value) -> Result<(), DatabaseError> {
        self.inner.insert(collection, id, doc).await
    }

    async fn replace(&mut self, collection: Collection, id: Uuid, doc: Value) -> Result<bool, DatabaseError> {
        self.inner.replace(collection, id, doc).await
    }

    async fn remove(&mut self, collection: Collection, id: Uuid) -> Result<bool, DatabaseError> {
        self.inner.remove(collection, id).await
    }

    async fn push_ref(
        &mut self,
        collection: Collection,
        id: Uuid,
        field: &'static str,
        child: Uuid,
    ) -> Result<bool, DatabaseError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("injected failure".to_string()));
        }
        self.inner.push_ref(collection, id, field, child).await
    }

    async fn pull_ref(
        &mut self,
        collection: Collection,
        id: Uuid,
        field: &'static str,
        child: Uuid,
    ) -> Result<bool, DatabaseError> {
        self.inner.pull_ref(collection, id, field, child).await
    }

    async fn pull_ref_everywhere(
        &mut self,
        collection: Collection,
        field: &'static str,
        child: Uuid,
    ) -> Result<u64, DatabaseError> {
        self.inner.pull_ref_everywhere(collection, field, child).await
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        self.inner.rollback().await
    }
}

async fn app_with_failing_store() -> Result<(TestApp, Arc<AtomicBool>)> {
    let store = FailingStore::default();
    let armed = store.armed.clone();
    let app = TestApp::with_store(Arc::new(store)).await?;
    Ok((app, armed))
}

#[tokio::test]
async fn failed_move_leaves_both_subjects_untouched() -> Result<()> {
    let (app, armed) = app_with_failing_store().await?;
    let a = str_of(&app.subject("Algebra").await?, "id");
    let b = str_of(&app.subject("Geometry").await?, "id");
    let topic = str_of(&app.topic("Linear Equations", &a, 1).await?, "id");

    armed.store(true, Ordering::SeqCst);
    let res = app
        .put(&format!("/topics/{}", topic), json!({ "subjectId": b }), Some(&app.admin_token))
        .await?;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["message"], "Database unavailable");

    let a_doc = app.get(&format!("/subjects/{}", a), None).await?.body;
    let b_doc = app.get(&format!("/subjects/{}", b), None).await?.body;
    assert_eq!(ids(&a_doc, "topics"), vec![topic.clone()]);
    assert!(ids(&b_doc, "topics").is_empty());

    let topic_doc = app.get(&format!("/topics/{}", topic), None).await?.body;
    assert_eq!(str_of(&topic_doc, "subjectId"), a);
    Ok(())
}

#[tokio::test]
async fn failed_create_leaves_no_orphan() -> Result<()> {
    let (app, armed) = app_with_failing_store().await?;
    let a = str_of(&app.subject("Algebra").await?, "id");

    armed.store(true, Ordering::SeqCst);
    let res = app
        .post(
            "/topics",
            json!({
                "name": "Linear Equations",
                "subjectId": a,
                "position": 1,
                "difficultyRange": "Beginner",
                "estimatedStudyHours": 2,
            }),
            Some(&app.admin_token),
        )
        .await?;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);

    let topics = app.get("/topics", None).await?.body;
    assert_eq!(topics, json!([]));

    app.topic("Linear Equations", &a, 1).await?;
    let a_doc = app.get(&format!("/subjects/{}", a), None).await?.body;
    assert_eq!(ids(&a_doc, "topics").len(), 1);
    Ok(())
}
