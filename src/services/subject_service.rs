use std::sync::Arc;

use uuid::Uuid;

use super::{check, finish, ListFilter, ServiceError, ServiceResult};
use crate::database::{Query, Repository, Store, Transaction};
use crate::models::Subject;
use crate::validation::checks;
use crate::validation::curriculum::{NewSubject, SubjectFields};

pub struct SubjectService {
    store: Arc<dyn Store>,
}

impl SubjectService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &ListFilter) -> ServiceResult<Vec<Subject>> {
        let mut query = Query::all();
        if let Some(active) = filter.active {
            query = query.with("isActive", active);
        }

        let mut tx = self.store.begin().await?;
        let subjects = tx.select_any::<Subject>(&query).await;
        finish(tx, subjects.map_err(ServiceError::from)).await
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Subject> {
        let mut tx = self.store.begin().await?;
        let subject = tx.get_404::<Subject>(id).await;
        finish(tx, subject.map_err(ServiceError::from)).await
    }

    pub async fn create(&self, input: NewSubject) -> ServiceResult<Subject> {
        let mut tx = self.store.begin().await?;
        let result = Self::create_in(&mut *tx, input).await;
        finish(tx, result).await
    }

    async fn create_in(tx: &mut dyn Transaction, input: NewSubject) -> ServiceResult<Subject> {
        let mut errors = Vec::new();
        checks::unique_name::<Subject>(tx, &input.name, None, &mut errors).await?;
        check(errors)?;

        let subject = Subject::new(input.name, input.icon_url, input.description);
        tx.create(&subject).await?;
        tracing::info!("Created subject {} ({})", subject.name, subject.id);
        Ok(subject)
    }

    pub async fn update(&self, id: Uuid, changes: SubjectFields) -> ServiceResult<Subject> {
        let mut tx = self.store.begin().await?;
        let result = Self::update_in(&mut *tx, id, changes).await;
        finish(tx, result).await
    }

    async fn update_in(tx: &mut dyn Transaction, id: Uuid, changes: SubjectFields) -> ServiceResult<Subject> {
        let mut subject = tx.get_404::<Subject>(id).await?;

        let mut errors = Vec::new();
        if let Some(name) = changes.name.as_deref().filter(|name| *name != subject.name) {
            checks::unique_name::<Subject>(tx, name, Some(id), &mut errors).await?;
        }
        check(errors)?;

        if let Some(name) = changes.name {
            subject.name = name;
        }
        if let Some(icon_url) = changes.icon_url {
            subject.icon_url = icon_url;
        }
        if let Some(description) = changes.description {
            subject.description = description;
        }
        if let Some(is_active) = changes.is_active {
            subject.is_active = is_active;
        }

        tx.save(&mut subject).await?;
        Ok(subject)
    }

    /// Mark the subject inactive; the document and its children stay.
    pub async fn soft_delete(&self, id: Uuid) -> ServiceResult<Subject> {
        self.update(
            id,
            SubjectFields {
                is_active: Some(false),
                ..SubjectFields::default()
            },
        )
        .await
    }

    pub async fn hard_delete(&self, id: Uuid) -> ServiceResult<Subject> {
        let mut tx = self.store.begin().await?;
        let result = Self::hard_delete_in(&mut *tx, id).await;
        finish(tx, result).await
    }

    async fn hard_delete_in(tx: &mut dyn Transaction, id: Uuid) -> ServiceResult<Subject> {
        let subject = tx.get_404::<Subject>(id).await?;
        if !subject.topics.is_empty() {
            return Err(ServiceError::rule("Cannot delete subject with existing topics"));
        }
        if !subject.concepts.is_empty() {
            return Err(ServiceError::rule("Cannot delete subject with existing concepts"));
        }

        tx.delete::<Subject>(id).await?;
        tracing::info!("Deleted subject {} ({})", subject.name, id);
        Ok(subject)
    }
}
