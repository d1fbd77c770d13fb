use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::{check, finish, relations, ListFilter, ServiceError, ServiceResult};
use crate::database::{Query, Repository, Store, Transaction};
use crate::models::Module;
use crate::validation::checks;
use crate::validation::curriculum::{ModuleFields, NewModule};

pub struct ModuleService {
    store: Arc<dyn Store>,
}

impl ModuleService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &ListFilter) -> ServiceResult<Vec<Module>> {
        let mut query = Query::all().order_by("position");
        if let Some(subtopic_id) = filter.subtopic_id {
            query = query.with("subtopicId", subtopic_id.to_string());
        }
        if let Some(module_type) = filter.module_type {
            query = query.with("moduleType", json!(module_type));
        }

        let mut tx = self.store.begin().await?;
        let modules = tx.select_any::<Module>(&query).await;
        finish(tx, modules.map_err(ServiceError::from)).await
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Module> {
        let mut tx = self.store.begin().await?;
        let module = tx.get_404::<Module>(id).await;
        finish(tx, module.map_err(ServiceError::from)).await
    }

    pub async fn create(&self, input: NewModule) -> ServiceResult<Module> {
        let mut tx = self.store.begin().await?;
        let result = Self::create_in(&mut *tx, input).await;
        finish(tx, result).await
    }

    async fn create_in(tx: &mut dyn Transaction, input: NewModule) -> ServiceResult<Module> {
        let mut errors = Vec::new();
        checks::unique_name::<Module>(tx, &input.name, None, &mut errors).await?;
        if checks::parent_exists::<Module>(tx, input.subtopic_id, &mut errors).await? {
            checks::position_free::<Module>(tx, input.subtopic_id, input.position, None, &mut errors).await?;
        }
        check(errors)?;

        let now = Utc::now();
        let module = Module {
            id: Uuid::new_v4(),
            name: input.name,
            position: input.position,
            module_type: input.module_type,
            xp_reward: input.xp_reward,
            difficulty_level: input.difficulty_level,
            estimated_minutes: input.estimated_minutes,
            subtopic_id: input.subtopic_id,
            exercises: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        relations::attach(tx, &module).await?;
        tracing::info!("Created module {} ({}) in subtopic {}", module.name, module.id, module.subtopic_id);
        Ok(module)
    }

    pub async fn update(&self, id: Uuid, changes: ModuleFields) -> ServiceResult<Module> {
        let mut tx = self.store.begin().await?;
        let result = Self::update_in(&mut *tx, id, changes).await;
        finish(tx, result).await
    }

    async fn update_in(tx: &mut dyn Transaction, id: Uuid, changes: ModuleFields) -> ServiceResult<Module> {
        let mut module = tx.get_404::<Module>(id).await?;
        let subtopic_id = changes.subtopic_id.unwrap_or(module.subtopic_id);
        let position = changes.position.unwrap_or(module.position);
        let moving = subtopic_id != module.subtopic_id;

        let mut errors = Vec::new();
        if let Some(name) = changes.name.as_deref().filter(|name| *name != module.name) {
            checks::unique_name::<Module>(tx, name, Some(id), &mut errors).await?;
        }
        let parent_ok = !moving || checks::parent_exists::<Module>(tx, subtopic_id, &mut errors).await?;
        if parent_ok && (moving || position != module.position) {
            checks::position_free::<Module>(tx, subtopic_id, position, Some(id), &mut errors).await?;
        }
        check(errors)?;

        if let Some(name) = changes.name {
            module.name = name;
        }
        if let Some(module_type) = changes.module_type {
            module.module_type = module_type;
        }
        if let Some(xp_reward) = changes.xp_reward {
            module.xp_reward = xp_reward;
        }
        if let Some(level) = changes.difficulty_level {
            module.difficulty_level = level;
        }
        if let Some(minutes) = changes.estimated_minutes {
            module.estimated_minutes = minutes;
        }
        module.position = position;
        relations::reparent(tx, &mut module, subtopic_id).await?;

        tx.save(&mut module).await?;
        Ok(module)
    }

    pub async fn hard_delete(&self, id: Uuid) -> ServiceResult<Module> {
        let mut tx = self.store.begin().await?;
        let result = Self::hard_delete_in(&mut *tx, id).await;
        finish(tx, result).await
    }

    async fn hard_delete_in(tx: &mut dyn Transaction, id: Uuid) -> ServiceResult<Module> {
        let module = tx.get_404::<Module>(id).await?;
        if !module.exercises.is_empty() {
            return Err(ServiceError::rule("Cannot delete module with existing exercises"));
        }

        relations::detach(tx, &module).await?;
        tracing::info!("Deleted module {} ({})", module.name, id);
        Ok(module)
    }
}
