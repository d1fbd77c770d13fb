use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::{check, finish, relations, ListFilter, ServiceError, ServiceResult};
use crate::database::{Query, Repository, Store, Transaction};
use crate::models::Formula;
use crate::validation::checks;
use crate::validation::curriculum::{FormulaFields, NewFormula};

pub struct FormulaService {
    store: Arc<dyn Store>,
}

impl FormulaService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &ListFilter) -> ServiceResult<Vec<Formula>> {
        let mut query = Query::all();
        if let Some(concept_id) = filter.concept_id {
            query = query.with("conceptId", concept_id.to_string());
        }

        let mut tx = self.store.begin().await?;
        let formulas = tx.select_any::<Formula>(&query).await;
        finish(tx, formulas.map_err(ServiceError::from)).await
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Formula> {
        let mut tx = self.store.begin().await?;
        let formula = tx.get_404::<Formula>(id).await;
        finish(tx, formula.map_err(ServiceError::from)).await
    }

    pub async fn create(&self, input: NewFormula) -> ServiceResult<Formula> {
        let mut tx = self.store.begin().await?;
        let result = Self::create_in(&mut *tx, input).await;
        finish(tx, result).await
    }

    async fn create_in(tx: &mut dyn Transaction, input: NewFormula) -> ServiceResult<Formula> {
        let mut errors = Vec::new();
        checks::parent_exists::<Formula>(tx, input.concept_id, &mut errors).await?;
        check(errors)?;

        let now = Utc::now();
        let formula = Formula {
            id: Uuid::new_v4(),
            name: input.name,
            latex_notation: input.latex_notation,
            plain_text: input.plain_text,
            description: input.description,
            concept_id: input.concept_id,
            created_at: now,
            updated_at: now,
        };
        relations::attach(tx, &formula).await?;
        Ok(formula)
    }

    pub async fn update(&self, id: Uuid, changes: FormulaFields) -> ServiceResult<Formula> {
        let mut tx = self.store.begin().await?;
        let result = Self::update_in(&mut *tx, id, changes).await;
        finish(tx, result).await
    }

    async fn update_in(tx: &mut dyn Transaction, id: Uuid, changes: FormulaFields) -> ServiceResult<Formula> {
        let mut formula = tx.get_404::<Formula>(id).await?;
        let concept_id = changes.concept_id.unwrap_or(formula.concept_id);

        let mut errors = Vec::new();
        if concept_id != formula.concept_id {
            checks::parent_exists::<Formula>(tx, concept_id, &mut errors).await?;
        }
        check(errors)?;

        if let Some(name) = changes.name {
            formula.name = name;
        }
        if let Some(latex) = changes.latex_notation {
            formula.latex_notation = latex;
        }
        if let Some(plain_text) = changes.plain_text {
            formula.plain_text = Some(plain_text);
        }
        if let Some(description) = changes.description {
            formula.description = Some(description);
        }
        relations::reparent(tx, &mut formula, concept_id).await?;

        tx.save(&mut formula).await?;
        Ok(formula)
    }

    pub async fn hard_delete(&self, id: Uuid) -> ServiceResult<Formula> {
        let mut tx = self.store.begin().await?;
        let result = async {
            let formula = tx.get_404::<Formula>(id).await?;
            relations::detach(&mut *tx, &formula).await?;
            Ok::<_, ServiceError>(formula)
        }
        .await;
        finish(tx, result).await
    }
}
