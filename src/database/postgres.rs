use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::store::{is_valid_field, Collection, Query, Store, Transaction};
use super::DatabaseError;

/// Postgres-backed document store: one `(id, doc JSONB)` table per collection.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, DatabaseError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PgTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

/// WHERE clause for a query plus the text parameters it binds after `$1`
/// (the containment pattern).
struct WhereClause {
    sql: String,
    search_param: Option<String>,
}

fn where_clause(query: &Query) -> Result<WhereClause, DatabaseError> {
    let mut sql = String::from(" WHERE doc @> $1");
    let mut next = 2;

    if query.exclude_id.is_some() {
        sql.push_str(&format!(" AND id <> ${next}"));
        next += 1;
    }

    let mut search_param = None;
    if let Some(search) = &query.search {
        if !search.term.is_empty() && !search.fields.is_empty() {
            let mut conditions = Vec::with_capacity(search.fields.len());
            for field in search.fields {
                if !is_valid_field(field) {
                    return Err(DatabaseError::QueryError(format!("invalid search field: {}", field)));
                }
                conditions.push(format!("doc->>'{field}' ILIKE ${next}"));
            }
            sql.push_str(&format!(" AND ({})", conditions.join(" OR ")));
            search_param = Some(format!("%{}%", escape_like(&search.term)));
        }
    }

    Ok(WhereClause { sql, search_param })
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn order_clause(query: &Query) -> Result<String, DatabaseError> {
    match query.sort {
        Some(sort) => {
            if !is_valid_field(sort.field) {
                return Err(DatabaseError::QueryError(format!("invalid sort field: {}", sort.field)));
            }
            let direction = if sort.descending { "DESC" } else { "ASC" };
            Ok(format!(" ORDER BY doc->'{}' {direction}, created_at {direction}, id", sort.field))
        }
        None => Ok(" ORDER BY created_at, id".to_string()),
    }
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn find(&mut self, collection: Collection, id: Uuid) -> Result<Option<Value>, DatabaseError> {
        let sql = format!("SELECT doc FROM \"{}\" WHERE id = $1", collection.table_name());
        let doc = sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(doc)
    }

    async fn find_many(&mut self, collection: Collection, query: &Query) -> Result<Vec<Value>, DatabaseError> {
        let clause = where_clause(query)?;
        let mut sql = format!("SELECT doc FROM \"{}\"{}", collection.table_name(), clause.sql);
        sql.push_str(&order_clause(query)?);
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = query.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        let mut q = sqlx::query_scalar::<_, Value>(&sql).bind(query.filter.clone());
        if let Some(id) = query.exclude_id {
            q = q.bind(id);
        }
        if let Some(term) = clause.search_param {
            q = q.bind(term);
        }

        let docs = q.fetch_all(&mut *self.tx).await?;
        Ok(docs)
    }

    async fn count(&mut self, collection: Collection, query: &Query) -> Result<u64, DatabaseError> {
        let clause = where_clause(query)?;
        let sql = format!("SELECT COUNT(*) FROM \"{}\"{}", collection.table_name(), clause.sql);

        let mut q = sqlx::query_scalar::<_, i64>(&sql).bind(query.filter.clone());
        if let Some(id) = query.exclude_id {
            q = q.bind(id);
        }
        if let Some(term) = clause.search_param {
            q = q.bind(term);
        }

        let count = q.fetch_one(&mut *self.tx).await?;
        Ok(count.max(0) as u64)
    }

    async fn insert(&mut self, collection: Collection, id: Uuid, doc: Value) -> Result<(), DatabaseError> {
        let sql = format!("INSERT INTO \"{}\" (id, doc) VALUES ($1, $2)", collection.table_name());
        sqlx::query(&sql)
            .bind(id)
            .bind(doc)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                let unique_violation = e
                    .as_database_error()
                    .and_then(|d| d.code())
                    .map_or(false, |code| code == "23505");
                if unique_violation {
                    DatabaseError::Duplicate(format!("{} already contains this value", collection.table_name()))
                } else {
                    DatabaseError::Sqlx(e)
                }
            })?;
        Ok(())
    }

    async fn replace(&mut self, collection: Collection, id: Uuid, doc: Value) -> Result<bool, DatabaseError> {
        let sql = format!("UPDATE \"{}\" SET doc = $2 WHERE id = $1", collection.table_name());
        let result = sqlx::query(&sql).bind(id).bind(doc).execute(&mut *self.tx).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&mut self, collection: Collection, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM \"{}\" WHERE id = $1", collection.table_name());
        let result = sqlx::query(&sql).bind(id).execute(&mut *self.tx).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn push_ref(
        &mut self,
        collection: Collection,
        id: Uuid,
        field: &'static str,
        child: Uuid,
    ) -> Result<bool, DatabaseError> {
        let sql = format!(
            "UPDATE \"{}\" SET doc = jsonb_set(doc, ARRAY[$2::text], \
             (COALESCE(doc->$2::text, '[]'::jsonb) - $3::text) || jsonb_build_array($3::text)) \
             WHERE id = $1",
            collection.table_name()
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(field)
            .bind(child.to_string())
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn pull_ref(
        &mut self,
        collection: Collection,
        id: Uuid,
        field: &'static str,
        child: Uuid,
    ) -> Result<bool, DatabaseError> {
        let sql = format!(
            "UPDATE \"{}\" SET doc = jsonb_set(doc, ARRAY[$2::text], \
             COALESCE(doc->$2::text, '[]'::jsonb) - $3::text) \
             WHERE id = $1",
            collection.table_name()
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(field)
            .bind(child.to_string())
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn pull_ref_everywhere(
        &mut self,
        collection: Collection,
        field: &'static str,
        child: Uuid,
    ) -> Result<u64, DatabaseError> {
        let sql = format!(
            "UPDATE \"{}\" SET doc = jsonb_set(doc, ARRAY[$1::text], (doc->$1::text) - $2::text) \
             WHERE doc->$1::text @> jsonb_build_array($2::text)",
            collection.table_name()
        );
        let result = sqlx::query(&sql)
            .bind(field)
            .bind(child.to_string())
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        let this = *self;
        this.tx.rollback().await?;
        Ok(())
    }
}
