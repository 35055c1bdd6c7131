//! Statement execution over the connection pool

use futures::{StreamExt, TryStreamExt};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{FromRow, PgPool, Postgres, Row};

use super::query::{count_sql, number_placeholders};
use super::{FindAll, Model, OrmError, SqlValue};

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

fn bind_args<'q>(mut query: PgQuery<'q>, args: &[SqlValue]) -> PgQuery<'q> {
    for arg in args {
        query = match arg.clone() {
            SqlValue::Text(s) => query.bind(s),
            SqlValue::BigInt(n) => query.bind(n),
            SqlValue::Double(n) => query.bind(n),
            SqlValue::Bool(b) => query.bind(b),
            // Untyped NULLs only ever land in nullable varchar columns
            SqlValue::Null => query.bind(None::<String>),
        };
    }
    query
}

/// Pooled database handle. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run a SELECT, returning at most `size` rows when given.
    pub async fn select(
        &self,
        sql: &str,
        args: &[SqlValue],
        size: Option<usize>,
    ) -> Result<Vec<PgRow>, OrmError> {
        tracing::info!("SQL: {}", sql);
        let numbered = number_placeholders(sql);
        let query = bind_args(sqlx::query(&numbered), args);

        let rows = match size {
            Some(n) => {
                query
                    .fetch(&self.pool)
                    .take(n)
                    .try_collect::<Vec<_>>()
                    .await?
            }
            None => query.fetch_all(&self.pool).await?,
        };

        tracing::info!("rows returned: {}", rows.len());
        Ok(rows)
    }

    /// Run an INSERT/UPDATE/DELETE and return the affected row count.
    ///
    /// Without autocommit the statement runs in its own transaction, rolled
    /// back if it fails.
    pub async fn execute(
        &self,
        sql: &str,
        args: &[SqlValue],
        autocommit: bool,
    ) -> Result<u64, OrmError> {
        tracing::info!("SQL: {}", sql);
        let numbered = number_placeholders(sql);
        let query = bind_args(sqlx::query(&numbered), args);

        if autocommit {
            let result = query.execute(&self.pool).await?;
            return Ok(result.rows_affected());
        }

        let mut tx = self.pool.begin().await?;
        match query.execute(&mut *tx).await {
            Ok(result) => {
                tx.commit().await?;
                Ok(result.rows_affected())
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e.into())
            }
        }
    }

    /// Run several statements under one commit/rollback.
    pub async fn transaction(
        &self,
        statements: &[(String, Vec<SqlValue>)],
    ) -> Result<u64, OrmError> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for (sql, args) in statements {
            tracing::info!("SQL (tx): {}", sql);
            let numbered = number_placeholders(sql);
            let query = bind_args(sqlx::query(&numbered), args);
            match query.execute(&mut *tx).await {
                Ok(result) => affected += result.rows_affected(),
                Err(e) => {
                    tx.rollback().await?;
                    return Err(e.into());
                }
            }
        }

        tx.commit().await?;
        Ok(affected)
    }

    /// Find a model by primary key.
    pub async fn find<M: Model>(&self, pk: impl Into<SqlValue>) -> Result<Option<M>, OrmError> {
        let meta = M::meta();
        let sql = format!("{} where \"{}\"=?", meta.select, meta.primary_key);
        let rows = self.select(&sql, &[pk.into()], Some(1)).await?;
        let model = rows.first().map(|row| M::from_row(row)).transpose()?;
        Ok(model)
    }

    pub async fn find_all<M: Model>(&self, query: FindAll) -> Result<Vec<M>, OrmError> {
        let (sql, args) = query.to_sql(&M::meta().select);
        let rows = self.select(&sql, &args, None).await?;
        let models = rows
            .iter()
            .map(|row| M::from_row(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(models)
    }

    /// Aggregate a single number, e.g. `count(id)`.
    pub async fn find_number<M: Model>(
        &self,
        select_field: &str,
        where_clause: Option<&str>,
        args: &[SqlValue],
    ) -> Result<Option<i64>, OrmError> {
        let sql = count_sql(M::meta().table, select_field, where_clause);
        let rows = self.select(&sql, args, Some(1)).await?;
        let number = rows
            .first()
            .map(|row| row.try_get::<i64, _>("_num_"))
            .transpose()?;
        Ok(number)
    }

    /// Insert a model, filling unset fields from their defaults.
    pub async fn save<M: Model>(&self, model: &mut M) -> Result<u64, OrmError> {
        let meta = M::meta();
        let mut args = Vec::with_capacity(meta.fields.len() + 1);
        for field in &meta.fields {
            args.push(model.value_or_default(field)?);
        }
        args.push(model.value_or_default(meta.primary_key)?);

        let rows = self.execute(&meta.insert, &args, true).await?;
        if rows != 1 {
            tracing::warn!("failed to insert record: affected rows: {}", rows);
        }
        Ok(rows)
    }

    pub async fn update<M: Model>(&self, model: &M) -> Result<u64, OrmError> {
        let meta = M::meta();
        let mut args: Vec<SqlValue> = meta
            .fields
            .iter()
            .map(|f| model.value(f).unwrap_or(SqlValue::Null))
            .collect();
        args.push(model.value(meta.primary_key).unwrap_or(SqlValue::Null));

        let rows = self.execute(&meta.update, &args, true).await?;
        if rows != 1 {
            tracing::warn!("failed to update by primary key: affected rows: {}", rows);
        }
        Ok(rows)
    }

    pub async fn remove<M: Model>(&self, model: &M) -> Result<u64, OrmError> {
        let meta = M::meta();
        let args = [model.value(meta.primary_key).unwrap_or(SqlValue::Null)];

        let rows = self.execute(&meta.delete, &args, true).await?;
        if rows != 1 {
            tracing::warn!("failed to remove by primary key: affected rows: {}", rows);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrations};
    use crate::models::{next_id, Blog};

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p quill-server -- --ignored

    async fn database() -> Database {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        Database::new(pool)
    }

    fn blog(name: &str) -> Blog {
        Blog {
            id: None,
            user_id: next_id(),
            user_name: "tester".into(),
            user_image: String::new(),
            name: name.into(),
            summary: "summary".into(),
            content: "content".into(),
            created_at: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn save_find_update_remove() {
        let db = database().await;

        let mut b = blog("first");
        assert_eq!(db.save(&mut b).await.unwrap(), 1);
        let id = b.id.clone().expect("id default applied");
        assert!(b.created_at.is_some());

        let mut found: Blog = db.find(id.as_str()).await.unwrap().unwrap();
        assert_eq!(found.name, "first");

        found.name = "renamed".into();
        assert_eq!(db.update(&found).await.unwrap(), 1);
        let found: Blog = db.find(id.as_str()).await.unwrap().unwrap();
        assert_eq!(found.name, "renamed");

        assert_eq!(db.remove(&found).await.unwrap(), 1);
        assert!(db.find::<Blog>(id.as_str()).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn find_number_counts_rows() {
        let db = database().await;
        let mut b = blog("counted");
        db.save(&mut b).await.unwrap();

        let n = db
            .find_number::<Blog>("count(id)", Some("user_id=?"), &[b.user_id.clone().into()])
            .await
            .unwrap();
        assert_eq!(n, Some(1));

        db.remove(&b).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn failed_transaction_rolls_back() {
        let db = database().await;
        let mut b = blog("rollback");
        db.save(&mut b).await.unwrap();
        let id = b.id.clone().unwrap();

        let statements = vec![
            (
                r#"delete from "blogs" where "id"=?"#.to_string(),
                vec![id.clone().into()],
            ),
            ("select * from no_such_table".to_string(), vec![]),
        ];
        assert!(db.transaction(&statements).await.is_err());
        assert!(db.find::<Blog>(id.as_str()).await.unwrap().is_some());

        db.remove(&b).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn execute_in_transaction_commits() {
        let db = database().await;
        let mut b = blog("before");
        db.save(&mut b).await.unwrap();
        let id = b.id.clone().unwrap();

        let affected = db
            .execute(
                r#"update "blogs" set "name"=? where "id"=?"#,
                &["after".into(), id.clone().into()],
                false,
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);
        let found: Blog = db.find(id.as_str()).await.unwrap().unwrap();
        assert_eq!(found.name, "after");

        db.remove(&found).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn execute_in_transaction_rolls_back_on_error() {
        let db = database().await;
        let mut b = blog("kept");
        db.save(&mut b).await.unwrap();

        // second insert of the same primary key violates the constraint
        let mut args: Vec<SqlValue> = Blog::meta()
            .fields
            .iter()
            .map(|f| b.value(f).unwrap_or(SqlValue::Null))
            .collect();
        args.push(b.id.clone().unwrap().into());
        let err = db.execute(&Blog::meta().insert, &args, false).await;
        assert!(err.is_err());

        let n = db
            .find_number::<Blog>("count(id)", Some("id=?"), &[b.id.clone().unwrap().into()])
            .await
            .unwrap();
        assert_eq!(n, Some(1));

        db.remove(&b).await.unwrap();
    }
}
