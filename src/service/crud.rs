//! Generic CRUD execution against PostgreSQL.
//!
//! Every write runs in its own transaction. On failure the transaction is rolled back
//! explicitly before the error is translated.

use crate::error::AppError;
use crate::resource::{PrimaryKey, Resource};
use crate::sql::{delete, insert, select_by_key, select_list, update, QueryBuf};
use sqlx::postgres::Postgres;
use sqlx::{PgConnection, PgPool, Transaction};
use std::marker::PhantomData;

const MAX_LIMIT: u32 = 1000;

/// List parameters: exact-match filters plus optional paging.
#[derive(Debug, Default, Clone)]
pub struct ListQuery {
    pub filters: Vec<(String, String)>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub struct CrudService<R>(PhantomData<R>);

impl<R: Resource> CrudService<R> {
    /// Rows ordered by primary key. Filters on unknown columns are ignored.
    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<Vec<R::Row>, AppError> {
        let limit = query.limit.map(|n| n.min(MAX_LIMIT));
        let q = select_list(&R::META, &query.filters, limit, query.offset);
        tracing::debug!(sql = %q.sql, "list");
        build::<R>(&q).fetch_all(pool).await.map_err(AppError::from_read)
    }

    pub async fn read(pool: &PgPool, id: &R::Id) -> Result<Option<R::Row>, AppError> {
        let mut conn = pool.acquire().await?;
        Self::read_in(&mut conn, id).await
    }

    /// Read inside an open connection or transaction.
    pub async fn read_in(conn: &mut PgConnection, id: &R::Id) -> Result<Option<R::Row>, AppError> {
        let q = select_by_key(&R::META, id.bind_values());
        build::<R>(&q).fetch_optional(conn).await.map_err(AppError::from_read)
    }

    /// Read or a 404 naming the entity.
    pub async fn get(pool: &PgPool, id: &R::Id) -> Result<R::Row, AppError> {
        Self::read(pool, id).await?.ok_or_else(|| not_found::<R>(id))
    }

    pub async fn create(pool: &PgPool, input: R::Create) -> Result<R::Row, AppError> {
        let q = insert(&R::META, R::insert_values(input));
        let mut tx = pool.begin().await?;
        match Self::write_one(&mut tx, &q).await {
            Ok(Some(row)) => {
                tx.commit().await.map_err(AppError::from_write)?;
                Ok(row)
            }
            Ok(None) => {
                tx.rollback().await?;
                Err(AppError::Internal(format!("insert into {} returned no row", R::META.table)))
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// Apply a sparse patch. `None` when no row has the key.
    pub async fn update(pool: &PgPool, id: &R::Id, patch: R::Patch) -> Result<Option<R::Row>, AppError> {
        let q = update(&R::META, id.bind_values(), R::patch_values(patch));
        let mut tx = pool.begin().await?;
        match Self::write_one(&mut tx, &q).await {
            Ok(row) => {
                tx.commit().await.map_err(AppError::from_write)?;
                Ok(row)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// Returns false when no row has the key.
    pub async fn delete(pool: &PgPool, id: &R::Id) -> Result<bool, AppError> {
        let q = delete(&R::META, id.bind_values());
        let mut tx = pool.begin().await?;
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        match query.execute(&mut *tx).await {
            Ok(done) if done.rows_affected() > 0 => {
                tx.commit().await.map_err(AppError::from_write)?;
                Ok(true)
            }
            Ok(_) => {
                tx.rollback().await?;
                Ok(false)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(AppError::from_write(e))
            }
        }
    }

    pub(crate) async fn write_one(
        tx: &mut Transaction<'_, Postgres>,
        q: &QueryBuf,
    ) -> Result<Option<R::Row>, AppError> {
        tracing::debug!(sql = %q.sql, params = q.params.len(), "write");
        build::<R>(q).fetch_optional(&mut **tx).await.map_err(AppError::from_write)
    }
}

fn build<R: Resource>(q: &QueryBuf) -> sqlx::query::QueryAs<'_, Postgres, R::Row, sqlx::postgres::PgArguments> {
    let mut query = sqlx::query_as::<_, R::Row>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

pub fn not_found<R: Resource>(id: &R::Id) -> AppError {
    AppError::NotFound(format!("{} {} not found", R::LABEL, id.describe()))
}
