use serde_json::Value;
use sqlx::{self, postgres::PgArguments, postgres::PgRow, FromRow, PgPool, Row};

use super::StoreError;
use crate::filter::SqlResult;

/// Run a SELECT and map every row into `T`.
pub async fn fetch_all<T>(pool: &PgPool, sql: &SqlResult) -> Result<Vec<T>, StoreError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    log_query(sql);
    let mut q = sqlx::query_as::<_, T>(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query_as(q, p);
    }
    Ok(q.fetch_all(pool).await?)
}

pub async fn fetch_optional<T>(pool: &PgPool, sql: &SqlResult) -> Result<Option<T>, StoreError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    log_query(sql);
    let mut q = sqlx::query_as::<_, T>(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query_as(q, p);
    }
    Ok(q.fetch_optional(pool).await?)
}

/// Run a statement and return the number of affected rows.
pub async fn execute(pool: &PgPool, sql: &SqlResult) -> Result<u64, StoreError> {
    log_query(sql);
    let mut q = sqlx::query(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query(q, p);
    }
    Ok(q.execute(pool).await?.rows_affected())
}

/// Read a single integer column (`COUNT(*)`, `RETURNING id`) from the first row.
pub async fn fetch_scalar_i64(pool: &PgPool, sql: &SqlResult, column: &str) -> Result<i64, StoreError> {
    log_query(sql);
    let mut q = sqlx::query(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query(q, p);
    }
    let row = q.fetch_one(pool).await?;
    // COUNT(*) is BIGINT, SERIAL ids are INTEGER
    match row.try_get::<i64, _>(column) {
        Ok(v) => Ok(v),
        Err(_) => Ok(i64::from(row.try_get::<i32, _>(column)?)),
    }
}

fn log_query(sql: &SqlResult) {
    tracing::debug!(query = %sql.query, params = sql.params.len(), "executing query");
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Every integer column in the schema is INTEGER
                match i32::try_from(i) {
                    Ok(small) => q.bind(small),
                    Err(_) => q.bind(i),
                }
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                match i32::try_from(i) {
                    Ok(small) => q.bind(small),
                    Err(_) => q.bind(i),
                }
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}
