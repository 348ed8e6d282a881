pub mod memory;
pub mod models;
pub mod postgres;
pub mod query_builder;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::Store;

use thiserror::Error;

use crate::filter::FilterError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid query: {0}")]
    Query(#[from] FilterError),

    #[error("Duplicate key: {0}")]
    Conflict(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected row data: {0}")]
    Decode(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23505") => {
                StoreError::Conflict(db.message().to_string())
            }
            sqlx::Error::Database(ref db) if matches!(db.code().as_deref(), Some("23503") | Some("23514")) => {
                StoreError::Constraint(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => StoreError::Unavailable(err.to_string()),
            sqlx::Error::Io(ref e) => StoreError::Unavailable(e.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => StoreError::Decode(err.to_string()),
            other => StoreError::Sqlx(other),
        }
    }
}

/// DDL for the three tables, applied by `trainers init-schema`.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");
