//! Per-year identifier counters

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, identifiers::IdentifierKind};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SequenceRepository: Send + Sync {
    /// Atomically reserve and return the next sequence value for
    /// `(kind, year)`. The first value of a year is 1.
    async fn next_value(&self, kind: IdentifierKind, year: i32) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct PgSequenceRepository {
    pool: Pool<Postgres>,
}

impl PgSequenceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceRepository for PgSequenceRepository {
    async fn next_value(&self, kind: IdentifierKind, year: i32) -> AppResult<i64> {
        // Single statement: the row lock taken by the upsert serializes
        // concurrent callers on the same (kind, year)
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO identifier_sequences (kind, year, last_value)
            VALUES ($1, $2, 1)
            ON CONFLICT (kind, year)
            DO UPDATE SET last_value = identifier_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(kind.as_str())
        .bind(year)
        .fetch_one(&self.pool)
        .await?;
        Ok(value)
    }
}
