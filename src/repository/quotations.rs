//! Quotation persistence

use async_trait::async_trait;
use sqlx::{types::Json, Pool, Postgres};

use super::conflict_on_unique;
use crate::{
    error::{AppError, AppResult},
    models::quotation::{NewQuotation, Quotation, QuotationRow, QuotationStatus},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuotationRepository: Send + Sync {
    /// List quotations, newest first
    async fn list(&self) -> AppResult<Vec<Quotation>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Quotation>;

    /// Number of quotations ever stored
    async fn count(&self) -> AppResult<i64>;

    /// Store a priced quotation; a duplicate code is a conflict
    async fn insert(&self, quotation: &NewQuotation) -> AppResult<Quotation>;

    /// Compare-and-set the status. Returns `None` when the stored status is no
    /// longer `current`.
    async fn set_status(
        &self,
        id: i32,
        current: QuotationStatus,
        next: QuotationStatus,
    ) -> AppResult<Option<Quotation>>;
}

#[derive(Clone)]
pub struct PgQuotationRepository {
    pool: Pool<Postgres>,
}

impl PgQuotationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuotationRepository for PgQuotationRepository {
    async fn list(&self) -> AppResult<Vec<Quotation>> {
        let rows = sqlx::query_as::<_, QuotationRow>(
            "SELECT * FROM quotations ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Quotation::from).collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Quotation> {
        sqlx::query_as::<_, QuotationRow>("SELECT * FROM quotations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Quotation::from)
            .ok_or_else(|| AppError::NotFound(format!("Quotation {} not found", id)))
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, quotation: &NewQuotation) -> AppResult<Quotation> {
        let row = sqlx::query_as::<_, QuotationRow>(
            r#"
            INSERT INTO quotations (
                quotation_id, customer_id, customer_name, customer_phone,
                start_date, end_date, items, total_amount, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&quotation.quotation_id)
        .bind(quotation.customer_id)
        .bind(&quotation.customer_name)
        .bind(&quotation.customer_phone)
        .bind(quotation.start_date)
        .bind(quotation.end_date)
        .bind(Json(&quotation.items))
        .bind(quotation.total_amount)
        .bind(quotation.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_on_unique("Quotation id already exists"))?;
        Ok(row.into())
    }

    async fn set_status(
        &self,
        id: i32,
        current: QuotationStatus,
        next: QuotationStatus,
    ) -> AppResult<Option<Quotation>> {
        let row = sqlx::query_as::<_, QuotationRow>(
            r#"
            UPDATE quotations SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(current.as_str())
        .bind(next.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Quotation::from))
    }
}
