//! Settings singleton persistence

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::settings::{Settings, UpdateSettings},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Return the settings record, creating it with defaults if absent.
    /// Concurrent first calls still leave exactly one record.
    async fn get_or_create(&self) -> AppResult<Settings>;

    /// Apply a partial update, creating the record first if needed
    async fn update(&self, patch: &UpdateSettings) -> AppResult<Settings>;

    async fn set_logo_path(&self, path: &str) -> AppResult<Settings>;
}

#[derive(Clone)]
pub struct PgSettingsRepository {
    pool: Pool<Postgres>,
}

impl PgSettingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn ensure_row(&self) -> AppResult<()> {
        sqlx::query("INSERT INTO settings (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn get_or_create(&self) -> AppResult<Settings> {
        self.ensure_row().await?;
        let settings = sqlx::query_as::<_, Settings>("SELECT * FROM settings WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(settings)
    }

    async fn update(&self, patch: &UpdateSettings) -> AppResult<Settings> {
        self.ensure_row().await?;
        let settings = sqlx::query_as::<_, Settings>(
            r#"
            UPDATE settings SET
                company_name = COALESCE($1, company_name),
                company_address = COALESCE($2, company_address),
                company_phone = COALESCE($3, company_phone),
                company_email = COALESCE($4, company_email),
                tax_rate = COALESCE($5, tax_rate),
                default_currency = COALESCE($6, default_currency),
                quotation_validity_days = COALESCE($7, quotation_validity_days),
                theme_color = COALESCE($8, theme_color),
                dark_mode = COALESCE($9, dark_mode),
                compact_mode = COALESCE($10, compact_mode),
                email_notifications = COALESCE($11, email_notifications),
                auto_save_drafts = COALESCE($12, auto_save_drafts),
                updated_at = NOW()
            WHERE id = 1
            RETURNING *
            "#,
        )
        .bind(&patch.company_name)
        .bind(&patch.company_address)
        .bind(&patch.company_phone)
        .bind(&patch.company_email)
        .bind(patch.tax_rate)
        .bind(&patch.default_currency)
        .bind(patch.quotation_validity_days)
        .bind(&patch.theme_color)
        .bind(patch.dark_mode)
        .bind(patch.compact_mode)
        .bind(patch.email_notifications)
        .bind(patch.auto_save_drafts)
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    async fn set_logo_path(&self, path: &str) -> AppResult<Settings> {
        self.ensure_row().await?;
        let settings = sqlx::query_as::<_, Settings>(
            "UPDATE settings SET logo_path = $1, updated_at = NOW() WHERE id = 1 RETURNING *",
        )
        .bind(path)
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }
}
