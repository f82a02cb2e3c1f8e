//! Repository layer for persistence
//!
//! Each entity has a store trait with a Postgres implementation next to it.
//! [`memory::MemoryStore`] implements every trait in-process and backs the
//! `memory://` database URL.

pub mod bookings;
pub mod customers;
pub mod equipment;
pub mod memory;
pub mod quotations;
pub mod sequences;
pub mod settings;
pub mod users;

use std::sync::Arc;

use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
};

pub use bookings::BookingRepository;
pub use customers::CustomerRepository;
pub use equipment::EquipmentRepository;
pub use quotations::QuotationRepository;
pub use sequences::SequenceRepository;
pub use settings::SettingsRepository;
pub use users::UserRepository;

/// Main repository struct holding one store per entity
#[derive(Clone)]
pub struct Repository {
    pool: Option<Pool<Postgres>>,
    pub equipment: Arc<dyn EquipmentRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub quotations: Arc<dyn QuotationRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub sequences: Arc<dyn SequenceRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repository {
    /// Open the store named by the configuration, running migrations for Postgres
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        if config.is_in_memory() {
            tracing::warn!("Using in-memory store, data will not survive a restart");
            return Ok(Self::in_memory());
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;

        tracing::info!("Connected to database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to run database migrations: {}", e)))?;

        tracing::info!("Database migrations completed");

        Ok(Self::postgres(pool))
    }

    /// Create a repository over the given database pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: Arc::new(equipment::PgEquipmentRepository::new(pool.clone())),
            customers: Arc::new(customers::PgCustomerRepository::new(pool.clone())),
            quotations: Arc::new(quotations::PgQuotationRepository::new(pool.clone())),
            bookings: Arc::new(bookings::PgBookingRepository::new(pool.clone())),
            sequences: Arc::new(sequences::PgSequenceRepository::new(pool.clone())),
            settings: Arc::new(settings::PgSettingsRepository::new(pool.clone())),
            users: Arc::new(users::PgUserRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Create a repository backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(memory::MemoryStore::new()))
    }

    /// Create a repository sharing an existing in-memory store
    pub fn from_memory(store: Arc<memory::MemoryStore>) -> Self {
        Self {
            pool: None,
            equipment: store.clone(),
            customers: store.clone(),
            quotations: store.clone(),
            bookings: store.clone(),
            sequences: store.clone(),
            settings: store.clone(),
            users: store,
        }
    }

    /// Round-trip to the database; always succeeds for the in-memory store
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}

/// Map unique-constraint violations to [`AppError::Conflict`]
pub(crate) fn conflict_on_unique(message: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| {
        let unique_violation = matches!(
            &e,
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
        );
        if unique_violation {
            AppError::Conflict(message.to_string())
        } else {
            AppError::Database(e)
        }
    }
}
