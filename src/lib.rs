//! RentFlow equipment rental back-office
//!
//! REST JSON API for an equipment rental business: equipment catalogue,
//! customers, quotations, bookings and the rental lifecycle, with printable
//! quotation and rental agreement documents.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod documents;
pub mod error;
pub mod identifiers;
pub mod models;
pub mod pricing;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
