//! Business logic services

pub mod bookings;
pub mod customers;
pub mod documents;
pub mod equipment;
pub mod identifiers;
pub mod quotations;
pub mod settings;
pub mod stats;
pub mod uploads;
pub mod users;

use chrono::NaiveDate;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    models::{equipment::Equipment, quotation::LineItemRequest},
    pricing::ensure_quantity,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub customers: customers::CustomersService,
    pub quotations: quotations::QuotationsService,
    pub bookings: bookings::BookingsService,
    pub settings: settings::SettingsService,
    pub stats: stats::StatsService,
    pub users: users::UsersService,
    pub documents: documents::DocumentsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let identifiers = identifiers::IdentifierGenerator::new(repository.clone());
        let storage = uploads::FileStorage::new(&config.uploads);

        Self {
            equipment: equipment::EquipmentService::new(repository.clone()),
            customers: customers::CustomersService::new(repository.clone()),
            quotations: quotations::QuotationsService::new(repository.clone(), identifiers.clone()),
            bookings: bookings::BookingsService::new(repository.clone(), identifiers),
            settings: settings::SettingsService::new(repository.clone(), storage),
            stats: stats::StatsService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), config.auth.clone()),
            documents: documents::DocumentsService::new(repository.clone()),
            repository,
        }
    }

    /// Check the backing store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

/// Reject ranges ending before they start
pub(crate) fn ensure_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> AppResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(AppError::Validation(format!(
                "End date {} is before start date {}",
                end, start
            )));
        }
    }
    Ok(())
}

/// Check quantities and load the equipment behind each line, in line order.
/// Unknown equipment is a not-found error.
pub(crate) async fn load_line_equipment(
    repository: &Repository,
    lines: &[LineItemRequest],
) -> AppResult<Vec<Equipment>> {
    if lines.is_empty() {
        return Err(AppError::Validation(
            "At least one equipment item is required".to_string(),
        ));
    }
    for line in lines {
        ensure_quantity(line.quantity)?;
    }

    let mut equipment = Vec::with_capacity(lines.len());
    for line in lines {
        equipment.push(repository.equipment.get_by_id(line.equipment_id).await?);
    }
    Ok(equipment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 3, d);
        assert!(ensure_date_range(day(1), day(1)).is_ok());
        assert!(ensure_date_range(day(1), day(5)).is_ok());
        assert!(ensure_date_range(None, day(5)).is_ok());
        assert!(matches!(
            ensure_date_range(day(5), day(1)),
            Err(AppError::Validation(_))
        ));
    }
}
