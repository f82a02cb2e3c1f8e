//! Dashboard statistics service

use crate::{error::AppResult, models::stats::DashboardStats, repository::Repository};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let equipment = self.repository.equipment.list().await?;
        let customers = self.repository.customers.count().await?;
        let quotations = self.repository.quotations.list().await?;
        let bookings = self.repository.bookings.list().await?;

        Ok(DashboardStats::compute(
            &equipment,
            customers,
            &quotations,
            &bookings,
        ))
    }
}
