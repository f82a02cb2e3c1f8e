//! Equipment service

use validator::Validate;

use crate::{
    error::AppResult,
    models::equipment::{CreateEquipment, Equipment, UpdateEquipment},
    pricing::ensure_rate,
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        ensure_rate("daily_rate", data.daily_rate)?;
        if let Some(rate) = data.weekly_rate {
            ensure_rate("weekly_rate", rate)?;
        }
        if let Some(rate) = data.monthly_rate {
            ensure_rate("monthly_rate", rate)?;
        }

        let equipment = self.repository.equipment.create(data).await?;
        tracing::info!(id = equipment.id, name = %equipment.name, "Equipment created");
        Ok(equipment)
    }

    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        for (field, rate) in [
            ("daily_rate", data.daily_rate),
            ("weekly_rate", data.weekly_rate),
            ("monthly_rate", data.monthly_rate),
        ] {
            if let Some(rate) = rate {
                ensure_rate(field, rate)?;
            }
        }
        self.repository.equipment.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.equipment.delete(id).await?;
        tracing::info!(id, "Equipment deleted");
        Ok(())
    }
}
