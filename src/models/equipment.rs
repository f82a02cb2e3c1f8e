//! Equipment model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Availability of a piece of equipment.
///
/// Edited by hand; booking transitions never touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum EquipmentStatus {
    #[default]
    Available,
    #[serde(rename = "On Rent")]
    OnRent,
    #[serde(rename = "Under Maintenance")]
    UnderMaintenance,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Available => "Available",
            EquipmentStatus::OnRent => "On Rent",
            EquipmentStatus::UnderMaintenance => "Under Maintenance",
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(EquipmentStatus::Available),
            "On Rent" => Ok(EquipmentStatus::OnRent),
            "Under Maintenance" => Ok(EquipmentStatus::UnderMaintenance),
            _ => Err(format!("Invalid equipment status: {}", s)),
        }
    }
}

/// Internal row structure (status stored as text)
#[derive(Debug, Clone, FromRow)]
pub struct EquipmentRow {
    id: i32,
    name: String,
    category: String,
    daily_rate: Decimal,
    weekly_rate: Decimal,
    monthly_rate: Decimal,
    status: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<EquipmentRow> for Equipment {
    fn from(row: EquipmentRow) -> Self {
        Equipment {
            id: row.id,
            name: row.name,
            category: row.category,
            daily_rate: row.daily_rate,
            weekly_rate: row.weekly_rate,
            monthly_rate: row.monthly_rate,
            status: row.status.parse().unwrap_or_default(),
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    pub category: String,
    /// Rate per day, used to price quotations and bookings
    pub daily_rate: Decimal,
    pub weekly_rate: Decimal,
    pub monthly_rate: Decimal,
    pub status: EquipmentStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create equipment request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub daily_rate: Decimal,
    pub weekly_rate: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
    pub status: Option<EquipmentStatus>,
    pub description: Option<String>,
}

/// Update equipment request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub category: Option<String>,
    pub daily_rate: Option<Decimal>,
    pub weekly_rate: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
    pub status: Option<EquipmentStatus>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&EquipmentStatus::UnderMaintenance).unwrap(),
            "\"Under Maintenance\""
        );
        let status: EquipmentStatus = serde_json::from_str("\"On Rent\"").unwrap();
        assert_eq!(status, EquipmentStatus::OnRent);
        for status in [
            EquipmentStatus::Available,
            EquipmentStatus::OnRent,
            EquipmentStatus::UnderMaintenance,
        ] {
            assert_eq!(status.as_str().parse::<EquipmentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_create_validation() {
        let data: CreateEquipment =
            serde_json::from_str(r#"{"name": "", "daily_rate": "100"}"#).unwrap();
        assert!(data.validate().is_err());
        let data: CreateEquipment =
            serde_json::from_str(r#"{"name": "Excavator", "daily_rate": 100}"#).unwrap();
        assert!(data.validate().is_ok());
        assert_eq!(data.category, "");
    }
}
