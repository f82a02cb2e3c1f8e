//! Customer model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Customer record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub phone: String,
    /// National identity card number
    pub national_id: String,
    pub address: String,
    pub email: Option<String>,
    /// Bookings ever created for this customer
    pub total_bookings: i32,
    /// Bookings not yet completed or cancelled
    pub active_bookings: i32,
    pub last_booking: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create customer request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCustomer {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub national_id: String,
    #[serde(default)]
    pub address: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Update customer request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomer {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}
