//! Booking model and lifecycle states

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;

use super::quotation::LineItemRequest;
use crate::pricing::parse_amount;

/// Booking states: `Confirmed -> On Rent -> Completed`, with `Cancelled`
/// reachable from any non-terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum BookingStatus {
    #[default]
    Confirmed,
    #[serde(rename = "On Rent")]
    OnRent,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::OnRent => "On Rent",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Guarded transitions only; the administrative override bypasses this
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Confirmed, OnRent) | (OnRent, Completed) | (Confirmed | OnRent, Cancelled)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "On Rent" => Ok(BookingStatus::OnRent),
            "Completed" => Ok(BookingStatus::Completed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

/// Booked line: no rate snapshot, bookings are priced from current rates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookingItem {
    pub equipment_id: i32,
    pub name: String,
    pub quantity: i32,
}

/// Internal row structure (items as JSONB, status as text)
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    id: i32,
    booking_id: String,
    source_quotation_id: Option<i32>,
    customer_id: Option<i32>,
    customer_name: String,
    customer_phone: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    items: Json<Vec<BookingItem>>,
    total_amount: Decimal,
    security_deposit: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            booking_id: row.booking_id,
            source_quotation_id: row.source_quotation_id,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            start_date: row.start_date,
            end_date: row.end_date,
            items: row.items.0,
            total_amount: row.total_amount,
            security_deposit: row.security_deposit,
            status: row.status.parse().unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Booking record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: i32,
    /// Human-readable code, e.g. `BK-2025-001`
    pub booking_id: String,
    /// Internal id of the accepted quotation this booking came from
    pub source_quotation_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub items: Vec<BookingItem>,
    pub total_amount: Decimal,
    pub security_deposit: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create booking request.
///
/// With `quotation_id` set, customer, dates and items default to the
/// quotation's; any field given here overrides them.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateBooking {
    pub quotation_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub items: Option<Vec<LineItemRequest>>,
    /// Number or numeric string; anything unparsable counts as zero
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = Option<String>)]
    pub security_deposit: Option<Decimal>,
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_amount))
}

/// Administrative status override request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BookingStatusUpdate {
    pub status: BookingStatus,
}

/// Priced booking ready to be stored
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub booking_id: String,
    pub source_quotation_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub items: Vec<BookingItem>,
    pub total_amount: Decimal,
    pub security_deposit: Decimal,
    pub status: BookingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use BookingStatus::*;

    #[test]
    fn test_guarded_transitions() {
        assert!(Confirmed.can_transition_to(OnRent));
        assert!(OnRent.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(OnRent.can_transition_to(Cancelled));

        assert!(!Confirmed.can_transition_to(Completed));
        assert!(!OnRent.can_transition_to(Confirmed));
        for terminal in [Completed, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Confirmed, OnRent, Completed, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&OnRent).unwrap(), "\"On Rent\"");
        let status: BookingStatus = serde_json::from_str("\"Cancelled\"").unwrap();
        assert_eq!(status, Cancelled);
        assert!("Returned".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_security_deposit_parsing() {
        let parse = |body: &str| serde_json::from_str::<CreateBooking>(body).unwrap().security_deposit;

        assert_eq!(parse(r#"{}"#), None);
        assert_eq!(parse(r#"{"security_deposit": null}"#), None);
        assert_eq!(parse(r#"{"security_deposit": "n/a"}"#), None);
        assert_eq!(
            parse(r#"{"security_deposit": "2500.50"}"#),
            Some(Decimal::from_str("2500.50").unwrap())
        );
        assert_eq!(parse(r#"{"security_deposit": 10000}"#), Some(Decimal::from(10000)));
    }
}
