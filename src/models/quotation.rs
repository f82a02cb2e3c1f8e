//! Quotation model and lifecycle states

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use validator::Validate;

/// Quotation states: `Draft -> Sent -> Accepted | Declined`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum QuotationStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Declined,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "Draft",
            QuotationStatus::Sent => "Sent",
            QuotationStatus::Accepted => "Accepted",
            QuotationStatus::Declined => "Declined",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QuotationStatus::Accepted | QuotationStatus::Declined)
    }

    /// Whether `self -> next` is a legal transition.
    ///
    /// A Draft may be accepted or declined without being sent first.
    pub fn can_transition_to(&self, next: QuotationStatus) -> bool {
        use QuotationStatus::*;
        matches!(
            (self, next),
            (Draft, Sent) | (Draft | Sent, Accepted) | (Draft | Sent, Declined)
        )
    }
}

impl std::fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QuotationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(QuotationStatus::Draft),
            "Sent" => Ok(QuotationStatus::Sent),
            "Accepted" => Ok(QuotationStatus::Accepted),
            "Declined" => Ok(QuotationStatus::Declined),
            _ => Err(format!("Invalid quotation status: {}", s)),
        }
    }
}

/// Priced line of a quotation, frozen at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuotationItem {
    pub equipment_id: i32,
    /// Equipment name at the time of quoting
    pub name: String,
    pub quantity: i32,
    /// Daily rate at the time of quoting
    pub rate: Decimal,
    pub subtotal: Decimal,
}

/// Line item as submitted by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LineItemRequest {
    pub equipment_id: i32,
    pub quantity: i32,
}

/// Internal row structure (items as JSONB, status as text)
#[derive(Debug, Clone, FromRow)]
pub struct QuotationRow {
    id: i32,
    quotation_id: String,
    customer_id: Option<i32>,
    customer_name: String,
    customer_phone: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    items: Json<Vec<QuotationItem>>,
    total_amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<QuotationRow> for Quotation {
    fn from(row: QuotationRow) -> Self {
        Quotation {
            id: row.id,
            quotation_id: row.quotation_id,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            start_date: row.start_date,
            end_date: row.end_date,
            items: row.items.0,
            total_amount: row.total_amount,
            status: row.status.parse().unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Quotation record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Quotation {
    pub id: i32,
    /// Human-readable code, e.g. `QT-2025-001`
    pub quotation_id: String,
    pub customer_id: Option<i32>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub items: Vec<QuotationItem>,
    /// Sum of item subtotals
    pub total_amount: Decimal,
    pub status: QuotationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create quotation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateQuotation {
    pub customer_id: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "At least one equipment item is required"))]
    #[serde(default)]
    pub items: Vec<LineItemRequest>,
}

/// Fully priced quotation ready to be stored
#[derive(Debug, Clone)]
pub struct NewQuotation {
    pub quotation_id: String,
    pub customer_id: Option<i32>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub items: Vec<QuotationItem>,
    pub total_amount: Decimal,
    pub status: QuotationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use QuotationStatus::*;

    #[test]
    fn test_transitions() {
        assert!(Draft.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Accepted));
        assert!(Sent.can_transition_to(Declined));
        assert!(Draft.can_transition_to(Accepted));
        assert!(Draft.can_transition_to(Declined));

        assert!(!Sent.can_transition_to(Sent));
        assert!(!Sent.can_transition_to(Draft));
        for terminal in [Accepted, Declined] {
            assert!(terminal.is_terminal());
            for next in [Draft, Sent, Accepted, Declined] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_empty_items_rejected() {
        let data: CreateQuotation = serde_json::from_str(r#"{"customer_id": 1}"#).unwrap();
        assert!(data.validate().is_err());
    }
}
